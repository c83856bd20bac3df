//! List panels: e-mail recipients, recorded patterns and recent detections.

use detector_core::scheduler::Scheduler;
use iced::widget::{Column, button, column, container, horizontal_space, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::{AppDisplayData, Message};

fn panel<'a>(title: &'static str, body: Element<'a, Message>) -> Element<'a, Message> {
    container(column![text(title).size(18), body].spacing(10))
        .padding(15)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn empty_state(label: &'static str) -> Element<'static, Message> {
    text(label).size(14).into()
}

fn list_item(
    title: String,
    subtitle: Option<String>,
    on_remove: Option<Message>,
) -> Element<'static, Message> {
    let mut content = column![text(title).size(16)];
    if let Some(subtitle) = subtitle {
        content = content.push(text(subtitle).size(12));
    }

    let mut item = row![content, horizontal_space()]
        .spacing(10)
        .align_y(Alignment::Center);
    if let Some(message) = on_remove {
        item = item.push(button(text("✕")).padding([4, 10]).on_press(message));
    }

    container(item).padding(8).width(Length::Fill).into()
}

pub fn email_panel<'a>(scheduler: &'a Scheduler, data: &'a AppDisplayData) -> Element<'a, Message> {
    let input = row![
        text_input("name@example.com", &data.email_input)
            .on_input(Message::EmailInputChanged)
            .on_submit(Message::AddEmail)
            .padding(8),
        button(text("Add")).on_press(Message::AddEmail),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let list = if scheduler.emails().is_empty() {
        empty_state("No e-mail configured")
    } else {
        Column::with_children(scheduler.emails().iter().map(|email| {
            list_item(email.clone(), None, Some(Message::RemoveEmail(email.clone())))
        }))
        .into()
    };

    panel("E-mail notifications", column![input, list].spacing(10).into())
}

pub fn pattern_panel(scheduler: &Scheduler) -> Element<'static, Message> {
    let list = if scheduler.patterns().is_empty() {
        empty_state("No pattern recorded")
    } else {
        Column::with_children(scheduler.patterns().iter().map(|pattern| {
            list_item(
                pattern.name.clone(),
                Some(format!("{:.1}s", pattern.duration_secs())),
                Some(Message::RemovePattern(pattern.id)),
            )
        }))
        .into()
    };

    panel("Recorded sounds", list)
}

/// The most recent detections, newest first.
pub fn detection_panel(scheduler: &Scheduler) -> Element<'static, Message> {
    let recent = scheduler.recent_detections();
    let list = if recent.is_empty() {
        empty_state("No sound detected yet")
    } else {
        Column::with_children(recent.into_iter().map(|detection| {
            list_item(
                detection.sound.clone(),
                Some(detection.display_time.clone()),
                None,
            )
        }))
        .into()
    };

    panel("Detections", list)
}
