//! # Main Display Module
//!
//! This module contains the main layout: mode controls, level meter, live
//! spectrum, the naming step while recording, and the three list panels.

use detector_core::scheduler::Scheduler;
use iced::widget::{
    Space, button, column, container, horizontal_space, progress_bar, row, scrollable, text,
    text_input,
};
use iced::{Alignment, Background, Color, Element, Length};

use super::lists;
use crate::widgets::spectrum::SpectrumView;
use crate::{AppDisplayData, Message};

/// Background of a mode button while its mode is active.
const ACTIVE_COLOR: Color = Color::from_rgb(0.8, 0.2, 0.2);

/// Creates the complete main application view.
pub fn create_main_view<'a>(scheduler: &'a Scheduler, data: &'a AppDisplayData) -> Element<'a, Message> {
    let header = row![
        text("Sound Detector").size(28),
        horizontal_space(),
        text(data.status.as_str()).size(16),
    ]
    .align_y(Alignment::Center);

    let mut content = column![
        header,
        create_controls(scheduler),
        create_level_meter(data),
        create_spectrum_panel(data),
    ]
    .spacing(15)
    .padding(20);

    if let Some(naming) = create_naming_panel(scheduler, data) {
        content = content.push(naming);
    }

    content = content.push(
        row![
            lists::email_panel(scheduler, data),
            lists::pattern_panel(scheduler),
            lists::detection_panel(scheduler),
        ]
        .spacing(15)
        .align_y(Alignment::Start),
    );

    container(scrollable(content))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Listen and record buttons. Listening is disabled while recording.
fn create_controls(scheduler: &Scheduler) -> Element<'static, Message> {
    let listening = scheduler.is_listening();
    let recording = scheduler.is_recording();

    let listen_label = if listening { "Stop listening" } else { "Start listening" };
    let record_label = if recording { "Save pattern" } else { "Record sound" };

    row![
        mode_button(listen_label, listening)
            .on_press_maybe((!recording).then_some(Message::ToggleListening)),
        mode_button(record_label, recording).on_press(Message::ToggleRecording),
    ]
    .spacing(10)
    .into()
}

fn mode_button(label: &'static str, active: bool) -> button::Button<'static, Message> {
    let mode_button = button(text(label).size(16)).padding([10, 20]);
    if !active {
        return mode_button;
    }
    mode_button.style(|_theme, _status| button::Style {
        background: Some(Background::Color(ACTIVE_COLOR)),
        text_color: Color::WHITE,
        ..button::Style::default()
    })
}

fn create_level_meter(data: &AppDisplayData) -> Element<'static, Message> {
    row![
        text("Level").size(14),
        Space::with_width(10),
        progress_bar(0.0..=100.0, data.level_percent as f32).height(Length::Fixed(12.0)),
        Space::with_width(10),
        text(format!("{}%", data.level_percent)).size(14),
    ]
    .align_y(Alignment::Center)
    .into()
}

fn create_spectrum_panel(data: &AppDisplayData) -> Element<'static, Message> {
    container(SpectrumView::new(data.spectrum.clone()).view())
        .width(Length::Fill)
        .height(Length::Fixed(160.0))
        .padding(10)
        .style(container::rounded_box)
        .into()
}

/// Name entry replacing a blocking prompt; only shown while recording.
fn create_naming_panel<'a>(
    scheduler: &'a Scheduler,
    data: &'a AppDisplayData,
) -> Option<Element<'a, Message>> {
    if !scheduler.is_recording() {
        return None;
    }

    let name_input = text_input("Sound name (e.g. Doorbell, Whistle)", &data.pattern_name)
        .on_input(Message::PatternNameChanged)
        .on_submit(Message::SavePattern)
        .padding(8);

    let panel = container(
        column![
            text(format!("Recording... {} frames", scheduler.recorded_frames())).size(14),
            row![
                name_input,
                button(text("Save")).on_press(Message::SavePattern),
                button(text("Cancel")).on_press(Message::CancelRecording),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
        ]
        .spacing(8),
    )
    .padding(15)
    .width(Length::Fill)
    .style(container::rounded_box);

    Some(panel.into())
}
