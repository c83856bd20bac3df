//! # Spectrum Widget
//!
//! Bar chart of the latest byte spectrum. The bins are already on a
//! decibel scale, so bar heights are linear in the byte value.

use iced::widget::canvas::{self, Geometry, Path};
use iced::widget::container;
use iced::{Color, Element, Point, Rectangle, Renderer, Size, Theme, mouse};

/// Bins drawn as one bar; keeps 1024 bins readable on narrow windows.
const BINS_PER_BAR: usize = 4;

pub struct SpectrumView {
    /// One byte per frequency bin.
    data: Vec<u8>,
}

impl SpectrumView {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fill),
        )
        .into()
    }

    /// Peak value of each group of [`BINS_PER_BAR`] bins.
    fn bars(&self) -> Vec<u8> {
        self.data
            .chunks(BINS_PER_BAR)
            .map(|group| group.iter().copied().max().unwrap_or(0))
            .collect()
    }
}

impl<Message> canvas::Program<Message> for SpectrumView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let bars = self.bars();
        if !bounds.width.is_finite() || !bounds.height.is_finite() || bars.is_empty() {
            return vec![frame.into_geometry()];
        }

        let bar_width = (bounds.width / bars.len() as f32).max(1.0);

        for (i, &value) in bars.iter().enumerate() {
            let height = value as f32 / 255.0 * bounds.height;
            if height > 0.0 {
                let bar = Path::rectangle(
                    Point::new(i as f32 * bar_width, bounds.height - height),
                    Size::new(bar_width, height),
                );
                frame.fill(&bar, Color::from_rgb8(0x34, 0x98, 0xDB));
            }
        }

        vec![frame.into_geometry()]
    }
}
