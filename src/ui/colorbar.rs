//! Colour bar legend drawn next to a generated slice plot
use iced::widget::canvas::{self, Frame};
use iced::{Color, Point, Rectangle, Size};

use crate::plot::colormap;

/// Number of flat bands used to approximate the gradient
const BANDS: usize = 64;

/// Vertical inferno gradient, low values at the bottom
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorBar;

impl<Message> canvas::Program<Message> for ColorBar {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        let band_height = bounds.height / BANDS as f32;

        for band in 0..BANDS {
            let value = band as f32 / (BANDS - 1) as f32;
            let [r, g, b] = colormap::inferno(value);
            let y = bounds.height - (band as f32 + 1.0) * band_height;

            // +1px overlap hides seams between bands
            frame.fill_rectangle(
                Point::new(0.0, y),
                Size::new(bounds.width, band_height + 1.0),
                Color::from_rgb(r, g, b),
            );
        }

        vec![frame.into_geometry()]
    }
}
