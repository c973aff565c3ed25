//! Page layout geometry

use serde::Serialize;

/// Aspect ratio of an A4 portrait page, width over height
pub const A4_PORTRAIT_ASPECT: f64 = 210.0 / 297.0;

/// An axis aligned rectangle
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };
}

/// Fit a rectangle of a fixed aspect ratio inside a container, centered on both axes
///
/// Non-finite or non-positive input results in [`Rect::ZERO`]
pub fn contain_aspect_rect(
    container_width: f64,
    container_height: f64,
    aspect_width_over_height: f64,
) -> Rect {
    let usable = |value: f64| value.is_finite() && value > 0.0;

    if !usable(container_width) || !usable(container_height) || !usable(aspect_width_over_height)
    {
        return Rect::ZERO;
    }

    let (width, height) = if container_width / container_height > aspect_width_over_height {
        // container is wider, height constrains
        (container_height * aspect_width_over_height, container_height)
    } else {
        (container_width, container_width / aspect_width_over_height)
    };

    Rect {
        x: (container_width - width) / 2.0,
        y: (container_height - height) / 2.0,
        width,
        height,
    }
}
