//! Ratio to PDF user-space transforms

use crate::model::NormalizedField;

/// Horizontal inset of a text run from the box's left edge
pub const TEXT_INSET_X: f64 = 4.0;
/// Baseline drop below the box's vertical center
pub const TEXT_BASELINE_DROP: f64 = 6.0;

/// Visible size of a page in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub width: f64,
    pub height: f64,
}

/// A field box in PDF user space, origin at the lower-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// Text origin: a small left inset, baseline just below the vertical center
    pub fn text_origin(&self) -> (f64, f64) {
        (
            self.x + TEXT_INSET_X,
            self.y + self.height / 2.0 - TEXT_BASELINE_DROP,
        )
    }

    /// Largest rectangle with the image's aspect ratio that fits the box,
    /// centered in it
    pub fn fit_image(&self, image_width: f64, image_height: f64) -> Placement {
        let scale = (self.width / image_width).min(self.height / image_height);
        let width = image_width * scale;
        let height = image_height * scale;
        Placement {
            x: self.x + (self.width - width) / 2.0,
            y: self.y + (self.height - height) / 2.0,
            width,
            height,
        }
    }
}

/// Convert a field's ratios to a box on `page`.
///
/// Returns `None` when any ratio is absent or the resulting box has no area.
/// Ratios are measured from the top-left of the rendered page, PDF space
/// grows upward, so the y axis is flipped.
pub fn place(field: &NormalizedField, page: PageBox) -> Option<Placement> {
    let (x_ratio, y_ratio, width_ratio, height_ratio) = field.ratios()?;

    let width = width_ratio * page.width;
    let height = height_ratio * page.height;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    Some(Placement {
        x: x_ratio * page.width,
        y: page.height - y_ratio * page.height - height,
        width,
        height,
    })
}
