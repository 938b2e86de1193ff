//! Freehand signature capture

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

use super::field::{Point, Size};
use crate::error::Result;
use crate::model::FieldType;
use crate::pdf::{png_data_url, EncodedImage};

/// Stroke width in pixels
pub const LINE_WIDTH: f64 = 2.0;
/// Largest pad side in pixels; larger fields get a clamped canvas
pub const MAX_PAD_DIMENSION: u32 = 4096;

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Drawing surface sized to a signature field.
///
/// Strokes are connected line segments painted with a round black brush on a
/// transparent canvas.
#[derive(Debug, Clone)]
pub struct SignaturePad {
    canvas: RgbaImage,
    last: Option<Point>,
}

impl SignaturePad {
    /// Blank pad covering `size` pixels, between one and
    /// [`MAX_PAD_DIMENSION`] each way
    pub fn new(size: Size) -> Self {
        let (width, height) = pixel_dimensions(size);
        Self {
            canvas: RgbaImage::new(width, height),
            last: None,
        }
    }

    /// Pad showing a previously captured drawing, stretched to `size`
    pub fn restore(size: Size, data_url: &str) -> Result<Self> {
        let (width, height) = pixel_dimensions(size);
        let previous = EncodedImage::from_data_url(FieldType::Signature, data_url)?
            .decode()?
            .to_rgba8();
        Ok(Self {
            canvas: imageops::resize(&previous, width, height, FilterType::Triangle),
            last: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn is_drawing(&self) -> bool {
        self.last.is_some()
    }

    /// True when nothing has been drawn
    pub fn is_blank(&self) -> bool {
        self.canvas.pixels().all(|p| p[3] == 0)
    }

    pub fn begin_stroke(&mut self, at: Point) {
        self.last = Some(at);
    }

    /// Extend the current stroke; ignored when no stroke is active
    pub fn extend_stroke(&mut self, to: Point) {
        if let Some(from) = self.last {
            self.segment(from, to);
            self.last = Some(to);
        }
    }

    /// Finish the stroke and serialize the pad as a PNG data URL.
    ///
    /// Returns `None` when no stroke was active.
    pub fn end_stroke(&mut self) -> Result<Option<String>> {
        if self.last.take().is_none() {
            return Ok(None);
        }
        self.to_data_url().map(Some)
    }

    pub fn to_data_url(&self) -> Result<String> {
        png_data_url(&DynamicImage::ImageRgba8(self.canvas.clone()))
    }

    fn segment(&mut self, from: Point, to: Point) {
        let Some((from, to)) = self.clip(from, to) else {
            return;
        };
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let steps = (dx.hypot(dy) / 0.5).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.dab(Point::new(from.x + dx * t, from.y + dy * t));
        }
    }

    /// Part of the segment within brush reach of the canvas (Liang-Barsky)
    fn clip(&self, from: Point, to: Point) -> Option<(Point, Point)> {
        if ![from.x, from.y, to.x, to.y].iter().all(|v| v.is_finite()) {
            return None;
        }
        let reach = LINE_WIDTH;
        let max_x = self.canvas.width() as f64 + reach;
        let max_y = self.canvas.height() as f64 + reach;
        let (dx, dy) = (to.x - from.x, to.y - from.y);

        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (p, q) in [
            (-dx, from.x + reach),
            (dx, max_x - from.x),
            (-dy, from.y + reach),
            (dy, max_y - from.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((
            Point::new(from.x + dx * t0, from.y + dy * t0),
            Point::new(from.x + dx * t1, from.y + dy * t1),
        ))
    }

    /// Paint one round brush footprint
    fn dab(&mut self, center: Point) {
        let radius = LINE_WIDTH / 2.0;
        let (w, h) = (self.canvas.width() as i64, self.canvas.height() as i64);
        let x0 = ((center.x - radius).floor() as i64).max(0);
        let x1 = ((center.x + radius).ceil() as i64).min(w - 1);
        let y0 = ((center.y - radius).floor() as i64).max(0);
        let y1 = ((center.y + radius).ceil() as i64).min(h - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let px = x as f64 + 0.5 - center.x;
                let py = y as f64 + 0.5 - center.y;
                if px.hypot(py) <= radius {
                    self.canvas.put_pixel(x as u32, y as u32, INK);
                }
            }
        }
    }
}

fn pixel_dimensions(size: Size) -> (u32, u32) {
    let side = |v: f64| {
        if v.is_nan() {
            1
        } else {
            v.round().clamp(1.0, MAX_PAD_DIMENSION as f64) as u32
        }
    };
    (side(size.width), side(size.height))
}
