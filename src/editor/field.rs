//! Editor-side field geometry

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{FieldType, NormalizedField};

/// Default size of a newly added field, in pixels
pub const DEFAULT_FIELD_SIZE: Size = Size {
    width: 160.0,
    height: 40.0,
};

/// Pointer position in container pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendered size of the page container, or of a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A field placed over the rendered page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Ratios are `None` until the first drag or resize completes
    pub x_ratio: Option<f64>,
    pub y_ratio: Option<f64>,
    pub width_ratio: Option<f64>,
    pub height_ratio: Option<f64>,
    pub value: String,
}

impl Field {
    pub fn new(field_type: FieldType, origin: Point) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            field_type,
            x: origin.x,
            y: origin.y,
            width: DEFAULT_FIELD_SIZE.width,
            height: DEFAULT_FIELD_SIZE.height,
            x_ratio: None,
            y_ratio: None,
            width_ratio: None,
            height_ratio: None,
            value: String::new(),
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Stored ratios, if all four are present
    pub fn ratios(&self) -> Option<(f64, f64, f64, f64)> {
        Some((
            self.x_ratio?,
            self.y_ratio?,
            self.width_ratio?,
            self.height_ratio?,
        ))
    }

    /// Current pixel geometry expressed as ratios of `container`
    pub fn ratios_in(&self, container: Size) -> (f64, f64, f64, f64) {
        (
            self.x / container.width,
            self.y / container.height,
            self.width / container.width,
            self.height / container.height,
        )
    }

    /// Persist the ratios of the current pixel geometry
    pub fn store_ratios(&mut self, container: Size) {
        let (x, y, w, h) = self.ratios_in(container);
        self.x_ratio = Some(x);
        self.y_ratio = Some(y);
        self.width_ratio = Some(w);
        self.height_ratio = Some(h);
    }

    /// Recompute pixel geometry from stored ratios; returns false when the
    /// field has none yet
    pub fn reflow(&mut self, container: Size) -> bool {
        let Some((x, y, w, h)) = self.ratios() else {
            return false;
        };
        self.x = x * container.width;
        self.y = y * container.height;
        self.width = w * container.width;
        self.height = h * container.height;
        true
    }

    /// Wire form with ratios freshly computed from pixel geometry
    pub fn normalized(&self, container: Size) -> NormalizedField {
        let (x, y, w, h) = self.ratios_in(container);
        NormalizedField {
            id: Some(self.id.clone()),
            field_type: self.field_type,
            value: Some(self.value.clone()),
            x_ratio: Some(x),
            y_ratio: Some(y),
            width_ratio: Some(w),
            height_ratio: Some(h),
        }
    }
}
