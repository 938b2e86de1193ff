//! Field editor state
//!
//! Holds the fields placed over a rendered page and turns pointer gestures
//! into pixel geometry and resolution-independent ratios. The host UI feeds
//! it pointer events and container measurements; nothing here draws.

mod field;
mod signature;

pub use field::{Field, Point, Size, DEFAULT_FIELD_SIZE};
pub use signature::{SignaturePad, LINE_WIDTH};

use chrono::NaiveDate;

use crate::client::SignClient;
use crate::error::{Error, Result};
use crate::model::{FieldType, NormalizedField, SignRequest, SignResponse};
use crate::pdf::to_data_url;

/// Minimum field width reachable by resizing
pub const MIN_FIELD_WIDTH: f64 = 60.0;
/// Minimum field height reachable by resizing
pub const MIN_FIELD_HEIGHT: f64 = 30.0;

const PLACEMENT_BASE: f64 = 80.0;
const PLACEMENT_STEP: f64 = 20.0;

/// Answer recorded by a radio field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioChoice {
    Yes,
    No,
}

impl RadioChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            RadioChoice::Yes => "Yes",
            RadioChoice::No => "No",
        }
    }
}

/// Pointer gesture in progress
#[derive(Debug, Clone, Default, PartialEq)]
enum Gesture {
    #[default]
    Idle,
    Dragging {
        field_id: String,
        start_origin: Point,
        start_pointer: Point,
    },
    Resizing {
        field_id: String,
        start_size: Size,
        start_pointer: Point,
    },
}

/// Ordered collection of fields plus the gesture and container state
#[derive(Debug, Default)]
pub struct FieldEditor {
    fields: Vec<Field>,
    container: Option<Size>,
    placement_offset: f64,
    gesture: Gesture,
}

impl FieldEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn container(&self) -> Option<Size> {
        self.container
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Append a field of `field_type` at the next staggered position
    pub fn add_field(&mut self, field_type: FieldType) -> &Field {
        self.placement_offset += PLACEMENT_STEP;
        let at = PLACEMENT_BASE + self.placement_offset;
        let field = Field::new(field_type, Point::new(at, at));
        tracing::debug!(field_id = %field.id, field_type = %field_type, "Added field");

        let index = self.fields.len();
        self.fields.push(field);
        &self.fields[index]
    }

    /// Record the container's rendered size and reflow every field that
    /// already has ratios
    pub fn set_container_size(&mut self, size: Size) {
        self.container = Some(size);
        let reflowed = self
            .fields
            .iter_mut()
            .map(|f| f.reflow(size))
            .filter(|reflowed| *reflowed)
            .count();
        tracing::debug!(
            width = size.width,
            height = size.height,
            reflowed,
            "Container resized"
        );
    }

    pub fn begin_drag(&mut self, field_id: &str, pointer: Point) -> Result<()> {
        let field = self.find(field_id)?;
        self.gesture = Gesture::Dragging {
            field_id: field.id.clone(),
            start_origin: field.origin(),
            start_pointer: pointer,
        };
        Ok(())
    }

    pub fn begin_resize(&mut self, field_id: &str, pointer: Point) -> Result<()> {
        let field = self.find(field_id)?;
        self.gesture = Gesture::Resizing {
            field_id: field.id.clone(),
            start_size: field.size(),
            start_pointer: pointer,
        };
        Ok(())
    }

    /// Apply pointer displacement to the active gesture
    pub fn pointer_move(&mut self, pointer: Point) {
        match &self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging {
                field_id,
                start_origin,
                start_pointer,
            } => {
                let dx = pointer.x - start_pointer.x;
                let dy = pointer.y - start_pointer.y;
                let Some(field) = self.fields.iter_mut().find(|f| f.id == *field_id) else {
                    return;
                };
                let (max_x, max_y) = match self.container {
                    Some(c) => (c.width - field.width, c.height - field.height),
                    None => (f64::INFINITY, f64::INFINITY),
                };
                field.x = (start_origin.x + dx).min(max_x).max(0.0);
                field.y = (start_origin.y + dy).min(max_y).max(0.0);
            }
            Gesture::Resizing {
                field_id,
                start_size,
                start_pointer,
            } => {
                let dx = pointer.x - start_pointer.x;
                let dy = pointer.y - start_pointer.y;
                if let Some(field) = self.fields.iter_mut().find(|f| f.id == *field_id) {
                    field.width = (start_size.width + dx).max(MIN_FIELD_WIDTH);
                    field.height = (start_size.height + dy).max(MIN_FIELD_HEIGHT);
                }
            }
        }
    }

    /// End the active gesture and persist the field's ratios.
    ///
    /// Returns the field whose ratios were stored. The gesture is cleared even
    /// when the container has not been measured, in which case nothing is
    /// stored.
    pub fn pointer_up(&mut self) -> Option<&Field> {
        let field_id = match std::mem::take(&mut self.gesture) {
            Gesture::Idle => return None,
            Gesture::Dragging { field_id, .. } | Gesture::Resizing { field_id, .. } => field_id,
        };
        let container = self.container?;

        let field = self.fields.iter_mut().find(|f| f.id == field_id)?;
        field.store_ratios(container);
        tracing::debug!(field_id = %field.id, "Stored field ratios");
        Some(&*field)
    }

    pub fn set_text(&mut self, field_id: &str, text: &str) -> Result<()> {
        self.set_value(field_id, FieldType::Text, text.to_string())
    }

    /// Store a date in `YYYY-MM-DD` form
    pub fn set_date(&mut self, field_id: &str, date: NaiveDate) -> Result<()> {
        self.set_value(field_id, FieldType::Date, date.format("%Y-%m-%d").to_string())
    }

    pub fn choose_radio(&mut self, field_id: &str, choice: RadioChoice) -> Result<()> {
        self.set_value(field_id, FieldType::Radio, choice.as_str().to_string())
    }

    /// Store uploaded image bytes as a data URL, typed by sniffing the content
    pub fn attach_image(&mut self, field_id: &str, bytes: &[u8]) -> Result<()> {
        let format = image::guess_format(bytes)?;
        let data_url = to_data_url(format.to_mime_type(), bytes);
        self.set_value(field_id, FieldType::Image, data_url)
    }

    /// Drawing pad sized to a signature field, showing its current drawing
    pub fn signature_pad(&self, field_id: &str) -> Result<SignaturePad> {
        let field = self.find_typed(field_id, FieldType::Signature)?;
        if field.value.is_empty() {
            Ok(SignaturePad::new(field.size()))
        } else {
            SignaturePad::restore(field.size(), &field.value)
        }
    }

    /// Store a signature drawing, normally the URL returned when a stroke ends
    pub fn set_signature(&mut self, field_id: &str, data_url: String) -> Result<()> {
        self.set_value(field_id, FieldType::Signature, data_url)
    }

    /// Every field with ratios recomputed from its current pixel geometry
    pub fn normalized_fields(&self) -> Result<Vec<NormalizedField>> {
        let container = self.container.ok_or(Error::ContainerNotMeasured)?;
        Ok(self
            .fields
            .iter()
            .map(|f| f.normalized(container))
            .collect())
    }

    /// Package the fields for stamping `pdf_id`
    pub fn submission(&self, pdf_id: &str) -> Result<SignRequest> {
        if self.fields.is_empty() {
            return Err(Error::NoFields);
        }
        Ok(SignRequest::new(pdf_id, self.normalized_fields()?)?)
    }

    /// Build the submission and send it; nothing is sent when it is rejected
    pub async fn submit(&self, client: &SignClient, pdf_id: &str) -> Result<SignResponse> {
        let request = self.submission(pdf_id)?;
        client.sign(&request).await
    }

    fn find(&self, field_id: &str) -> Result<&Field> {
        self.field(field_id).ok_or_else(|| Error::FieldNotFound {
            id: field_id.to_string(),
        })
    }

    fn find_typed(&self, field_id: &str, expected: FieldType) -> Result<&Field> {
        let field = self.find(field_id)?;
        if field.field_type != expected {
            return Err(Error::FieldTypeMismatch {
                id: field_id.to_string(),
                field_type: field.field_type,
            });
        }
        Ok(field)
    }

    fn set_value(&mut self, field_id: &str, expected: FieldType, value: String) -> Result<()> {
        self.find_typed(field_id, expected)?;
        if let Some(field) = self.fields.iter_mut().find(|f| f.id == field_id) {
            field.value = value;
        }
        Ok(())
    }
}
