//! Wire types shared by the field editor, the sign client and the server

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Kind of field placed over the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Date,
    Radio,
    Image,
    Signature,
    /// Any type name this build does not know; never stamped
    #[serde(other)]
    Unknown,
}

impl FieldType {
    /// Field types stamped as a text run
    pub fn is_textual(self) -> bool {
        matches!(self, FieldType::Text | FieldType::Date | FieldType::Radio)
    }

    /// Field types stamped as an embedded image
    pub fn is_graphic(self) -> bool {
        matches!(self, FieldType::Image | FieldType::Signature)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Radio => "radio",
            FieldType::Image => "image",
            FieldType::Signature => "signature",
            FieldType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution-independent field placement, as submitted for stamping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedField {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub x_ratio: Option<f64>,
    #[serde(default)]
    pub y_ratio: Option<f64>,
    #[serde(default)]
    pub width_ratio: Option<f64>,
    #[serde(default)]
    pub height_ratio: Option<f64>,
}

impl NormalizedField {
    /// All four ratios, or `None` if any is missing
    pub fn ratios(&self) -> Option<(f64, f64, f64, f64)> {
        Some((
            self.x_ratio?,
            self.y_ratio?,
            self.width_ratio?,
            self.height_ratio?,
        ))
    }

    /// The value, treating a missing value as empty
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    /// Short label for logs
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<unnamed>")
    }
}

/// A field exactly as the client sent it, plus its typed reading.
///
/// Serializes back to the submitted JSON, so audit records keep keys and
/// type names the stamper does not understand.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedField {
    raw: Value,
    field: NormalizedField,
}

impl SubmittedField {
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn field(&self) -> &NormalizedField {
        &self.field
    }
}

impl TryFrom<NormalizedField> for SubmittedField {
    type Error = serde_json::Error;

    fn try_from(field: NormalizedField) -> Result<Self, Self::Error> {
        Ok(Self {
            raw: serde_json::to_value(&field)?,
            field,
        })
    }
}

impl Serialize for SubmittedField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SubmittedField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let field = NormalizedField::deserialize(&raw).map_err(D::Error::custom)?;
        Ok(Self { raw, field })
    }
}

/// Body of `POST /sign-pdf`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub pdf_id: String,
    #[serde(default)]
    pub fields: Vec<SubmittedField>,
}

impl SignRequest {
    pub fn new(
        pdf_id: impl Into<String>,
        fields: Vec<NormalizedField>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            pdf_id: pdf_id.into(),
            fields: fields
                .into_iter()
                .map(SubmittedField::try_from)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Typed view of every field, in submission order
    pub fn normalized_fields(&self) -> Vec<NormalizedField> {
        self.fields.iter().map(|f| f.field.clone()).collect()
    }
}

/// Successful response of `POST /sign-pdf`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub success: bool,
    pub signed_pdf_url: String,
}

/// One append-only audit entry per stamped document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub pdf_id: String,
    pub original_hash: String,
    pub signed_hash: String,
    /// Fields as submitted, unknown keys included
    pub fields: Vec<Value>,
    pub signed_at: DateTime<Utc>,
}
