//! Error types for the PDF signing service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::FieldType;

/// Result type alias for the PDF signing service
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the PDF signing service
#[derive(Error, Debug)]
pub enum Error {
    /// Original PDF not found in document storage
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Document id is not a single plain file name
    #[error("Invalid document id: {id}")]
    InvalidDocumentId { id: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// lopdf failed to read, modify or serialize the document
    #[error("PDF processing error: {reason}")]
    Pdf { reason: String },

    /// Image or signature value that is not a PNG/JPEG base64 data URL
    #[error("{field_type} must be PNG or JPG Base64")]
    UnsupportedImageEncoding { field_type: FieldType },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Image decode/encode error
    #[error("Invalid image data: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Audit record could not be persisted
    #[error("Audit log failed: {reason}")]
    Audit { reason: String },

    /// Submission attempted with no fields placed
    #[error("Place and resize fields before signing.")]
    NoFields,

    /// Geometry requested before the page container was measured
    #[error("Page container has not been measured yet")]
    ContainerNotMeasured,

    /// Editor operation on a field id that does not exist
    #[error("Field not found: {id}")]
    FieldNotFound { id: String },

    /// Value edit that does not match the field's type
    #[error("Field {id} is a {field_type} field")]
    FieldTypeMismatch { id: String, field_type: FieldType },

    /// Sign service base URL could not be parsed
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The signing service answered with an error body
    #[error("Sign request rejected ({status}): {message}")]
    SignRejected { status: u16, message: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Request body could not be read as a sign request
    #[error("{reason}")]
    InvalidRequest { reason: String },

    /// Blocking stamping task did not complete
    #[error("Task join error: {reason}")]
    Task { reason: String },
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Pdf {
            reason: err.to_string(),
        }
    }
}

/// Body returned by `/sign-pdf` on failure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl Error {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "sign request failed");
        } else {
            tracing::warn!(error = %self, "sign request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_image_message_names_field_type() {
        let err = Error::UnsupportedImageEncoding {
            field_type: FieldType::Signature,
        };
        assert_eq!(err.to_string(), "signature must be PNG or JPG Base64");
    }

    #[test]
    fn test_no_fields_notice() {
        assert_eq!(
            Error::NoFields.to_string(),
            "Place and resize fields before signing."
        );
    }

    #[test]
    fn test_into_response_is_internal_server_error() {
        let response = Error::PdfNotFound {
            path: "uploads/original/missing.pdf".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_request_is_bad_request() {
        let response = Error::InvalidRequest {
            reason: "missing field `pdfId`".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
