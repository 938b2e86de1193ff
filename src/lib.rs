//! PDF Sign Server Library
//!
//! Place typed fields over a rendered PDF page and stamp their values onto
//! the original document:
//! - `editor`: field placement, drag/resize gestures and value capture
//! - `client`: typed HTTP client for `POST /sign-pdf`
//! - `pdf`: ratio to PDF coordinate transforms, text and image stamping
//! - `signing`: stamp, store and audit one request
//! - `server`: axum router serving the sign endpoint and stamped files

pub mod client;
pub mod config;
pub mod digest;
pub mod editor;
pub mod error;
pub mod model;
pub mod pdf;
pub mod server;
pub mod signing;
pub mod storage;

pub use client::SignClient;
pub use config::ServerConfig;
pub use editor::{Field, FieldEditor, Point, RadioChoice, SignaturePad, Size};
pub use error::{Error, Result};
pub use model::{AuditRecord, FieldType, NormalizedField, SignRequest, SignResponse, SubmittedField};
pub use server::{build_router, run_server, run_server_with_config};
pub use signing::SigningService;
