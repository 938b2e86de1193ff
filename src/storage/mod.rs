//! Document storage and audit persistence

pub mod audit;
pub mod documents;

pub use audit::{AuditSink, JsonlAuditLog, MemoryAuditLog};
pub use documents::DocumentStore;
