//! Stamp, store, audit

use chrono::Utc;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::digest::sha256_hex;
use crate::error::Result;
use crate::model::{AuditRecord, SignRequest, SignResponse};
use crate::pdf::stamp_fields;
use crate::storage::{AuditSink, DocumentStore, JsonlAuditLog, MemoryAuditLog};

/// Applies sign requests against the document store.
///
/// All work is synchronous; callers on the async runtime should run
/// [`SigningService::sign`] on the blocking pool.
#[derive(Clone)]
pub struct SigningService {
    documents: DocumentStore,
    audit: Arc<dyn AuditSink>,
    config: Arc<ServerConfig>,
}

impl SigningService {
    pub fn new(config: ServerConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            documents: DocumentStore::new(config.uploads_dir.clone()),
            audit,
            config: Arc::new(config),
        }
    }

    /// Service with the audit sink named by `config`: a JSON-lines file when
    /// `audit_log` is set, otherwise in memory
    pub fn from_config(config: ServerConfig) -> Self {
        let audit: Arc<dyn AuditSink> = match &config.audit_log {
            Some(path) => Arc::new(JsonlAuditLog::new(path.clone())),
            None => {
                tracing::warn!("No audit log configured, audit records are kept in memory");
                Arc::new(MemoryAuditLog::new())
            }
        };
        Self::new(config, audit)
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Stamp the request's fields onto the original and store the result.
    ///
    /// Concurrent requests for the same `pdf_id` are not serialized; the last
    /// write of the signed file wins.
    pub fn sign(&self, request: &SignRequest) -> Result<SignResponse> {
        let pdf_id = request.pdf_id.as_str();

        let original = self.documents.load_original(pdf_id)?;
        let original_hash = sha256_hex(&original);

        let outcome = stamp_fields(&original, &request.normalized_fields())?;
        let signed_hash = sha256_hex(&outcome.bytes);

        let path = self.documents.write_signed(pdf_id, &outcome.bytes)?;
        tracing::info!(
            pdf_id,
            stamped = outcome.stamped.len(),
            skipped = outcome.skipped.len(),
            path = %path.display(),
            "Stamped document"
        );

        self.record_audit(&AuditRecord {
            pdf_id: pdf_id.to_string(),
            original_hash,
            signed_hash,
            fields: request.fields.iter().map(|f| f.raw().clone()).collect(),
            signed_at: Utc::now(),
        });

        Ok(SignResponse {
            success: true,
            signed_pdf_url: self
                .config
                .signed_url(&DocumentStore::signed_name(pdf_id)),
        })
    }

    /// Best effort: the stamped file is already written, so a failed append
    /// is only logged
    fn record_audit(&self, record: &AuditRecord) {
        if let Err(e) = self.audit.append(record) {
            tracing::error!(pdf_id = %record.pdf_id, error = %e, "Failed to persist audit record");
        }
    }
}
