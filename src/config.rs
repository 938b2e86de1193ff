//! Server configuration

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::Result;

/// Configuration for the PDF signing server
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (default: 127.0.0.1)
    pub host: String,
    /// Port to bind (default: 5001)
    pub port: u16,
    /// Root directory holding `original/` and `signed/` (default: uploads)
    pub uploads_dir: PathBuf,
    /// JSON-lines audit log (default: logs/audit.jsonl); in-memory only when unset.
    /// Keep it outside `uploads_dir`, which is served publicly.
    pub audit_log: Option<PathBuf>,
    /// Base URL used to build `signedPdfUrl` (default: http://localhost:5001)
    pub public_base_url: String,
    /// Origins allowed by CORS (default: http://localhost:5173)
    pub allowed_origins: Vec<String>,
    /// Maximum JSON body size in bytes (default: 10MB)
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            uploads_dir: PathBuf::from("uploads"),
            audit_log: Some(PathBuf::from("logs/audit.jsonl")),
            public_base_url: "http://localhost:5001".to_string(),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl ServerConfig {
    /// Layer defaults, `config/server.toml` and `PDF_SIGN__*` environment variables
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let s = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", defaults.port)?
            .set_default("uploads_dir", defaults.uploads_dir.display().to_string())?
            .set_default(
                "audit_log",
                defaults
                    .audit_log
                    .map(|p| p.display().to_string()),
            )?
            .set_default("public_base_url", defaults.public_base_url)?
            .set_default("allowed_origins", defaults.allowed_origins)?
            .set_default("max_body_bytes", defaults.max_body_bytes as u64)?
            .add_source(File::with_name("config/server").required(false))
            // e.g. PDF_SIGN__PORT=8080, PDF_SIGN__PUBLIC_BASE_URL=https://sign.example.com
            .add_source(
                Environment::with_prefix("PDF_SIGN")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Public URL of a stamped document
    pub fn signed_url(&self, file_name: &str) -> String {
        format!(
            "{}/uploads/signed/{}",
            self.public_base_url.trim_end_matches('/'),
            file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5001);
        assert_eq!(config.bind_addr(), "127.0.0.1:5001");
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_signed_url_trims_trailing_slash() {
        let config = ServerConfig {
            public_base_url: "https://sign.example.com/".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(
            config.signed_url("signed-sample.pdf"),
            "https://sign.example.com/uploads/signed/signed-sample.pdf"
        );
    }

    #[test]
    fn test_load_uses_defaults() {
        let config = ServerConfig::load().unwrap();
        assert!(!config.public_base_url.is_empty());
        assert!(config.max_body_bytes > 0);
    }
}
