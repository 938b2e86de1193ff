//! PDF sign server - Entry point
//!
//! Serves `POST /sign-pdf`, which stamps field values onto stored documents.

use pdf_sign_server::{run_server_with_config, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_sign_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ServerConfig::load()?;
    tracing::info!(
        uploads = %config.uploads_dir.display(),
        base_url = %config.public_base_url,
        "Starting PDF sign server"
    );

    run_server_with_config(config).await
}
