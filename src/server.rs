//! HTTP server implementation using axum

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequest, Request, State},
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::model::{SignRequest, SignResponse};
use crate::signing::SigningService;

/// `Json` extractor whose rejections become `400 { error }`
pub struct SignJson<T>(pub T);

impl<S, T> FromRequest<S> for SignJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| Error::InvalidRequest {
                reason: e.body_text(),
            })?;
        Ok(SignJson(value))
    }
}

/// Router with the sign endpoint, static uploads, health probe and the
/// CORS, body limit and trace layers
pub fn build_router(service: SigningService) -> Router {
    let config = service.config().clone();
    let uploads = ServeDir::new(&config.uploads_dir);

    Router::new()
        .route("/sign-pdf", post(sign_pdf))
        .route("/health", get(health))
        .nest_service("/uploads", uploads)
        .with_state(Arc::new(service))
        .layer(cors_layer(&config))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn sign_pdf(
    State(service): State<Arc<SigningService>>,
    SignJson(request): SignJson<SignRequest>,
) -> Result<Json<SignResponse>> {
    tracing::debug!(
        pdf_id = %request.pdf_id,
        fields = request.fields.len(),
        field_ids = ?request.fields.iter().map(|f| f.field().label()).collect::<Vec<_>>(),
        "Received sign request"
    );

    // Stamping is CPU-bound; keep it off the async workers
    let response = tokio::task::spawn_blocking(move || service.sign(&request))
        .await
        .map_err(|e| Error::Task {
            reason: e.to_string(),
        })??;

    Ok(Json(response))
}

async fn health() -> &'static str {
    "ok"
}

/// Run the server with configuration loaded from file and environment
pub async fn run_server() -> anyhow::Result<()> {
    run_server_with_config(ServerConfig::load()?).await
}

/// Run the server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let service = SigningService::from_config(config);

    for dir in [
        service.documents().original_dir(),
        service.documents().signed_dir(),
    ] {
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            tracing::warn!(path = %dir.display(), error = %e, "Could not create uploads directory");
        }
    }

    let app = build_router(service);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("PDF sign server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
