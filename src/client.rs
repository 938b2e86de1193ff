//! HTTP client for the stamping endpoint

use url::Url;

use crate::error::{Error, ErrorBody, Result};
use crate::model::{SignRequest, SignResponse};

/// Posts field submissions to `<base>/sign-pdf`.
///
/// One request per call: no retry and no timeout.
#[derive(Debug, Clone)]
pub struct SignClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl SignClient {
    /// Client for the service rooted at `base_url`, e.g. `http://localhost:5001`
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        // Joining against a base without a trailing slash would drop its last segment
        let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join("sign-pdf")
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit a request and decode the service's answer
    pub async fn sign(&self, request: &SignRequest) -> Result<SignResponse> {
        tracing::debug!(
            pdf_id = %request.pdf_id,
            fields = request.fields.len(),
            endpoint = %self.endpoint,
            "Submitting sign request"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<SignResponse>().await?);
        }

        let body = response.text().await?;
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);

        tracing::warn!(status = status.as_u16(), error = %message, "Sign request rejected");
        Err(Error::SignRejected {
            status: status.as_u16(),
            message,
        })
    }
}
