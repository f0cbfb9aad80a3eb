//! DigitalOcean API client
//!
//! Direct implementation of the v2 REST API endpoints Droplift needs.
//! Uses Bearer token authentication.

use droplift_cloud::{CloudError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

/// Upper bound on a single API request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// DigitalOcean API client
pub struct DigitalOceanClient {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
}

impl DigitalOceanClient {
    /// Create a new client for the public API
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(http_error)?;

        Ok(Self {
            client,
            api_token: api_token.into(),
            base_url: DIGITALOCEAN_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        tracing::debug!("GET {}", path);

        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await
            .map_err(http_error)?;

        read_json(response).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("POST {}", path);

        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await
            .map_err(http_error)?;

        read_json(response).await
    }

    /// POST whose response body carries nothing Droplift needs
    pub(crate) async fn post_discard<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<()> {
        tracing::debug!("POST {}", path);

        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await
            .map_err(http_error)?;

        check_status(response).await.map(|_| ())
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        tracing::debug!("DELETE {}", path);

        let response = self
            .client
            .delete(self.url(path))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(http_error)?;

        check_status(response).await.map(|_| ())
    }
}

fn http_error(err: reqwest::Error) -> CloudError {
    CloudError::Http(err.to_string())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|e| e.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(CloudError::AuthenticationFailed(message));
    }

    Err(CloudError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;
    let body = response.text().await.map_err(http_error)?;
    serde_json::from_str(&body).map_err(|e| {
        CloudError::UnexpectedResponse(format!("{} (body: {})", e, truncate(&body, 200)))
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ApiError {
    #[allow(dead_code)]
    #[serde(default)]
    id: String,
    message: String,
}
