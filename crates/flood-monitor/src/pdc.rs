//! PDC hazard feed client.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::hazards::Hazard;

/// Errors that can occur when talking to the hazard feed.
#[derive(Debug, Error)]
pub enum PdcError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed returned a non-success status.
    #[error("PDC API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Client for the PDC Sentry hazard services, authenticated with a bearer
/// token.
#[derive(Debug, Clone)]
pub struct PdcClient {
    http: reqwest::Client,
    api_url: String,
    auth_token: String,
}

impl PdcClient {
    /// Create a client for the given feed URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        api_url: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Result<Self, PdcError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("flood-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut api_url = api_url.into();
        while api_url.ends_with('/') {
            api_url.pop();
        }

        Ok(Self {
            http,
            api_url,
            auth_token: auth_token.into(),
        })
    }

    /// Fetch the currently active hazards, unfiltered.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    pub async fn active_hazards(&self) -> Result<Vec<Hazard>, PdcError> {
        let url = format!(
            "{}/hp_srv/services/hazards/t/json/get_active_hazards",
            self.api_url
        );
        self.get(&url).await
    }

    /// Fetch a hazard's alert geometry as WKT text.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    pub async fn alert_geography(&self, hazard_id: i64) -> Result<String, PdcError> {
        let url = format!(
            "{}/hp_srv/services/hazard/{hazard_id}/alertGeography",
            self.api_url
        );
        let geography: AlertGeography = self.get(&url).await?;
        Ok(geography.wkt.text)
    }

    async fn get<T>(&self, url: &str) -> Result<T, PdcError>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(url, "Fetching from hazard feed");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PdcError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(PdcError::Serialization)
    }
}

#[derive(Debug, Deserialize)]
struct AlertGeography {
    wkt: WktText,
}

#[derive(Debug, Deserialize)]
struct WktText {
    text: String,
}
