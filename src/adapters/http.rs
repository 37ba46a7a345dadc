use crate::domain::model::{ComicMetadata, ComicSelection};
use crate::domain::ports::{ComicSource, ConfigProvider};
use crate::utils::error::{ComicError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// [`ComicSource`] backed by the selection and lookup HTTP endpoints.
pub struct HttpComicSource {
    client: Client,
    selection_endpoint: String,
    lookup_endpoint: String,
    email: String,
}

impl HttpComicSource {
    pub fn new(
        selection_endpoint: impl Into<String>,
        lookup_endpoint: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            selection_endpoint: selection_endpoint.into(),
            lookup_endpoint: lookup_endpoint.into(),
            email: email.into(),
        }
    }

    /// Without a timeout a stalled endpoint blocks the load indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let source = Self::new(
            config.selection_endpoint(),
            config.lookup_endpoint(),
            config.email(),
        );
        match config.timeout_seconds() {
            Some(seconds) => source.with_timeout(Duration::from_secs(seconds)),
            None => Ok(source),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: (&str, &str),
        what: &'static str,
    ) -> Result<T> {
        let url = Url::parse_with_params(endpoint, [query]).map_err(|e| {
            ComicError::InvalidConfigValue {
                field: "endpoint".to_string(),
                value: endpoint.to_string(),
                reason: format!("Invalid URL format: {}", e),
            }
        })?;

        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(url.clone()).send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ComicError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| ComicError::Decode { what, source })
    }
}

#[async_trait]
impl ComicSource for HttpComicSource {
    async fn select(&self) -> Result<ComicSelection> {
        self.get_json(
            &self.selection_endpoint,
            ("email", self.email.as_str()),
            "comic selection",
        )
        .await
    }

    async fn lookup(&self, selection: &ComicSelection) -> Result<ComicMetadata> {
        self.get_json(
            &self.lookup_endpoint,
            ("id", selection.as_str()),
            "comic metadata",
        )
        .await
    }
}
