use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::core::status::{StatusClient, StatusError};

/// Plain GET client for the status and news pages.
pub struct HttpStatusClient {
    client: Client,
}

impl HttpStatusClient {
    pub fn new() -> Result<Self, StatusError> {
        let client = Client::builder()
            .user_agent(concat!("OverBot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StatusError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl StatusClient for HttpStatusClient {
    async fn fetch(&self, url: &str) -> Result<String, StatusError> {
        debug!(url, "Fetching status page");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StatusError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::Http(format!("{} returned {}", url, status)));
        }

        response
            .text()
            .await
            .map_err(|e| StatusError::Http(e.to_string()))
    }
}
