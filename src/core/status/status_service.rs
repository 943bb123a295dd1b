use async_trait::async_trait;

use super::status_models::{ComponentStatus, NewsArticle, StatusReport, StatusUrls};
use super::status_parsers::{parse_components, parse_news, parse_overwatch_status};

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("Request failed: {0}")]
    Http(String),
    #[error("Could not parse response: {0}")]
    Parse(String),
    #[error("No {0} found")]
    Empty(&'static str),
}

impl StatusError {
    pub fn kind(&self) -> &'static str {
        match self {
            StatusError::Http(_) => "HttpError",
            StatusError::Parse(_) => "ParseError",
            StatusError::Empty(_) => "EmptyResponse",
        }
    }
}

/// Fetches raw page bodies. Implementations decide the transport.
#[async_trait]
pub trait StatusClient: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, StatusError>;
}

pub struct StatusService<C: StatusClient> {
    client: C,
    urls: StatusUrls,
}

impl<C: StatusClient> StatusService<C> {
    pub fn new(client: C, urls: StatusUrls) -> Self {
        Self { client, urls }
    }

    pub fn urls(&self) -> &StatusUrls {
        &self.urls
    }

    pub async fn overbot_components(&self) -> Result<Vec<ComponentStatus>, StatusError> {
        let body = self.client.fetch(&self.urls.overbot_status).await?;
        parse_components(&body)
    }

    pub async fn overwatch_status(&self) -> Result<String, StatusError> {
        let body = self.client.fetch(&self.urls.overwatch_status).await?;
        parse_overwatch_status(&body)
    }

    /// Both sources; a failure of either fails the report.
    pub async fn report(&self) -> Result<StatusReport, StatusError> {
        let (overwatch, components) =
            tokio::try_join!(self.overwatch_status(), self.overbot_components())?;
        Ok(StatusReport {
            overwatch,
            components,
        })
    }

    pub async fn news(&self) -> Result<Vec<NewsArticle>, StatusError> {
        let body = self.client.fetch(&self.urls.overwatch_news).await?;
        parse_news(&body, &self.urls.overwatch_news)
    }
}

/// `<icon> name: status` for one Statuspage component.
pub fn format_overbot_status(name: &str, status: &str) -> String {
    match status {
        "Operational" => format!("<:online:648186001361076243> {}: {}", name, status),
        "Under Maintenance" => format!(":tools: {}: {}", name, status),
        "Degraded Performance" | "Partial Outage" => {
            format!("<:idle:648185977717915650> {}: {}", name, status)
        }
        _ => format!("<:dnd:648185968209428490> {}: {}", name, status),
    }
}

pub fn format_overwatch_status(status: &str) -> String {
    if status == "No problems at Overwatch" {
        format!("<:online:648186001361076243> {}", status)
    } else {
        format!("<:dnd:648185968209428490> {}", status)
    }
}
