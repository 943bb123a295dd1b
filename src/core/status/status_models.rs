use serde::Deserialize;

/// One component of the bot's Statuspage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentStatus {
    pub name: String,
    /// Display form, e.g. `Operational` or `Partial Outage`.
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsArticle {
    pub title: String,
    pub link: String,
    pub image: String,
}

/// Everything the `status` command shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub overwatch: String,
    pub components: Vec<ComponentStatus>,
}

#[derive(Debug, Clone)]
pub struct StatusUrls {
    /// Statuspage `components.json` endpoint.
    pub overbot_status: String,
    pub overwatch_status: String,
    pub overwatch_news: String,
}

/// Raw Statuspage payload.
#[derive(Debug, Deserialize)]
pub(crate) struct StatuspageComponents {
    pub components: Vec<StatuspageComponent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatuspageComponent {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub group: bool,
}
