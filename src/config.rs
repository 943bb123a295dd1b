use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub database_url: String,
    pub legacy_database_url: String,
    pub default_prefix: String,
    pub owner_ids: Vec<u64>,
    pub feedback_channel_id: Option<u64>,
    pub embed_color: u32,
    pub website_url: String,
    pub github_profile_url: String,
    pub repository_url: String,
    pub overwatch_status_url: String,
    pub overwatch_news_url: String,
    /// Contains a `{}` placeholder for the release channel.
    pub overwatch_patch_url: String,
    pub overbot_status_url: String,
    pub license_path: PathBuf,
    pub eval_timeout: Duration,
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DISCORD_TOKEN`
    ///
    /// Everything else has a default:
    /// - `DATABASE_URL`, `LEGACY_DATABASE_URL`
    /// - `BOT_PREFIX`, `OWNER_ID` (comma-separated), `FEEDBACK_CHANNEL_ID`, `EMBED_COLOR`
    /// - `WEBSITE_URL`, `GITHUB_PROFILE_URL`, `REPOSITORY_URL`
    /// - `OVERWATCH_STATUS_URL`, `OVERWATCH_NEWS_URL`, `OVERWATCH_PATCH_URL`, `OVERBOT_STATUS_URL`
    /// - `LICENSE_PATH`, `EVAL_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let or = |var: &str, default: &str| get(var).unwrap_or_else(|| default.to_string());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let owner_ids = match get("OWNER_ID") {
            Some(value) => parse_id_list("OWNER_ID", &value)?,
            None => Vec::new(),
        };

        let feedback_channel_id = match get("FEEDBACK_CHANNEL_ID") {
            Some(value) => Some(parse_number("FEEDBACK_CHANNEL_ID", &value)?),
            None => None,
        };

        let embed_color = match get("EMBED_COLOR") {
            Some(value) => parse_color(&value)?,
            None => 0xFA9C1D,
        };

        let eval_timeout = match get("EVAL_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_number("EVAL_TIMEOUT_SECS", &value)?),
            None => Duration::from_secs(30),
        };

        Ok(Self {
            discord_token,
            database_url: or("DATABASE_URL", "sqlite://data/overbot.db"),
            legacy_database_url: or("LEGACY_DATABASE_URL", "main.sqlite"),
            default_prefix: or("BOT_PREFIX", "-"),
            owner_ids,
            feedback_channel_id,
            embed_color,
            website_url: or("WEBSITE_URL", "https://overbot.netlify.app"),
            github_profile_url: or("GITHUB_PROFILE_URL", "https://github.com/davidetacchini"),
            repository_url: or(
                "REPOSITORY_URL",
                "https://github.com/davidetacchini/OverBot",
            ),
            overwatch_status_url: or(
                "OVERWATCH_STATUS_URL",
                "https://downdetector.com/status/overwatch/",
            ),
            overwatch_news_url: or(
                "OVERWATCH_NEWS_URL",
                "https://playoverwatch.com/en-us/news",
            ),
            overwatch_patch_url: or(
                "OVERWATCH_PATCH_URL",
                "https://playoverwatch.com/en-us/news/patch-notes/{}",
            ),
            overbot_status_url: or(
                "OVERBOT_STATUS_URL",
                "https://overbot.statuspage.io/api/v2/components.json",
            ),
            license_path: PathBuf::from(or("LICENSE_PATH", "LICENSE")),
            eval_timeout,
        })
    }

    /// Patch notes link for `live`, `ptr` or `experimental`.
    pub fn patch_url(&self, channel: &str) -> String {
        self.overwatch_patch_url.replace("{}", channel)
    }

    /// Human-facing Statuspage, derived from the API endpoint.
    pub fn overbot_status_page(&self) -> String {
        match self.overbot_status_url.find("/api/") {
            Some(index) => format!("{}/", &self.overbot_status_url[..index]),
            None => self.overbot_status_url.clone(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}

fn parse_id_list(var: &'static str, value: &str) -> Result<Vec<u64>, ConfigError> {
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| parse_number(var, part))
        .collect()
}

/// Accepts `#fa9c1d`, `0xfa9c1d` or `fa9c1d`.
fn parse_color(value: &str) -> Result<u32, ConfigError> {
    let trimmed = value.trim();
    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);
    u32::from_str_radix(hex, 16)
        .ok()
        .filter(|color| *color <= 0xFFFFFF)
        .ok_or_else(|| ConfigError::Invalid {
            var: "EMBED_COLOR",
            value: value.to_string(),
        })
}
