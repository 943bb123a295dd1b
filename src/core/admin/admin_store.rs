use async_trait::async_trait;

use super::admin_models::{CommandRow, LegacyPrefix, Profile, QueryResult, ServerUsage};
use super::admin_service::AdminError;

/// The bot's primary database: the `command`, `server` and `profile` tables.
#[async_trait]
pub trait BotStore: Send + Sync {
    async fn count_profiles(&self) -> Result<i64, AdminError>;
    /// Servers whose prefix differs from `default_prefix`.
    async fn count_custom_prefixes(&self, default_prefix: &str) -> Result<i64, AdminError>;
    async fn count_servers(&self) -> Result<i64, AdminError>;
    /// `SUM(used)` over the command table; zero when empty.
    async fn total_commands(&self) -> Result<i64, AdminError>;

    async fn list_commands(&self) -> Result<Vec<CommandRow>, AdminError>;
    async fn command_exists(&self, name: &str) -> Result<bool, AdminError>;
    async fn insert_command(&self, name: &str) -> Result<(), AdminError>;
    /// Returns the number of rows changed.
    async fn rename_command(&self, id: i64, name: &str) -> Result<u64, AdminError>;
    /// Returns the number of rows removed.
    async fn delete_command(&self, id: i64) -> Result<u64, AdminError>;
    /// Bumps `used` for `name`, creating the row if needed.
    async fn increment_command(&self, name: &str) -> Result<(), AdminError>;

    async fn server_exists(&self, id: u64) -> Result<bool, AdminError>;
    async fn insert_server(&self, id: u64, prefix: &str) -> Result<(), AdminError>;
    async fn server_prefix(&self, id: u64) -> Result<Option<String>, AdminError>;
    /// Returns the number of rows changed.
    async fn update_prefix(&self, id: u64, prefix: &str) -> Result<u64, AdminError>;
    /// Bumps `commands_runned`, creating the row with `default_prefix` if needed.
    async fn increment_server(&self, id: u64, default_prefix: &str) -> Result<(), AdminError>;
    async fn top_servers(&self, limit: i64) -> Result<Vec<ServerUsage>, AdminError>;

    async fn insert_profile(&self, profile: &Profile) -> Result<(), AdminError>;

    /// Runs arbitrary SQL and returns every row.
    async fn query(&self, sql: &str) -> Result<QueryResult, AdminError>;
    /// Runs arbitrary SQL and returns the number of rows affected.
    async fn execute(&self, sql: &str) -> Result<u64, AdminError>;
}

/// Read access to the database of the previous bot version.
#[async_trait]
pub trait LegacyStore: Send + Sync {
    async fn profiles(&self) -> Result<Vec<Profile>, AdminError>;
    async fn prefixes(&self) -> Result<Vec<LegacyPrefix>, AdminError>;
}
