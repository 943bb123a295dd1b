// Owner-only maintenance over the primary database.
//
// Everything the `admin`, `cmd`, `sql` and `insert_*` commands do lives here
// so the Discord layer only has to translate arguments and render results.

use tracing::{info, warn};

use super::admin_models::{AdminPanel, CommandRow, ImportSummary, QueryResult, ServerUsage};
use super::admin_store::{BotStore, LegacyStore};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("{0}")]
    Database(String),
    #[error("{0}")]
    Legacy(String),
    #[error("Command with id {0} does not exist")]
    CommandNotFound(i64),
    #[error("Invalid guild id: {0}")]
    InvalidGuildId(String),
}

impl AdminError {
    pub fn kind(&self) -> &'static str {
        match self {
            AdminError::Database(_) => "DatabaseError",
            AdminError::Legacy(_) => "LegacyDatabaseError",
            AdminError::CommandNotFound(_) => "CommandNotFound",
            AdminError::InvalidGuildId(_) => "ValueError",
        }
    }
}

pub struct AdminService<S: BotStore> {
    store: S,
    default_prefix: String,
}

impl<S: BotStore> AdminService<S> {
    pub fn new(store: S, default_prefix: impl Into<String>) -> Self {
        Self {
            store,
            default_prefix: default_prefix.into(),
        }
    }

    pub fn default_prefix(&self) -> &str {
        &self.default_prefix
    }

    pub async fn panel(&self, session_commands: u64) -> Result<AdminPanel, AdminError> {
        Ok(AdminPanel {
            profiles: self.store.count_profiles().await?,
            prefixes: self
                .store
                .count_custom_prefixes(&self.default_prefix)
                .await?,
            guilds: self.store.count_servers().await?,
            session_commands,
            lifetime_commands: self.store.total_commands().await?,
        })
    }

    pub async fn total_commands(&self) -> Result<i64, AdminError> {
        self.store.total_commands().await
    }

    pub async fn list_commands(&self) -> Result<Vec<CommandRow>, AdminError> {
        self.store.list_commands().await
    }

    /// Inserts every name not yet in the command table. Returns how many were added.
    pub async fn register_commands<I>(&self, names: I) -> Result<usize, AdminError>
    where
        I: IntoIterator<Item = String> + Send,
        I::IntoIter: Send,
    {
        let mut inserted = 0;
        for name in names {
            let name = name.trim().to_string();
            if name.is_empty() || self.store.command_exists(&name).await? {
                continue;
            }
            self.store.insert_command(&name).await?;
            inserted += 1;
        }
        info!(inserted, "Registered commands");
        Ok(inserted)
    }

    pub async fn update_command(&self, id: i64, name: &str) -> Result<(), AdminError> {
        if self.store.rename_command(id, name.trim()).await? == 0 {
            return Err(AdminError::CommandNotFound(id));
        }
        Ok(())
    }

    pub async fn delete_command(&self, id: i64) -> Result<(), AdminError> {
        if self.store.delete_command(id).await? == 0 {
            return Err(AdminError::CommandNotFound(id));
        }
        Ok(())
    }

    /// Adds a `server` row with the default prefix for every guild that lacks one.
    pub async fn insert_guilds(&self, guild_ids: &[u64]) -> Result<usize, AdminError> {
        let mut inserted = 0;
        for &id in guild_ids {
            if self.store.server_exists(id).await? {
                continue;
            }
            self.store.insert_server(id, &self.default_prefix).await?;
            inserted += 1;
        }
        info!(inserted, "Inserted missing guilds");
        Ok(inserted)
    }

    /// Copies every legacy profile. The first failing row aborts the import.
    pub async fn import_profiles<L: LegacyStore>(&self, legacy: &L) -> Result<usize, AdminError> {
        let profiles = legacy.profiles().await?;
        for profile in &profiles {
            self.store.insert_profile(profile).await?;
        }
        info!(count = profiles.len(), "Imported legacy profiles");
        Ok(profiles.len())
    }

    /// Copies legacy prefixes onto `server.prefix`. Rows that fail are logged
    /// and skipped.
    pub async fn import_prefixes<L: LegacyStore>(
        &self,
        legacy: &L,
    ) -> Result<ImportSummary, AdminError> {
        let mut summary = ImportSummary::default();

        for row in legacy.prefixes().await? {
            let result = match row.guild_id.trim().parse::<u64>() {
                Ok(id) => self.store.update_prefix(id, &row.prefix).await.map(|_| ()),
                Err(_) => Err(AdminError::InvalidGuildId(row.guild_id.clone())),
            };
            match result {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    warn!(guild_id = %row.guild_id, "Skipping legacy prefix: {}", e);
                    summary.skipped += 1;
                }
            }
        }

        info!(
            applied = summary.applied,
            skipped = summary.skipped,
            "Imported legacy prefixes"
        );
        Ok(summary)
    }

    pub async fn top_servers(&self, limit: i64) -> Result<Vec<ServerUsage>, AdminError> {
        self.store.top_servers(limit).await
    }

    /// Usage accounting run after every successful command.
    pub async fn record_usage(&self, command: &str, guild_id: Option<u64>) -> Result<(), AdminError> {
        self.store.increment_command(command).await?;
        if let Some(id) = guild_id {
            self.store.increment_server(id, &self.default_prefix).await?;
        }
        Ok(())
    }

    /// The guild's custom prefix, or the default one.
    pub async fn prefix_for(&self, guild_id: Option<u64>) -> Result<String, AdminError> {
        let Some(id) = guild_id else {
            return Ok(self.default_prefix.clone());
        };
        Ok(self
            .store
            .server_prefix(id)
            .await?
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| self.default_prefix.clone()))
    }

    pub async fn query(&self, sql: &str) -> Result<QueryResult, AdminError> {
        self.store.query(sql).await
    }

    pub async fn execute(&self, sql: &str) -> Result<u64, AdminError> {
        self.store.execute(sql).await
    }
}
