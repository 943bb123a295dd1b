// Discord layer - commands, framework hooks and the script host.

use std::sync::Arc;

use crate::config::BotConfig;
use crate::core::admin::AdminService;
use crate::core::eval::EvalEngine;
use crate::core::extensions::ExtensionRegistry;
use crate::core::stats::BotStats;
use crate::core::status::StatusService;
use crate::infra::database::SqliteBotStore;
use crate::infra::status::HttpStatusClient;

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "hooks/framework_hooks.rs"]
pub mod hooks;

#[path = "eval/discord_host.rs"]
pub mod script_host;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands.
pub struct Data {
    pub config: Arc<BotConfig>,
    pub admin: Arc<AdminService<SqliteBotStore>>,
    pub status: Arc<StatusService<HttpStatusClient>>,
    pub eval: Arc<EvalEngine>,
    pub extensions: Arc<ExtensionRegistry>,
    pub stats: Arc<BotStats>,
    /// Contents of the license file, read once at startup.
    pub license: String,
}
