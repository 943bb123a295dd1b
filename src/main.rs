// This is the entry point of OverBot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (databases, HTTP, subprocesses)
// - `discord/` = Discord-specific adapters (commands, hooks, script host)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and hooks

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use std::num::NonZeroU64;
use std::path::Path;
use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::core::admin::AdminService;
use crate::core::eval::EvalEngine;
use crate::core::extensions::ExtensionRegistry;
use crate::core::stats::{count_source_lines, BotStats};
use crate::core::status::{StatusService, StatusUrls};
use crate::discord::commands::presence;
use crate::discord::{hooks, Data};
use crate::infra::database::SqliteBotStore;
use crate::infra::status::HttpStatusClient;

const MISSING_LICENSE: &str = "No license file was found.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = Arc::new(BotConfig::from_env()?);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let store = SqliteBotStore::new(&config.database_url).await?;
    let admin = Arc::new(AdminService::new(store, config.default_prefix.clone()));

    let status = Arc::new(StatusService::new(
        HttpStatusClient::new()?,
        StatusUrls {
            overbot_status: config.overbot_status_url.clone(),
            overwatch_status: config.overwatch_status_url.clone(),
            overwatch_news: config.overwatch_news_url.clone(),
        },
    ));

    let total_lines = count_source_lines(Path::new("src")).unwrap_or_else(|e| {
        warn!("Failed to count source lines: {}", e);
        0
    });

    let license = std::fs::read_to_string(&config.license_path).unwrap_or_else(|e| {
        warn!(path = %config.license_path.display(), "Failed to read license: {}", e);
        MISSING_LICENSE.to_string()
    });

    let data = Data {
        config: Arc::clone(&config),
        admin,
        status,
        eval: Arc::new(EvalEngine::new(config.eval_timeout)),
        extensions: Arc::new(ExtensionRegistry::new()),
        stats: Arc::new(BotStats::new(total_lines)),
        license,
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let owners = config
        .owner_ids
        .iter()
        .filter_map(|id| NonZeroU64::new(*id))
        .map(serenity::UserId::from)
        .collect();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT; // Required to read prefix commands

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                dynamic_prefix: Some(|ctx| Box::pin(hooks::dynamic_prefix(ctx))),
                mention_as_prefix: true,
                ..Default::default()
            },
            owners,
            command_check: Some(|ctx| Box::pin(hooks::command_check(ctx))),
            post_command: |ctx| Box::pin(hooks::post_command(ctx)),
            on_error: |error| Box::pin(hooks::on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!(
                    user = %ready.user.name,
                    guilds = ready.guilds.len(),
                    started_at = %data.stats.started_at,
                    extensions = ?data.extensions.list(),
                    "OverBot is ready"
                );
                presence::on_ready(ctx, &data.config.default_prefix);
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    client.start_autosharded().await?;
    Ok(())
}
