// One-off data migrations from the previous bot version.
//
// The legacy SQLite file is opened read-only for the duration of one command
// and closed afterwards.

use tracing::info;

use crate::core::admin::AdminError;
use crate::discord::commands::replies;
use crate::discord::{Context, Error};
use crate::infra::database::SqliteLegacyStore;

async fn open_legacy(ctx: Context<'_>) -> Result<SqliteLegacyStore, AdminError> {
    SqliteLegacyStore::open(&ctx.data().config.legacy_database_url).await
}

/// [Owner Only] Add a server row for every guild the bot is in.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn insert_guild(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_or_broadcast().await?;
    let guild_ids: Vec<u64> = ctx.cache().guilds().iter().map(|id| id.get()).collect();

    match ctx.data().admin.insert_guilds(&guild_ids).await {
        Ok(inserted) => {
            info!(inserted, total = guild_ids.len(), "insert_guild finished");
            ctx.say("```css\nGuilds successfully inserted.```").await?;
        }
        Err(e) => replies::send_prolog(ctx, e.kind(), &e.to_string()).await?,
    }
    Ok(())
}

/// [Owner Only] Copy legacy profiles into the profile table.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn insert_profiles(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_or_broadcast().await?;
    let legacy = match open_legacy(ctx).await {
        Ok(legacy) => legacy,
        Err(e) => return replies::send_prolog(ctx, e.kind(), &e.to_string()).await,
    };

    let result = ctx.data().admin.import_profiles(&legacy).await;
    legacy.close().await;

    match result {
        Ok(_) => {
            ctx.say("```css\nProfiles successfully inserted.```").await?;
        }
        Err(e) => replies::send_prolog(ctx, e.kind(), &e.to_string()).await?,
    }
    Ok(())
}

/// [Owner Only] Copy legacy custom prefixes onto the server table.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn insert_prefixes(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_or_broadcast().await?;
    let legacy = match open_legacy(ctx).await {
        Ok(legacy) => legacy,
        Err(e) => return replies::send_prolog(ctx, e.kind(), &e.to_string()).await,
    };

    let result = ctx.data().admin.import_prefixes(&legacy).await;
    legacy.close().await;

    match result {
        Ok(_) => {
            ctx.say("```css\nPrefixes successfully updated.```").await?;
        }
        Err(e) => replies::send_prolog(ctx, e.kind(), &e.to_string()).await?,
    }
    Ok(())
}
