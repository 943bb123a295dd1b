// Discord commands for the Owner extension.
//
// Every command here except `awards` is gated by `owners_only` and hidden
// from the help listing.

use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::core::extensions::ExtensionError;
use crate::discord::commands::{dispatch, replies};
use crate::discord::{Context, Error};
use crate::infra::system::speedtest;

/// Most messages Discord returns per history request and accepts per bulk delete.
const PURGE_BATCH: u32 = 100;
/// Bulk deletes reject messages older than two weeks; keep a minute of slack.
const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60 - 60;

fn bulk_deletable(created_at: i64, now: i64) -> bool {
    now - created_at < BULK_DELETE_MAX_AGE_SECS
}

/// [Owner Only] Remove the given amount of messages.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn clr(
    ctx: Context<'_>,
    #[description = "Messages to remove besides the command itself"] amount: Option<u32>,
) -> Result<(), Error> {
    let channel = ctx.channel_id();
    // The invoking message is purged too.
    let mut remaining = amount.unwrap_or(1).saturating_add(1);
    let mut purged = 0u32;

    while remaining > 0 {
        let batch = remaining.min(PURGE_BATCH);
        let messages = channel
            .messages(ctx.http(), serenity::GetMessages::new().limit(batch as u8))
            .await?;
        if messages.is_empty() {
            break;
        }

        let now = chrono::Utc::now().timestamp();
        let (recent, old): (Vec<&serenity::Message>, Vec<&serenity::Message>) = messages
            .iter()
            .partition(|msg| bulk_deletable(msg.timestamp.unix_timestamp(), now));

        match recent.as_slice() {
            [] => {}
            [msg] => channel.delete_message(ctx.http(), msg.id).await?,
            _ => {
                let ids: Vec<serenity::MessageId> = recent.iter().map(|msg| msg.id).collect();
                channel.delete_messages(ctx.http(), ids).await?;
            }
        }
        for msg in old {
            channel.delete_message(ctx.http(), msg.id).await?;
        }

        let fetched = messages.len() as u32;
        purged += fetched;
        if fetched < batch {
            break;
        }
        remaining -= batch;
    }

    info!(channel_id = %channel, purged, "Purged messages");
    Ok(())
}

async fn extension_reply(
    ctx: Context<'_>,
    result: Result<(), ExtensionError>,
) -> Result<(), Error> {
    match result {
        Ok(()) => replies::react_success(ctx).await,
        Err(e) => replies::send_prolog(ctx, e.kind(), &e.to_string()).await,
    }
}

/// [Owner Only] Loads a module. Use cogs.cog_name as cog parameter.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn load(ctx: Context<'_>, #[rest] cog: String) -> Result<(), Error> {
    let result = ctx.data().extensions.load(cog.trim());
    extension_reply(ctx, result).await
}

/// [Owner Only] Unloads a module. Use cogs.cog_name as cog parameter.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn unload(ctx: Context<'_>, #[rest] cog: String) -> Result<(), Error> {
    let result = ctx.data().extensions.unload(cog.trim());
    extension_reply(ctx, result).await
}

/// [Owner Only] Reloads a module. Use cogs.cog_name as cog parameter.
#[poise::command(
    prefix_command,
    owners_only,
    hide_in_help,
    aliases("rld"),
    category = "Owner"
)]
pub async fn reload(ctx: Context<'_>, #[rest] cog: String) -> Result<(), Error> {
    let result = ctx.data().extensions.reload(cog.trim());
    extension_reply(ctx, result).await
}

/// [Owner Only] Kills the bot session.
#[poise::command(
    prefix_command,
    owners_only,
    hide_in_help,
    aliases("kys", "die"),
    category = "Owner"
)]
pub async fn shutdown(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say("Successfully gone offline.").await?;
    info!(owner = %ctx.author().name, "Shutdown requested");
    ctx.framework().shard_manager().shutdown_all().await;
    Ok(())
}

/// [Owner Only] Run a command as if you were the user.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn runas(
    ctx: Context<'_>,
    #[description = "Member to impersonate"] member: serenity::Member,
    #[description = "Command and arguments, without the prefix"]
    #[rest]
    command: String,
) -> Result<(), Error> {
    let original = replies::invoking_message(ctx).ok_or("runas needs a message to copy")?;
    let content = format!("{}{}", replies::used_prefix(ctx), command);
    let msg = dispatch::impersonate(original, member.user.clone(), content);
    dispatch::dispatch(ctx, &msg).await;
    Ok(())
}

/// [Owner Only] Run a speedtest directly from Discord.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn speedtest(ctx: Context<'_>) -> Result<(), Error> {
    let reply = ctx.say("Running the speedtest...").await?;
    let output = match speedtest::run().await {
        Ok(output) => output,
        Err(e) => {
            warn!("Speedtest failed: {}", e);
            e.to_string()
        }
    };
    reply
        .edit(
            ctx,
            poise::CreateReply::default().content(format!("```prolog\n{}```", output)),
        )
        .await?;
    Ok(())
}

/// [Owner Only] Run a query.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn sql(ctx: Context<'_>, #[rest] query: String) -> Result<(), Error> {
    let result = match ctx.data().admin.query(&query).await {
        Ok(result) => result,
        Err(e) => {
            ctx.say(format!("```prolog\n{}```", e)).await?;
            return Ok(());
        }
    };

    if result.is_empty() {
        ctx.say("There are no results.").await?;
    } else {
        for chunk in sql_report(&result.render()) {
            ctx.say(chunk).await?;
        }
    }
    Ok(())
}

/// Splits rendered rows into `asciidoc` blocks; only the first carries the header.
fn sql_report(rows: &str) -> Vec<String> {
    const HEADER: &str = "Successful query\n----------------\n\n";
    let budget = crate::core::formatting::MESSAGE_LIMIT - "```asciidoc\n```".len() - HEADER.len();

    crate::core::formatting::split_message(rows, budget)
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            let header = if index == 0 { HEADER } else { "" };
            format!("```asciidoc\n{}{}```", header, chunk)
        })
        .collect()
}

/// [Owner Only] Display an admin panel.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn admin(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let panel = match data.admin.panel(data.stats.commands_used()).await {
        Ok(panel) => panel,
        Err(e) => return replies::send_prolog(ctx, e.kind(), &e.to_string()).await,
    };

    let embed = replies::embed(ctx)
        .title("Admin Panel")
        .field("Profiles", panel.profiles.to_string(), true)
        .field("Prefixes", panel.prefixes.to_string(), true)
        .field("Guilds", panel.guilds.to_string(), true)
        .field(
            "Commands Used (Session)",
            panel.session_commands.to_string(),
            true,
        )
        .field(
            "Commands Used (Lifetime)",
            panel.lifetime_commands.to_string(),
            true,
        );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Statistics moved to the `stats` command.
#[poise::command(
    prefix_command,
    aliases("medals", "quick", "quickplay", "comp", "competitive"),
    category = "Owner"
)]
pub async fn awards(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(deprecation_notice(&replies::used_prefix(ctx))).await?;
    Ok(())
}

fn deprecation_notice(prefix: &str) -> String {
    format!(
        "This command has been deprecated. To see your whole quickplay/competitive \
         statistics run `{}stats <pc/psn/xbl> <battletag/username>`. \
         For more information run the `help` command.",
        prefix
    )
}
