// Discord commands for the Miscellaneous extension.
//
// Thin handlers: gather data from the services, format it, reply.

use std::num::NonZeroU64;
use std::time::Instant;

use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

use crate::core::admin::ServerUsage;
use crate::core::formatting::{format_commits, placement};
use crate::core::status::{format_overbot_status, format_overwatch_status};
use crate::discord::commands::{paginator, replies};
use crate::discord::{Context, Error};
use crate::infra::system::{git_log, host_info};

const PATCH_CHANNELS: [&str; 3] = ["live", "ptr", "experimental"];

/// Displays the bot's current websocket latency.
#[poise::command(prefix_command, aliases("pong"), category = "Miscellaneous")]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let started = Instant::now();
    let reply = ctx
        .send(poise::CreateReply::default().embed(replies::embed(ctx).title("Pinging...")))
        .await?;
    let ack = started.elapsed().as_millis();
    let heartbeat = ctx.ping().await.as_millis();

    let embed = replies::embed(ctx)
        .field("Heartbeat", format!("{}ms", heartbeat), true)
        .field("ACK", format!("{}ms", ack), true);
    reply
        .edit(ctx, poise::CreateReply::default().embed(embed))
        .await?;
    Ok(())
}

/// Returns the bot license.
#[poise::command(prefix_command, category = "Miscellaneous")]
pub async fn license(ctx: Context<'_>) -> Result<(), Error> {
    replies::send_fenced(ctx, "text", &ctx.data().license).await
}

/// Leave a feedback about the bot (you can leave a feedback once a minute).
#[poise::command(prefix_command, user_cooldown = 60, category = "Miscellaneous")]
pub async fn feedback(
    ctx: Context<'_>,
    #[description = "Your feedback"]
    #[rest]
    message: String,
) -> Result<(), Error> {
    let Some(channel_id) = ctx
        .data()
        .config
        .feedback_channel_id
        .and_then(NonZeroU64::new)
        .map(serenity::ChannelId::from)
    else {
        debug!("No feedback channel configured, dropping feedback");
        return Ok(());
    };

    let author = ctx.author();
    let embed = replies::embed(ctx)
        .author(serenity::CreateEmbedAuthor::new(author.tag()).icon_url(author.face()))
        .description(message)
        .timestamp(ctx.created_at());

    channel_id
        .send_message(ctx.http(), serenity::CreateMessage::new().embed(embed))
        .await?;
    ctx.say(format!(
        "{}, your feedback has been successfully sent, thanks!",
        author.name
    ))
    .await?;
    Ok(())
}

/// Displays the bot information.
#[poise::command(prefix_command, guild_only, category = "Miscellaneous")]
pub async fn about(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_or_broadcast().await?;
    let data = ctx.data();
    let config = &data.config;

    let commits = match git_log::latest_commits(3).await {
        Ok(commits) => format_commits(&commits, &config.repository_url),
        Err(e) => {
            warn!("Failed to read latest commits: {}", e);
            String::new()
        }
    };
    let host = host_info::sample().await;
    let lifetime = data.admin.total_commands().await?;
    let owner = owner_user(ctx).await;

    let (members, servers, shards) = {
        let cache = ctx.cache();
        let guilds = cache.guilds();
        let members: u64 = guilds
            .iter()
            .filter_map(|id| cache.guild(*id).map(|guild| guild.member_count))
            .sum();
        let shards = format!(
            "{}/{}",
            ctx.serenity_context().shard_id.0 + 1,
            cache.shard_count()
        );
        (members, guilds.len(), shards)
    };

    let mut embed = replies::embed(ctx)
        .title("Official Website")
        .description(format!("Latest Commits:\n{}", commits))
        .url(&config.website_url)
        .timestamp(serenity::Timestamp::now());

    if let Some(owner) = owner {
        embed = embed.author(
            serenity::CreateEmbedAuthor::new(owner.tag())
                .url(&config.github_profile_url)
                .icon_url(owner.face()),
        );
    }

    let embed = embed
        .field("Activity Monitor", host.activity(), true)
        .field("Host Statistics", host.host(), true)
        .field(
            "Commands Runned",
            format!(
                "{} (session)\n{} (total)",
                data.stats.commands_used(),
                lifetime
            ),
            true,
        )
        .field("Members", members.to_string(), true)
        .field("Servers", servers.to_string(), true)
        .field("Shards", shards, true)
        .field("Lines of code", data.stats.total_lines().to_string(), true)
        .field("Uptime", data.stats.uptime().to_string(), true)
        .field("\u{200b}", "\u{200b}", true)
        .footer(serenity::CreateEmbedFooter::new(
            "Made with poise v0.6 and serenity v0.12",
        ));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// First configured owner, falling back to the application owner.
async fn owner_user(ctx: Context<'_>) -> Option<serenity::User> {
    let configured = ctx
        .data()
        .config
        .owner_ids
        .iter()
        .find_map(|id| NonZeroU64::new(*id))
        .map(serenity::UserId::from);

    if let Some(id) = configured {
        match id.to_user(ctx).await {
            Ok(user) => return Some(user),
            Err(e) => warn!(owner_id = %id, "Failed to fetch owner: {}", e),
        }
    }

    ctx.http()
        .get_current_application_info()
        .await
        .ok()
        .and_then(|info| info.owner)
}

/// Returns both OverBot and Overwatch servers status.
#[poise::command(prefix_command, user_cooldown = 60, category = "Miscellaneous")]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_or_broadcast().await?;
    let data = ctx.data();
    let overwatch_url = &data.status.urls().overwatch_status;

    let embed = replies::embed(ctx)
        .title("Status")
        .timestamp(serenity::Timestamp::now());

    let embed = match data.status.report().await {
        Ok(report) => {
            let components = report
                .components
                .iter()
                .map(|component| format_overbot_status(&component.name, &component.status))
                .collect::<Vec<_>>()
                .join("\n");
            embed
                .description(format!(
                    "[Overwatch]({}) · [OverBot]({})",
                    overwatch_url,
                    data.config.overbot_status_page()
                ))
                .field("OverBot", components, true)
                .field("Overwatch", format_overwatch_status(&report.overwatch), false)
        }
        Err(e) => {
            warn!(kind = e.kind(), "Status fetch failed: {}", e);
            embed.description(format!("[Overwatch Servers Status]({})", overwatch_url))
        }
    };

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Returns the latest Overwatch news.
#[poise::command(prefix_command, user_cooldown = 60, category = "Miscellaneous")]
pub async fn news(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_or_broadcast().await?;
    let data = ctx.data();

    let articles = match data.status.news().await {
        Ok(articles) => articles,
        Err(e) => {
            warn!(kind = e.kind(), "News fetch failed: {}", e);
            Vec::new()
        }
    };

    if articles.is_empty() {
        let embed = replies::embed(ctx)
            .title("Latest Overwatch News")
            .description(format!(
                "[Click here to check out all the new Overwatch news.]({})",
                data.status.urls().overwatch_news
            ))
            .footer(serenity::CreateEmbedFooter::new("Blizzard Entertainment"));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        return Ok(());
    }

    let total = articles.len();
    let pages = articles
        .into_iter()
        .enumerate()
        .map(|(index, article)| {
            replies::embed(ctx)
                .title(article.title)
                .url(article.link)
                .image(article.image)
                .timestamp(serenity::Timestamp::now())
                .footer(serenity::CreateEmbedFooter::new(format!(
                    "News {}/{} - Blizzard Entertainment",
                    index + 1,
                    total
                )))
        })
        .collect();

    paginator::paginate(ctx, pages).await
}

/// Returns the most recent Overwatch patch notes.
#[poise::command(prefix_command, user_cooldown = 10, category = "Miscellaneous")]
pub async fn patch(ctx: Context<'_>) -> Result<(), Error> {
    let config = &ctx.data().config;
    let mut embed = replies::embed(ctx).title("Overwatch Patch Notes");
    for channel in PATCH_CHANNELS {
        embed = embed.field(
            capitalize(channel),
            patch_link(channel, &config.patch_url(channel)),
            false,
        );
    }
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn patch_link(channel: &str, url: &str) -> String {
    format!("[Click here to view **{}** patch notes]({})", channel, url)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Displays a leaderboard of the 5 most active servers (based on commands runned).
#[poise::command(prefix_command, user_cooldown = 30, category = "Miscellaneous")]
pub async fn leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_or_broadcast().await?;
    let servers = ctx.data().admin.top_servers(5).await?;

    if servers.is_empty() {
        ctx.say("No server has run a command yet.").await?;
        return Ok(());
    }

    // Cache guards are not Send, so resolve everything before the next await.
    let (description, thumbnail) = {
        let cache = ctx.cache();
        let guild = |id: u64| NonZeroU64::new(id).and_then(|id| cache.guild(serenity::GuildId::from(id)));

        let description = servers
            .iter()
            .enumerate()
            .map(|(index, server)| {
                let name = guild(server.id)
                    .map(|guild| guild.name.clone())
                    .unwrap_or_else(|| server.id.to_string());
                leaderboard_line(index + 1, &name, server)
            })
            .collect::<Vec<_>>()
            .join("\n");
        let thumbnail = servers
            .first()
            .and_then(|server| guild(server.id))
            .and_then(|guild| guild.icon_url());
        (description, thumbnail)
    };

    let mut embed = replies::embed(ctx)
        .title("Top 5 Active Servers")
        .description(description);
    if let Some(url) = thumbnail {
        embed = embed.thumbnail(url);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn leaderboard_line(place: usize, guild_name: &str, server: &ServerUsage) -> String {
    format!(
        "{} `{}` runned a total of **{}** commands",
        placement(place),
        guild_name,
        server.commands_runned
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_line() {
        let server = ServerUsage {
            id: 1,
            commands_runned: 42,
        };
        assert_eq!(
            leaderboard_line(1, "Overwatch Fans", &server),
            "<:top500:632281138832080926> `Overwatch Fans` runned a total of **42** commands"
        );
        assert!(leaderboard_line(7, "x", &server).starts_with("<:platinum:"));
    }

    #[test]
    fn test_patch_fields() {
        assert_eq!(capitalize("experimental"), "Experimental");
        assert_eq!(capitalize(""), "");
        assert_eq!(
            patch_link("ptr", "https://example.com/ptr"),
            "[Click here to view **ptr** patch notes](https://example.com/ptr)"
        );
    }
}
