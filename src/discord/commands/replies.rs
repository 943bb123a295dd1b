// Reply plumbing shared by the command files.

use poise::serenity_prelude as serenity;

use crate::core::formatting::{fenced_chunks, prolog_block};
use crate::discord::{Context, Error};

pub const SUCCESS_REACTION: char = '✅';

/// The message that triggered a prefix command. Slash invocations have none.
pub fn invoking_message<'a>(ctx: Context<'a>) -> Option<&'a serenity::Message> {
    match ctx {
        poise::Context::Prefix(prefix_ctx) => Some(prefix_ctx.msg),
        _ => None,
    }
}

/// The prefix the user typed, or the configured default for slash invocations.
pub fn used_prefix(ctx: Context<'_>) -> String {
    match ctx {
        poise::Context::Prefix(prefix_ctx) => prefix_ctx.prefix.to_string(),
        _ => ctx.data().config.default_prefix.clone(),
    }
}

/// Adds the ✅ reaction to the invoking message.
pub async fn react_success(ctx: Context<'_>) -> Result<(), Error> {
    if let Some(msg) = invoking_message(ctx) {
        msg.react(ctx.http(), SUCCESS_REACTION).await?;
    }
    Ok(())
}

/// Sends `text` fenced with `language`, split over as many messages as needed.
pub async fn send_fenced(ctx: Context<'_>, language: &str, text: &str) -> Result<(), Error> {
    for chunk in fenced_chunks(language, text) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

pub async fn send_prolog(ctx: Context<'_>, kind: &str, message: &str) -> Result<(), Error> {
    ctx.say(prolog_block(kind, message)).await?;
    Ok(())
}

/// Base embed with the configured color.
pub fn embed(ctx: Context<'_>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new().color(ctx.data().config.embed_color)
}
