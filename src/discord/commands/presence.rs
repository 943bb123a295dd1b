// This module handles bot presence and lifecycle events.
//
// Only Discord SDK types (Context, ActivityData, OnlineStatus) live here.

use poise::serenity_prelude as serenity;

/// Shows "Playing <prefix>help" so users can discover the commands.
pub fn reset_status(ctx: &serenity::Context, prefix: &str) {
    let activity = serenity::ActivityData::playing(help_hint(prefix));
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}

/// Called once the bot is ready.
pub fn on_ready(ctx: &serenity::Context, prefix: &str) {
    reset_status(ctx, prefix);
}

fn help_hint(prefix: &str) -> String {
    format!("{}help", prefix)
}
