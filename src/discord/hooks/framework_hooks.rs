// Framework-wide hooks: per-guild prefix, extension check, usage accounting
// and the catch-all error reply.

use poise::serenity_prelude as serenity;
use tracing::{debug, error, warn};

use crate::core::admin::AdminError;
use crate::core::extensions::ExtensionError;
use crate::core::formatting::prolog_block;
use crate::core::status::StatusError;
use crate::discord::{Context, Data, Error};

/// Name printed on the first line of a fault reply.
pub fn fault_kind(error: &Error) -> &'static str {
    if let Some(e) = error.downcast_ref::<AdminError>() {
        e.kind()
    } else if let Some(e) = error.downcast_ref::<StatusError>() {
        e.kind()
    } else if let Some(e) = error.downcast_ref::<ExtensionError>() {
        e.kind()
    } else if error.is::<serenity::Error>() {
        "HTTPException"
    } else {
        "CommandInvokeError"
    }
}

/// Resolves `server.prefix` for the guild, falling back to the default prefix.
pub async fn dynamic_prefix(
    ctx: poise::PartialContext<'_, Data, Error>,
) -> Result<Option<String>, Error> {
    let data = ctx.framework.user_data;
    let guild_id = ctx.guild_id.map(|id| id.get());

    match data.admin.prefix_for(guild_id).await {
        Ok(prefix) => Ok(Some(prefix)),
        Err(e) => {
            warn!(guild_id, "Prefix lookup failed, using default: {}", e);
            Ok(Some(data.config.default_prefix.clone()))
        }
    }
}

/// Commands of an unloaded extension are rejected.
pub async fn command_check(ctx: Context<'_>) -> Result<bool, Error> {
    let category = ctx.command().category.as_deref();
    Ok(ctx.data().extensions.category_enabled(category))
}

/// Counts the command for the session and in the database.
pub async fn post_command(ctx: Context<'_>) {
    let data = ctx.data();
    let name = &ctx.command().qualified_name;
    let session = data.stats.record_command();

    if let Err(e) = data
        .admin
        .record_usage(name, ctx.guild_id().map(|id| id.get()))
        .await
    {
        error!(command = %name, "Failed to record command usage: {}", e);
    }
    debug!(command = %name, session, "Command completed");
}

pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let kind = fault_kind(&error);
            error!(
                command = %ctx.command().qualified_name,
                kind,
                "Command failed: {}",
                error
            );
            if let Err(e) = ctx.say(prolog_block(kind, &error.to_string())).await {
                error!("Failed to deliver error reply: {}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed {
            error: None, ctx, ..
        } => {
            debug!(
                command = %ctx.command().qualified_name,
                "Command belongs to an unloaded extension"
            );
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_kind() {
        let admin: Error = Box::new(AdminError::CommandNotFound(3));
        assert_eq!(fault_kind(&admin), "CommandNotFound");

        let extension: Error = Box::new(ExtensionError::NotLoaded("cogs.x".into()));
        assert_eq!(fault_kind(&extension), "ExtensionNotLoaded");

        let status: Error = Box::new(StatusError::Empty("news"));
        assert_eq!(fault_kind(&status), "EmptyResponse");

        let other: Error = "boom".into();
        assert_eq!(fault_kind(&other), "CommandInvokeError");
    }
}
