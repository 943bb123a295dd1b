// `exc`: runs an owner-supplied script and reports what happened.

use tracing::{error, info, warn};

use crate::core::eval::{Outcome, Reply};
use crate::discord::commands::replies;
use crate::discord::script_host::DiscordHost;
use crate::discord::{Context, Error};

/// [Owner Only] Evaluates a code.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn exc(
    ctx: Context<'_>,
    #[description = "Code, optionally inside a code block"]
    #[rest]
    body: String,
) -> Result<(), Error> {
    let message = replies::invoking_message(ctx).ok_or("exc needs the invoking message")?;
    let host = DiscordHost::new(ctx, message, replies::used_prefix(ctx));
    let environment = host.environment().await;

    let outcome = ctx.data().eval.evaluate(&body, environment, &host).await;
    match &outcome {
        Outcome::CompileFault(fault) => info!(line = fault.line, "exc did not compile"),
        Outcome::RuntimeFault { fault, .. } => info!(kind = fault.kind(), "exc raised"),
        Outcome::Completed { value, .. } => info!(result = value.type_name(), "exc completed"),
    }

    deliver(ctx, outcome.reply()).await;
    Ok(())
}

/// Failures to deliver the reply are logged and dropped.
async fn deliver(ctx: Context<'_>, reply: Reply) {
    if reply.marker {
        if let Err(e) = replies::react_success(ctx).await {
            warn!("Could not react to exc message: {}", e);
        }
    }

    if let Some(text) = reply.text {
        if let Err(e) = replies::send_fenced(ctx, "py", &text).await {
            error!("Failed to deliver exc result: {}", e);
        }
    }
}
