// Re-entry into the framework: runs a synthetic message through the same
// path a real message takes (prefix resolution, checks, cooldowns, hooks).

use poise::serenity_prelude as serenity;
use tracing::debug;

use crate::discord::Context;

/// Copy of the invoking message with a different author and content.
pub fn impersonate(
    original: &serenity::Message,
    author: serenity::User,
    content: String,
) -> serenity::Message {
    let mut msg = original.clone();
    msg.author = author;
    msg.content = content;
    msg
}

/// Dispatches `msg` as if it had just been received. Framework errors raised
/// by the nested command are reported only through the regular `on_error`
/// hook, never to the caller.
pub async fn dispatch(ctx: Context<'_>, msg: &serenity::Message) {
    let framework = ctx.framework();
    let invocation_data =
        tokio::sync::Mutex::new(Box::new(()) as Box<dyn std::any::Any + Send + Sync>);
    let mut parent_commands = Vec::new();

    debug!(author = %msg.author.name, content = %msg.content, "Dispatching message");

    if let Err(error) = poise::dispatch_message(
        framework,
        ctx.serenity_context(),
        msg,
        poise::MessageDispatchTrigger::MessageCreate,
        &invocation_data,
        &mut parent_commands,
    )
    .await
    {
        error.handle(framework.options).await;
    }
}

/// `text` as a command line, adding `prefix` unless it is already there.
pub fn command_line(prefix: &str, text: &str) -> String {
    if text.starts_with(prefix) {
        text.to_string()
    } else {
        format!("{}{}", prefix, text)
    }
}
