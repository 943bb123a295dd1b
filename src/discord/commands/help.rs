use crate::discord::commands::replies;
use crate::discord::{Context, Error};

/// Shows the command list, or details about one command.
#[poise::command(prefix_command, track_edits)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to explain"]
    #[rest]
    command: Option<String>,
) -> Result<(), Error> {
    let footer = help_footer(&replies::used_prefix(ctx));

    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: &footer,
            show_subcommands: true,
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

fn help_footer(prefix: &str) -> String {
    format!(
        "Type {prefix}help <command> for more info on a command.\n\
         You can also type {prefix}help <category> for more info on a category."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_footer_uses_given_prefix() {
        let footer = help_footer("ow!");
        assert!(footer.starts_with("Type ow!help <command>"));
        assert!(footer.ends_with("type ow!help <category> for more info on a category."));
        assert!(!footer.contains("-help"));
    }
}
