// `cmd`: maintenance of the `command` usage table.

use poise::serenity_prelude as serenity;

use crate::core::admin::CommandRow;
use crate::discord::commands::{paginator, replies};
use crate::discord::{Context, Data, Error};

const ROWS_PER_PAGE: usize = 10;

/// [Owner Only] Get usage information for 'cmd' command.
#[poise::command(
    prefix_command,
    owners_only,
    hide_in_help,
    category = "Owner",
    subcommands("ls", "addall", "update", "delete")
)]
pub async fn cmd(ctx: Context<'_>) -> Result<(), Error> {
    let prefix = replies::used_prefix(ctx);
    let mut embed = replies::embed(ctx)
        .title(format!("{}cmd", prefix))
        .description(ctx.command().description.clone().unwrap_or_default());
    for sub in &ctx.command().subcommands {
        embed = embed.field(
            format!("{}{}", prefix, sub.qualified_name),
            sub.description.clone().unwrap_or_else(|| "\u{200b}".to_string()),
            false,
        );
    }
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// [Owner Only] Lists commands table.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn ls(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_or_broadcast().await?;
    let rows = ctx.data().admin.list_commands().await?;

    if rows.is_empty() {
        ctx.say("The commands table is empty.").await?;
        return Ok(());
    }

    let pages = command_pages(&rows)
        .into_iter()
        .map(|(description, footer)| {
            replies::embed(ctx)
                .title("Commands")
                .description(description)
                .footer(serenity::CreateEmbedFooter::new(footer))
        })
        .collect();
    paginator::paginate(ctx, pages).await
}

/// `(description, footer)` per page of the command table.
fn command_pages(rows: &[CommandRow]) -> Vec<(String, String)> {
    let total = rows.chunks(ROWS_PER_PAGE).len();
    rows.chunks(ROWS_PER_PAGE)
        .enumerate()
        .map(|(index, chunk)| {
            let description = chunk
                .iter()
                .map(CommandRow::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            (description, format!("Page {}/{}", index + 1, total))
        })
        .collect()
}

/// Qualified names of every registered command, subcommands included.
fn command_names(commands: &[poise::Command<Data, Error>]) -> Vec<String> {
    let mut names = Vec::new();
    for command in commands {
        names.push(command.qualified_name.clone());
        names.extend(command_names(&command.subcommands));
    }
    names
}

/// [Owner Only] Insert commands into commands table.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn addall(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_or_broadcast().await?;
    let names = command_names(&ctx.framework().options().commands);
    let inserted = ctx.data().admin.register_commands(names).await?;
    ctx.say(format!(
        "```css\n{} commands successfully inserted.```",
        inserted
    ))
    .await?;
    Ok(())
}

/// [Owner Only] Rename a row of the commands table.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn update(
    ctx: Context<'_>,
    #[description = "Row id"] command_id: i64,
    #[description = "New name"]
    #[rest]
    name: String,
) -> Result<(), Error> {
    match ctx.data().admin.update_command(command_id, &name).await {
        Ok(()) => {
            ctx.say("Command successfully updated.").await?;
        }
        Err(e) => replies::send_prolog(ctx, e.kind(), &e.to_string()).await?,
    }
    Ok(())
}

/// [Owner Only] Delete a row of the commands table.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Owner")]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "Row id"] command_id: i64,
) -> Result<(), Error> {
    match ctx.data().admin.delete_command(command_id).await {
        Ok(()) => {
            ctx.say("Command successfully deleted.").await?;
        }
        Err(e) => replies::send_prolog(ctx, e.kind(), &e.to_string()).await?,
    }
    Ok(())
}
