// Button paginator for multi-embed replies (`news`, `cmd ls`).

use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::warn;

use crate::discord::{Context, Error};

const PAGE_TIMEOUT: Duration = Duration::from_secs(60 * 2);

fn buttons(current: usize, total: usize) -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new("prev")
            .label("◀ Previous")
            .style(serenity::ButtonStyle::Primary)
            .disabled(current == 0),
        serenity::CreateButton::new("next")
            .label("Next ▶")
            .style(serenity::ButtonStyle::Primary)
            .disabled(current + 1 >= total),
    ])]
}

/// Sends `pages` one at a time. Only the invoker can flip pages; the buttons
/// are removed once nobody has pressed one for two minutes.
pub async fn paginate(ctx: Context<'_>, pages: Vec<serenity::CreateEmbed>) -> Result<(), Error> {
    let Some(first) = pages.first().cloned() else {
        return Ok(());
    };

    if pages.len() == 1 {
        ctx.send(poise::CreateReply::default().embed(first)).await?;
        return Ok(());
    }

    let total = pages.len();
    let mut current = 0;

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(first)
                .components(buttons(current, total)),
        )
        .await?;
    let msg_id = reply.message().await?.id;

    while let Some(mci) = serenity::ComponentInteractionCollector::new(ctx)
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(PAGE_TIMEOUT)
        .filter(move |mci| mci.message.id == msg_id)
        .await
    {
        match mci.data.custom_id.as_str() {
            "prev" => current = current.saturating_sub(1),
            "next" if current + 1 < total => current += 1,
            _ => {}
        }

        if let Err(e) = mci
            .create_response(
                ctx,
                serenity::CreateInteractionResponse::UpdateMessage(
                    serenity::CreateInteractionResponseMessage::new()
                        .embed(pages[current].clone())
                        .components(buttons(current, total)),
                ),
            )
            .await
        {
            warn!("Failed to flip page: {}", e);
        }
    }

    reply
        .edit(
            ctx,
            poise::CreateReply::default()
                .embed(pages[current].clone())
                .components(vec![]),
        )
        .await?;

    Ok(())
}
