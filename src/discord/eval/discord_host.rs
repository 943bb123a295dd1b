// Bridges evaluated scripts to Discord.
//
// Handles are snapshots taken before the session starts; every method call on
// them lands in `DiscordHost::call`, which is the only place a script can
// reach the gateway, the HTTP API or the database.

use std::num::NonZeroU64;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use tracing::debug;

use crate::core::admin::{AdminError, QueryResult, QueryValue};
use crate::core::eval::host::{expect_args, int_arg, no_such_method, str_arg};
use crate::core::eval::{Environment, Handle, HandleKind, ScriptError, ScriptHost, Value};
use crate::discord::commands::dispatch;
use crate::discord::Context;

pub struct DiscordHost<'a> {
    ctx: Context<'a>,
    message: &'a serenity::Message,
    prefix: String,
}

impl<'a> DiscordHost<'a> {
    pub fn new(ctx: Context<'a>, message: &'a serenity::Message, prefix: String) -> Self {
        Self {
            ctx,
            message,
            prefix,
        }
    }

    /// `bot`, `ctx`, `channel`, `author`, `guild` and `message` for this invocation.
    pub async fn environment(&self) -> Environment {
        let ctx = self.ctx;
        let msg = self.message;
        let channel_name = ctx
            .guild_channel()
            .await
            .map(|channel| channel.name)
            .unwrap_or_else(|| "Direct Message".to_string());

        // Cache guards are not Send; nothing below awaits.
        let (bot, guild) = {
            let cache = ctx.cache();
            let me = cache.current_user();
            let bot = Handle::new(HandleKind::Bot, me.id.get(), me.name.clone())
                .with_attr("name", me.name.clone())
                .with_attr("guild_count", cache.guilds().len())
                .with_attr("commands_used", ctx.data().stats.commands_used())
                .with_attr("prefix", ctx.data().config.default_prefix.clone());
            let guild = ctx.guild().map(|guild| guild_handle(&guild));
            (bot, guild)
        };

        let context = Handle::new(
            HandleKind::Context,
            msg.id.get(),
            ctx.command().qualified_name.clone(),
        )
        .with_attr("prefix", self.prefix.clone())
        .with_attr("invoked_with", ctx.invoked_command_name().to_string())
        .with_attr("command", ctx.command().qualified_name.clone());

        let channel = Handle::new(HandleKind::Channel, msg.channel_id.get(), channel_name.clone())
            .with_attr("name", channel_name)
            .with_attr("mention", format!("<#{}>", msg.channel_id.get()));

        let author = user_handle(&msg.author);

        Environment::for_invocation(bot, context, channel, author, guild, message_handle(msg))
    }

    /// Failures of the invoked command are replied by `on_error`, not raised
    /// into the script.
    async fn invoke(&self, text: &str) -> Result<Value, ScriptError> {
        let content = dispatch::command_line(&self.prefix, text);
        let msg = dispatch::impersonate(self.message, self.message.author.clone(), content);
        dispatch::dispatch(self.ctx, &msg).await;
        Ok(Value::None)
    }

    async fn send(&self, channel_id: u64, text: &str) -> Result<Value, ScriptError> {
        let channel = serenity::ChannelId::from(snowflake(channel_id)?);
        let sent = channel
            .say(self.ctx.http(), text)
            .await
            .map_err(http_error)?;
        Ok(message_handle(&sent).into_value())
    }

    async fn direct_message(&self, user_id: u64, text: &str) -> Result<Value, ScriptError> {
        let user = serenity::UserId::from(snowflake(user_id)?);
        let sent = user
            .direct_message(self.ctx.http(), serenity::CreateMessage::new().content(text))
            .await
            .map_err(http_error)?;
        Ok(message_handle(&sent).into_value())
    }

    async fn reply(&self, target: &Handle, text: &str) -> Result<Value, ScriptError> {
        let channel = serenity::ChannelId::from(snowflake(attr_id(target, "channel_id")?)?);
        let message = serenity::MessageId::from(snowflake(target.id)?);
        let sent = channel
            .send_message(
                self.ctx.http(),
                serenity::CreateMessage::new()
                    .content(text)
                    .reference_message((channel, message)),
            )
            .await
            .map_err(http_error)?;
        Ok(message_handle(&sent).into_value())
    }

    async fn react(&self, target: &Handle, emoji: &str) -> Result<Value, ScriptError> {
        let channel = serenity::ChannelId::from(snowflake(attr_id(target, "channel_id")?)?);
        let message = serenity::MessageId::from(snowflake(target.id)?);
        channel
            .create_reaction(
                self.ctx.http(),
                message,
                serenity::ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(http_error)?;
        Ok(Value::None)
    }

    fn guild(&self, id: i64) -> Result<Value, ScriptError> {
        let id = u64::try_from(id)
            .ok()
            .and_then(NonZeroU64::new)
            .ok_or_else(|| ScriptError::value_error(format!("invalid guild id {}", id)))?;
        let guild = self
            .ctx
            .cache()
            .guild(serenity::GuildId::from(id))
            .map(|guild| guild_handle(&guild).into_value());
        Ok(guild.unwrap_or_default())
    }

    async fn query(&self, sql: &str) -> Result<QueryResult, ScriptError> {
        self.ctx.data().admin.query(sql).await.map_err(database_error)
    }
}

#[async_trait]
impl<'a> ScriptHost for DiscordHost<'a> {
    async fn call(
        &self,
        receiver: &Handle,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, ScriptError> {
        debug!(receiver = receiver.kind.name(), method, "Script host call");

        match (receiver.kind, method) {
            (HandleKind::Bot | HandleKind::Context, "invoke") => {
                expect_args(method, &args, 1)?;
                self.invoke(str_arg(method, &args[0])?).await
            }
            (HandleKind::Bot, "fetch") => {
                expect_args(method, &args, 1)?;
                let result = self.query(str_arg(method, &args[0])?).await?;
                Ok(Value::List(result.rows.into_iter().map(row_value).collect()))
            }
            (HandleKind::Bot, "fetchrow") => {
                expect_args(method, &args, 1)?;
                let result = self.query(str_arg(method, &args[0])?).await?;
                Ok(result.rows.into_iter().next().map(row_value).unwrap_or_default())
            }
            (HandleKind::Bot, "fetchval") => {
                expect_args(method, &args, 1)?;
                let result = self.query(str_arg(method, &args[0])?).await?;
                Ok(result
                    .rows
                    .into_iter()
                    .next()
                    .and_then(|row| row.into_iter().next())
                    .map(cell_value)
                    .unwrap_or_default())
            }
            (HandleKind::Bot, "execute") => {
                expect_args(method, &args, 1)?;
                let sql = str_arg(method, &args[0])?;
                let affected = self
                    .ctx
                    .data()
                    .admin
                    .execute(sql)
                    .await
                    .map_err(database_error)?;
                Ok(Value::from(affected))
            }
            (HandleKind::Bot, "guild") => {
                expect_args(method, &args, 1)?;
                self.guild(int_arg(method, &args[0])?)
            }
            (HandleKind::Channel, "send") => {
                expect_args(method, &args, 1)?;
                self.send(receiver.id, &args[0].to_string()).await
            }
            (HandleKind::Context, "send") => {
                expect_args(method, &args, 1)?;
                self.send(self.message.channel_id.get(), &args[0].to_string())
                    .await
            }
            (HandleKind::User, "send") => {
                expect_args(method, &args, 1)?;
                self.direct_message(receiver.id, &args[0].to_string()).await
            }
            (HandleKind::Message, "reply") => {
                expect_args(method, &args, 1)?;
                self.reply(receiver, &args[0].to_string()).await
            }
            (HandleKind::Message, "react") => {
                expect_args(method, &args, 1)?;
                self.react(receiver, str_arg(method, &args[0])?).await
            }
            _ => Err(no_such_method(receiver, method)),
        }
    }
}

fn snowflake(id: u64) -> Result<NonZeroU64, ScriptError> {
    NonZeroU64::new(id).ok_or_else(|| ScriptError::value_error("id must be non-zero"))
}

fn attr_id(handle: &Handle, name: &str) -> Result<u64, ScriptError> {
    match handle.attrs.get(name) {
        Some(Value::Int(id)) => u64::try_from(*id)
            .map_err(|_| ScriptError::value_error(format!("invalid {} {}", name, id))),
        _ => Err(no_such_method(handle, name)),
    }
}

fn http_error(err: serenity::Error) -> ScriptError {
    ScriptError::new("HTTPException", err.to_string())
}

fn database_error(err: AdminError) -> ScriptError {
    ScriptError::new(err.kind(), err.to_string())
}

fn cell_value(cell: QueryValue) -> Value {
    match cell {
        QueryValue::Null => Value::None,
        QueryValue::Integer(i) => Value::Int(i),
        QueryValue::Real(r) => Value::Float(r),
        QueryValue::Text(s) => Value::Str(s),
        blob @ QueryValue::Blob(_) => Value::Str(blob.to_string()),
    }
}

fn row_value(row: Vec<QueryValue>) -> Value {
    Value::List(row.into_iter().map(cell_value).collect())
}

fn user_handle(user: &serenity::User) -> Handle {
    Handle::new(HandleKind::User, user.id.get(), user.name.clone())
        .with_attr("name", user.name.clone())
        .with_attr("bot", user.bot)
        .with_attr("mention", format!("<@{}>", user.id.get()))
}

fn guild_handle(guild: &serenity::Guild) -> Handle {
    Handle::new(HandleKind::Guild, guild.id.get(), guild.name.clone())
        .with_attr("name", guild.name.clone())
        .with_attr("member_count", guild.member_count)
        .with_attr("owner_id", guild.owner_id.get())
}

fn message_handle(msg: &serenity::Message) -> Handle {
    Handle::new(HandleKind::Message, msg.id.get(), msg.content.clone())
        .with_attr("content", msg.content.clone())
        .with_attr("channel_id", msg.channel_id.get())
        .with_attr("author", user_handle(&msg.author).into_value())
}
