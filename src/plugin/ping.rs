use crate::context::ShardManagerContainer;
use crate::invocation::{Embed, Reply, COLOR_SUCCESS};
use crate::{event::*, plugin::*};
use anyhow::Result;
use std::time::Duration;

/// Liveness check.  Never touches the LLM.
pub struct Ping;

#[serenity::async_trait]
impl Plugin for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    async fn usage(&self, ctx: &Context) -> Option<String> {
        Some(format!(
            "`/{name}` or `{}{name}` - Check if I'm responsive",
            ctx.cfg.general.command_prefix,
            name = self.name()
        ))
    }

    fn slash_command(&self) -> Option<CreateCommand> {
        Some(CreateCommand::new(self.name()).description("Check if Neural is responsive"))
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        let Some((invocation, _)) = event.is_bot_cmd(ctx, self.name()).await else {
            return Ok(EventHandled::No);
        };

        let latency = gateway_latency(ctx).await;
        invocation.reply(ctx, pong(latency)).await?;
        Ok(EventHandled::Yes)
    }
}

/// Heartbeat round trip of the shard this event arrived on.  None until the first heartbeat ack.
async fn gateway_latency(ctx: &Context<'_>) -> Option<Duration> {
    let shard_manager = ctx
        .cache_http
        .data
        .read()
        .await
        .get::<ShardManagerContainer>()?
        .clone();

    let runners = shard_manager.runners.lock().await;
    runners.get(&ctx.cache_http.shard_id)?.latency
}

pub fn pong(latency: Option<Duration>) -> Reply {
    let latency = match latency {
        Some(latency) => format!("{}ms", latency.as_millis()),
        None => "unknown".to_owned(),
    };

    Reply::embed(
        Embed::new(COLOR_SUCCESS)
            .title("🏓 Pong!")
            .description(format!("Bot latency: `{}`", latency)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pong_reports_latency_in_millis() {
        let reply = pong(Some(Duration::from_micros(42_700)));
        let embed = reply.embed.unwrap();
        assert_eq!(embed.title.as_deref(), Some("🏓 Pong!"));
        assert_eq!(embed.description.as_deref(), Some("Bot latency: `42ms`"));
        assert!(!reply.ephemeral);
    }

    #[test]
    fn pong_before_first_heartbeat() {
        let embed = pong(None).embed.unwrap();
        assert_eq!(embed.description.as_deref(), Some("Bot latency: `unknown`"));
    }
}
