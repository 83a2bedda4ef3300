use crate::invocation::{Embed, Reply, COLOR_SUCCESS};
use crate::volatile_state::VolatileState;
use crate::{event::*, plugin::*};
use anyhow::Result;
use serenity::all::UserId;
use tokio::sync::RwLock;

/// Forgets the caller's conversation history
pub struct Clear;

#[serenity::async_trait]
impl Plugin for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }

    async fn usage(&self, ctx: &Context) -> Option<String> {
        Some(format!(
            "`/{name}` or `{}{name}` - Clear your chat history",
            ctx.cfg.general.command_prefix,
            name = self.name()
        ))
    }

    fn slash_command(&self) -> Option<CreateCommand> {
        Some(
            CreateCommand::new(self.name())
                .description("Clear your conversation history with Neural"),
        )
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        let Some((invocation, _)) = event.is_bot_cmd(ctx, self.name()).await else {
            return Ok(EventHandled::No);
        };

        let reply = forget(ctx.vstate, invocation.user().id).await;
        invocation.reply(ctx, reply).await?;
        Ok(EventHandled::Yes)
    }
}

pub async fn forget(vstate: &RwLock<VolatileState>, user_id: UserId) -> Reply {
    let cleared = vstate.write().await.conversations.clear(user_id);

    if cleared {
        Reply::embed(
            Embed::new(COLOR_SUCCESS)
                .title("✅ History Cleared")
                .description("Your conversation history has been cleared! 🧹"),
        )
        .ephemeral()
    } else {
        Reply::text("🤷 You don't have any conversation history to clear!").ephemeral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clear_empties_history_and_is_idempotent() {
        let user = UserId::new(7);
        let vstate = RwLock::new(VolatileState::new());
        vstate
            .write()
            .await
            .conversations
            .record_exchange(user, "hi", "hello", 20);

        let first = forget(&vstate, user).await;
        assert!(first.embed.is_some());
        assert!(first.ephemeral);
        assert!(vstate.read().await.conversations.history(user).is_empty());

        let second = forget(&vstate, user).await;
        assert!(second.embed.is_none());
        assert!(second.content.unwrap().contains("don't have any"));
        assert!(vstate.read().await.conversations.history(user).is_empty());
        assert_eq!(vstate.read().await.conversations.len(), 0);
    }
}
