use crate::{event::*, log_internal, plugin::*};
use anyhow::Result;
use serenity::all::{ActivityData, Command};

/// Registers slash commands and sets the bot's status once the connection to Discord is ready.
pub struct Ready;

#[serenity::async_trait]
impl Plugin for Ready {
    fn name(&self) -> &'static str {
        "ready"
    }

    async fn usage(&self, _ctx: &Context) -> Option<String> {
        None
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        let Event::Ready(_) = event else {
            return Ok(EventHandled::No);
        };

        let commands: Vec<CreateCommand> = crate::plugin::plugins()
            .iter()
            .filter_map(|plugin| plugin.slash_command())
            .collect();

        // Replaces whatever was registered before, so renamed or removed commands disappear.
        let synced = Command::set_global_commands(ctx.http, commands).await?;
        log_internal!("Synced {} command(s)", synced.len());

        ctx.cache_http
            .set_activity(Some(ActivityData::listening("/chat")));

        Ok(EventHandled::Yes)
    }
}
