use crate::{event::*, log_event, logging::log_location, plugin::*};
use anyhow::Result;
use serenity::all::Interaction;

/// Logs every event
pub struct Debug;

#[serenity::async_trait]
impl Plugin for Debug {
    fn name(&self) -> &'static str {
        "debug"
    }

    async fn usage(&self, _ctx: &Context) -> Option<String> {
        None
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        match event {
            Event::Ready(ready) => {
                log_event!(
                    "Connected to {} server(s) as {}",
                    ready.guilds.len(),
                    ready.user.name,
                );
            }
            Event::Message(msg) => {
                log_event!(
                    "{}:{} {}",
                    log_location(ctx.cache, msg.guild_id, msg.channel_id),
                    msg.author.name,
                    msg.content,
                );
            }
            Event::Interaction(Interaction::Command(command)) => {
                log_event!(
                    "{}:{} used /{}",
                    log_location(ctx.cache, command.guild_id, command.channel_id),
                    command.user.name,
                    command.data.name,
                );
            }
            Event::Interaction(_) => {
                // Components, autocomplete and modals aren't used
            }
        }

        Ok(EventHandled::No)
    }
}
