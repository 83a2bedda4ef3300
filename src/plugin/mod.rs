use crate::context::Context;
use crate::event::{Event, EventHandled};
use anyhow::Result;
use serenity::all::CreateCommand;

mod chat;
mod clear;
mod debug;
mod ignore_bots;
mod info;
mod ping;
mod ready;

#[serenity::async_trait]
pub trait Plugin: Sync + Send {
    /// Plugin name.  Doubles as the command name for command plugins.
    fn name(&self) -> &'static str;
    /// Help message line.  None if no help message
    async fn usage(&self, ctx: &Context) -> Option<String>;
    /// Slash command to register with Discord.  None if the plugin isn't a command.
    fn slash_command(&self) -> Option<CreateCommand> {
        None
    }
    /// Potentially handle event.  Returns:
    /// - Ok(EventHandled::Yes) if the event has been handled and no other plugin should attempt to
    /// handle it
    /// - Ok(EventHandled::No) if another plugin should attempt to handle the event
    /// - Err if an error occurred
    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled>;
}

/// Ordered list of available plugins
pub fn plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        // Core bot operations
        Box::new(debug::Debug),
        Box::new(ready::Ready),
        Box::new(ignore_bots::IgnoreBots),
        // Commands
        Box::new(chat::Chat),
        Box::new(clear::Clear),
        Box::new(info::Info),
        Box::new(ping::Ping),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_plugins_register_slash_commands() {
        let mut names: Vec<String> = plugins()
            .iter()
            .filter_map(|plugin| plugin.slash_command())
            .map(|command| {
                serde_json::to_value(command).unwrap()["name"]
                    .as_str()
                    .unwrap()
                    .to_owned()
            })
            .collect();
        names.sort();

        assert_eq!(names, ["chat", "clear", "info", "ping"]);
    }
}
