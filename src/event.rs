//! The Serenity crate we're using for the Discord API is designed around callbacks to handle
//! events.  However, this does not mesh well with our plugin framework here.  To resolve this,
//! the handler translates the callbacks into a distinct Event enum.

use crate::{
    context::Context,
    invocation::{Invocation, Reply},
};
use serenity::all::{Interaction, Message, Ready};

/// A Discord event
pub enum Event {
    Ready(Ready),
    Message(Message),
    Interaction(Interaction),
}

pub enum EventHandled {
    Yes,
    No,
}

impl Event {
    // When an event occurs, iterate over all the plugins to see if any can/should handle it.
    pub async fn handle(self, ctx: Context<'_>) {
        for plugin in crate::plugin::plugins() {
            match plugin.handle(&ctx, &self).await {
                Ok(EventHandled::Yes) => return,
                Ok(EventHandled::No) => continue,
                Err(err) => {
                    tracing::error!("Error in plugin {}: {:#}", plugin.name(), err);
                    self.report_failure(&ctx).await;
                    return;
                }
            }
        }
    }

    // Check if the event is a request for the bot command `cmd`, either as a slash command or as a
    // message prefixed with the configured command prefix, e.g. `!chat hello`.
    //
    // Returns the invocation along with the command's text argument, or "" if it has none.
    pub async fn is_bot_cmd<'a>(
        &'a self,
        ctx: &Context<'_>,
        cmd: &str,
    ) -> Option<(Invocation<'a>, &'a str)> {
        match self {
            Event::Interaction(Interaction::Command(command)) if command.data.name == cmd => {
                let arg = command
                    .data
                    .options
                    .iter()
                    .find_map(|option| option.value.as_str())
                    .unwrap_or("");
                Some((Invocation::slash(command), arg))
            }
            Event::Message(msg) => {
                let prefix = ctx.cfg.general.command_prefix.as_str();
                match parse_text_command(prefix, &msg.content) {
                    Some((name, arg)) if name == cmd => Some((Invocation::Text(msg), arg)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    // A plugin failed part way through a command.  Let the user know something went wrong rather
    // than leaving the command hanging.
    async fn report_failure(&self, ctx: &Context<'_>) {
        let invocation = match self {
            Event::Interaction(Interaction::Command(command)) => Invocation::slash(command),
            Event::Message(msg)
                if parse_text_command(&ctx.cfg.general.command_prefix, &msg.content).is_some() =>
            {
                Invocation::Text(msg)
            }
            _ => return,
        };

        if let Err(err) = invocation.reply_or_edit(ctx, Reply::failure()).await {
            tracing::error!("Could not report command failure: {:#}", err);
        }
    }
}

/// Split `content` into a command name and its argument if it starts with `prefix`.
pub fn parse_text_command<'a>(prefix: &str, content: &'a str) -> Option<(&'a str, &'a str)> {
    let body = content.trim_start().strip_prefix(prefix)?;
    let (name, arg) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
    if name.is_empty() {
        return None;
    }
    Some((name, arg.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_commands_split_name_and_argument() {
        assert_eq!(
            parse_text_command("!", "!chat how are you?"),
            Some(("chat", "how are you?"))
        );
        assert_eq!(parse_text_command("!", "!ping"), Some(("ping", "")));
        assert_eq!(
            parse_text_command("nn ", "nn chat   spaced  "),
            Some(("chat", "spaced"))
        );
    }

    #[test]
    fn non_commands_are_ignored() {
        assert_eq!(parse_text_command("!", "chat hello"), None);
        assert_eq!(parse_text_command("!", "!"), None);
        assert_eq!(parse_text_command("!", "! chat"), None);
        assert_eq!(parse_text_command(";", "!chat hello"), None);
    }
}
