use crate::helper::human_duration;
use crate::invocation::{Embed, Reply, COLOR_SUCCESS};
use crate::{event::*, plugin::*};
use anyhow::Result;
use std::time::Duration;

/// Static bot metadata and the list of commands
pub struct Info;

/// What the info embed reports
pub struct About<'a> {
    pub model_name: &'a str,
    pub guilds: usize,
    pub users: usize,
    pub conversations: usize,
    pub uptime: Duration,
    pub usages: Vec<String>,
    pub avatar_url: Option<String>,
}

#[serenity::async_trait]
impl Plugin for Info {
    fn name(&self) -> &'static str {
        "info"
    }

    async fn usage(&self, ctx: &Context) -> Option<String> {
        Some(format!(
            "`/{name}` or `{}{name}` - Show this information",
            ctx.cfg.general.command_prefix,
            name = self.name()
        ))
    }

    fn slash_command(&self) -> Option<CreateCommand> {
        Some(CreateCommand::new(self.name()).description("Get information about Neural"))
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        let Some((invocation, _)) = event.is_bot_cmd(ctx, self.name()).await else {
            return Ok(EventHandled::No);
        };

        let mut usages = Vec::new();
        for plugin in crate::plugin::plugins() {
            if let Some(usage) = plugin.usage(ctx).await {
                usages.push(usage);
            }
        }

        let (conversations, uptime) = {
            let vstate = ctx.vstate.read().await;
            (vstate.conversations.len(), vstate.started.elapsed())
        };

        let about = About {
            model_name: &ctx.cfg.llm.model_name,
            guilds: ctx.cache.guild_count(),
            users: ctx.cache.user_count(),
            conversations,
            uptime,
            usages,
            avatar_url: ctx.cache.current_user().avatar_url(),
        };

        invocation.reply(ctx, about.reply()).await?;
        Ok(EventHandled::Yes)
    }
}

impl About<'_> {
    pub fn reply(&self) -> Reply {
        Reply::embed(
            Embed::new(COLOR_SUCCESS)
                .title("About Neural")
                .description("I'm an AI-powered Discord bot ready to chat and help!")
                .field("🤖 AI Model", format!("`{}`", self.model_name), true)
                .field("📊 Servers", format!("`{}`", self.guilds), true)
                .field("👥 Users", format!("`{}`", self.users), true)
                .field("🗨️ Conversations", format!("`{}`", self.conversations), true)
                .field("⏱️ Uptime", format!("`{}`", human_duration(self.uptime)), true)
                .field("💬 Commands", self.usages.join("\n"), false)
                .thumbnail(self.avatar_url.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn about_lists_model_and_commands() {
        let about = About {
            model_name: "llama-3.1-70b-versatile",
            guilds: 3,
            users: 120,
            conversations: 2,
            uptime: Duration::from_secs(65),
            usages: vec![
                "`/chat <message>` - Have a conversation with me".to_owned(),
                "`/ping` - Check if I'm responsive".to_owned(),
            ],
            avatar_url: None,
        };

        let embed = about.reply().embed.unwrap();
        let field = |name: &str| {
            embed
                .fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.value.clone())
                .unwrap()
        };

        assert_eq!(field("🤖 AI Model"), "`llama-3.1-70b-versatile`");
        assert_eq!(field("📊 Servers"), "`3`");
        assert_eq!(field("⏱️ Uptime"), "`1m 5s`");
        assert_eq!(field("💬 Commands").lines().count(), 2);
        assert!(embed.thumbnail.is_none());
    }
}
