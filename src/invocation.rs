//! A command invocation and the reply it receives.
//!
//! Commands can arrive as slash commands or as prefixed text messages.  Plugins describe their
//! answer as a `Reply` and let the invocation deliver it the way the platform expects.

use crate::context::Context;
use anyhow::Result;
use serenity::all::{
    CommandInteraction, CreateEmbed, CreateEmbedFooter, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, EditInteractionResponse, Message, Typing,
    User,
};
use std::sync::atomic::{AtomicBool, Ordering};

pub const COLOR_SUCCESS: u32 = 0x00ff88;

pub enum Invocation<'a> {
    Slash {
        command: &'a CommandInteraction,
        deferred: AtomicBool,
    },
    Text(&'a Message),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reply {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    /// Only visible to the invoking user.  Text commands have no such concept, and a deferred slash
    /// command has already fixed its visibility.
    pub ephemeral: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl<'a> Invocation<'a> {
    pub fn slash(command: &'a CommandInteraction) -> Self {
        Invocation::Slash {
            command,
            deferred: AtomicBool::new(false),
        }
    }

    pub fn user(&self) -> &User {
        match self {
            Invocation::Slash { command, .. } => &command.user,
            Invocation::Text(msg) => &msg.author,
        }
    }

    /// Tell Discord we're working on it.  Slash commands must be acknowledged within three
    /// seconds; text commands get a typing indicator, which the caller should stop once done.
    ///
    /// The deferred response is public, and the eventual reply replaces it in place.
    pub async fn defer(&self, ctx: &Context<'_>) -> Result<Option<Typing>> {
        match self {
            Invocation::Slash { command, deferred } => {
                command.defer(ctx.cache_http).await?;
                deferred.store(true, Ordering::Release);
                Ok(None)
            }
            Invocation::Text(msg) => Ok(Some(msg.channel_id.start_typing(ctx.http))),
        }
    }

    pub async fn reply(&self, ctx: &Context<'_>, reply: Reply) -> Result<()> {
        match self {
            Invocation::Slash { command, deferred } if deferred.load(Ordering::Acquire) => {
                command
                    .edit_response(ctx.cache_http, reply.to_edit())
                    .await?;
            }
            Invocation::Slash { command, .. } => {
                command
                    .create_response(
                        ctx.cache_http,
                        CreateInteractionResponse::Message(reply.to_response_message()),
                    )
                    .await?;
            }
            Invocation::Text(msg) => {
                msg.channel_id
                    .send_message(ctx.cache_http, reply.to_message().reference_message(*msg))
                    .await?;
            }
        }
        Ok(())
    }

    /// Like `reply`, but for when we don't know whether the interaction was already acknowledged.
    /// If it was, the acknowledgement is replaced and keeps its visibility.
    pub async fn reply_or_edit(&self, ctx: &Context<'_>, reply: Reply) -> Result<()> {
        match self {
            Invocation::Slash { command, .. } => {
                let response = CreateInteractionResponse::Message(reply.to_response_message());
                if command.create_response(ctx.cache_http, response).await.is_err() {
                    command
                        .edit_response(ctx.cache_http, reply.to_edit())
                        .await?;
                }
                Ok(())
            }
            Invocation::Text(_) => self.reply(ctx, reply).await,
        }
    }
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Generic answer for a command that fell over
    pub fn failure() -> Self {
        Self::text("❌ An error occurred while processing your command.").ephemeral()
    }

    fn to_response_message(&self) -> CreateInteractionResponseMessage {
        let mut builder = CreateInteractionResponseMessage::new().ephemeral(self.ephemeral);
        if let Some(content) = &self.content {
            builder = builder.content(content);
        }
        if let Some(embed) = &self.embed {
            builder = builder.embed(embed.to_create_embed());
        }
        builder
    }

    fn to_edit(&self) -> EditInteractionResponse {
        let mut builder = EditInteractionResponse::new();
        if let Some(content) = &self.content {
            builder = builder.content(content);
        }
        if let Some(embed) = &self.embed {
            builder = builder.embed(embed.to_create_embed());
        }
        builder
    }

    fn to_message(&self) -> CreateMessage {
        let mut builder = CreateMessage::new();
        if let Some(content) = &self.content {
            builder = builder.content(content);
        }
        if let Some(embed) = &self.embed {
            builder = builder.embed(embed.to_create_embed());
        }
        builder
    }
}

impl Embed {
    pub fn new(color: u32) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn thumbnail(mut self, url: Option<String>) -> Self {
        self.thumbnail = url;
        self
    }

    fn to_create_embed(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new().color(self.color);
        if let Some(title) = &self.title {
            embed = embed.title(title);
        }
        if let Some(description) = &self.description {
            embed = embed.description(description);
        }
        for field in &self.fields {
            embed = embed.field(&field.name, &field.value, field.inline);
        }
        if let Some(footer) = &self.footer {
            embed = embed.footer(CreateEmbedFooter::new(footer));
        }
        if let Some(thumbnail) = &self.thumbnail {
            embed = embed.thumbnail(thumbnail);
        }
        embed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_is_private() {
        let reply = Reply::failure();
        assert!(reply.ephemeral);
        assert!(reply.embed.is_none());
        assert!(reply.content.unwrap().contains("error occurred"));
    }

    #[test]
    fn deferred_replies_edit_the_original_response() {
        let reply = Reply::embed(Embed::new(COLOR_SUCCESS).description("done"));
        let json = serde_json::to_value(reply.to_edit()).unwrap();

        assert_eq!(json["embeds"][0]["description"], "done");
        // Visibility was settled by the deferral; an edit can't change it.
        assert!(json.get("flags").is_none());
    }

    #[test]
    fn embed_builder_collects_fields_in_order() {
        let embed = Embed::new(COLOR_SUCCESS)
            .title("About")
            .field("a", "1", true)
            .field("b", "2", false);

        assert_eq!(embed.title.as_deref(), Some("About"));
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[1].name, "b");
        assert!(!embed.fields[1].inline);
    }

    #[test]
    fn embed_converts_to_serenity_builder() {
        let embed = Embed::new(0x40E0D0)
            .description("hello")
            .footer("✦ Neural Response");
        let json = serde_json::to_value(embed.to_create_embed()).unwrap();

        assert_eq!(json["description"], "hello");
        assert_eq!(json["footer"]["text"], "✦ Neural Response");
    }
}
