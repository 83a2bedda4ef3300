use crate::config::Config;
use crate::helper::{truncate_chars, EMBED_DESCRIPTION_LIMIT};
use crate::invocation::{Embed, Reply};
use crate::llm::{ChatBackend, LlmChatRequest};
use crate::volatile_state::VolatileState;
use crate::{event::*, plugin::*};
use anyhow::Result;
use rand::seq::IndexedRandom;
use serenity::all::{CommandOptionType, CreateCommandOption, UserId};
use std::future::Future;
use tokio::sync::RwLock;

/// Longest message accepted for a single chat turn
pub const MAX_PROMPT_CHARS: usize = 2000;

/// Reply embed colours: light blue, plum, medium purple, turquoise
const PALETTE: [u32; 4] = [0x87CEEB, 0xDDA0DD, 0x9370DB, 0x40E0D0];

const THINKING_FAILED: &str =
    "🤔 Sorry, I'm having trouble thinking right now. Please try again in a moment!";

/// Forwards a message, along with the caller's recent history, to the LLM.
pub struct Chat;

/// A message that is fit to send to the LLM
#[derive(Debug, PartialEq)]
pub struct Prompt<'a>(&'a str);

#[derive(Debug, PartialEq)]
pub enum Rejection {
    Empty,
    TooLong(usize),
}

#[serenity::async_trait]
impl Plugin for Chat {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn usage(&self, ctx: &Context) -> Option<String> {
        Some(format!(
            "`/{name} <message>` or `{}{name} <message>` - Have a conversation with me",
            ctx.cfg.general.command_prefix,
            name = self.name()
        ))
    }

    fn slash_command(&self) -> Option<CreateCommand> {
        let message = CreateCommandOption::new(
            CommandOptionType::String,
            "message",
            "What would you like to talk about?",
        )
        .required(true)
        .max_length(MAX_PROMPT_CHARS as u16);

        Some(
            CreateCommand::new(self.name())
                .description("Ask Neural anything!")
                .add_option(message),
        )
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        let Some((invocation, arg)) = event.is_bot_cmd(ctx, self.name()).await else {
            return Ok(EventHandled::No);
        };

        // The request may take some time.  Acknowledge it so Discord doesn't give up on us and so
        // users can see we're on it.
        let user_id = invocation.user().id;
        let (reply, typing) = respond(ctx.vstate, ctx.llm, ctx.cfg, user_id, arg, || {
            invocation.defer(ctx)
        })
        .await?;

        invocation.reply(ctx, reply).await?;
        if let Some(typing) = typing.flatten() {
            typing.stop();
        }
        Ok(EventHandled::Yes)
    }
}

impl<'a> Prompt<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, Rejection> {
        let text = raw.trim();
        if text.chars().all(|c| c.is_whitespace() || c.is_control()) {
            return Err(Rejection::Empty);
        }

        let len = text.chars().count();
        if len > MAX_PROMPT_CHARS {
            return Err(Rejection::TooLong(len));
        }

        Ok(Self(text))
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

impl Rejection {
    pub fn reply(&self) -> Reply {
        let text = match self {
            Rejection::Empty => "❌ Please include a message, e.g. `/chat Hello!`".to_owned(),
            Rejection::TooLong(len) => format!(
                "❌ Your message is {} characters long.  Please keep it under {}.",
                len, MAX_PROMPT_CHARS
            ),
        };
        Reply::text(text).ephemeral()
    }
}

/// Answer a chat command.  A message that isn't fit to send is rejected before `acknowledge` runs
/// and before the LLM is contacted; otherwise `acknowledge`'s result is handed back with the reply.
pub async fn respond<F, Fut, T>(
    vstate: &RwLock<VolatileState>,
    llm: &dyn ChatBackend,
    cfg: &Config,
    user_id: UserId,
    raw: &str,
    acknowledge: F,
) -> Result<(Reply, Option<T>)>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let prompt = match Prompt::parse(raw) {
        Ok(prompt) => prompt,
        Err(rejection) => return Ok((rejection.reply(), None)),
    };

    let acknowledged = acknowledge().await?;
    let reply = converse(vstate, llm, cfg, user_id, prompt).await;
    Ok((reply, Some(acknowledged)))
}

/// Ask the LLM to continue the user's conversation.
///
/// History is only updated once a response arrives, so a failed request leaves it untouched.
/// The lock is not held across the request.
pub async fn converse(
    vstate: &RwLock<VolatileState>,
    llm: &dyn ChatBackend,
    cfg: &Config,
    user_id: UserId,
    prompt: Prompt<'_>,
) -> Reply {
    let request = {
        let vstate = vstate.read().await;
        let history = vstate.conversations.history(user_id);
        LlmChatRequest::new(&cfg.llm.as_llm_settings(), history, prompt.as_str())
    };

    let response = match llm.complete(&request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("Chat completion for user {} failed: {:#}", user_id, err);
            return Reply::text(THINKING_FAILED);
        }
    };

    vstate.write().await.conversations.record_exchange(
        user_id,
        prompt.as_str(),
        response.as_str(),
        cfg.history.max_turns,
    );

    let color = *PALETTE.choose(&mut rand::rng()).unwrap_or(&PALETTE[0]);
    Reply::embed(
        Embed::new(color)
            .description(truncate_chars(&response, EMBED_DESCRIPTION_LIMIT))
            .footer("✦ Neural Response"),
    )
}
