use crate::{
    config::Config, context::Context, event::Event, llm::ChatBackend,
    volatile_state::VolatileState,
};
use serenity::all::{Interaction, Message, Ready};
use tokio::sync::RwLock;

/// Discord event handler
pub struct Handler {
    cfg: Config,
    vstate: RwLock<VolatileState>,
    llm: Box<dyn ChatBackend>,
}

impl<'a> Handler {
    pub fn new(cfg: Config, vstate: VolatileState, llm: Box<dyn ChatBackend>) -> Self {
        Self {
            cfg,
            vstate: RwLock::new(vstate),
            llm,
        }
    }

    fn ctx(&'a self, discord_ctx: &'a serenity::all::Context) -> Context<'a> {
        Context {
            cfg: &self.cfg,
            vstate: &self.vstate,
            llm: self.llm.as_ref(),
            cache: &discord_ctx.cache,
            http: &discord_ctx.http,
            cache_http: discord_ctx,
        }
    }
}

#[serenity::async_trait]
impl serenity::all::EventHandler for Handler {
    async fn ready(&self, discord_ctx: serenity::all::Context, ready: Ready) {
        Event::Ready(ready).handle(self.ctx(&discord_ctx)).await;
    }

    async fn message(&self, discord_ctx: serenity::all::Context, msg: Message) {
        Event::Message(msg).handle(self.ctx(&discord_ctx)).await;
    }

    async fn interaction_create(&self, discord_ctx: serenity::all::Context, interaction: Interaction) {
        Event::Interaction(interaction)
            .handle(self.ctx(&discord_ctx))
            .await;
    }
}
