mod config;
mod context;
mod event;
mod handler;
mod helper;
mod invocation;
mod llm;
mod logging;
mod plugin;
mod volatile_state;

use crate::context::ShardManagerContainer;
use serenity::{all::GatewayIntents, Client};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing `.env` is fine; the real environment may already carry everything.
    dotenvy::dotenv().ok();

    let cfg = crate::config::Config::load().await?;
    let _log_guard = crate::logging::init(&cfg.logging.log_path, &cfg.logging.filter)?;
    log_internal!("Starting Neural using AI model {}", cfg.llm.model_name);

    let token = cfg.general.discord_token.clone();
    let llm = crate::llm::GroqClient::new(&cfg.llm)?;
    let vstate = crate::volatile_state::VolatileState::new();
    let handler = handler::Handler::new(cfg, vstate, Box::new(llm));

    // Things we want discord to tell us about.  Message content is needed for text commands.
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;

    client
        .data
        .write()
        .await
        .insert::<ShardManagerContainer>(client.shard_manager.clone());

    client.start().await.map_err(|e| {
        tracing::error!("Failed to start bot: {}", e);
        e.into()
    })
}
