use crate::{config::Config, llm::ChatBackend, volatile_state::VolatileState};
use serenity::{gateway::ShardManager, prelude::TypeMapKey};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Collection of data that is shared across events
pub struct Context<'a> {
    // Neural's own context types
    pub cfg: &'a Config,
    pub vstate: &'a RwLock<VolatileState>,
    pub llm: &'a dyn ChatBackend,
    // Discord/Serenity context types
    pub cache: &'a Arc<serenity::all::Cache>,
    pub http: &'a Arc<serenity::all::Http>,
    pub cache_http: &'a CacheHttp,
}

/// Many Serenity functions take a `impl CacheHttp` in order to first check the cache if the item
/// is available and fall back to an http request otherwise.  The most readily available type that
/// impl's this is named very differently in a way that could be confusing, and so we alias it.
pub type CacheHttp = serenity::all::Context;

/// The shard manager only exists once the client is built, after the handler has been handed
/// over.  Stash it in Serenity's type map so plugins can read heartbeat latencies.
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}
