//! Logging to the terminal and to an append-only log file

use anyhow::{anyhow, Result};
use serenity::all::{Cache, ChannelId, GuildId};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.  Keep the returned guard alive for as long as log lines should
/// reach the file.
pub fn init(log_path: &Path, filter: &str) -> Result<WorkerGuard> {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| {
            anyhow!(
                "Could not open log file `{}`: {}",
                log_path.to_string_lossy(),
                e
            )
        })?;
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let env_filter = || {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(filter))
    };
    let stdout_filter = env_filter().map_err(|e| anyhow!("Invalid log filter `{}`: {}", filter, e))?;
    let file_filter = env_filter().map_err(|e| anyhow!("Invalid log filter `{}`: {}", filter, e))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(stdout_filter),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .try_init()
        .map_err(|e| anyhow!("Could not install logger: {}", e))?;

    Ok(guard)
}

/// Something that happened on Discord
#[macro_export]
macro_rules! log_event {
    ($($args:tt)+) => {
        ::tracing::info!(target: "event", $($args)+)
    };
}

/// Something the bot did on its own behalf
#[macro_export]
macro_rules! log_internal {
    ($($args:tt)+) => {
        ::tracing::info!(target: "internal", $($args)+)
    };
}

/// `guild:#channel` for log lines.  Names come from the cache only; anything not cached is
/// logged by id.
pub fn log_location(cache: &Cache, guild_id: Option<GuildId>, channel_id: ChannelId) -> String {
    let Some(guild_id) = guild_id else {
        return format!("<direct-message>:{channel_id}");
    };

    match cache.guild(guild_id) {
        Some(guild) => match guild.channels.get(&channel_id) {
            Some(channel) => format!("{}:#{}", guild.name, channel.name),
            None => format!("{}:{}", guild.name, channel_id),
        },
        None => format!("{guild_id}:{channel_id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncached_locations_fall_back_to_ids() {
        let cache = Cache::new();
        assert_eq!(
            log_location(&cache, Some(GuildId::new(7)), ChannelId::new(9)),
            "7:9"
        );
        assert_eq!(
            log_location(&cache, None, ChannelId::new(9)),
            "<direct-message>:9"
        );
    }
}
