//! Server configuration, read once at startup from the environment. Every
//! variable is optional; a missing or unparsable value falls back to its
//! documented default rather than failing startup.

use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub target_score: u32,
    pub ai_think_ms: u64,
    pub ai_hard_timeout_ms: u64,
    pub host_grace_ms: u64,
    pub room_empty_ttl_ms: u64,
    pub rng_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: ":5001".to_string(),
            target_score: 200,
            ai_think_ms: 500,
            ai_hard_timeout_ms: 3000,
            host_grace_ms: 30_000,
            room_empty_ttl_ms: 120_000,
            rng_seed: None,
        }
    }
}

impl ServerConfig {
    /// Loads overrides from the environment, logging which ones were
    /// applied so a deploy's effective config is visible in the logs.
    pub fn from_env() -> Self {
        let defaults = ServerConfig::default();
        let config = ServerConfig {
            listen_addr: env_string("LISTEN_ADDR", defaults.listen_addr),
            target_score: env_parsed("TARGET_SCORE", defaults.target_score),
            ai_think_ms: env_parsed("AI_THINK_MS", defaults.ai_think_ms),
            ai_hard_timeout_ms: env_parsed("AI_HARD_TIMEOUT_MS", defaults.ai_hard_timeout_ms),
            host_grace_ms: env_parsed("HOST_GRACE_MS", defaults.host_grace_ms),
            room_empty_ttl_ms: env_parsed("ROOM_EMPTY_TTL_MS", defaults.room_empty_ttl_ms),
            rng_seed: env::var("RNG_SEED").ok().and_then(|v| v.parse().ok()),
        };
        tracing::info!(?config, "Loaded server configuration.");
        config
    }

    /// Binds a host-port pair usable by `TcpListener::bind`, translating
    /// the `:PORT` shorthand accepted by `LISTEN_ADDR` into `0.0.0.0:PORT`.
    pub fn bind_addr(&self) -> String {
        if let Some(port) = self.listen_addr.strip_prefix(':') {
            format!("0.0.0.0:{port}")
        } else {
            self.listen_addr.clone()
        }
    }
}

fn env_string(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
