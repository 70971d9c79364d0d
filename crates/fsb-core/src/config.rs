use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use crate::{domain::Destination, errors::Error, Result};

/// Default lifetime of a delivered file before it is deleted again.
pub const DEFAULT_DELETE_AFTER: Duration = Duration::from_secs(20 * 60);

/// Typed, immutable configuration for the bot.
///
/// Built once at startup and shared by `Arc` with every component.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub bot_username: Option<String>,

    // Channels
    pub public_channel: Option<Destination>,
    /// Where the files were originally uploaded. Informational only.
    pub private_channel_id: Option<String>,

    // Content
    pub catalog_path: PathBuf,

    // Behavior
    pub delete_after: Duration,
    pub auto_setup_buttons: bool,
    pub button_setup_delay: Duration,

    // Outbound spacing
    pub throttle_global: Duration,
    pub throttle_per_chat: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_env_file();
        Self::from_lookup(env_str)
    }

    /// Build from any key/value source; `load` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("BOT_TOKEN").and_then(non_empty).ok_or_else(|| {
            Error::Config("BOT_TOKEN environment variable is required".to_string())
        })?;

        let bot_username = lookup("BOT_USERNAME").and_then(|s| normalize_username(&s));
        let public_channel = lookup("PUBLIC_CHANNEL_ID").and_then(|s| Destination::parse(&s));
        let private_channel_id = lookup("PRIVATE_CHANNEL_ID").and_then(non_empty);

        let catalog_path = PathBuf::from(
            lookup("CATALOG_FILE")
                .and_then(non_empty)
                .unwrap_or_else(|| "catalog.json".to_string()),
        );

        let delete_after = parse_u64(lookup("DELETE_AFTER_SECONDS"))
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_DELETE_AFTER);
        let auto_setup_buttons = lookup("AUTO_SETUP_BUTTONS_ON_START")
            .map(|s| parse_bool(&s))
            .unwrap_or(true);
        let button_setup_delay = Duration::from_secs(2);

        let throttle_global =
            Duration::from_millis(parse_u64(lookup("THROTTLE_GLOBAL_MS")).unwrap_or(40));
        let throttle_per_chat =
            Duration::from_millis(parse_u64(lookup("THROTTLE_PER_CHAT_MS")).unwrap_or(1050));

        Ok(Self {
            telegram_bot_token,
            bot_username,
            public_channel,
            private_channel_id,
            catalog_path,
            delete_after,
            auto_setup_buttons,
            button_setup_delay,
            throttle_global,
            throttle_per_chat,
        })
    }
}

/// Settings for the keep-alive HTTP endpoint.
///
/// Loaded separately from `Config` so the endpoint can come up even when the
/// bot configuration is broken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LivenessConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

impl LivenessConfig {
    /// Hosting platforms usually hand the port in via `PORT`.
    pub fn from_env() -> Self {
        load_env_file();
        Self::from_lookup(env_str)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(port) = lookup("PORT").and_then(|s| s.trim().parse::<u16>().ok()) {
            cfg.port = port;
        }
        cfg
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Load `.env` if present. Existing environment variables win.
pub fn load_env_file() {
    let _ = dotenvy::dotenv();
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn parse_u64(value: Option<String>) -> Option<u64> {
    value.and_then(|s| s.trim().parse::<u64>().ok())
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn normalize_username(s: &str) -> Option<String> {
    let name = s.trim().trim_start_matches('@');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
