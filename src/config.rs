use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::integrations::instagram::InstagramConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server settings. Every flag can also be set through its environment variable.
#[derive(Parser, Debug, Clone)]
#[command(name = "kith")]
#[command(about = "Personal relationship manager API server")]
pub struct Settings {
    /// SQLite database file
    #[arg(long, env = "KITH_DATABASE", default_value = ".data/kith.db")]
    pub database: PathBuf,

    #[arg(long, env = "KITH_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    #[arg(short, long, env = "KITH_PORT", default_value_t = 8080)]
    pub port: u16,

    /// File with at least 64 bytes of key material for signing session
    /// cookies. Without it a throwaway key is generated and sessions end on restart.
    #[arg(long, env = "KITH_SESSION_KEY_FILE")]
    pub session_key_file: Option<PathBuf>,

    /// Mark the session cookie `Secure` (HTTPS only)
    #[arg(long, env = "KITH_COOKIE_SECURE", default_value_t = false)]
    pub cookie_secure: bool,

    #[arg(long, env = "KITH_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Ask Gravatar whether an avatar exists on lookups
    #[arg(long, env = "KITH_GRAVATAR_CHECK", default_value_t = false)]
    pub gravatar_check: bool,

    #[arg(long, env = "KITH_INSTAGRAM_CLIENT_ID")]
    pub instagram_client_id: Option<String>,

    #[arg(long, env = "KITH_INSTAGRAM_CLIENT_SECRET", hide_env_values = true)]
    pub instagram_client_secret: Option<String>,

    #[arg(long, env = "KITH_INSTAGRAM_REDIRECT_URI")]
    pub instagram_redirect_uri: Option<String>,
}

impl Settings {
    pub fn instagram(&self) -> Option<InstagramConfig> {
        InstagramConfig::from_parts(
            self.instagram_client_id.clone(),
            self.instagram_client_secret.clone(),
            self.instagram_redirect_uri.clone(),
        )
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from(".data/kith.db"),
            bind: "127.0.0.1".into(),
            port: 8080,
            session_key_file: None,
            cookie_secure: false,
            log_format: LogFormat::Pretty,
            gravatar_check: false,
            instagram_client_id: None,
            instagram_client_secret: None,
            instagram_redirect_uri: None,
        }
    }
}
