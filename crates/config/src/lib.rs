use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "tutorline.toml",
    "config/tutorline.toml",
    "crates/config/tutorline.toml",
    "../tutorline.toml",
    "../config/tutorline.toml",
    "../crates/config/tutorline.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://tutorline.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
        }
    }
}

impl AuthConfig {
    fn default_session_ttl() -> u64 {
        86_400
    }
}

/// Limits applied by the conversation core.
///
/// ```
/// use tutorline_config::ChatConfig;
///
/// let chat = ChatConfig::default();
/// assert_eq!(chat.max_message_length, 4_000);
/// assert!(chat.default_page_size <= chat.max_page_size);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Maximum message body length, counted in characters.
    #[serde(default = "ChatConfig::default_max_message_length")]
    pub max_message_length: usize,
    #[serde(default = "ChatConfig::default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "ChatConfig::default_max_page_size")]
    pub max_page_size: u32,
}

impl ChatConfig {
    const fn default_max_message_length() -> usize {
        4_000
    }

    const fn default_page_size() -> u32 {
        50
    }

    const fn default_max_page_size() -> u32 {
        100
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: Self::default_max_message_length(),
            default_page_size: Self::default_page_size(),
            max_page_size: Self::default_max_page_size(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use tutorline_config::load;
///
/// std::env::remove_var("TUTORLINE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    load_with(None)
}

/// Like [`load`], but an explicit file takes precedence over `TUTORLINE_CONFIG`
/// and the search list.
pub fn load_with(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl = defaults.auth.session_ttl_seconds;
    let session_ttl_i64 = i64::try_from(session_ttl).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.session_ttl_seconds", session_ttl_i64)?
        .set_default(
            "chat.max_message_length",
            i64::try_from(defaults.chat.max_message_length).unwrap_or(i64::MAX),
        )?
        .set_default(
            "chat.default_page_size",
            i64::from(defaults.chat.default_page_size),
        )?
        .set_default("chat.max_page_size", i64::from(defaults.chat.max_page_size))?;

    let environment_overrides = config::Environment::with_prefix("TUTORLINE").separator("__");

    let mut config_file_attached = false;

    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading configuration from command line");
        builder = builder.add_source(config::File::from(path.to_path_buf()));
        config_file_attached = true;
    } else if let Ok(path) = std::env::var("TUTORLINE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via TUTORLINE_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }

    validate(&mut config)?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

fn validate(config: &mut AppConfig) -> anyhow::Result<()> {
    let chat = &mut config.chat;
    if chat.max_message_length == 0 {
        anyhow::bail!("invalid configuration: chat.max_message_length must be positive");
    }
    if chat.max_page_size == 0 {
        anyhow::bail!("invalid configuration: chat.max_page_size must be positive");
    }
    if chat.default_page_size == 0 || chat.default_page_size > chat.max_page_size {
        debug!(
            default_page_size = chat.default_page_size,
            max_page_size = chat.max_page_size,
            "clamping default page size into range"
        );
        chat.default_page_size = chat.default_page_size.clamp(1, chat.max_page_size);
    }
    Ok(())
}
