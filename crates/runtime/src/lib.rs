use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;
use tutorline_auth::Authenticator;
use tutorline_chats::ChatServices;
use tutorline_config::AppConfig;
use tutorline_database::initialize_database;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Installs the global fmt subscriber; `RUST_LOG` overrides the `info`
    /// default.
    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub chats: ChatServices,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), config.auth.clone());
        let chats = ChatServices::with_sqlite_directory(db_pool.clone(), config.chat.clone());

        info!(
            max_message_length = config.chat.max_message_length,
            max_page_size = config.chat.max_page_size,
            "chat services ready"
        );

        Ok(Self {
            db_pool,
            authenticator,
            chats,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
