use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::Row;
use tokio::net::TcpListener;
use tracing::info;
use tutorline_backend_api::{build_router, AppState};
use tutorline_chats::Role;
use tutorline_config::{load_with, AppConfig};
use tutorline_runtime::{shutdown_signal, telemetry, BackendServices};

#[derive(Parser)]
#[command(name = "tutorline")]
#[command(about = "Tutorline chat backend (serves HTTP by default)")]
struct Cli {
    /// Configuration file, taking precedence over the search path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Listen address, overriding `http.address` and `http.port`
    #[arg(long, global = true)]
    bind: Option<SocketAddr>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Create a student, a tutor and an admin and print their session tokens
    SeedUsers,
    /// Print chats, their participants and message counts
    DumpChats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;

    let mut config = load_with(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config.http.address = bind.ip().to_string();
        config.http.port = bind.port();
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::SeedUsers => seed_users(config).await,
        Commands::DumpChats => dump_chats(config).await,
    }
}

async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    info!("starting Tutorline backend");

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = AppState::new(services.authenticator.clone(), services.chats.clone());
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn seed_users(config: AppConfig) -> anyhow::Result<()> {
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let seeds = [
        ("student@tutorline.test", "Sam Student", Role::Student),
        ("tutor@tutorline.test", "Terry Tutor", Role::Tutor),
        ("admin@tutorline.test", "Alex Admin", Role::Admin),
    ];

    println!("{:<5} {:<25} {:<8} Token", "ID", "Email", "Role");
    println!("{}", "-".repeat(90));
    for (email, name, role) in seeds {
        let user = services
            .authenticator
            .register_user(email, Some(name), role)
            .await
            .with_context(|| format!("failed to register {email}"))?;
        let session = services
            .authenticator
            .issue_session(user.id)
            .await
            .with_context(|| format!("failed to issue session for {email}"))?;

        println!("{:<5} {:<25} {:<8} {}", user.id, email, role.as_str(), session.token);
    }

    info!("seeded users");
    Ok(())
}

async fn dump_chats(config: AppConfig) -> anyhow::Result<()> {
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let chats = sqlx::query(
        r#"
        SELECT c.id, c.kind, c.name, c.creator_id, c.last_sequence, c.created_at,
               (SELECT COUNT(*) FROM chat_participants p WHERE p.chat_id = c.id) AS participants,
               (SELECT COUNT(*) FROM messages m WHERE m.chat_id = c.id) AS messages
        FROM chats c
        ORDER BY c.id ASC
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch chats")?;

    println!("=== CHATS ===");
    if chats.is_empty() {
        println!("No chats found in database");
        return Ok(());
    }

    println!("Found {} chats:", chats.len());
    println!(
        "{:<5} {:<7} {:<25} {:<8} {:<6} {:<6} {:<6} {:<30}",
        "ID", "Kind", "Name", "Creator", "Seq", "Users", "Msgs", "Created At"
    );
    println!("{}", "-".repeat(100));

    for row in chats {
        let id: i64 = row.try_get("id")?;
        let kind: String = row.try_get("kind")?;
        let name: Option<String> = row.try_get("name")?;
        let creator_id: i64 = row.try_get("creator_id")?;
        let last_sequence: i64 = row.try_get("last_sequence")?;
        let created_at: String = row.try_get("created_at")?;
        let participants: i64 = row.try_get("participants")?;
        let messages: i64 = row.try_get("messages")?;

        println!(
            "{:<5} {:<7} {:<25} {:<8} {:<6} {:<6} {:<6} {:<30}",
            id,
            kind,
            name.as_deref().unwrap_or("-"),
            creator_id,
            last_sequence,
            participants,
            messages,
            created_at
        );
    }

    Ok(())
}
