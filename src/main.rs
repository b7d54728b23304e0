use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use granite_catalog::auth::TokenService;
use granite_catalog::config::AppConfig;
use granite_catalog::database::{CatalogStore, MemoryStore, PgStore};
use granite_catalog::state::AppState;

#[derive(Parser)]
#[command(name = "granite-catalog", version, about = "Catalog and admin backend for a granite products site")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override PORT
        #[arg(long)]
        port: Option<u16>,
        /// Serve from a JSON fixture instead of PostgreSQL
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
    /// Apply database migrations and exit
    Migrate,
    /// Issue an admin token (uses ADMIN_PASSWORD when --password is omitted)
    Token {
        #[arg(long)]
        password: Option<String>,
    },
    /// Check an admin token and print its claims
    Verify { token: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ADMIN_PASSWORD, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve { port: None, fixture: None }) {
        Command::Serve { port, fixture } => serve(config, port, fixture).await,
        Command::Migrate => {
            let store = PgStore::connect(config.database_url()?, &config.database).await?;
            store.migrate().await?;
            Ok(())
        }
        Command::Token { password } => {
            let tokens = TokenService::new(&config.security);
            let password = match password {
                Some(password) => password,
                None => config.security.admin_password.expose_secret().to_string(),
            };
            let issued = tokens.issue(&password)?;
            println!("{}", issued.token);
            Ok(())
        }
        Command::Verify { token } => {
            let claims = TokenService::new(&config.security).verify(Some(&token))?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
            Ok(())
        }
    }
}

async fn serve(mut config: AppConfig, port: Option<u16>, fixture: Option<PathBuf>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    tracing::info!("Starting granite-catalog in {:?} mode", config.environment);

    let store: Arc<dyn CatalogStore> = match fixture {
        Some(path) => Arc::new(
            MemoryStore::load(&path)
                .await
                .with_context(|| format!("failed to load fixture {}", path.display()))?,
        ),
        None => {
            let store = PgStore::connect(config.database_url()?, &config.database).await?;
            store.migrate().await?;
            Arc::new(store)
        }
    };

    let bind_addr = config.server.socket_addr();
    let app = granite_catalog::app(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
