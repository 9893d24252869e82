//! # Wedsite Main Entry Point
//!
//! `wedsite serve` (the default) migrates and starts the API server,
//! `wedsite migrate` only applies migrations, and `wedsite create-admin`
//! provisions a platform administrator.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use wedsite::{
    auth::password::{hash_password, validate_password_strength},
    config::ConfigLoader,
    db,
    models::user::Role,
    repositories::UserRepository,
    server::run_server,
    telemetry::init_tracing,
};

#[derive(Debug, Parser)]
#[command(name = "wedsite", version, about = "Multi-tenant wedding website platform")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the API
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Create a platform administrator account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new().load().context("loading configuration")?;
    init_tracing(&config).context("initializing telemetry")?;

    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Loaded configuration");
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            db::run_migrations(&db).await?;
            run_server(config, db).await
        }
        Command::Migrate => db::run_migrations(&db).await,
        Command::CreateAdmin { email, password } => {
            validate_password_strength(&password).map_err(|reason| anyhow!(reason))?;
            let hash =
                hash_password(&password).map_err(|err| anyhow!("hashing password: {}", err))?;
            let admin = UserRepository::new(&db)
                .create(&email, hash, Role::Admin, None)
                .await
                .context("creating admin user")?;
            tracing::info!(user_id = %admin.id, email = %admin.email, "Admin user created");
            Ok(())
        }
    }
}
