use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::net::TcpListener;

use crate::auth::Credentials;
use crate::config::AppConfig;
use crate::database::seed::{seed, SeedOwner};
use crate::database::{DatabaseManager, MemoryStore, PgStore, TeaStore};
use crate::server;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "tea-api")]
#[command(about = "Tea catalogue REST API with comments and JWT authentication")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, value_enum, default_value_t = StoreKind::Postgres, help = "Storage backend")]
        store: StoreKind,

        #[arg(long, help = "Insert the starter catalogue before serving")]
        seed: bool,

        #[command(flatten)]
        owner: SeedArgs,
    },

    #[command(about = "Create the database tables")]
    Migrate,

    #[command(about = "Insert the starter catalogue into the database")]
    Seed {
        #[command(flatten)]
        owner: SeedArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Args)]
pub struct SeedArgs {
    #[arg(long = "seed-username", default_value = "teaAdmin", help = "Owner of the seeded teas")]
    pub username: String,

    #[arg(long = "seed-email", default_value = "admin@example.com")]
    pub email: String,

    #[arg(long = "seed-password", help = "Password for the seed owner")]
    pub password: Option<String>,
}

impl SeedArgs {
    fn owner(&self) -> anyhow::Result<SeedOwner> {
        let password = self
            .password
            .clone()
            .context("--seed-password is required when seeding")?;

        Ok(SeedOwner {
            username: self.username.clone(),
            email: self.email.clone(),
            password,
        })
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve { store, seed: with_seed, owner }) => {
            let owner = if with_seed { Some(owner.owner()?) } else { None };
            serve(config, store, owner).await
        }
        None => serve(config, StoreKind::Postgres, None).await,
        Some(Commands::Migrate) => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
        Some(Commands::Seed { owner }) => {
            let owner = owner.owner()?;
            let store = open_postgres(&config).await?;
            let credentials = Credentials::new(&config.security)?;
            let report = seed(store.as_ref(), &credentials, &owner).await?;
            println!(
                "Seeded {} teas ({} already present) owned by '{}'",
                report.created, report.skipped, report.owner.username
            );
            Ok(())
        }
    }
}

async fn open_postgres(config: &AppConfig) -> anyhow::Result<Arc<dyn TeaStore>> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL")?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Arc::new(PgStore::new(pool)))
}

async fn serve(config: AppConfig, kind: StoreKind, owner: Option<SeedOwner>) -> anyhow::Result<()> {
    let store: Arc<dyn TeaStore> = match kind {
        StoreKind::Postgres => open_postgres(&config).await?,
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store, data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let credentials = Credentials::new(&config.security)?;
    if let Some(owner) = owner {
        seed(store.as_ref(), &credentials, &owner).await?;
    }

    let state = AppState::new(store, credentials);
    let router = server::app(state, &config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    server::serve(listener, router).await?;
    Ok(())
}
