use clap::Parser;
use tea_api::cli::Cli;
use tea_api::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tea_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match AppConfig::from_env().validate() {
        Ok(config) => {
            tracing::info!("Starting Tea API in {:?} mode", config.environment);
            tea_api::cli::run(cli, config).await
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}
