mod cli;
mod config;
mod storage;

use clap::Parser;
use color_eyre::Result;
use lockbox_core::backing::BackingStore;
use lockbox_storage::token_store::{SecureTokenStore, LEGACY_TOKEN_KEY, TOKEN_KEY};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Command, ConfigCommand, TokenCommand};

/// Entry point wiring the CLI to the encrypted token store.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    match cli.command {
        Command::Token(cmd) => run_token(cmd, &config).await?,
        Command::Health => run_health_check(&config).await?,
        Command::Config(ConfigCommand::Init) => init_config(&config)?,
        Command::Version => print_version(),
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("lockbox {}", env!("CARGO_PKG_VERSION"));
}

async fn run_token(cmd: TokenCommand, config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    match cmd {
        TokenCommand::Set { token } => {
            store.set_token(&token).await?;
            println!("Token stored");
        }
        TokenCommand::Get => match store.token().await {
            Some(token) => println!("{token}"),
            None => println!("No token stored"),
        },
        TokenCommand::Clear => {
            store.clear(TOKEN_KEY)?;
            store.clear(LEGACY_TOKEN_KEY)?;
            println!("Token cleared");
        }
    }
    Ok(())
}

/// Runs a seal/open round trip against the configured store.
async fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    run_store_health(&store).await?;
    println!("Storage: ok");
    Ok(())
}

async fn run_store_health<B: BackingStore>(store: &SecureTokenStore<B>) -> Result<()> {
    let probe_key = "health/probe";
    let payload = "ok";
    store.persist(probe_key, payload).await?;
    let round_trip: Option<String> = store.load(probe_key).await;
    store.clear(probe_key)?;

    if round_trip.as_deref() != Some(payload) {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;

    #[tokio::test]
    async fn health_check_with_test_store_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = storage::test_store(dir.path());
        run_store_health(&store)
            .await
            .expect("health check should succeed");
    }

    #[tokio::test]
    async fn token_survives_store_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = storage::test_store(dir.path());
            store.set_token("abc123").await.expect("set token");
        }

        let reopened = storage::test_store(dir.path());
        assert_eq!(reopened.token().await.as_deref(), Some("abc123"));
    }
}
