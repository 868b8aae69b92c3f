//! keygate - API key verification and plan rate limiting service

#![allow(missing_docs)]

use anyhow::{Context, bail};
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use keygate::auth::{ApiKeyManager, CreateApiKeyRequest};
use keygate::config::Config;
use keygate::core::models::Plan;
use keygate::storage::StorageLayer;
use keygate::utils::auth::KeyHasher;
use keygate::utils::logging::init_logging;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "keygate")]
#[command(about = "API key verification and plan-based rate limiting")]
#[command(version)]
struct Cli {
    /// Configuration file (environment variables override it)
    #[arg(long, short, global = true, env = "KEYGATE_CONFIG", default_value = "config/keygate.yaml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve,
    /// Issue a persisted API key and print it once
    CreateKey {
        /// Human-readable label
        #[arg(long)]
        name: String,
        /// free, pro or partner
        #[arg(long, default_value = "free")]
        plan: Plan,
        /// Owning user reference
        #[arg(long)]
        user: String,
        /// Days until the key expires; never when omitted
        #[arg(long)]
        expires_in_days: Option<i64>,
    },
    /// Print the stored digest of a raw key
    Hash {
        key: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Display, not Debug, so the context chain reads top to bottom
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_with_precedence(Some(&cli.config))
        .await
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    let json = cli.json_logs || config.logging().json;
    init_logging(Some(&config.logging().level), json).context("initializing logging")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let gateway = keygate::Gateway::new(config).await?;
            gateway.run().await?;
        }
        Commands::CreateKey {
            name,
            plan,
            user,
            expires_in_days,
        } => create_key(&config, name, plan, user, expires_in_days).await?,
        Commands::Hash { key } => {
            let auth = config.auth();
            let hasher = KeyHasher::new(auth.hash_salt.clone(), auth.hash_iterations);
            println!("{}", hasher.hash(&key));
        }
    }

    Ok(())
}

/// Expiry `days` from now; out-of-range offsets are an error
fn expiry_after_days(days: i64) -> anyhow::Result<DateTime<Utc>> {
    TimeDelta::try_days(days)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .with_context(|| format!("--expires-in-days {} is out of range", days))
}

async fn create_key(
    config: &Config,
    name: String,
    plan: Plan,
    user_id: String,
    expires_in_days: Option<i64>,
) -> anyhow::Result<()> {
    if config.storage().database.is_none() {
        bail!("no database configured; set DATABASE_URL or storage.database.url");
    }

    let storage = StorageLayer::new(config.storage()).await;
    let Some(store) = storage.key_store() else {
        bail!("key store configuration is invalid; see the log for details");
    };

    let auth = config.auth();
    let manager = ApiKeyManager::new(
        Some(store),
        KeyHasher::new(auth.hash_salt.clone(), auth.hash_iterations),
    );

    let expires_at = expires_in_days.map(expiry_after_days).transpose()?;
    let (record, raw_key) = manager
        .create_key(CreateApiKeyRequest {
            name,
            plan,
            user_id,
            expires_at,
        })
        .await
        .context("creating API key")?;

    println!("id:      {}", record.id);
    println!("plan:    {}", record.plan);
    println!("prefix:  {}", record.key_prefix);
    println!("api key: {}", raw_key);
    println!("Store the key now; it cannot be shown again.");
    Ok(())
}
