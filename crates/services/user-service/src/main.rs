//! User Service - command-line access to the user store and its cache.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::{AppError, AppResult};
use domain::UserId;
use user_service_lib::config::UserServiceConfig;
use user_service_lib::repository::CachedUserRepository;
use user_service_lib::Components;

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "User record store with cache-aside reads")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a user by ID
    Get {
        id: UserId,
        /// Read through the cache
        #[arg(long)]
        cached: bool,
    },
    /// Fetch a user by email
    GetByEmail { email: String },
    /// Create a user
    Create { email: String, name: String },
    /// Replace a user's email and name
    Update {
        id: UserId,
        email: String,
        name: String,
    },
    /// Delete a user
    Delete { id: UserId },
    /// List all users ordered by ID
    List,
    /// Find users whose name matches a LIKE pattern (case-insensitive)
    Find { pattern: String },
    /// Count users
    Count,
    /// Users created in the last N days (0 = today)
    Recent { days: u32 },
    /// Move the source user's name onto the target and delete the source
    Transfer { from: UserId, to: UserId },
    /// Drop the cached snapshot of a user
    Invalidate { id: UserId },
    /// Check database and cache connectivity
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = UserServiceConfig::from_env();
    tracing::debug!(?config, "Configuration loaded");

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(code = e.code(), "Command failed: {}", e);
        std::process::exit(if e.is_unavailable() { 2 } else { 1 });
    }
}

async fn run(command: Commands, config: &UserServiceConfig) -> AppResult<()> {
    let components = Components::connect(config).await?;
    let users = &components.users;

    match command {
        Commands::Get { id, cached } => {
            let user = if cached {
                components.cached_users.get_cached(id).await?
            } else {
                users.get(id).await?
            };
            print_json(&user)
        }
        Commands::GetByEmail { email } => print_json(&users.get_by_email(&email).await?),
        Commands::Create { email, name } => print_json(&users.create(email, name).await?),
        Commands::Update { id, email, name } => {
            users.update(id, email, name).await?;
            invalidate_after_write(&components.cached_users, &[id]).await;
            Ok(())
        }
        Commands::Delete { id } => {
            users.delete(id).await?;
            invalidate_after_write(&components.cached_users, &[id]).await;
            Ok(())
        }
        Commands::List => print_json(&users.list().await?),
        Commands::Find { pattern } => print_json(&users.find_by_name_pattern(&pattern).await?),
        Commands::Count => {
            println!("{}", users.count().await?);
            Ok(())
        }
        Commands::Recent { days } => print_json(&users.recent_since(days).await?),
        Commands::Transfer { from, to } => {
            users.transfer(from, to).await?;
            invalidate_after_write(&components.cached_users, &[from, to]).await;
            Ok(())
        }
        Commands::Invalidate { id } => components.cached_users.invalidate(id).await,
        Commands::Health => {
            components.health().await?;
            println!("ok");
            Ok(())
        }
    }
}

/// Drop cached snapshots made stale by a committed write.
///
/// The write already succeeded, so a cache failure here is only reported.
async fn invalidate_after_write(cached: &CachedUserRepository, ids: &[UserId]) {
    for &id in ids {
        if let Err(e) = cached.invalidate(id).await {
            tracing::warn!(user_id = id, error = %e, "Cache invalidation failed; entry stays stale until TTL");
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::internal(format!("Serialization error: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
