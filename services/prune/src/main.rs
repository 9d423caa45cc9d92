//! Retention pruning service
//!
//! Deletes every imported record whose 14-day retention deadline has
//! passed: once at startup, then on a cron schedule. Running it twice with
//! no new imports in between removes nothing the second time.

use anyhow::Result;
use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use common::database::{self, DatabaseConfig, init_pool, run_migrations};
use common::store::{LibraryStore, PgLibraryStore};

async fn prune_expired(store: &PgLibraryStore) -> Result<()> {
    let stats = store.delete_expired(Utc::now()).await?;

    if stats.total() == 0 {
        info!("Pruning run removed nothing");
    } else {
        info!(
            "Pruning run removed {} subscriptions, {} liked videos, {} playlists",
            stats.subscriptions, stats.liked_videos, stats.playlists
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .init();

    info!("Starting pruning service");

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let store = PgLibraryStore::new(pool);

    // Default schedule: daily at midnight UTC.
    let schedule =
        std::env::var("PRUNE_SCHEDULE").unwrap_or_else(|_| "0 0 0 * * *".to_string());

    // One immediate run so a long-stopped deployment catches up without
    // waiting for the next tick.
    prune_expired(&store).await?;

    let scheduler = JobScheduler::new().await?;

    let job_store = store.clone();
    let job = Job::new_async(schedule.as_str(), move |_, _| {
        let store = job_store.clone();
        Box::pin(async move {
            info!("Pruning job executed");
            if let Err(e) = prune_expired(&store).await {
                error!("Pruning run failed: {}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Started pruning scheduler with schedule: {}", schedule);

    // Keep the service running
    tokio::signal::ctrl_c().await?;
    info!("Shutting down pruning service");

    Ok(())
}
