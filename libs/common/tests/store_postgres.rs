//! Integration tests for the PostgreSQL record store
//!
//! These need a running PostgreSQL instance reachable through
//! `DATABASE_URL` and are therefore ignored by default:
//!
//! ```sh
//! DATABASE_URL=postgresql://... cargo test -p common -- --ignored
//! ```

use chrono::{Duration, Utc};
use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use common::models::{NewPlaylist, NewPlaylistVideo, NewSubscription};
use common::store::{LibraryStore, PgLibraryStore};
use serial_test::serial;
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> Result<(PgPool, PgLibraryStore), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;
    assert!(health_check(&pool).await?, "Database health check failed");
    run_migrations(&pool).await?;
    Ok((pool.clone(), PgLibraryStore::new(pool)))
}

async fn create_user(pool: &PgPool, username: &str) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO users (username, password_hash) VALUES ($1, 'x') RETURNING id",
    )
    .bind(username)
    .fetch_one(pool)
    .await
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn subscriptions_round_trip_and_selective_delete()
-> Result<(), Box<dyn std::error::Error>> {
    let (pool, store) = setup().await?;
    let user = create_user(&pool, &format!("it_sub_{}", Uuid::new_v4())).await?;
    let expiry = Utc::now() + Duration::days(14);

    let rows = ["UC-one", "UC-two", "UC-three"]
        .iter()
        .map(|channel| NewSubscription {
            user_id: user,
            channel_id: channel.to_string(),
            title: channel.to_string(),
            thumbnail: "https://example.com/t.jpg".to_string(),
            expires_at: expiry,
        })
        .collect();
    assert_eq!(store.insert_subscriptions(rows).await?, 3);

    assert_eq!(store.delete_subscription(user, "UC-one").await?, 1);
    assert_eq!(store.delete_subscription(user, "UC-three").await?, 1);
    assert_eq!(store.subscriptions_for_user(user).await?.len(), 1);

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user)
        .execute(&pool)
        .await?;
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn deleting_a_user_cascades_to_owned_rows() -> Result<(), Box<dyn std::error::Error>> {
    let (pool, store) = setup().await?;
    let doomed = create_user(&pool, &format!("it_doomed_{}", Uuid::new_v4())).await?;
    let bystander = create_user(&pool, &format!("it_bystander_{}", Uuid::new_v4())).await?;
    let expiry = Utc::now() + Duration::days(14);

    for user in [doomed, bystander] {
        store
            .insert_subscriptions(vec![NewSubscription {
                user_id: user,
                channel_id: "UC-keep".to_string(),
                title: "Keep".to_string(),
                thumbnail: "https://example.com/t.jpg".to_string(),
                expires_at: expiry,
            }])
            .await?;
        store
            .insert_playlists(vec![NewPlaylist {
                user_id: user,
                resource_id: "PL-keep".to_string(),
                title: "Keep".to_string(),
                thumbnail: "https://example.com/t.jpg".to_string(),
                privacy_status: "private".to_string(),
                expires_at: expiry,
            }])
            .await?;
        let playlist = store.playlist_by_resource(user, "PL-keep").await?.unwrap();
        store
            .insert_playlist_videos(vec![NewPlaylistVideo {
                playlist_id: playlist.id,
                video_id: "vid".to_string(),
            }])
            .await?;
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(doomed)
        .execute(&pool)
        .await?;

    assert!(store.subscriptions_for_user(doomed).await?.is_empty());
    assert!(store.playlists_for_user(doomed).await?.is_empty());

    let kept = store.playlist_by_resource(bystander, "PL-keep").await?.unwrap();
    assert_eq!(store.playlist_videos(kept.id).await?.len(), 1);

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(bystander)
        .execute(&pool)
        .await?;
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn pruning_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let (pool, store) = setup().await?;
    let user = create_user(&pool, &format!("it_prune_{}", Uuid::new_v4())).await?;
    let now = Utc::now();

    store
        .insert_subscriptions(vec![
            NewSubscription {
                user_id: user,
                channel_id: "UC-old".to_string(),
                title: "Old".to_string(),
                thumbnail: "https://example.com/t.jpg".to_string(),
                expires_at: now - Duration::hours(1),
            },
            NewSubscription {
                user_id: user,
                channel_id: "UC-new".to_string(),
                title: "New".to_string(),
                thumbnail: "https://example.com/t.jpg".to_string(),
                expires_at: now + Duration::days(14),
            },
        ])
        .await?;

    let stats = store.delete_expired(now).await?;
    assert!(stats.subscriptions >= 1);
    assert_eq!(store.subscriptions_for_user(user).await?.len(), 1);

    let again = store.delete_expired(now).await?;
    assert_eq!(again.subscriptions, 0);

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user)
        .execute(&pool)
        .await?;
    Ok(())
}
