use anyhow::Result;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod error;
mod jwt;
mod middleware;
mod oauth;
mod platform;
mod repositories;
mod routes;
mod sync;
mod validation;

use common::database::{self, DatabaseConfig, init_pool, run_migrations};
use common::store::PgLibraryStore;

use crate::{
    jwt::{JwtConfig, JwtService},
    oauth::{OAuthClient, OAuthConfig, PendingAuthorization},
    platform::{PlatformConfig, YouTubeClient},
    repositories::{CredentialRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: PgLibraryStore,
    pub users: UserRepository,
    pub credentials: CredentialRepository,
    pub jwt_service: JwtService,
    pub oauth_client: OAuthClient,
    pub platform: YouTubeClient,
    pub pending_authorizations: Arc<Mutex<HashMap<Uuid, PendingAuthorization>>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .init();

    info!("Starting tubelift API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let store = PgLibraryStore::new(pool.clone());
    let users = UserRepository::new(pool.clone());
    let credentials = CredentialRepository::new(pool);

    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let oauth_client = OAuthClient::new(OAuthConfig::from_env()?)?;
    let platform = YouTubeClient::new(PlatformConfig::from_env(), credentials.clone())
        .map_err(|e| anyhow::anyhow!("Failed to build platform client: {}", e))?;

    let app_state = AppState {
        store,
        users,
        credentials,
        jwt_service,
        oauth_client,
        platform,
        pending_authorizations: Arc::new(Mutex::new(HashMap::new())),
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
