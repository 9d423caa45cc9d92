//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Redirect},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;

use common::models::{LikedVideo, Playlist, Subscription};
use common::store::LibraryStore;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::{CurrentUser, auth_middleware},
    sync::{
        self, ImportSummary, SelectionKind, build_export_document, export_selection,
        parse_selection,
    },
    validation::{validate_password, validate_username},
};

/// Request for signup and login
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Response carrying a fresh session token
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Query parameters of the OAuth callback
#[derive(Deserialize)]
pub struct CallbackParams {
    pub state: String,
    pub code: String,
}

/// Request selecting which entity kinds to import
#[derive(Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub subscriptions: bool,
    #[serde(default)]
    pub liked_videos: bool,
    #[serde(default)]
    pub playlists: bool,
}

/// The current user's imported library
#[derive(Serialize)]
pub struct DashboardResponse {
    pub subscriptions: Vec<Subscription>,
    pub liked_videos: Vec<LikedVideo>,
    pub playlists: Vec<Playlist>,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/logout", post(logout))
        .route("/account", delete(delete_account))
        .route("/dashboard", get(dashboard))
        .route("/auth/google/signin", get(google_signin))
        .route("/auth/google/callback", get(google_callback))
        .route("/import", post(import))
        .route("/library/delete", post(delete_library_selection))
        .route("/library/download", post(download_library_selection))
        .route("/library/export", post(export_library_selection))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "tubelift-api"
    }))
}

fn token_response(state: &AppState, user_id: uuid::Uuid) -> ApiResult<Json<TokenResponse>> {
    let access_token = state.jwt_service.generate_token(user_id)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.token_expiry(),
    }))
}

/// Create a new account and open a session
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_username(&payload.username).map_err(ApiError::Validation)?;
    validate_password(&payload.password).map_err(ApiError::Validation)?;

    if state
        .users
        .find_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation(
            "Username is already taken".to_string(),
        ));
    }

    let user = state.users.create(&payload.username, &payload.password).await?;
    info!("Created account for user: {}", user.id);

    Ok((StatusCode::CREATED, token_response(&state, user.id)?))
}

/// Verify credentials and open a session
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_username(&payload.username)
        .await?
        .ok_or(ApiError::NotAuthenticated)?;

    if !state.users.verify_password(&user, &payload.password).await? {
        return Err(ApiError::NotAuthenticated);
    }

    token_response(&state, user.id)
}

/// Close the session. Tokens are stateless, so this only acknowledges; the
/// client discards its copy.
pub async fn logout(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    info!("User logged out: {}", user.0);
    Json(json!({ "message": "Logged out" }))
}

/// Delete the current user's account, cascading to every owned record
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    state.users.delete(user.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the current user's imported library
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<DashboardResponse>> {
    let subscriptions = state.store.subscriptions_for_user(user.0).await?;
    let liked_videos = state.store.liked_videos_for_user(user.0).await?;
    let playlists = state.store.playlists_for_user(user.0).await?;

    Ok(Json(DashboardResponse {
        subscriptions,
        liked_videos,
        playlists,
    }))
}

/// Start the platform authorization flow
pub async fn google_signin(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    let (auth_url, pending) = state.oauth_client.authorization_url();
    state
        .pending_authorizations
        .lock()
        .await
        .insert(user.0, pending);

    Redirect::to(&auth_url)
}

/// Complete the platform authorization flow and store the tokens
pub async fn google_callback(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<CallbackParams>,
) -> ApiResult<impl IntoResponse> {
    let pending = state
        .pending_authorizations
        .lock()
        .await
        .remove(&user.0)
        .ok_or(ApiError::NotAuthenticated)?;

    // Reject a state mismatch before any code exchange.
    if pending.csrf_token != params.state {
        return Err(ApiError::NotAuthenticated);
    }

    let tokens = state
        .oauth_client
        .exchange_code(params.code, pending.pkce_verifier)
        .await?;

    state
        .credentials
        .upsert(user.0, &tokens.access_token, &tokens.refresh_token)
        .await?;

    Ok(Json(json!({ "message": "Platform account linked" })))
}

/// Import the selected entity kinds from the platform
pub async fn import(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ImportRequest>,
) -> ApiResult<Json<ImportSummary>> {
    let mut summary = ImportSummary::default();

    if payload.subscriptions {
        summary.subscriptions =
            sync::import_subscriptions(&state.platform, &state.store, user.0).await?;
    }
    if payload.liked_videos {
        summary.liked_videos =
            sync::import_liked_videos(&state.platform, &state.store, user.0).await?;
    }
    if payload.playlists {
        let (playlists, playlist_videos) =
            sync::import_playlists(&state.platform, &state.store, user.0).await?;
        summary.playlists = playlists;
        summary.playlist_videos = playlist_videos;
    }

    Ok(Json(summary))
}

/// Delete the selected records from local storage
pub async fn delete_library_selection(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(form): Json<BTreeMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    let keys = parse_selection(&form);
    let mut deleted = 0;

    for key in &keys {
        match key.kind {
            // Deleting an already absent row is a no-op, not an error.
            SelectionKind::LikedVideo => {
                deleted += state
                    .store
                    .delete_liked_video(user.0, &key.natural_key)
                    .await?;
            }
            SelectionKind::Subscription => {
                deleted += state
                    .store
                    .delete_subscription(user.0, &key.natural_key)
                    .await?;
            }
            SelectionKind::Playlist => {
                let removed = state
                    .store
                    .delete_playlist(user.0, &key.natural_key)
                    .await?;
                if removed == 0 {
                    return Err(ApiError::LookupFailure(format!(
                        "playlist {}",
                        key.natural_key
                    )));
                }
                deleted += removed;
            }
        }
    }

    info!("Deleted {} records for user {}", deleted, user.0);
    Ok(Json(json!({ "deleted": deleted })))
}

/// Download the selected records as a JSON attachment
pub async fn download_library_selection(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(form): Json<BTreeMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    let keys = parse_selection(&form);
    let document = build_export_document(&state.store, user.0, &keys).await?;

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"tubelift_export.json\"",
        )],
        Json(document),
    ))
}

/// Export the selected records back to the platform
pub async fn export_library_selection(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(form): Json<BTreeMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    let keys = parse_selection(&form);
    let report = export_selection(&state.platform, &state.store, user.0, &keys).await?;

    Ok(Json(report))
}
