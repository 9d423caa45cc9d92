//! OAuth2 authorization-code flow for linking a platform account
//!
//! The flow is PKCE-protected: `/auth/google/signin` remembers the CSRF
//! state and verifier for the requesting user, and the callback refuses to
//! exchange the code unless the returned state matches.

use anyhow::Result;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use std::env;
use tracing::info;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

/// OAuth2 configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl OAuthConfig {
    /// Create a new OAuthConfig from environment variables
    ///
    /// # Environment Variables
    /// - `GOOGLE_CLIENT_ID`: OAuth2 client id (required)
    /// - `GOOGLE_CLIENT_SECRET`: OAuth2 client secret (required)
    /// - `OAUTH_REDIRECT_URL`: callback URL registered with the provider (required)
    pub fn from_env() -> Result<Self> {
        let client_id = env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("GOOGLE_CLIENT_ID environment variable not set"))?;
        let client_secret = env::var("GOOGLE_CLIENT_SECRET")
            .map_err(|_| anyhow::anyhow!("GOOGLE_CLIENT_SECRET environment variable not set"))?;
        let redirect_url = env::var("OAUTH_REDIRECT_URL")
            .map_err(|_| anyhow::anyhow!("OAUTH_REDIRECT_URL environment variable not set"))?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_url,
        })
    }
}

/// State held between building the authorization URL and the callback
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub csrf_token: String,
    pub pkce_verifier: String,
}

/// Tokens obtained from a completed authorization-code exchange
#[derive(Debug, Clone)]
pub struct PlatformTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// OAuth2 client wrapper
#[derive(Clone)]
pub struct OAuthClient {
    client: BasicClient,
}

impl OAuthClient {
    /// Create a new OAuth2 client
    pub fn new(config: OAuthConfig) -> Result<Self> {
        let client = BasicClient::new(
            ClientId::new(config.client_id),
            Some(ClientSecret::new(config.client_secret)),
            AuthUrl::new(AUTH_URL.to_string())?,
            Some(TokenUrl::new(TOKEN_URL.to_string())?),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_url)?);

        Ok(Self { client })
    }

    /// Generate the authorization URL with PKCE and a fresh CSRF state
    pub fn authorization_url(&self) -> (String, PendingAuthorization) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(YOUTUBE_SCOPE.to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        let pending = PendingAuthorization {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), pending)
    }

    /// Exchange the authorization code for platform tokens
    pub async fn exchange_code(
        &self,
        code: String,
        pkce_verifier: String,
    ) -> Result<PlatformTokens> {
        info!("Exchanging authorization code for platform tokens");

        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(oauth2::reqwest::async_http_client)
            .await?;

        Ok(PlatformTokens {
            access_token: token_response.access_token().secret().clone(),
            refresh_token: token_response
                .refresh_token()
                .map(|token| token.secret().clone())
                .unwrap_or_default(),
        })
    }
}
