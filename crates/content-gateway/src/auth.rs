//! Password authentication and the identity-change stream.
//!
//! The [`Authenticator`] owns the current session and broadcasts every
//! identity change (sign-in, sign-up, sign-out, token refresh) so the
//! session store can mirror it without polling.

use crate::http::expect_success;
use crate::{GatewayConfig, GatewayError, GatewayResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Capacity of the identity-change broadcast channel.
const IDENTITY_CHANNEL_CAPACITY: usize = 16;

/// The authenticated user's profile handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthUser {
    /// Display name derived from the e-mail local-part.
    ///
    /// Falls back to the full address when it has no `@`, and to an empty
    /// string when the identity carries no e-mail. Persisted with rows at
    /// creation time and never recomputed, so a later e-mail change does not
    /// rewrite old bylines.
    pub fn display_name(&self) -> String {
        match self.email.as_deref() {
            None => String::new(),
            Some(email) => match email.find('@') {
                Some(at) => email[..at].to_string(),
                None => email.to_string(),
            },
        }
    }
}

/// An authenticated session as issued by the auth endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

/// Token grant response shared by password sign-in and refresh.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: AuthUser,
}

impl From<TokenResponse> for AuthSession {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
            user: response.user,
        }
    }
}

#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshGrantRequest<'a> {
    refresh_token: &'a str,
}

/// Sign-up response; the token fields are present only when the project
/// auto-confirms new accounts.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<AuthUser>,
}

/// Authentication client owning the current session.
pub struct Authenticator {
    http_client: reqwest::Client,
    config: Option<GatewayConfig>,
    session: Mutex<Option<AuthSession>>,
    changes: broadcast::Sender<Option<AuthSession>>,
}

impl Authenticator {
    /// Create a new authenticator over an optional endpoint configuration.
    pub fn new(config: Option<GatewayConfig>) -> Self {
        let (changes, _) = broadcast::channel(IDENTITY_CHANNEL_CAPACITY);
        Self {
            http_client: reqwest::Client::new(),
            config,
            session: Mutex::new(None),
            changes,
        }
    }

    /// Build an authenticator straight from the client configuration.
    pub fn from_config(config: &client_core::Config) -> GatewayResult<Self> {
        Ok(Self::new(GatewayConfig::from_config(config)?))
    }

    fn config(&self) -> GatewayResult<&GatewayConfig> {
        self.config.as_ref().ok_or(GatewayError::NotConfigured)
    }

    /// The current session, if signed in.
    pub fn current_session(&self) -> Option<AuthSession> {
        self.session.lock().unwrap().clone()
    }

    /// Subscribe to identity changes.
    pub fn subscribe(&self) -> broadcast::Receiver<Option<AuthSession>> {
        self.changes.subscribe()
    }

    fn publish(&self, session: Option<AuthSession>) {
        *self.session.lock().unwrap() = session.clone();
        // Nobody listening yet is fine.
        let _ = self.changes.send(session);
    }

    /// Restore a previously persisted session.
    ///
    /// Counts as an identity-change event, so attached stores pick it up
    /// exactly like a fresh sign-in.
    pub fn restore_session(&self, session: AuthSession) {
        debug!(user_id = %session.user.id, "Session restored");
        self.publish(Some(session));
    }

    /// Sign in with e-mail and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<AuthSession> {
        let config = self.config()?;
        let url = config.auth_url("token?grant_type=password");

        debug!("Signing in");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", config.anon_key())
            .header("Content-Type", "application/json")
            .json(&PasswordGrantRequest { email, password })
            .send()
            .await?;
        let response = expect_success(response, "Sign-in failed").await?;

        let session: AuthSession = response.json::<TokenResponse>().await?.into();
        info!(user_id = %session.user.id, "Signed in");
        self.publish(Some(session.clone()));
        Ok(session)
    }

    /// Register a new account.
    ///
    /// Returns the session when the project auto-confirms sign-ups, `None`
    /// when e-mail confirmation is required before the first sign-in.
    pub async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<Option<AuthSession>> {
        let config = self.config()?;
        let url = config.auth_url("signup");

        debug!("Signing up");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", config.anon_key())
            .header("Content-Type", "application/json")
            .json(&PasswordGrantRequest { email, password })
            .send()
            .await?;
        let response = expect_success(response, "Sign-up failed").await?;

        let body: SignUpResponse = response.json().await?;
        match body {
            SignUpResponse {
                access_token: Some(access_token),
                refresh_token: Some(refresh_token),
                expires_in: Some(expires_in),
                user: Some(user),
            } => {
                let session = AuthSession {
                    access_token,
                    refresh_token,
                    expires_at: Utc::now() + Duration::seconds(expires_in),
                    user,
                };
                info!(user_id = %session.user.id, "Signed up");
                self.publish(Some(session.clone()));
                Ok(Some(session))
            }
            _ => {
                info!("Signed up; e-mail confirmation required before sign-in");
                Ok(None)
            }
        }
    }

    /// Sign out, revoking the session server-side on a best-effort basis.
    ///
    /// The local session is always cleared and the change broadcast, even
    /// when the revocation request fails.
    pub async fn sign_out(&self) -> GatewayResult<()> {
        let config = self.config()?;
        let token = self
            .session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.access_token.clone());

        if let Some(token) = token {
            let url = config.auth_url("logout");
            match self
                .http_client
                .post(&url)
                .header("apikey", config.anon_key())
                .header("Authorization", format!("Bearer {token}"))
                .send()
                .await
            {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "Remote sign-out rejected");
                }
                Err(err) => {
                    warn!(error = %err, "Remote sign-out failed");
                }
                Ok(_) => {}
            }
        }

        self.publish(None);
        info!("Signed out");
        Ok(())
    }

    /// Exchange the refresh token for a new session.
    pub async fn refresh_session(&self) -> GatewayResult<AuthSession> {
        let config = self.config()?;
        let refresh_token = self
            .session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or(GatewayError::NotSignedIn)?;

        debug!("Refreshing session");

        let url = config.auth_url("token?grant_type=refresh_token");
        let response = self
            .http_client
            .post(&url)
            .header("apikey", config.anon_key())
            .header("Content-Type", "application/json")
            .json(&RefreshGrantRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await?;
        let response = expect_success(response, "Token refresh failed").await?;

        let session: AuthSession = response.json::<TokenResponse>().await?.into();
        debug!(user_id = %session.user.id, "Session refreshed");
        self.publish(Some(session.clone()));
        Ok(session)
    }
}
