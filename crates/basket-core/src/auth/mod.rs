//! Supabase GoTrue client shared by the front ends.
//!
//! The client owns the HTTP plumbing; where sessions live between runs is up
//! to the [`SessionPersistence`] the front end plugs in (OS keychain on
//! desktop, one keychain entry per profile in the CLI).

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::OwnerId;
use crate::util::{compact_text, is_http_url, unix_timestamp_now};

/// Sessions this close to expiry are refreshed before use.
const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }

    /// Seconds left before the session should be refreshed; zero once due.
    #[must_use]
    pub fn seconds_until_refresh(&self) -> u64 {
        let remaining = self.expires_at - EXPIRY_SKEW_SECONDS - unix_timestamp_now();
        u64::try_from(remaining).unwrap_or(0)
    }

    /// Owner id that scopes every row this session may touch.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        OwnerId::new(self.user.id.clone())
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    /// The project requires email confirmation before the first sign-in.
    ConfirmationRequired,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where a signed-in session is kept between runs.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Invalidates the current session. The list controller only needs this one
/// capability from the auth layer.
#[async_trait]
pub trait SignOut: Send + Sync {
    async fn sign_out(&self) -> AuthResult<()>;
}

#[derive(Clone)]
pub struct SupabaseAuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>, store: S) -> AuthResult<Self> {
        let auth_url = normalize_auth_url(url.as_ref())?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            auth_url,
            anon_key,
            client: Client::builder().build()?,
            store,
        })
    }

    /// Load the persisted session, refreshing it when it is about to expire.
    ///
    /// A session that cannot be refreshed is cleared and reported as absent.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored) = self.store.load_session()? else {
            return Ok(None);
        };
        if !stored.is_expired() {
            return Ok(Some(stored));
        }

        tracing::debug!("Persisted session expired, refreshing");
        match self.refresh_session(&stored.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Dropping persisted session: {}", error);
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        let payload = credentials(email, password)?;
        let request = self.client.post(format!("{}/signup", self.auth_url));
        let session = self.exchange(request.json(&payload)).await?;

        match session {
            Some(session) => {
                self.store.save_session(&session)?;
                tracing::info!("Signed up as user {}", session.user.id);
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let payload = credentials(email, password)?;
        let session = self.grant("password", &payload).await?;
        tracing::info!("Signed in as user {}", session.user.id);
        Ok(session)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Refresh token must not be empty",
            ));
        }
        let payload = serde_json::json!({ "refresh_token": refresh_token });
        self.grant("refresh_token", &payload).await
    }

    /// Revoke `access_token` and forget the persisted session.
    ///
    /// An already-invalid token (401) still counts as signed out.
    pub async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        self.store.clear_session()?;
        Ok(())
    }

    /// Bind this client to a signed-in session.
    #[must_use]
    pub fn activate(&self, session: AuthSession) -> ActiveSession<S> {
        ActiveSession {
            client: self.clone(),
            session,
        }
    }

    /// `POST /token?grant_type=...`, persisting the resulting session.
    async fn grant(&self, grant_type: &str, payload: &serde_json::Value) -> AuthResult<AuthSession> {
        let request = self
            .client
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", grant_type)])
            .json(payload);
        let session = self.exchange(request).await?.ok_or_else(|| {
            AuthError::Api(format!("{grant_type} grant did not return a session"))
        })?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    async fn exchange(&self, request: RequestBuilder) -> AuthResult<Option<AuthSession>> {
        let response = request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }
        response.json::<TokenResponse>().await?.into_session()
    }
}

/// A signed-in session together with the client that issued it.
#[derive(Clone)]
pub struct ActiveSession<S: SessionPersistence> {
    client: SupabaseAuthClient<S>,
    session: AuthSession,
}

impl<S: SessionPersistence> ActiveSession<S> {
    pub const fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn owner(&self) -> OwnerId {
        self.session.owner()
    }
}

#[async_trait]
impl<S: SessionPersistence> SignOut for ActiveSession<S> {
    async fn sign_out(&self) -> AuthResult<()> {
        self.client.sign_out(&self.session.access_token).await
    }
}

/// `https://project.supabase.co` becomes `https://project.supabase.co/auth/v1`.
pub fn normalize_auth_url(url: &str) -> AuthResult<String> {
    let base = url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !is_http_url(base) {
        return Err(AuthError::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }

    Ok(if base.ends_with("/auth/v1") {
        base.to_string()
    } else {
        format!("{base}/auth/v1")
    })
}

fn credentials(email: &str, password: &str) -> AuthResult<serde_json::Value> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Api("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Api("Password is required".to_string()));
    }
    Ok(serde_json::json!({ "email": email, "password": password }))
}

/// Session fields as GoTrue returns them, either at the top level or nested
/// under `session` (sign-up with auto-confirm).
#[derive(Debug, Default, Deserialize)]
struct SessionFields {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<AuthUser>,
}

impl SessionFields {
    fn or(self, other: Self) -> Self {
        Self {
            access_token: self.access_token.or(other.access_token),
            refresh_token: self.refresh_token.or(other.refresh_token),
            expires_at: self.expires_at.or(other.expires_at),
            expires_in: self.expires_in.or(other.expires_in),
            user: self.user.or(other.user),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(flatten)]
    fields: SessionFields,
    #[serde(default)]
    session: Option<SessionFields>,
}

impl TokenResponse {
    /// `Ok(None)` when no tokens came back: the account awaits confirmation.
    fn into_session(self) -> AuthResult<Option<AuthSession>> {
        let fields = self.fields.or(self.session.unwrap_or_default());
        let expires_at = fields.expires_at.or_else(|| {
            fields
                .expires_in
                .map(|seconds| unix_timestamp_now().saturating_add(seconds))
        });

        match (fields.access_token, fields.refresh_token, expires_at, fields.user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user,
                }))
            }
            (None, None, None, _) => Ok(None),
            _ => Err(AuthError::Api(
                "Auth response is missing session fields".to_string(),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Render a Supabase error body as `message (status)`.
pub fn parse_api_error(status: StatusCode, body: &str) -> String {
    let code = status.as_u16();
    let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| compact_text(body));

    match message.trim() {
        "" => format!("HTTP {code}"),
        message => format!("{message} ({code})"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn auth_url_gets_the_gotrue_path_once() {
        assert_eq!(
            normalize_auth_url("https://demo.supabase.co").unwrap(),
            "https://demo.supabase.co/auth/v1"
        );
        assert_eq!(
            normalize_auth_url("https://demo.supabase.co/auth/v1/").unwrap(),
            "https://demo.supabase.co/auth/v1"
        );
    }

    #[test]
    fn auth_url_requires_a_scheme() {
        assert!(normalize_auth_url("demo.supabase.co").is_err());
        assert!(normalize_auth_url("   ").is_err());
    }

    #[test]
    fn user_only_response_means_confirmation_required() {
        let raw = r#"{ "id": "ignored", "user": { "id": "user", "email": "user@example.com" } }"#;
        let response: TokenResponse = serde_json::from_str(raw).unwrap();
        assert!(response.into_session().unwrap().is_none());
    }

    #[test]
    fn bare_user_response_means_confirmation_required() {
        let raw = r#"{ "id": "user", "email": "user@example.com", "confirmation_sent_at": "now" }"#;
        let response: TokenResponse = serde_json::from_str(raw).unwrap();
        assert!(response.into_session().unwrap().is_none());
    }

    #[test]
    fn nested_session_fields_are_used() {
        let raw = r#"{
            "session": {
                "access_token": "access",
                "refresh_token": "refresh",
                "expires_in": 3600,
                "user": { "id": "user-1", "email": "a@example.com" }
            }
        }"#;
        let response: TokenResponse = serde_json::from_str(raw).unwrap();
        let session = response.into_session().unwrap().unwrap();
        assert_eq!(session.owner().as_str(), "user-1");
        assert!(!session.is_expired());
    }

    #[test]
    fn partial_session_is_an_error() {
        let raw = r#"{ "access_token": "access", "user": { "id": "user-1", "email": null } }"#;
        let response: TokenResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(response.into_session(), Err(AuthError::Api(_))));
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let session = AuthSession {
            access_token: "secret-access-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at: 1_700_000_000,
            user: AuthUser {
                id: "user".to_string(),
                email: None,
            },
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-access-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(session.is_expired());
    }

    #[test]
    fn refresh_is_scheduled_ahead_of_expiry() {
        let session = |expires_at| AuthSession {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
            user: AuthUser {
                id: "user".to_string(),
                email: None,
            },
        };

        let fresh = session(unix_timestamp_now() + 3_600).seconds_until_refresh();
        assert!((3_530..=3_540).contains(&fresh));
        assert_eq!(session(unix_timestamp_now() + 30).seconds_until_refresh(), 0);
        assert_eq!(session(1_700_000_000).seconds_until_refresh(), 0);
    }

    #[test]
    fn api_errors_prefer_message_fields() {
        let rendered = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(rendered, "Invalid login credentials (400)");
        assert_eq!(
            parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream down"),
            "upstream down (500)"
        );
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
    }

    #[test]
    fn credentials_are_required() {
        assert!(matches!(credentials(" ", "pw"), Err(AuthError::Api(_))));
        assert!(matches!(credentials("a@example.com", " "), Err(AuthError::Api(_))));
        assert_eq!(
            credentials(" a@example.com ", "pw").unwrap(),
            serde_json::json!({ "email": "a@example.com", "password": "pw" })
        );
    }
}
