//! Supabase authentication service with secure session storage.

use keyring::Entry;

use basket_core::auth::{
    ActiveSession, AuthError, AuthResult, SessionPersistence, SupabaseAuthClient,
};
pub use basket_core::auth::{AuthSession, SignUpOutcome};
use basket_core::config::ResolvedBackend;

const KEYRING_SERVICE_NAME: &str = "basket";
const KEYRING_SESSION_USERNAME: &str = "supabase_session";

/// The desktop keeps a single signed-in session in the OS keychain.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringSessionStore;

impl KeyringSessionStore {
    fn entry() -> AuthResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, KEYRING_SESSION_USERNAME).map_err(storage_error)
    }
}

fn storage_error(error: keyring::Error) -> AuthError {
    AuthError::SecureStorage(error.to_string())
}

impl SessionPersistence for KeyringSessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        match Self::entry()?.get_password() {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(storage_error(error)),
        }
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        let raw = serde_json::to_string(session)?;
        Self::entry()?.set_password(&raw).map_err(storage_error)
    }

    fn clear_session(&self) -> AuthResult<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(storage_error(error)),
        }
    }
}

#[derive(Clone)]
pub struct SupabaseAuthService {
    inner: SupabaseAuthClient<KeyringSessionStore>,
}

impl SupabaseAuthService {
    pub fn new(backend: &ResolvedBackend) -> AuthResult<Self> {
        let inner =
            SupabaseAuthClient::new(backend.base_url(), backend.anon_key(), KeyringSessionStore)?;
        Ok(Self { inner })
    }

    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        self.inner.restore_session().await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        self.inner.sign_up(email, password).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        self.inner.sign_in(email, password).await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        self.inner.refresh_session(refresh_token).await
    }

    pub fn activate(&self, session: AuthSession) -> ActiveSession<KeyringSessionStore> {
        self.inner.activate(session)
    }
}

/// Turn raw auth errors into text suitable for the sign-in form.
pub fn format_auth_error_message(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("invalid login credentials") {
        return "Email or password is incorrect.".to_string();
    }
    if lower.contains("email not confirmed") {
        return "Confirm your email address, then sign in.".to_string();
    }
    if lower.contains("error sending request") || lower.contains("connect") {
        return "Could not reach the server. Check your connection.".to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn known_auth_errors_get_friendly_messages() {
        assert_eq!(
            format_auth_error_message("Auth API error: Invalid login credentials"),
            "Email or password is incorrect."
        );
        assert_eq!(
            format_auth_error_message("Auth API error: Email not confirmed"),
            "Confirm your email address, then sign in."
        );
        assert_eq!(
            format_auth_error_message("Auth API error: weak password"),
            "Auth API error: weak password"
        );
    }
}
