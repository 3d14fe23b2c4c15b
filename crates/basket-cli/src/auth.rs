//! Per-profile Supabase sessions kept in the OS keychain.

use basket_core::auth::{
    ActiveSession, AuthResult, SessionPersistence, SignUpOutcome, SupabaseAuthClient,
};
pub use basket_core::auth::{AuthError, AuthSession};
use basket_core::config::ResolvedBackend;

/// Raw secret storage. Tests swap the keychain for a process-local map.
#[cfg(not(test))]
mod secrets {
    use keyring::Entry;

    use super::AuthError;

    const KEYRING_SERVICE_NAME: &str = "basket-cli";

    fn entry(key: &str) -> Result<Entry, AuthError> {
        Entry::new(KEYRING_SERVICE_NAME, key).map_err(storage_error)
    }

    fn storage_error(error: keyring::Error) -> AuthError {
        AuthError::SecureStorage(error.to_string())
    }

    pub fn read(key: &str) -> Result<Option<String>, AuthError> {
        match entry(key)?.get_password() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(storage_error(error)),
        }
    }

    pub fn write(key: &str, value: &str) -> Result<(), AuthError> {
        entry(key)?.set_password(value).map_err(storage_error)
    }

    pub fn delete(key: &str) -> Result<(), AuthError> {
        match entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(storage_error(error)),
        }
    }
}


/// One keychain entry per profile.
#[derive(Debug, Clone)]
pub struct SessionStore {
    key: String,
}

impl SessionStore {
    fn for_profile(profile_name: &str) -> Self {
        Self {
            key: format!("supabase_session:{profile_name}"),
        }
    }
}

impl SessionPersistence for SessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        secrets::read(&self.key)?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(AuthError::from)
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        secrets::write(&self.key, &serde_json::to_string(session)?)
    }

    fn clear_session(&self) -> AuthResult<()> {
        secrets::delete(&self.key)
    }
}

/// Auth client bound to one profile's backend and keychain entry.
#[derive(Clone)]
pub struct SupabaseAuthService {
    inner: SupabaseAuthClient<SessionStore>,
}

impl SupabaseAuthService {
    pub fn new(profile_name: &str, backend: &ResolvedBackend) -> AuthResult<Self> {
        let store = SessionStore::for_profile(profile_name);
        let inner = SupabaseAuthClient::new(backend.base_url(), backend.anon_key(), store)?;
        Ok(Self { inner })
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        self.inner.sign_up(email, password).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        self.inner.sign_in(email, password).await
    }

    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        self.inner.restore_session().await
    }

    pub fn activate(&self, session: AuthSession) -> ActiveSession<SessionStore> {
        self.inner.activate(session)
    }
}

/// Read a profile's session without contacting the backend.
pub fn load_stored_session(profile_name: &str) -> AuthResult<Option<AuthSession>> {
    SessionStore::for_profile(profile_name).load_session()
}

pub fn clear_stored_session(profile_name: &str) -> AuthResult<()> {
    SessionStore::for_profile(profile_name).clear_session()
}

#[cfg(test)]
mod tests {
    use basket_core::auth::AuthUser;
    use pretty_assertions::assert_eq;

    use super::*;

    fn session(user: &str) -> AuthSession {
        AuthSession {
            access_token: "secret-access-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at: 1_700_000_000,
            user: AuthUser {
                id: user.to_string(),
                email: Some(format!("{user}@example.com")),
            },
        }
    }

    #[test]
    fn sessions_are_kept_per_profile() {
        let home = SessionStore::for_profile("auth-test-home");
        let work = SessionStore::for_profile("auth-test-work");
        home.save_session(&session("home-user")).unwrap();
        work.save_session(&session("work-user")).unwrap();

        let loaded = load_stored_session("auth-test-home").unwrap().unwrap();
        assert_eq!(loaded.user.id, "home-user");

        clear_stored_session("auth-test-home").unwrap();
        assert_eq!(load_stored_session("auth-test-home").unwrap(), None);
        assert!(load_stored_session("auth-test-work").unwrap().is_some());
    }

    #[test]
    fn clearing_missing_session_is_ok() {
        assert!(clear_stored_session("auth-test-never-stored").is_ok());
    }

    #[test]
    fn corrupt_entry_is_a_json_error() {
        secrets::write("supabase_session:auth-test-corrupt", "not json").unwrap();
        assert!(matches!(
            load_stored_session("auth-test-corrupt"),
            Err(AuthError::Json(_))
        ));
    }
}
