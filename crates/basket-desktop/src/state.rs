//! Application state management
//!
//! Global state accessible via Dioxus context providers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;

use basket_core::config::ResolvedBackend;
use basket_core::list::{follow_list, Action, ListController, ListState, Outcome};
use basket_core::remote::{RealtimeFeed, SupabaseStore};

use crate::bootstrap_config::load_backend_config;
use crate::services::{AuthSession, SupabaseAuthService};
use crate::theme::ResolvedTheme;

const FEED_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Global application state
#[derive(Clone, Copy)]
pub struct AppState {
    pub theme: Signal<ResolvedTheme>,
    /// Resolved Supabase endpoints, if this build is configured
    pub backend: Signal<Option<ResolvedBackend>>,
    pub auth_service: Signal<Option<SupabaseAuthService>>,
    /// Active auth session, if signed in
    pub session: Signal<Option<AuthSession>>,
    /// Last auth or save error for UI display
    pub error_message: Signal<Option<String>>,
    /// True until the persisted session has been checked
    pub restoring: Signal<bool>,
    pub list: Signal<ListState>,
    /// Bumped whenever an operation leaves the list unchanged, so rows
    /// re-create their inputs instead of keeping what the user clicked.
    pub revision: Signal<u64>,
    pub controller: Signal<Option<ListController>>,
    /// Initial load followed by the change feed loop
    pub live_task: Signal<Option<Task>>,
}

impl AppState {
    /// Must run inside the root component so the signals live as long as the app.
    pub fn new() -> Self {
        let mut error_message = None;
        let backend = match load_backend_config().resolve() {
            Ok(backend) => Some(backend),
            Err(error) => {
                tracing::warn!("Backend unavailable: {}", error);
                error_message = Some(
                    "Supabase is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY."
                        .to_string(),
                );
                None
            }
        };
        let auth_service =
            backend
                .as_ref()
                .and_then(|backend| match SupabaseAuthService::new(backend) {
                    Ok(service) => Some(service),
                    Err(error) => {
                        tracing::error!("Failed to initialize auth: {}", error);
                        error_message = Some(error.to_string());
                        None
                    }
                });
        let restoring = auth_service.is_some();

        Self {
            theme: Signal::new(ResolvedTheme::detect()),
            backend: Signal::new(backend),
            auth_service: Signal::new(auth_service),
            session: Signal::new(None),
            error_message: Signal::new(error_message),
            restoring: Signal::new(restoring),
            list: Signal::new(ListState::new()),
            revision: Signal::new(0),
            controller: Signal::new(None),
            live_task: Signal::new(None),
        }
    }

    pub fn dispatch(mut self, action: Action) {
        self.list.write().dispatch(action);
    }

    pub fn dispatch_all(mut self, actions: Vec<Action>) {
        if !actions.is_empty() {
            self.list.write().dispatch_all(actions);
        }
    }

    pub fn apply(mut self, outcome: Outcome) {
        let revision = *self.revision.peek();
        let next = next_revision(revision, &outcome);
        if next != revision {
            self.revision.set(next);
        }
        match outcome {
            Outcome::Applied(actions) => self.dispatch_all(actions),
            Outcome::Skipped(reason) => tracing::debug!("Skipped list operation: {}", reason),
            Outcome::Failed => self.report_error("The change was not saved. Try again."),
        }
    }

    /// Run a controller operation against a snapshot of the current list.
    ///
    /// Operations outlive the component that started them.
    pub fn perform<F, Fut>(self, operation: F)
    where
        F: FnOnce(ListController, ListState) -> Fut + 'static,
        Fut: Future<Output = Outcome> + 'static,
    {
        let Some(controller) = self.controller.read().clone() else {
            tracing::warn!("Ignoring list operation without a session");
            return;
        };
        let snapshot = self.list.read().clone();
        spawn_forever(async move {
            let outcome = operation(controller, snapshot).await;
            self.apply(outcome);
        });
    }

    /// Bind the list to `session`, load it, and follow remote changes.
    pub fn start_session(mut self, session: AuthSession) {
        let Some(backend) = self.backend.read().clone() else {
            tracing::warn!("Cannot start a session without a backend");
            return;
        };
        let store = match SupabaseStore::new(backend.clone(), session.access_token.clone()) {
            Ok(store) => store,
            Err(error) => {
                tracing::error!("Failed to create remote store: {}", error);
                self.error_message.set(Some(error.to_string()));
                return;
            }
        };

        let owner = session.owner();
        let controller = ListController::new(Arc::new(store), owner.clone());
        let feed = RealtimeFeed::new(backend, session.access_token.clone());
        let renew_in = Duration::from_secs(session.seconds_until_refresh());
        let refresh_token = session.refresh_token.clone();
        tracing::info!("Starting session for {}", owner);

        self.stop_live_updates();
        self.session.set(Some(session));
        self.error_message.set(None);
        self.controller.set(Some(controller.clone()));
        self.dispatch(Action::LoadStarted);

        let task = spawn_forever(async move {
            let follow = follow_list(&feed, &controller, FEED_RETRY_DELAY, move |actions| {
                self.dispatch_all(actions);
            });
            tokio::select! {
                () = follow => {}
                () = tokio::time::sleep(renew_in) => self.renew_session(refresh_token),
            }
        });
        self.live_task.set(task);
    }

    /// Trade the refresh token for a new session and rebind the list to it.
    fn renew_session(self, refresh_token: String) {
        let Some(service) = self.auth_service.read().clone() else {
            return;
        };
        spawn_forever(async move {
            match service.refresh_session(&refresh_token).await {
                Ok(session) => {
                    tracing::debug!("Session refreshed");
                    self.start_session(session);
                }
                Err(error) => {
                    tracing::warn!("Session refresh failed: {}", error);
                    self.end_session(vec![Action::SignedOut]);
                    self.report_error("Your session expired. Sign in again.");
                }
            }
        });
    }

    pub fn sign_out(mut self) {
        let controller = self.controller.read().clone();
        let service = self.auth_service.read().clone();
        let session = self.session.read().clone();
        let (Some(controller), Some(service), Some(session)) = (controller, service, session)
        else {
            self.end_session(vec![Action::SignedOut]);
            return;
        };

        spawn_forever(async move {
            let active = service.activate(session);
            match controller.sign_out(&active).await {
                Outcome::Applied(actions) => self.end_session(actions),
                _ => self.report_error("Sign out failed. Try again."),
            }
        });
    }

    fn end_session(mut self, actions: Vec<Action>) {
        self.stop_live_updates();
        self.controller.set(None);
        self.session.set(None);
        self.dispatch_all(actions);
        tracing::info!("Signed out");
    }

    fn stop_live_updates(mut self) {
        if let Some(task) = self.live_task.take() {
            task.cancel();
        }
    }

    fn report_error(mut self, message: &str) {
        self.error_message.set(Some(message.to_string()));
    }
}

/// Any outcome that leaves the list as it was moves the revision on.
const fn next_revision(current: u64, outcome: &Outcome) -> u64 {
    match outcome {
        Outcome::Applied(_) => current,
        Outcome::Skipped(_) | Outcome::Failed => current.wrapping_add(1),
    }
}

#[cfg(test)]
mod tests {
    use basket_core::list::SkipReason;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unchanged_outcomes_bump_the_revision() {
        assert_eq!(next_revision(4, &Outcome::Failed), 5);
        assert_eq!(next_revision(4, &Outcome::Skipped(SkipReason::NotNeeded)), 5);
        assert_eq!(next_revision(4, &Outcome::Applied(Vec::new())), 4);
        assert_eq!(next_revision(u64::MAX, &Outcome::Failed), 0);
    }
}
