//! Main application component

use dioxus::prelude::*;

use crate::components::{ListView, SignIn};
use crate::services::format_auth_error_message;
use crate::state::AppState;

/// Root application component
#[component]
pub fn App() -> Element {
    let state = use_context_provider(AppState::new);

    // Restore the persisted session once
    use_future(move || async move {
        let mut restoring = state.restoring;
        let mut error_message = state.error_message;
        let Some(service) = state.auth_service.read().clone() else {
            restoring.set(false);
            return;
        };

        match service.restore_session().await {
            Ok(Some(session)) => state.start_session(session),
            Ok(None) => tracing::debug!("No persisted session"),
            Err(error) => {
                tracing::warn!("Failed to restore session: {}", error);
                error_message.set(Some(format_auth_error_message(&error.to_string())));
            }
        }
        restoring.set(false);
    });

    let colors = (state.theme)().palette();
    let signed_in = state.session.read().is_some();

    rsx! {
        div {
            class: "app-container",
            style: "
                min-height: 100vh;
                font-family: system-ui, -apple-system, sans-serif;
                font-size: 14px;
                background: {colors.bg_primary};
                color: {colors.text_primary};
            ",

            if (state.restoring)() {
                div {
                    style: "padding: 96px 0; text-align: center; color: {colors.text_muted};",
                    "Restoring session..."
                }
            } else if signed_in {
                ListView {}
            } else {
                SignIn {}
            }
        }
    }
}
