//! Sign-in form shown until a session exists

use dioxus::prelude::*;

use crate::services::{format_auth_error_message, SignUpOutcome};
use crate::state::AppState;

#[component]
pub fn SignIn() -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let busy = use_signal(|| false);
    let message = use_signal(|| None::<String>);

    let configured = state.auth_service.read().is_some();
    let init_error = (state.error_message)();

    let submit = move |sign_up: bool| {
        let mut busy_signal = busy;
        let mut message_signal = message;
        let mut password_signal = password;

        let Some(service) = state.auth_service.read().clone() else {
            message_signal.set(Some(
                "Supabase auth is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY."
                    .to_string(),
            ));
            return;
        };
        if busy() {
            return;
        }
        let email_value = email().trim().to_string();
        let password_value = password();
        if email_value.is_empty() || password_value.trim().is_empty() {
            message_signal.set(Some("Email and password are required.".to_string()));
            return;
        }

        busy_signal.set(true);
        message_signal.set(None);
        spawn(async move {
            let result = if sign_up {
                service
                    .sign_up(&email_value, &password_value)
                    .await
                    .map(|outcome| match outcome {
                        SignUpOutcome::SignedIn(session) => Some(session),
                        SignUpOutcome::ConfirmationRequired => None,
                    })
            } else {
                service.sign_in(&email_value, &password_value).await.map(Some)
            };
            busy_signal.set(false);

            match result {
                Ok(Some(session)) => {
                    password_signal.set(String::new());
                    state.start_session(session);
                }
                Ok(None) => message_signal.set(Some(
                    "Check your email for a confirmation link, then sign in.".to_string(),
                )),
                Err(error) => {
                    tracing::error!("Authentication failed: {}", error);
                    message_signal.set(Some(format_auth_error_message(&error.to_string())));
                }
            }
        });
    };

    let input_style = format!(
        "padding: 10px 12px; border: 1px solid {}; border-radius: 8px; \
         background: {}; color: {}; font-size: 14px;",
        colors.border, colors.bg_primary, colors.text_primary
    );

    rsx! {
        div {
            class: "sign-in",
            style: "
                max-width: 360px;
                margin: 96px auto 0;
                padding: 32px;
                display: flex;
                flex-direction: column;
                gap: 12px;
                background: {colors.bg_secondary};
                border: 1px solid {colors.border};
                border-radius: 12px;
            ",

            h1 {
                style: "margin: 0 0 8px; font-size: 22px; color: {colors.text_primary};",
                "Basket"
            }

            if configured {
                input {
                    r#type: "email",
                    placeholder: "Email",
                    style: "{input_style}",
                    value: "{email}",
                    disabled: busy(),
                    oninput: move |event: FormEvent| email.set(event.value()),
                }
                input {
                    r#type: "password",
                    placeholder: "Password",
                    style: "{input_style}",
                    value: "{password}",
                    disabled: busy(),
                    oninput: move |event: FormEvent| password.set(event.value()),
                    onkeydown: move |event: KeyboardEvent| {
                        if event.key() == Key::Enter {
                            submit(false);
                        }
                    },
                }
                div {
                    style: "display: flex; gap: 8px;",
                    button {
                        style: "
                            flex: 1;
                            padding: 10px;
                            border: none;
                            border-radius: 8px;
                            cursor: pointer;
                            background: {colors.accent};
                            color: {colors.accent_text};
                        ",
                        disabled: busy(),
                        onclick: move |_| submit(false),
                        "Sign In"
                    }
                    button {
                        style: "
                            flex: 1;
                            padding: 10px;
                            border: 1px solid {colors.border};
                            border-radius: 8px;
                            cursor: pointer;
                            background: transparent;
                            color: {colors.text_primary};
                        ",
                        disabled: busy(),
                        onclick: move |_| submit(true),
                        "Sign Up"
                    }
                }
            }

            if busy() {
                div {
                    style: "font-size: 13px; color: {colors.text_secondary};",
                    "Working..."
                }
            }

            if let Some(text) = message() {
                div {
                    style: "font-size: 13px; color: {colors.text_secondary};",
                    "{text}"
                }
            }

            if let Some(error_message) = init_error {
                div {
                    style: "font-size: 13px; color: {colors.error};",
                    "{error_message}"
                }
            }
        }
    }
}
