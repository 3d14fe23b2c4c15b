//! Services for the desktop app

mod auth;

pub use auth::{format_auth_error_message, AuthSession, SignUpOutcome, SupabaseAuthService};
