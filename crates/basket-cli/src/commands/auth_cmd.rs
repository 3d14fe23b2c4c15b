use basket_core::auth::SignUpOutcome;
use basket_core::list::ListState;

use crate::auth::{clear_stored_session, load_stored_session, SupabaseAuthService};
use crate::cli::AuthCommands;
use crate::commands::common::{apply_outcome, resolve_backend, ListContext};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Signup { email, password } => {
            let (profile_name, auth_service) = auth_service(global_profile)?;
            let outcome = auth_service
                .sign_up(&email, &password)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            match outcome {
                SignUpOutcome::SignedIn(session) => {
                    let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                    println!("Signed up and signed in profile '{profile_name}' as {email_label}");
                }
                SignUpOutcome::ConfirmationRequired => {
                    println!("Check {email} for a confirmation link, then run `basket auth login`.");
                }
            }
            Ok(())
        }
        AuthCommands::Login { email, password } => {
            let (profile_name, auth_service) = auth_service(global_profile)?;
            let session = auth_service
                .sign_in(&email, &password)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!("Signed in profile '{profile_name}' as {email_label}");
            Ok(())
        }
        AuthCommands::Status => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(global_profile);
            let session = match resolve_backend(&config, &profile_name) {
                Ok(backend) => SupabaseAuthService::new(&profile_name, &backend)
                    .map_err(|error| CliError::Auth(error.to_string()))?
                    .restore_session()
                    .await
                    .map_err(|error| CliError::Auth(error.to_string()))?,
                Err(_) => load_stored_session(&profile_name)
                    .map_err(|error| CliError::Auth(error.to_string()))?,
            };

            if let Some(session) = session {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                println!(
                    "Profile '{}' is signed in as {} (expires_at={})",
                    profile_name, email_label, session.expires_at
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            match ListContext::open(global_profile).await {
                Ok(context) => {
                    let active = context.auth.activate(context.session.clone());
                    let mut state = ListState::new();
                    let outcome = context.controller.sign_out(&active).await;
                    apply_outcome(&mut state, outcome)?;
                    println!("Signed out profile '{}'", context.profile_name);
                }
                Err(CliError::NotSignedIn(profile_name)) => {
                    println!("Profile '{profile_name}' is not signed in.");
                }
                Err(error) => {
                    tracing::debug!("Clearing local session without remote sign-out: {}", error);
                    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
                    let profile_name = config.resolve_profile_name(global_profile);
                    clear_stored_session(&profile_name)
                        .map_err(|error| CliError::Auth(error.to_string()))?;
                    println!("Signed out profile '{profile_name}'");
                }
            }
            Ok(())
        }
    }
}

fn auth_service(global_profile: Option<&str>) -> Result<(String, SupabaseAuthService), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let backend = resolve_backend(&config, &profile_name)?;
    let service = SupabaseAuthService::new(&profile_name, &backend)
        .map_err(|error| CliError::Auth(error.to_string()))?;
    Ok((profile_name, service))
}
