use basket_core::config::BackendConfig;
use basket_core::remote::Collection;
use basket_core::util::is_http_url;

use crate::cli::ConfigCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            supabase_url,
            supabase_anon_key,
            items_table,
            categories_table,
            no_activate,
        } => run_config_init(
            global_profile,
            BackendConfig {
                supabase_url,
                supabase_anon_key,
                items_table,
                categories_table,
            },
            no_activate,
        ),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    explicit: BackendConfig,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    let update = explicit.with_fallback(BackendConfig::from_env());
    validate_profile(&update)?;
    let profile = config.update_profile(&profile_name, update);
    let missing = missing_fields(profile);

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    tracing::info!("Saved profile '{}' to {}", profile_name, path.display());
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    if missing.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `basket auth login --email <email> --password <password>`."
        );
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing.join(", ")
        );
    }

    Ok(())
}

fn run_config_show(global_profile: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let backend = config.backend_for(&profile_name);

    println!("profile: {profile_name}");
    match backend.resolve() {
        Ok(resolved) => {
            println!("supabase_url: {}", resolved.base_url());
            println!("items_table: {}", resolved.table(Collection::Items));
            println!("categories_table: {}", resolved.table(Collection::Categories));
        }
        Err(error) => println!("not configured: {error}"),
    }
    Ok(())
}

fn validate_profile(profile: &BackendConfig) -> Result<(), CliError> {
    if let Some(url) = profile.supabase_url.as_deref() {
        if !is_http_url(url) {
            return Err(CliError::Config(
                "supabase_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}

fn missing_fields(profile: &BackendConfig) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.supabase_url.is_none() {
        missing.push("supabase_url");
    }
    if profile.supabase_anon_key.is_none() {
        missing.push("supabase_anon_key");
    }
    missing
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn profile_urls_must_be_http() {
        let profile = BackendConfig {
            supabase_url: Some("project.supabase.co".to_string()),
            ..BackendConfig::default()
        };
        assert!(matches!(validate_profile(&profile), Err(CliError::Config(_))));

        let profile = BackendConfig {
            supabase_url: Some("https://project.supabase.co".to_string()),
            ..BackendConfig::default()
        };
        assert!(validate_profile(&profile).is_ok());
    }

    #[test]
    fn missing_fields_lists_unset_credentials() {
        let profile = BackendConfig {
            supabase_url: Some("https://project.supabase.co".to_string()),
            ..BackendConfig::default()
        };
        assert_eq!(missing_fields(&profile), vec!["supabase_anon_key"]);
        assert_eq!(
            missing_fields(&BackendConfig::default()),
            vec!["supabase_url", "supabase_anon_key"]
        );
    }
}
