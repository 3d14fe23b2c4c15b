use std::sync::Arc;

use basket_core::config::ResolvedBackend;
use basket_core::list::{Action, ListController, ListState, Outcome};
use basket_core::models::{Item, ItemId};
use basket_core::remote::SupabaseStore;

use crate::auth::{AuthSession, SupabaseAuthService};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Everything a list command needs: the resolved profile, a live session,
/// and a controller bound to it.
pub struct ListContext {
    pub profile_name: String,
    pub backend: ResolvedBackend,
    pub auth: SupabaseAuthService,
    pub session: AuthSession,
    pub controller: ListController,
}

impl ListContext {
    pub async fn open(global_profile: Option<&str>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(global_profile);
        let backend = resolve_backend(&config, &profile_name)?;

        let auth = SupabaseAuthService::new(&profile_name, &backend)
            .map_err(|error| CliError::Auth(error.to_string()))?;
        let session = auth
            .restore_session()
            .await
            .map_err(|error| CliError::Auth(error.to_string()))?
            .ok_or_else(|| CliError::NotSignedIn(profile_name.clone()))?;

        let store = SupabaseStore::new(backend.clone(), session.access_token.clone())?;
        let controller = ListController::new(Arc::new(store), session.owner());
        tracing::debug!("Opened profile '{}' for {}", profile_name, session.owner());

        Ok(Self {
            profile_name,
            backend,
            auth,
            session,
            controller,
        })
    }

    /// Fetch a fresh snapshot of the list.
    pub async fn load(&self) -> ListState {
        let mut state = ListState::new();
        state.dispatch(Action::LoadStarted);
        state.dispatch_all(self.controller.load().await);
        state
    }
}

pub fn resolve_backend(
    config: &CliProfilesConfig,
    profile_name: &str,
) -> Result<ResolvedBackend, CliError> {
    config.backend_for(profile_name).resolve().map_err(|error| {
        CliError::Config(format!(
            "{error}. Run `basket config init --profile {profile_name}` first."
        ))
    })
}

/// Dispatch an applied outcome, or turn a skip or failure into an error.
pub fn apply_outcome(state: &mut ListState, outcome: Outcome) -> Result<(), CliError> {
    match outcome {
        Outcome::Applied(actions) => {
            state.dispatch_all(actions);
            Ok(())
        }
        Outcome::Skipped(reason) => Err(CliError::Skipped(reason)),
        Outcome::Failed => Err(CliError::OperationFailed),
    }
}

pub fn join_words(parts: &[String]) -> Result<String, CliError> {
    let joined = parts.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyItemName)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Find an item by full id, exact name (ignoring case), or unique id prefix.
pub fn resolve_item<'a>(items: &'a [Item], query: &str) -> Result<&'a Item, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::EmptyItemName);
    }

    if let Ok(id) = query.parse::<ItemId>() {
        if let Some(item) = items.iter().find(|item| item.id == id) {
            return Ok(item);
        }
    }

    let folded = query.to_lowercase();
    let by_name: Vec<&Item> = items
        .iter()
        .filter(|item| item.name.to_lowercase() == folded)
        .collect();
    match by_name.as_slice() {
        [item] => return Ok(*item),
        [] => {}
        matches => return Err(ambiguous(query, matches)),
    }

    let prefix = query.to_ascii_lowercase();
    let by_prefix: Vec<&Item> = items
        .iter()
        .filter(|item| item.id.as_str().starts_with(&prefix))
        .collect();
    match by_prefix.as_slice() {
        [item] => Ok(*item),
        [] => Err(CliError::ItemNotFound(query.to_string())),
        matches => Err(ambiguous(query, matches)),
    }
}

fn ambiguous(query: &str, matches: &[&Item]) -> CliError {
    let options = matches
        .iter()
        .take(3)
        .map(|item| format!("{} ({})", item.name, short_id(item.id)))
        .collect::<Vec<_>>()
        .join(", ");
    CliError::AmbiguousItem(format!(
        "'{query}' matches more than one item: {options}. Use a longer ID prefix."
    ))
}

/// Canonical category name for user input.
///
/// Exact match wins; otherwise a unique case-insensitive match is accepted.
pub fn resolve_category<'a>(state: &'a ListState, input: &str) -> Result<&'a str, CliError> {
    let input = input.trim();
    if let Some(category) = state.categories.iter().find(|name| name.as_str() == input) {
        return Ok(category.as_str());
    }

    let folded = input.to_lowercase();
    let mut matches = state
        .categories
        .iter()
        .filter(|name| name.to_lowercase() == folded);
    match (matches.next(), matches.next()) {
        (Some(category), None) => Ok(category.as_str()),
        _ => Err(CliError::UnknownCategory(input.to_string())),
    }
}

pub fn short_id(id: ItemId) -> String {
    id.as_str().chars().take(8).collect()
}
