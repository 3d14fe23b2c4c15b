//! Remote effects for list operations.
//!
//! Every operation validates against a snapshot of [`ListState`], issues one
//! remote call, re-fetches the affected collection on success, and returns the
//! actions the caller should dispatch. Failures are logged and produce no
//! actions, so state stays as it was. Nothing is applied optimistically.

use std::fmt;
use std::sync::Arc;

use super::state::{Action, ListState, Mode};
use crate::auth::SignOut;
use crate::models::{Category, Item, ItemId, ItemPatch, OwnerId};
use crate::remote::{Collection, RemoteStore};

/// Result of a list operation.
#[derive(Debug)]
pub enum Outcome {
    /// The remote call succeeded; dispatch these to converge.
    Applied(Vec<Action>),
    /// A precondition failed and no remote call was made.
    Skipped(SkipReason),
    /// The remote call failed and was logged; state is unchanged.
    Failed,
}

impl Outcome {
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn into_actions(self) -> Vec<Action> {
        match self {
            Self::Applied(actions) => actions,
            Self::Skipped(_) | Self::Failed => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyName,
    DuplicateCategory,
    UnknownItem,
    /// Store mode only acts on items that are on the list.
    NotNeeded,
    WrongMode(Mode),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => f.write_str("name is empty"),
            Self::DuplicateCategory => f.write_str("category already exists"),
            Self::UnknownItem => f.write_str("item not found"),
            Self::NotNeeded => f.write_str("item is not on the shopping list"),
            Self::WrongMode(mode) => write!(f, "not available in {} mode", mode.label()),
        }
    }
}

/// Effect runner for one signed-in owner.
///
/// Holds no list state of its own, so clones can be moved into tasks freely.
#[derive(Clone)]
pub struct ListController {
    store: Arc<dyn RemoteStore>,
    owner: OwnerId,
}

impl ListController {
    pub fn new(store: Arc<dyn RemoteStore>, owner: OwnerId) -> Self {
        Self { store, owner }
    }

    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Fetch both collections concurrently.
    ///
    /// Dispatch [`Action::LoadStarted`] before awaiting this. The returned
    /// actions always end with [`Action::LoadFinished`]; a failed fetch
    /// degrades to no items or built-in categories only.
    pub async fn load(&self) -> Vec<Action> {
        let (items, categories) = tokio::join!(
            self.store.fetch_items(&self.owner),
            self.store.fetch_categories(&self.owner)
        );

        let items = items.unwrap_or_else(|error| {
            tracing::error!("Failed to load items: {}", error);
            Vec::new()
        });
        let categories = categories.unwrap_or_else(|error| {
            tracing::error!("Failed to load categories: {}", error);
            Vec::new()
        });
        tracing::info!(
            "Loaded {} items and {} custom categories",
            items.len(),
            categories.len()
        );

        vec![
            Action::ItemsLoaded(items),
            Action::CategoriesLoaded(categories),
            Action::LoadFinished,
        ]
    }

    /// Re-fetch one collection. Empty when the fetch fails.
    pub async fn refresh(&self, collection: Collection) -> Vec<Action> {
        let action = match collection {
            Collection::Items => self
                .store
                .fetch_items(&self.owner)
                .await
                .map(Action::ItemsLoaded),
            Collection::Categories => self
                .store
                .fetch_categories(&self.owner)
                .await
                .map(Action::CategoriesLoaded),
        };

        match action {
            Ok(action) => vec![action],
            Err(error) => {
                tracing::error!("Failed to refresh {}: {}", collection, error);
                Vec::new()
            }
        }
    }

    pub async fn add_category(&self, state: &ListState) -> Outcome {
        if state.mode != Mode::Plan {
            return Outcome::Skipped(SkipReason::WrongMode(state.mode));
        }
        let name = state.new_category_name.trim();
        if name.is_empty() {
            return Outcome::Skipped(SkipReason::EmptyName);
        }
        if state.categories.iter().any(|existing| existing == name) {
            return Outcome::Skipped(SkipReason::DuplicateCategory);
        }

        let category = Category::new(name, self.owner.clone());
        if let Err(error) = self.store.insert_category(&category).await {
            tracing::error!("Failed to add category '{}': {}", name, error);
            return Outcome::Failed;
        }
        tracing::info!("Added category '{}'", name);

        let mut actions = self.refresh(Collection::Categories).await;
        actions.push(Action::CategoryAdded);
        Outcome::Applied(actions)
    }

    /// Add the pending item typed for `category`.
    pub async fn add_item(&self, state: &ListState, category: &str) -> Outcome {
        if state.mode != Mode::Plan {
            return Outcome::Skipped(SkipReason::WrongMode(state.mode));
        }
        let name = state.new_item_name(category).trim();
        if name.is_empty() {
            return Outcome::Skipped(SkipReason::EmptyName);
        }

        let item = Item::new(name, category, self.owner.clone());
        if let Err(error) = self.store.insert_item(&item).await {
            tracing::error!("Failed to add item '{}': {}", name, error);
            return Outcome::Failed;
        }
        tracing::info!("Added item '{}' to {}", name, category);

        let mut actions = self.refresh(Collection::Items).await;
        actions.push(Action::ItemAdded {
            category: category.to_string(),
        });
        Outcome::Applied(actions)
    }

    /// Flip `needed` based on the last fetched value.
    pub async fn toggle_needed(&self, state: &ListState, id: ItemId) -> Outcome {
        if state.mode != Mode::Plan {
            return Outcome::Skipped(SkipReason::WrongMode(state.mode));
        }
        let Some(item) = state.item(id) else {
            return Outcome::Skipped(SkipReason::UnknownItem);
        };
        self.update(id, ItemPatch::needed(!item.needed)).await
    }

    /// Flip `bought` based on the last fetched value. Only needed items
    /// appear in store mode, so only they can be bought.
    pub async fn toggle_bought(&self, state: &ListState, id: ItemId) -> Outcome {
        if state.mode != Mode::Store {
            return Outcome::Skipped(SkipReason::WrongMode(state.mode));
        }
        let Some(item) = state.item(id) else {
            return Outcome::Skipped(SkipReason::UnknownItem);
        };
        if !item.needed {
            return Outcome::Skipped(SkipReason::NotNeeded);
        }
        self.update(id, ItemPatch::bought(!item.bought)).await
    }

    pub async fn delete_item(&self, state: &ListState, id: ItemId) -> Outcome {
        if state.mode != Mode::Plan {
            return Outcome::Skipped(SkipReason::WrongMode(state.mode));
        }
        if let Err(error) = self.store.delete_item(&self.owner, id).await {
            tracing::error!("Failed to delete item {}: {}", id, error);
            return Outcome::Failed;
        }
        tracing::info!("Deleted item {}", id);
        Outcome::Applied(self.refresh(Collection::Items).await)
    }

    /// Clear both flags on every item and go back to plan mode.
    pub async fn reset_shopping(&self) -> Outcome {
        if let Err(error) = self
            .store
            .update_all_items(&self.owner, ItemPatch::cleared())
            .await
        {
            tracing::error!("Failed to reset shopping list: {}", error);
            return Outcome::Failed;
        }
        tracing::info!("Reset shopping list");

        let mut actions = self.refresh(Collection::Items).await;
        actions.push(Action::SetMode(Mode::Plan));
        Outcome::Applied(actions)
    }

    pub async fn sign_out(&self, session: &dyn SignOut) -> Outcome {
        if let Err(error) = session.sign_out().await {
            tracing::error!("Failed to sign out: {}", error);
            return Outcome::Failed;
        }
        tracing::info!("Signed out {}", self.owner);
        Outcome::Applied(vec![Action::SignedOut])
    }

    async fn update(&self, id: ItemId, patch: ItemPatch) -> Outcome {
        if let Err(error) = self.store.update_item(&self.owner, id, patch).await {
            tracing::error!("Failed to update item {}: {}", id, error);
            return Outcome::Failed;
        }
        Outcome::Applied(self.refresh(Collection::Items).await)
    }
}
