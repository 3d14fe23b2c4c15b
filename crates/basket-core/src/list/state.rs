//! List state container and reducer.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::view::resolve_categories;
use crate::models::{Category, Item, ItemId};

/// Plan mode edits the list; store mode checks items off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Plan,
    Store,
}

impl Mode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Plan => Self::Store,
            Self::Store => Self::Plan,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Store => "store",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    /// Items as last fetched
    pub items: Vec<Item>,
    /// Built-in names followed by the owner's custom names
    pub categories: Vec<String>,
    /// Pending new-item text, keyed by category name
    pub new_item_names: BTreeMap<String, String>,
    /// Collapsed category names
    pub collapsed: BTreeSet<String>,
    pub mode: Mode,
    pub show_category_form: bool,
    pub new_category_name: String,
    pub loading: bool,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            categories: resolve_categories(&[]),
            new_item_names: BTreeMap::new(),
            collapsed: BTreeSet::new(),
            mode: Mode::Plan,
            show_category_form: false,
            new_category_name: String::new(),
            loading: false,
        }
    }
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `self` with `reduce(self, action)`.
    pub fn dispatch(&mut self, action: Action) {
        *self = reduce(std::mem::take(self), action);
    }

    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn new_item_name(&self, category: &str) -> &str {
        self.new_item_names
            .get(category)
            .map_or("", String::as_str)
    }

    pub fn is_collapsed(&self, category: &str) -> bool {
        self.collapsed.contains(category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadStarted,
    LoadFinished,
    ItemsLoaded(Vec<Item>),
    /// Custom categories as fetched; merged with the built-ins.
    CategoriesLoaded(Vec<Category>),
    SetMode(Mode),
    ToggleMode,
    ToggleCollapse(String),
    EditItemName { category: String, text: String },
    ItemAdded { category: String },
    ShowCategoryForm(bool),
    EditCategoryName(String),
    CategoryAdded,
    SignedOut,
}

/// Pure state transition.
#[must_use]
pub fn reduce(mut state: ListState, action: Action) -> ListState {
    match action {
        Action::LoadStarted => state.loading = true,
        Action::LoadFinished => state.loading = false,
        Action::ItemsLoaded(items) => state.items = items,
        Action::CategoriesLoaded(custom) => state.categories = resolve_categories(&custom),
        Action::SetMode(mode) => state.mode = mode,
        Action::ToggleMode => state.mode = state.mode.toggled(),
        Action::ToggleCollapse(category) => {
            if !state.collapsed.remove(&category) {
                state.collapsed.insert(category);
            }
        }
        Action::EditItemName { category, text } => {
            if text.is_empty() {
                state.new_item_names.remove(&category);
            } else {
                state.new_item_names.insert(category, text);
            }
        }
        Action::ItemAdded { category } => {
            state.new_item_names.remove(&category);
        }
        Action::ShowCategoryForm(show) => state.show_category_form = show,
        Action::EditCategoryName(text) => state.new_category_name = text,
        Action::CategoryAdded => {
            state.new_category_name.clear();
            state.show_category_form = false;
        }
        Action::SignedOut => state = ListState::default(),
    }
    state
}
