//! Derived views over [`ListState`].
//!
//! Nothing here is cached; front ends call these on every render.

use std::fmt;

use serde::Serialize;

use super::state::{ListState, Mode};
use crate::models::{Category, Item, BUILTIN_CATEGORIES};

/// Shown in store mode when nothing is needed.
pub const EMPTY_STORE_MESSAGE: &str = "Nothing on the list. Switch to plan mode to add items.";

/// Built-in names, then custom names not already present, in the order given.
///
/// Names compare exactly; "snacks" and "Snacks" are different categories.
pub fn resolve_categories(custom: &[Category]) -> Vec<String> {
    let mut names: Vec<String> = BUILTIN_CATEGORIES.iter().map(ToString::to_string).collect();
    for category in custom {
        if !names.contains(&category.name) {
            names.push(category.name.clone());
        }
    }
    names
}

/// Items filed under `category`, sorted by name ignoring case.
///
/// In store mode only needed items are returned.
pub fn items_for_category<'a>(items: &'a [Item], category: &str, mode: Mode) -> Vec<&'a Item> {
    let mut matching: Vec<&Item> = items
        .iter()
        .filter(|item| item.category == category)
        .filter(|item| mode == Mode::Plan || item.needed)
        .collect();
    matching.sort_by_cached_key(|item| item.name.to_lowercase());
    matching
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub completed: usize,
    pub total: usize,
}

impl fmt::Display for CategoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.completed, self.total)
    }
}

/// Store mode: bought out of needed. Plan mode: needed out of all.
pub fn category_stats(items: &[Item], category: &str, mode: Mode) -> CategoryStats {
    let filtered = items_for_category(items, category, mode);
    let completed = match mode {
        Mode::Store => filtered.iter().filter(|item| item.bought).count(),
        Mode::Plan => filtered.iter().filter(|item| item.needed).count(),
    };
    CategoryStats {
        completed,
        total: filtered.len(),
    }
}

/// Items still to buy, across all categories.
pub fn needed_count(items: &[Item]) -> usize {
    items
        .iter()
        .filter(|item| item.needed && !item.bought)
        .count()
}

/// Needed items already bought, across all categories.
pub fn bought_count(items: &[Item]) -> usize {
    items.iter().filter(|item| item.needed && item.bought).count()
}

/// Categories to render, in resolved order.
pub fn visible_categories(state: &ListState) -> Vec<&str> {
    state
        .categories
        .iter()
        .map(String::as_str)
        .filter(|category| match state.mode {
            Mode::Plan => true,
            Mode::Store => state
                .items
                .iter()
                .any(|item| item.needed && item.category == *category),
        })
        .collect()
}

pub fn shows_empty_state(state: &ListState) -> bool {
    state.mode == Mode::Store && visible_categories(state).is_empty()
}

/// One rendered category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section<'a> {
    pub category: &'a str,
    pub collapsed: bool,
    pub stats: CategoryStats,
    pub items: Vec<&'a Item>,
}

/// Everything a front end needs to draw the list.
pub fn sections(state: &ListState) -> Vec<Section<'_>> {
    visible_categories(state)
        .into_iter()
        .map(|category| Section {
            category,
            collapsed: state.is_collapsed(category),
            stats: category_stats(&state.items, category, state.mode),
            items: items_for_category(&state.items, category, state.mode),
        })
        .collect()
}
