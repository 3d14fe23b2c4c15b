//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::OwnerId;

/// Category names every owner sees, in display order, whether or not they
/// have stored categories of their own.
pub const BUILTIN_CATEGORIES: &[&str] = &[
    "Produce",
    "Dairy",
    "Meat & Seafood",
    "Bakery",
    "Pantry",
    "Frozen",
    "Beverages",
    "Household",
    "Other",
];

/// A unique identifier for a category row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(Uuid);

impl CategoryId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user-created category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,
    /// Category name, compared exactly (case-sensitive)
    pub name: String,
    /// Owning user
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    /// Creation timestamp; custom categories are listed in this order
    pub created_at: DateTime<Utc>,
}

impl Category {
    #[must_use]
    pub fn new(name: impl Into<String>, owner: OwnerId) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            owner,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_are_unique() {
        let mut names = BUILTIN_CATEGORIES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUILTIN_CATEGORIES.len());
    }

    #[test]
    fn test_category_new_keeps_name_as_given() {
        let category = Category::new("Snacks", OwnerId::from("user-1"));
        assert_eq!(category.name, "Snacks");
        assert_eq!(category.owner.as_str(), "user-1");
    }
}
