//! Item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::OwnerId;

/// A unique identifier for an item, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Create a new unique item ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A shopping-list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Name of the category this item is filed under
    pub category: String,
    /// On the list for the next trip
    pub needed: bool,
    /// Picked up during the current trip
    pub bought: bool,
    /// Owning user
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    /// Creation timestamp; only used to order fetches
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Create a new item that is neither needed nor bought
    #[must_use]
    pub fn new(name: impl Into<String>, category: impl Into<String>, owner: OwnerId) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            category: category.into(),
            needed: false,
            bought: false,
            owner,
            created_at: Utc::now(),
        }
    }
}

/// Partial update for an item row.
///
/// Unset fields are left out of the serialized body so the backend keeps
/// their stored values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bought: Option<bool>,
}

impl ItemPatch {
    #[must_use]
    pub const fn needed(value: bool) -> Self {
        Self {
            needed: Some(value),
            bought: None,
        }
    }

    #[must_use]
    pub const fn bought(value: bool) -> Self {
        Self {
            needed: None,
            bought: Some(value),
        }
    }

    /// Patch used when a shopping trip is reset.
    #[must_use]
    pub const fn cleared() -> Self {
        Self {
            needed: Some(false),
            bought: Some(false),
        }
    }

    pub fn apply(&self, item: &mut Item) {
        if let Some(needed) = self.needed {
            item.needed = needed;
        }
        if let Some(bought) = self.bought {
            item.bought = bought;
        }
    }
}
