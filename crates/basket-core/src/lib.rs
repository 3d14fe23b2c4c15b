//! basket-core - Core library for Basket
//!
//! This crate contains the shared models, the shopping-list state container,
//! and the remote backend used by all Basket interfaces (desktop, CLI).

pub mod auth;
pub mod config;
pub mod error;
pub mod list;
pub mod models;
pub mod remote;
pub mod util;

pub use error::{Error, Result};
pub use list::{Action, ListController, ListState, Mode, Outcome};
pub use models::{Category, Item, ItemId, OwnerId};
