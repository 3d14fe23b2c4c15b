//! Data models for Basket

mod category;
mod item;
mod owner;

pub use category::{Category, CategoryId, BUILTIN_CATEGORIES};
pub use item::{Item, ItemId, ItemPatch};
pub use owner::OwnerId;
