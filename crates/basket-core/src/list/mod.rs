//! The shopping list component.
//!
//! State lives in [`ListState`] and changes only through [`reduce`].
//! Derived views in [`view`] are pure functions over that state.
//! [`ListController`] turns user intents into remote calls and hands back
//! the actions that converge local state, and [`LiveFeed`] keeps both
//! collections subscribed while an owner is signed in.

mod controller;
mod live;
mod state;
pub mod view;

pub use controller::{ListController, Outcome, SkipReason};
pub use live::{follow_list, LiveFeed};
pub use state::{reduce, Action, ListState, Mode};
