use std::io;

use basket_core::list::SkipReason;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Remote(#[from] basket_core::remote::RemoteError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Item name cannot be empty")]
    EmptyItemName,
    #[error("Item not found: {0}")]
    ItemNotFound(String),
    #[error("{0}")]
    AmbiguousItem(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Skipped: {0}")]
    Skipped(SkipReason),
    #[error("The change was not saved. Run with RUST_LOG=basket=debug for details.")]
    OperationFailed,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Profile '{0}' is not signed in. Run `basket auth login` first.")]
    NotSignedIn(String),
}
