//! Remote backend capabilities.
//!
//! The list controller talks to the hosted database through two traits:
//! [`RemoteStore`] for queries and mutations, and [`ChangeFeed`] for
//! owner-scoped change notifications. [`SupabaseStore`] and [`RealtimeFeed`]
//! implement them against a Supabase project; [`MemoryStore`] implements both
//! in-process.

mod memory;
mod realtime;
mod supabase;

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::Stream;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::models::{Category, Item, ItemId, ItemPatch, OwnerId};

pub use memory::{CallCounts, MemoryStore};
pub use realtime::RealtimeFeed;
pub use supabase::SupabaseStore;

/// Every failure reported by the hosted service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid backend configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend API error: {0}")]
    Api(String),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Realtime error: {0}")]
    Realtime(String),
    #[error("Backend unavailable")]
    Unavailable,
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// The two record collections this app stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Items,
    Categories,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Items => f.write_str("items"),
            Self::Categories => f.write_str("categories"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    Other,
}

impl ChangeKind {
    /// Parse the `type` field of a postgres change payload.
    pub fn from_wire(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            _ => Self::Other,
        }
    }
}

/// "Something changed" in one collection. The kind is informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
}

/// Query and mutation capability over items and categories.
///
/// Update and delete always carry the owner as a mandatory row filter.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All items of `owner`, oldest first.
    async fn fetch_items(&self, owner: &OwnerId) -> RemoteResult<Vec<Item>>;

    /// All custom categories of `owner`, oldest first.
    async fn fetch_categories(&self, owner: &OwnerId) -> RemoteResult<Vec<Category>>;

    async fn insert_item(&self, item: &Item) -> RemoteResult<()>;

    async fn insert_category(&self, category: &Category) -> RemoteResult<()>;

    async fn update_item(&self, owner: &OwnerId, id: ItemId, patch: ItemPatch)
        -> RemoteResult<()>;

    /// Apply `patch` to every item of `owner`.
    async fn update_all_items(&self, owner: &OwnerId, patch: ItemPatch) -> RemoteResult<()>;

    async fn delete_item(&self, owner: &OwnerId, id: ItemId) -> RemoteResult<()>;
}

/// Owner-scoped change notifications.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn subscribe(
        &self,
        collection: Collection,
        owner: &OwnerId,
    ) -> RemoteResult<Subscription>;
}

/// A live subscription to one collection.
///
/// Yields a [`ChangeEvent`] per reported change. Dropping the subscription
/// (or calling [`Subscription::unsubscribe`]) releases it.
#[derive(Debug)]
pub struct Subscription {
    collection: Collection,
    events: mpsc::UnboundedReceiver<ChangeEvent>,
    cancel: Option<oneshot::Sender<()>>,
}

impl Subscription {
    pub const fn new(
        collection: Collection,
        events: mpsc::UnboundedReceiver<ChangeEvent>,
        cancel: Option<oneshot::Sender<()>>,
    ) -> Self {
        Self {
            collection,
            events,
            cancel,
        }
    }

    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Wait for the next change. `None` once the feed has closed.
    pub async fn next_change(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.events.close();
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl Stream for Subscription {
    type Item = ChangeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_kind_parses_wire_names() {
        assert_eq!(ChangeKind::from_wire("INSERT"), ChangeKind::Insert);
        assert_eq!(ChangeKind::from_wire("update"), ChangeKind::Update);
        assert_eq!(ChangeKind::from_wire("DELETE"), ChangeKind::Delete);
        assert_eq!(ChangeKind::from_wire("TRUNCATE"), ChangeKind::Other);
    }

    #[tokio::test]
    async fn dropping_subscription_signals_cancel() {
        let (_events_tx, events_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let subscription = Subscription::new(Collection::Items, events_rx, Some(cancel_tx));

        drop(subscription);
        assert!(cancel_rx.await.is_ok());
    }

    #[tokio::test]
    async fn subscription_yields_sent_events() {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut subscription = Subscription::new(Collection::Categories, events_rx, None);
        let event = ChangeEvent {
            collection: Collection::Categories,
            kind: ChangeKind::Insert,
        };

        events_tx.send(event).unwrap();
        drop(events_tx);

        assert_eq!(subscription.next_change().await, Some(event));
        assert_eq!(subscription.next_change().await, None);
    }
}
