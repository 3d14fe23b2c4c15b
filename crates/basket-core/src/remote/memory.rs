//! In-process backend.
//!
//! Implements [`RemoteStore`] and [`ChangeFeed`] over plain vectors, counts
//! every call it receives, and can be switched into a failing mode. Mutations
//! notify matching subscribers the way the hosted change feed would.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    ChangeEvent, ChangeFeed, ChangeKind, Collection, RemoteError, RemoteResult, RemoteStore,
    Subscription,
};
use crate::models::{Category, Item, ItemId, ItemPatch, OwnerId};

/// Number of calls received per operation, failed ones included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch_items: usize,
    pub fetch_categories: usize,
    pub insert_item: usize,
    pub insert_category: usize,
    pub update_item: usize,
    pub update_all_items: usize,
    pub delete_item: usize,
}

impl CallCounts {
    /// Calls that would have written to the backend.
    pub const fn mutations(&self) -> usize {
        self.insert_item
            + self.insert_category
            + self.update_item
            + self.update_all_items
            + self.delete_item
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<Item>,
    categories: Vec<Category>,
    subscribers: Vec<Subscriber>,
    calls: CallCounts,
    failing: bool,
}

#[derive(Debug)]
struct Subscriber {
    collection: Collection,
    owner: OwnerId,
    events: mpsc::UnboundedSender<ChangeEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an item without counting a call or notifying anyone.
    pub fn seed_item(&self, item: Item) {
        self.state().items.push(item);
    }

    /// Store a category without counting a call or notifying anyone.
    pub fn seed_category(&self, category: Category) {
        self.state().categories.push(category);
    }

    pub fn items(&self) -> Vec<Item> {
        self.state().items.clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.state().categories.clone()
    }

    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    /// While failing, every operation is counted and then rejected.
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Subscriptions whose receiving side is still alive.
    pub fn active_subscriptions(&self) -> usize {
        let mut state = self.state();
        state
            .subscribers
            .retain(|subscriber| !subscriber.events.is_closed());
        state.subscribers.len()
    }

    /// End every subscription to `collection`, the way a dropped socket would.
    pub fn close_subscriptions(&self, collection: Collection) {
        self.state()
            .subscribers
            .retain(|subscriber| subscriber.collection != collection);
    }

    /// Report a change made by another client.
    pub fn notify(&self, collection: Collection, owner: &OwnerId, kind: ChangeKind) {
        self.state().notify(collection, owner, kind);
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn call(&self, count: impl FnOnce(&mut CallCounts)) -> RemoteResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.state();
        count(&mut state.calls);
        if state.failing {
            return Err(RemoteError::Unavailable);
        }
        Ok(state)
    }
}

impl MemoryState {
    fn notify(&mut self, collection: Collection, owner: &OwnerId, kind: ChangeKind) {
        self.subscribers.retain(|subscriber| {
            if subscriber.collection != collection || &subscriber.owner != owner {
                return !subscriber.events.is_closed();
            }
            subscriber
                .events
                .send(ChangeEvent { collection, kind })
                .is_ok()
        });
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn fetch_items(&self, owner: &OwnerId) -> RemoteResult<Vec<Item>> {
        let state = self.call(|calls| calls.fetch_items += 1)?;
        let mut items: Vec<Item> = state
            .items
            .iter()
            .filter(|item| &item.owner == owner)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.created_at);
        Ok(items)
    }

    async fn fetch_categories(&self, owner: &OwnerId) -> RemoteResult<Vec<Category>> {
        let state = self.call(|calls| calls.fetch_categories += 1)?;
        let mut categories: Vec<Category> = state
            .categories
            .iter()
            .filter(|category| &category.owner == owner)
            .cloned()
            .collect();
        categories.sort_by_key(|category| category.created_at);
        Ok(categories)
    }

    async fn insert_item(&self, item: &Item) -> RemoteResult<()> {
        let mut state = self.call(|calls| calls.insert_item += 1)?;
        if state.items.iter().any(|existing| existing.id == item.id) {
            return Err(RemoteError::Api(format!("duplicate item id {}", item.id)));
        }
        state.items.push(item.clone());
        state.notify(Collection::Items, &item.owner, ChangeKind::Insert);
        Ok(())
    }

    async fn insert_category(&self, category: &Category) -> RemoteResult<()> {
        let mut state = self.call(|calls| calls.insert_category += 1)?;
        state.categories.push(category.clone());
        state.notify(Collection::Categories, &category.owner, ChangeKind::Insert);
        Ok(())
    }

    async fn update_item(
        &self,
        owner: &OwnerId,
        id: ItemId,
        patch: ItemPatch,
    ) -> RemoteResult<()> {
        let mut state = self.call(|calls| calls.update_item += 1)?;
        let mut touched = false;
        for item in state
            .items
            .iter_mut()
            .filter(|item| item.id == id && &item.owner == owner)
        {
            patch.apply(item);
            touched = true;
        }
        if touched {
            state.notify(Collection::Items, owner, ChangeKind::Update);
        }
        Ok(())
    }

    async fn update_all_items(&self, owner: &OwnerId, patch: ItemPatch) -> RemoteResult<()> {
        let mut state = self.call(|calls| calls.update_all_items += 1)?;
        for item in state.items.iter_mut().filter(|item| &item.owner == owner) {
            patch.apply(item);
        }
        state.notify(Collection::Items, owner, ChangeKind::Update);
        Ok(())
    }

    async fn delete_item(&self, owner: &OwnerId, id: ItemId) -> RemoteResult<()> {
        let mut state = self.call(|calls| calls.delete_item += 1)?;
        let before = state.items.len();
        state
            .items
            .retain(|item| !(item.id == id && &item.owner == owner));
        if state.items.len() != before {
            state.notify(Collection::Items, owner, ChangeKind::Delete);
        }
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for MemoryStore {
    async fn subscribe(
        &self,
        collection: Collection,
        owner: &OwnerId,
    ) -> RemoteResult<Subscription> {
        let mut state = self.state();
        if state.failing {
            return Err(RemoteError::Unavailable);
        }
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        state.subscribers.push(Subscriber {
            collection,
            owner: owner.clone(),
            events: events_tx,
        });
        Ok(Subscription::new(collection, events_rx, None))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn owner(id: &str) -> OwnerId {
        OwnerId::from(id)
    }

    #[tokio::test]
    async fn fetch_is_scoped_to_owner() {
        let store = MemoryStore::new();
        store.seed_item(Item::new("Milk", "Dairy", owner("alice")));
        store.seed_item(Item::new("Beer", "Beverages", owner("bob")));

        let items = store.fetch_items(&owner("alice")).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Milk");
        assert_eq!(store.calls().fetch_items, 1);
    }

    #[tokio::test]
    async fn update_and_delete_ignore_other_owners() {
        let store = MemoryStore::new();
        let foreign = Item::new("Beer", "Beverages", owner("bob"));
        let foreign_id = foreign.id;
        store.seed_item(foreign);

        store
            .update_item(&owner("alice"), foreign_id, ItemPatch::needed(true))
            .await
            .unwrap();
        store.delete_item(&owner("alice"), foreign_id).await.unwrap();
        store
            .update_all_items(&owner("alice"), ItemPatch::needed(true))
            .await
            .unwrap();

        let items = store.items();
        assert_eq!(items.len(), 1);
        assert!(!items[0].needed);
    }

    #[tokio::test]
    async fn failing_store_counts_and_rejects_calls() {
        let store = MemoryStore::new();
        store.set_failing(true);

        let result = store
            .insert_item(&Item::new("Milk", "Dairy", owner("alice")))
            .await;
        assert!(matches!(result, Err(RemoteError::Unavailable)));
        assert_eq!(store.calls().insert_item, 1);
        assert!(store.items().is_empty());
    }

    #[tokio::test]
    async fn mutations_notify_matching_subscribers_only() {
        let store = MemoryStore::new();
        let mut items = store
            .subscribe(Collection::Items, &owner("alice"))
            .await
            .unwrap();
        let mut categories = store
            .subscribe(Collection::Categories, &owner("alice"))
            .await
            .unwrap();
        let mut other_owner = store
            .subscribe(Collection::Items, &owner("bob"))
            .await
            .unwrap();

        store
            .insert_item(&Item::new("Milk", "Dairy", owner("alice")))
            .await
            .unwrap();

        assert_eq!(
            items.next_change().await,
            Some(ChangeEvent {
                collection: Collection::Items,
                kind: ChangeKind::Insert,
            })
        );
        assert!(categories.events_pending_is_empty());
        assert!(other_owner.events_pending_is_empty());
    }

    #[tokio::test]
    async fn dropped_subscriptions_are_released() {
        let store = MemoryStore::new();
        let first = store
            .subscribe(Collection::Items, &owner("alice"))
            .await
            .unwrap();
        let second = store
            .subscribe(Collection::Categories, &owner("alice"))
            .await
            .unwrap();
        assert_eq!(store.active_subscriptions(), 2);

        drop(first);
        second.unsubscribe();
        assert_eq!(store.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn closed_subscriptions_end_their_stream() {
        let store = MemoryStore::new();
        let mut items = store
            .subscribe(Collection::Items, &owner("alice"))
            .await
            .unwrap();
        let _categories = store
            .subscribe(Collection::Categories, &owner("alice"))
            .await
            .unwrap();

        store.close_subscriptions(Collection::Items);
        assert_eq!(items.next_change().await, None);
        assert_eq!(store.active_subscriptions(), 1);
    }

    impl Subscription {
        fn events_pending_is_empty(&mut self) -> bool {
            self.events.try_recv().is_err()
        }
    }
}
