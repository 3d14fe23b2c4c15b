//! Combined change notifications for one owner's list.

use std::time::Duration;

use super::{Action, ListController};
use crate::models::OwnerId;
use crate::remote::{ChangeEvent, ChangeFeed, Collection, RemoteResult, Subscription};

/// Item and category subscriptions for one owner.
///
/// Each event names the collection that changed; pass it to
/// [`ListController::refresh`]. Dropping the feed releases both
/// subscriptions.
pub struct LiveFeed {
    owner: OwnerId,
    items: Subscription,
    categories: Subscription,
}

impl LiveFeed {
    pub async fn connect(feed: &dyn ChangeFeed, owner: &OwnerId) -> RemoteResult<Self> {
        let items = feed.subscribe(Collection::Items, owner).await?;
        let categories = feed.subscribe(Collection::Categories, owner).await?;
        tracing::info!("Watching list changes for {}", owner);

        Ok(Self {
            owner: owner.clone(),
            items,
            categories,
        })
    }

    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Next change on either collection. `None` as soon as one of the two
    /// subscriptions has closed, since the list can no longer be trusted to
    /// follow the backend.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        tokio::select! {
            event = self.items.next_change() => event,
            event = self.categories.next_change() => event,
        }
    }
}

/// Keep one owner's list in step with the backend until the future is dropped.
///
/// Subscribes before the first load, so a change landing in between is
/// either in the fetched rows or delivered as an event. A feed that closes or
/// cannot be opened is reopened after `retry_delay`, and both collections are
/// fetched again to pick up whatever was missed. Reconnects use
/// [`ListController::refresh`], so a failed fetch there keeps the rows already
/// shown.
pub async fn follow_list<F>(
    feed: &dyn ChangeFeed,
    controller: &ListController,
    retry_delay: Duration,
    mut apply: F,
) where
    F: FnMut(Vec<Action>),
{
    let owner = controller.owner().clone();
    let mut reconnecting = false;
    loop {
        let live = LiveFeed::connect(feed, &owner).await;
        if reconnecting {
            apply(controller.refresh(Collection::Items).await);
            apply(controller.refresh(Collection::Categories).await);
        } else {
            apply(controller.load().await);
            reconnecting = true;
        }

        match live {
            Ok(mut live) => {
                while let Some(event) = live.next().await {
                    tracing::debug!("{} changed ({:?})", event.collection, event.kind);
                    apply(controller.refresh(event.collection).await);
                }
                tracing::warn!("Change feed for {} closed, reconnecting", owner);
            }
            Err(error) => tracing::warn!("Live updates unavailable: {}", error),
        }
        tokio::time::sleep(retry_delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    use super::*;
    use crate::list::ListState;
    use crate::models::{Category, Item};
    use crate::remote::{ChangeKind, MemoryStore, RemoteStore};

    fn owner() -> OwnerId {
        OwnerId::from("user-1")
    }

    fn item_names(state: &ListState) -> Vec<&str> {
        state.items.iter().map(|item| item.name.as_str()).collect()
    }

    /// Another device adds Milk right after the category subscription opens.
    struct BusyHousehold {
        store: MemoryStore,
    }

    #[async_trait]
    impl ChangeFeed for BusyHousehold {
        async fn subscribe(
            &self,
            collection: Collection,
            owner: &OwnerId,
        ) -> RemoteResult<Subscription> {
            let subscription = self.store.subscribe(collection, owner).await?;
            if collection == Collection::Categories {
                self.store.seed_item(Item::new("Milk", "Dairy", owner.clone()));
            }
            Ok(subscription)
        }
    }

    #[tokio::test]
    async fn external_change_refreshes_only_that_collection() {
        let store = MemoryStore::new();
        let controller = ListController::new(Arc::new(store.clone()), owner());
        let mut state = ListState::new();
        state.dispatch_all(controller.load().await);
        let mut live = LiveFeed::connect(&store, &owner()).await.unwrap();

        store.seed_category(Category::new("Snacks", owner()));
        store.notify(Collection::Categories, &owner(), ChangeKind::Insert);

        let event = live.next().await.unwrap();
        assert_eq!(event.collection, Collection::Categories);

        let before = store.calls();
        state.dispatch_all(controller.refresh(event.collection).await);
        let after = store.calls();

        assert_eq!(after.fetch_categories, before.fetch_categories + 1);
        assert_eq!(after.fetch_items, before.fetch_items);
        assert_eq!(state.categories.last().map(String::as_str), Some("Snacks"));
    }

    #[tokio::test]
    async fn own_mutations_are_reported_too() {
        let store = MemoryStore::new();
        let mut live = LiveFeed::connect(&store, &owner()).await.unwrap();

        store
            .insert_item(&Item::new("Milk", "Dairy", owner()))
            .await
            .unwrap();

        let event = live.next().await.unwrap();
        assert_eq!(event.collection, Collection::Items);
        assert_eq!(event.kind, ChangeKind::Insert);
    }

    #[tokio::test]
    async fn other_owners_changes_are_not_seen() {
        let store = MemoryStore::new();
        let mut live = LiveFeed::connect(&store, &owner()).await.unwrap();

        store.notify(Collection::Items, &OwnerId::from("user-2"), ChangeKind::Update);
        store.notify(Collection::Items, &owner(), ChangeKind::Delete);

        let event = live.next().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Delete);
    }

    #[tokio::test]
    async fn dropping_feed_releases_both_subscriptions() {
        let store = MemoryStore::new();
        let live = LiveFeed::connect(&store, &owner()).await.unwrap();
        assert_eq!(store.active_subscriptions(), 2);
        assert_eq!(live.owner(), &owner());

        drop(live);
        assert_eq!(store.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn connect_fails_when_feed_is_unavailable() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(LiveFeed::connect(&store, &owner()).await.is_err());
    }

    #[tokio::test]
    async fn closing_one_subscription_ends_the_feed() {
        let store = MemoryStore::new();
        let mut live = LiveFeed::connect(&store, &owner()).await.unwrap();

        store.close_subscriptions(Collection::Categories);
        assert_eq!(live.next().await, None);
    }

    #[tokio::test]
    async fn follow_subscribes_before_loading() {
        let store = MemoryStore::new();
        let feed = BusyHousehold {
            store: store.clone(),
        };
        let controller = ListController::new(Arc::new(store.clone()), owner());
        let (actions_tx, mut actions_rx) = mpsc::unbounded_channel();

        let follow = follow_list(&feed, &controller, Duration::from_secs(5), |actions| {
            let _ = actions_tx.send(actions);
        });
        let first_batch = async { actions_rx.recv().await.unwrap() };

        tokio::select! {
            () = follow => unreachable!("follow_list only ends when dropped"),
            actions = first_batch => {
                let mut state = ListState::new();
                state.dispatch_all(actions);
                assert_eq!(item_names(&state), vec!["Milk"]);
                assert!(!state.loading);
            }
        }
        assert_eq!(store.active_subscriptions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn follow_reopens_a_closed_feed_and_refetches() {
        let store = MemoryStore::new();
        let controller = ListController::new(Arc::new(store.clone()), owner());
        let (actions_tx, mut actions_rx) = mpsc::unbounded_channel();

        let follow = follow_list(&store, &controller, Duration::from_secs(5), |actions| {
            let _ = actions_tx.send(actions);
        });
        let scenario = async {
            let mut state = ListState::new();
            state.dispatch_all(actions_rx.recv().await.unwrap());
            assert!(state.items.is_empty());

            store.seed_item(Item::new("Milk", "Dairy", owner()));
            store.close_subscriptions(Collection::Items);

            state.dispatch_all(actions_rx.recv().await.unwrap());
            state.dispatch_all(actions_rx.recv().await.unwrap());
            state
        };

        tokio::select! {
            () = follow => unreachable!("follow_list only ends when dropped"),
            state = scenario => {
                assert_eq!(item_names(&state), vec!["Milk"]);
                assert_eq!(store.active_subscriptions(), 2);
                assert_eq!(store.calls().fetch_items, 2);
                assert_eq!(store.calls().fetch_categories, 2);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refetch_after_reconnect_keeps_rows() {
        let store = MemoryStore::new();
        store.seed_item(Item::new("Milk", "Dairy", owner()));
        let controller = ListController::new(Arc::new(store.clone()), owner());
        let (actions_tx, mut actions_rx) = mpsc::unbounded_channel();

        let follow = follow_list(&store, &controller, Duration::from_secs(5), |actions| {
            let _ = actions_tx.send(actions);
        });
        let scenario = async {
            let mut state = ListState::new();
            state.dispatch_all(actions_rx.recv().await.unwrap());
            store.set_failing(true);
            store.close_subscriptions(Collection::Items);

            let after_reconnect = actions_rx.recv().await.unwrap();
            state.dispatch_all(after_reconnect.clone());
            (state, after_reconnect)
        };

        tokio::select! {
            () = follow => unreachable!("follow_list only ends when dropped"),
            (state, after_reconnect) = scenario => {
                assert!(after_reconnect.is_empty());
                assert_eq!(item_names(&state), vec!["Milk"]);
            }
        }
    }
}
