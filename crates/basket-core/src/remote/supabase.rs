//! PostgREST-backed [`RemoteStore`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{Collection, RemoteError, RemoteResult, RemoteStore};
use crate::auth::parse_api_error;
use crate::config::ResolvedBackend;
use crate::models::{Category, Item, ItemId, ItemPatch, OwnerId};

/// Row access through the project's REST endpoint, authorized as the
/// signed-in user so row-level security applies on top of the owner filters.
#[derive(Clone)]
pub struct SupabaseStore {
    backend: ResolvedBackend,
    access_token: String,
    client: Client,
}

impl SupabaseStore {
    pub fn new(backend: ResolvedBackend, access_token: impl Into<String>) -> RemoteResult<Self> {
        let access_token = access_token.into().trim().to_string();
        if access_token.is_empty() {
            return Err(RemoteError::InvalidConfiguration(
                "access token must not be empty".to_string(),
            ));
        }

        Ok(Self {
            backend,
            access_token,
            client: Client::builder().build()?,
        })
    }

    fn table_url(&self, collection: Collection) -> String {
        format!(
            "{}/{}",
            self.backend.rest_url(),
            self.backend.table(collection)
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", self.backend.anon_key())
            .bearer_auth(&self.access_token)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        collection: Collection,
        owner: &OwnerId,
    ) -> RemoteResult<Vec<T>> {
        tracing::debug!("Fetching {} for owner {}", collection, owner);
        let request = self.authorized(
            self.client
                .get(self.table_url(collection))
                .header("Accept", "application/json")
                .query(&fetch_query(owner)),
        );
        let response = ensure_success(request.send().await?).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    async fn insert<T: serde::Serialize + Sync>(
        &self,
        collection: Collection,
        row: &T,
    ) -> RemoteResult<()> {
        tracing::debug!("Inserting into {}", collection);
        let request = self.authorized(
            self.client
                .post(self.table_url(collection))
                .header("Prefer", "return=minimal")
                .json(row),
        );
        ensure_success(request.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    async fn fetch_items(&self, owner: &OwnerId) -> RemoteResult<Vec<Item>> {
        self.fetch(Collection::Items, owner).await
    }

    async fn fetch_categories(&self, owner: &OwnerId) -> RemoteResult<Vec<Category>> {
        self.fetch(Collection::Categories, owner).await
    }

    async fn insert_item(&self, item: &Item) -> RemoteResult<()> {
        self.insert(Collection::Items, item).await
    }

    async fn insert_category(&self, category: &Category) -> RemoteResult<()> {
        self.insert(Collection::Categories, category).await
    }

    async fn update_item(
        &self,
        owner: &OwnerId,
        id: ItemId,
        patch: ItemPatch,
    ) -> RemoteResult<()> {
        tracing::debug!("Updating item {} with {:?}", id, patch);
        let request = self.authorized(
            self.client
                .patch(self.table_url(Collection::Items))
                .header("Prefer", "return=minimal")
                .query(&row_query(owner, id))
                .json(&patch),
        );
        ensure_success(request.send().await?).await?;
        Ok(())
    }

    async fn update_all_items(&self, owner: &OwnerId, patch: ItemPatch) -> RemoteResult<()> {
        tracing::debug!("Updating all items of {} with {:?}", owner, patch);
        let request = self.authorized(
            self.client
                .patch(self.table_url(Collection::Items))
                .header("Prefer", "return=minimal")
                .query(&[owner_filter(owner)])
                .json(&patch),
        );
        ensure_success(request.send().await?).await?;
        Ok(())
    }

    async fn delete_item(&self, owner: &OwnerId, id: ItemId) -> RemoteResult<()> {
        tracing::debug!("Deleting item {}", id);
        let request = self.authorized(
            self.client
                .delete(self.table_url(Collection::Items))
                .query(&row_query(owner, id)),
        );
        ensure_success(request.send().await?).await?;
        Ok(())
    }
}

fn owner_filter(owner: &OwnerId) -> (&'static str, String) {
    ("user_id", format!("eq.{owner}"))
}

fn fetch_query(owner: &OwnerId) -> [(&'static str, String); 3] {
    [
        ("select", "*".to_string()),
        owner_filter(owner),
        ("order", "created_at.asc".to_string()),
    ]
}

fn row_query(owner: &OwnerId, id: ItemId) -> [(&'static str, String); 2] {
    [("id", format!("eq.{id}")), owner_filter(owner)]
}

async fn ensure_success(response: Response) -> RemoteResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Api(parse_api_error(status, &body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    fn backend() -> ResolvedBackend {
        BackendConfig {
            supabase_url: Some("https://project.supabase.co".to_string()),
            supabase_anon_key: Some("anon".to_string()),
            items_table: Some("shopping_items".to_string()),
            categories_table: None,
        }
        .resolve()
        .unwrap()
    }

    #[test]
    fn new_rejects_empty_token() {
        assert!(SupabaseStore::new(backend(), "  ").is_err());
    }

    #[test]
    fn table_url_uses_configured_tables() {
        let store = SupabaseStore::new(backend(), "token").unwrap();
        assert_eq!(
            store.table_url(Collection::Items),
            "https://project.supabase.co/rest/v1/shopping_items"
        );
        assert_eq!(
            store.table_url(Collection::Categories),
            "https://project.supabase.co/rest/v1/categories"
        );
    }

    #[test]
    fn fetch_query_filters_by_owner_and_orders_by_creation() {
        let query = fetch_query(&OwnerId::from("user-1"));
        assert!(query.contains(&("user_id", "eq.user-1".to_string())));
        assert!(query.contains(&("order", "created_at.asc".to_string())));
    }

    #[test]
    fn row_query_always_carries_owner_filter() {
        let id = ItemId::new();
        let query = row_query(&OwnerId::from("user-1"), id);
        assert_eq!(query[0], ("id", format!("eq.{id}")));
        assert_eq!(query[1], ("user_id", "eq.user-1".to_string()));
    }
}
