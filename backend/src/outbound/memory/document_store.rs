//! In-memory [`DocumentStore`] backed by per-collection maps.
//!
//! Semantics mirror the Postgres adapter: generated identifiers are UUID v4
//! strings, patches merge dotted paths, and ordered queries skip documents
//! lacking the order field.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::json_path;
use crate::domain::ports::{
    Collection, Document, DocumentData, DocumentQuery, DocumentStore, DocumentStoreError,
};

type CollectionMap = BTreeMap<String, DocumentData>;

/// Document store holding everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, CollectionMap>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(
        &self,
        collection: Collection,
        data: DocumentData,
    ) -> Result<String, DocumentStoreError> {
        let id = Uuid::new_v4().to_string();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn set(
        &self,
        collection: Collection,
        id: &str,
        data: DocumentData,
    ) -> Result<(), DocumentStoreError> {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.to_owned(), data);
        Ok(())
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: DocumentData,
    ) -> Result<(), DocumentStoreError> {
        let mut guard = self.collections.write().await;
        let data = guard
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| DocumentStoreError::missing(collection.name(), id))?;
        json_path::apply_patch(data, patch);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), DocumentStoreError> {
        if let Some(docs) = self.collections.write().await.get_mut(&collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let guard = self.collections.read().await;
        let Some(docs) = guard.get(&collection) else {
            return Ok(Vec::new());
        };
        let matches: Vec<Document> = docs
            .iter()
            .filter(|(_, data)| query.matches(data))
            .map(|(id, data)| Document::new(id.as_str(), data.clone()))
            .collect();
        Ok(query.finish(matches))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    fn data(value: Value) -> DocumentData {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[fixture]
    fn store() -> InMemoryDocumentStore {
        InMemoryDocumentStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn add_then_get_returns_the_body(store: InMemoryDocumentStore) {
        let id = store
            .add(Collection::PitchDecks, data(json!({"startupId": "s"})))
            .await
            .expect("add");
        let doc = store
            .get(Collection::PitchDecks, &id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(doc.str_field("startupId"), Some("s"));
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn update_merges_dotted_paths(store: InMemoryDocumentStore) {
        store
            .set(
                Collection::DealNotes,
                "n1",
                data(json!({"json": {"claims": []}, "status": "ready"})),
            )
            .await
            .expect("set");
        store
            .update(
                Collection::DealNotes,
                "n1",
                data(json!({"json.score": {"overall": 7.1}})),
            )
            .await
            .expect("update");
        let doc = store
            .get(Collection::DealNotes, "n1")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(doc.field("json.score.overall"), Some(&json!(7.1)));
        assert_eq!(doc.field("json.claims"), Some(&json!([])));
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_missing_document_fails(store: InMemoryDocumentStore) {
        let err = store
            .update(Collection::Users, "ghost", DocumentData::new())
            .await
            .expect_err("missing");
        assert!(matches!(err, DocumentStoreError::Missing { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn latest_for_startup_picks_greatest_created_at(store: InMemoryDocumentStore) {
        for (id, created) in [
            ("a", "2024-01-01T00:00:00.000Z"),
            ("b", "2024-03-01T00:00:00.000Z"),
            ("c", "2024-02-01T00:00:00.000Z"),
        ] {
            store
                .set(
                    Collection::PitchDecks,
                    id,
                    data(json!({"startupId": "s", "createdAt": created})),
                )
                .await
                .expect("set");
        }
        store
            .set(
                Collection::PitchDecks,
                "other",
                data(json!({"startupId": "t", "createdAt": "2025-01-01T00:00:00.000Z"})),
            )
            .await
            .expect("set");

        let latest = store
            .query(Collection::PitchDecks, &DocumentQuery::latest_for_startup("s"))
            .await
            .expect("query");
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, "b");
        assert_eq!(store.count(Collection::PitchDecks).await, 4);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_is_idempotent(store: InMemoryDocumentStore) {
        store
            .set(Collection::Uploads, "u1", DocumentData::new())
            .await
            .expect("set");
        store.delete(Collection::Uploads, "u1").await.expect("delete");
        store.delete(Collection::Uploads, "u1").await.expect("delete again");
        assert!(store.get(Collection::Uploads, "u1").await.expect("get").is_none());
    }
}
