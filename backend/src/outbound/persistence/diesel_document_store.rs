//! PostgreSQL-backed `DocumentStore` using Diesel over a single JSONB table.
//!
//! Every collection lives in `documents`, keyed by `(collection, id)`.
//! Equality filters are pushed to PostgreSQL as a JSONB containment probe
//! (`data @> $probe`). The exact predicate set, ordering and limit are then
//! applied by [`DocumentQuery::finish`] so both adapters agree on semantics.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Jsonb, Text};
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::domain::json_path;
use crate::domain::ports::{
    Collection, Document, DocumentData, DocumentQuery, DocumentStore, DocumentStoreError,
    FilterOp,
};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::documents;

const QUERY_SQL: &str = "SELECT id, data FROM documents WHERE collection = $1 AND data @> $2";

#[derive(QueryableByName)]
struct DocumentRow {
    #[diesel(sql_type = Text)]
    id: String,
    #[diesel(sql_type = Jsonb)]
    data: Value,
}

/// Diesel implementation of the [`DocumentStore`] port.
#[derive(Clone)]
pub struct DieselDocumentStore {
    pool: DbPool,
}

impl DieselDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_document(id: String, data: Value) -> Result<Document, DocumentStoreError> {
    match data {
        Value::Object(map) => Ok(Document::new(id, map)),
        other => Err(DocumentStoreError::serialization(format!(
            "document {id} is not an object: {other}"
        ))),
    }
}

/// Nested object holding every equality filter, for `@>`.
fn containment_probe(query: &DocumentQuery) -> DocumentData {
    let mut probe = Map::new();
    for filter in query.filters.iter().filter(|filter| filter.op == FilterOp::Eq) {
        json_path::assign(&mut probe, &filter.field, filter.value.clone());
    }
    probe
}

#[async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn add(
        &self,
        collection: Collection,
        data: DocumentData,
    ) -> Result<String, DocumentStoreError> {
        let id = Uuid::new_v4().to_string();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(documents::table)
            .values((
                documents::collection.eq(collection.name()),
                documents::id.eq(&id),
                documents::data.eq(Value::Object(data)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(id)
    }

    async fn set(
        &self,
        collection: Collection,
        id: &str,
        data: DocumentData,
    ) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(documents::table)
            .values((
                documents::collection.eq(collection.name()),
                documents::id.eq(id),
                documents::data.eq(Value::Object(data)),
            ))
            .on_conflict((documents::collection, documents::id))
            .do_update()
            .set((
                documents::data.eq(excluded(documents::data)),
                documents::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = documents::table
            .filter(documents::collection.eq(collection.name()))
            .filter(documents::id.eq(id))
            .select((documents::id, documents::data))
            .first::<(String, Value)>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(id, data)| into_document(id, data)).transpose()
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: DocumentData,
    ) -> Result<(), DocumentStoreError> {
        let mut document = self
            .get(collection, id)
            .await?
            .ok_or_else(|| DocumentStoreError::missing(collection.name(), id))?;
        json_path::apply_patch(&mut document.data, patch);

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            documents::table
                .filter(documents::collection.eq(collection.name()))
                .filter(documents::id.eq(id)),
        )
        .set((
            documents::data.eq(Value::Object(document.data)),
            documents::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(DocumentStoreError::missing(collection.name(), id));
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(
            documents::table
                .filter(documents::collection.eq(collection.name()))
                .filter(documents::id.eq(id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let probe = containment_probe(query);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = sql_query(QUERY_SQL)
            .bind::<Text, _>(collection.name())
            .bind::<Jsonb, _>(Value::Object(probe))
            .load::<DocumentRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        debug!(%collection, candidates = rows.len(), "document query prefiltered");

        let mut matches = Vec::with_capacity(rows.len());
        for row in rows {
            let document = into_document(row.id, row.data)?;
            if query.matches(&document.data) {
                matches.push(document);
            }
        }
        Ok(query.finish(matches))
    }
}
