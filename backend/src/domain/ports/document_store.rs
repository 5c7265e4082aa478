//! Driven port for the schemaless document store.
//!
//! Documents are JSON objects keyed by an opaque identifier inside a named
//! [`Collection`]. The store offers single-document writes, dotted-path
//! patches, and simple filtered queries with ordering and a limit. There are
//! no transactions: concurrent writers to one document are last-write-wins.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::define_port_error;
use crate::domain::json_path;

/// Raw document body.
pub type DocumentData = Map<String, Value>;

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Founders and investors, discriminated by `role`.
    Users,
    /// Legacy startup profiles.
    Startups,
    /// Deal notes, analyst notes, and final notes.
    DealNotes,
    /// Uploaded pitch deck metadata.
    PitchDecks,
    /// Generated questionnaires.
    Questionnaires,
    /// Follow-up calls booked by founders.
    ScheduledCalls,
    /// Canonical founder answer records.
    FounderAnswers,
    /// Signed-URL upload handshakes.
    Uploads,
    /// Chat transcript entries.
    Messages,
}

impl Collection {
    /// Every collection, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Users,
        Self::Startups,
        Self::DealNotes,
        Self::PitchDecks,
        Self::Questionnaires,
        Self::ScheduledCalls,
        Self::FounderAnswers,
        Self::Uploads,
        Self::Messages,
    ];

    /// Storage name of the collection.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Startups => "startups",
            Self::DealNotes => "deal_notes",
            Self::PitchDecks => "pitch_decks",
            Self::Questionnaires => "questionnaires",
            Self::ScheduledCalls => "scheduled_calls",
            Self::FounderAnswers => "founder_answers",
            Self::Uploads => "uploads",
            Self::Messages => "messages",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The backing store could not be reached.
        Connection { message: String } => "document store connection failed: {message}",
        /// The store rejected or failed to execute an operation.
        Query { message: String } => "document store query failed: {message}",
        /// An update targeted a document that does not exist.
        Missing { collection: String, id: String } => "document {collection}/{id} not found",
        /// A record could not be converted to or from JSON.
        Serialization { message: String } => "document serialisation failed: {message}",
    }
}

/// A stored document and its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Opaque identifier, unique within the collection.
    pub id: String,
    /// JSON body.
    pub data: DocumentData,
}

impl Document {
    /// Construct a document from parts.
    pub fn new(id: impl Into<String>, data: DocumentData) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Value at a dotted path.
    pub fn field(&self, path: &str) -> Option<&Value> {
        json_path::lookup(&self.data, path)
    }

    /// String value at a dotted path.
    pub fn str_field(&self, path: &str) -> Option<&str> {
        self.field(path).and_then(Value::as_str)
    }

    /// Flatten into `{"id": ..., ...data}`.
    pub fn into_json(self) -> Value {
        let mut body = Map::with_capacity(self.data.len() + 1);
        body.insert("id".to_owned(), Value::String(self.id));
        body.extend(self.data);
        Value::Object(body)
    }

    /// Deserialise the body into a typed record.
    ///
    /// # Errors
    /// Returns [`DocumentStoreError::Serialization`] when the body does not
    /// match `T`.
    pub fn into_record<T: DeserializeOwned>(self) -> Result<Stored<T>, DocumentStoreError> {
        let record = serde_json::from_value(Value::Object(self.data)).map_err(|err| {
            DocumentStoreError::serialization(format!("document {}: {err}", self.id))
        })?;
        Ok(Stored {
            id: self.id,
            record,
        })
    }
}

/// Typed record paired with its document identifier.
///
/// Serialises flat, as `{"id": ..., ...record}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stored<T> {
    /// Document identifier.
    pub id: String,
    /// Typed body.
    #[serde(flatten)]
    pub record: T,
}

/// Serialise a record into a document body.
///
/// # Errors
/// Returns [`DocumentStoreError::Serialization`] when `record` does not
/// serialise to a JSON object.
pub fn to_document_data<T: Serialize>(record: &T) -> Result<DocumentData, DocumentStoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DocumentStoreError::serialization(format!(
            "expected a JSON object, found {other}"
        ))),
        Err(err) => Err(DocumentStoreError::serialization(err.to_string())),
    }
}

/// Comparison applied by a [`FieldFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Field equals the value.
    Eq,
    /// Field is strictly less than the value.
    Lt,
    /// Field is less than or equal to the value.
    Le,
    /// Field is strictly greater than the value.
    Gt,
    /// Field is greater than or equal to the value.
    Ge,
}

impl FilterOp {
    /// SQL operator spelling.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

/// Single predicate over a dotted field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Dotted field path.
    pub field: String,
    /// Comparison operator.
    pub op: FilterOp,
    /// Right-hand operand.
    pub value: Value,
}

impl FieldFilter {
    /// Whether `data` satisfies the predicate.
    pub fn matches(&self, data: &DocumentData) -> bool {
        let Some(actual) = json_path::lookup(data, &self.field) else {
            return false;
        };
        if self.op == FilterOp::Eq {
            return actual == &self.value;
        }
        json_path::compare(actual, &self.value).is_some_and(|ordering| self.op.accepts(ordering))
    }
}

/// Sort direction for [`OrderBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Ordering clause.
///
/// Documents lacking the field are excluded from ordered results.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Dotted field path.
    pub field: String,
    /// Sort direction.
    pub direction: SortDirection,
}

/// Query over one collection.
///
/// # Examples
/// ```
/// use dealroom::domain::ports::{DocumentQuery, SortDirection};
///
/// let query = DocumentQuery::new()
///     .where_eq("startupId", "s-1")
///     .order_by("createdAt", SortDirection::Descending)
///     .limit(1);
/// assert_eq!(query.filters.len(), 1);
/// assert_eq!(query.limit, Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    /// Conjunctive predicates.
    pub filters: Vec<FieldFilter>,
    /// Optional ordering.
    pub order_by: Option<OrderBy>,
    /// Maximum number of documents returned.
    pub limit: Option<usize>,
}

impl DocumentQuery {
    /// Query matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest document for a startup, by `createdAt`.
    pub fn latest_for_startup(startup_id: &str) -> Self {
        Self::new()
            .where_eq("startupId", startup_id)
            .newest_first()
            .limit(1)
    }

    /// Add an equality predicate.
    #[must_use]
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_op(field, FilterOp::Eq, value)
    }

    /// Add a predicate with an explicit operator.
    #[must_use]
    pub fn where_op(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Order by a field.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Order by `createdAt`, newest first.
    #[must_use]
    pub fn newest_first(self) -> Self {
        self.order_by("createdAt", SortDirection::Descending)
    }

    /// Cap the number of results.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `data` satisfies every predicate and carries the order field.
    pub fn matches(&self, data: &DocumentData) -> bool {
        let has_order_field = self
            .order_by
            .as_ref()
            .is_none_or(|order| json_path::lookup(data, &order.field).is_some());
        has_order_field && self.filters.iter().all(|filter| filter.matches(data))
    }

    /// Sort already-filtered documents and apply the limit.
    pub fn finish(&self, mut documents: Vec<Document>) -> Vec<Document> {
        if let Some(order) = &self.order_by {
            documents.sort_by(|left, right| {
                let ordering = match (left.field(&order.field), right.field(&order.field)) {
                    (Some(a), Some(b)) => json_path::compare(a, b).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }
        documents
    }
}

/// Driven port for document persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document under a freshly generated identifier.
    async fn add(
        &self,
        collection: Collection,
        data: DocumentData,
    ) -> Result<String, DocumentStoreError>;

    /// Create or replace the document with identifier `id`.
    async fn set(
        &self,
        collection: Collection,
        id: &str,
        data: DocumentData,
    ) -> Result<(), DocumentStoreError>;

    /// Fetch a document by identifier.
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, DocumentStoreError>;

    /// Merge a dotted-path patch into an existing document.
    ///
    /// Fails with [`DocumentStoreError::Missing`] when the document is absent.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: DocumentData,
    ) -> Result<(), DocumentStoreError>;

    /// Remove a document. Removing an absent document is not an error.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), DocumentStoreError>;

    /// Run a filtered, ordered, limited query.
    async fn query(
        &self,
        collection: Collection,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, DocumentStoreError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;

    fn data(value: Value) -> DocumentData {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[rstest]
    #[case::eq(FilterOp::Eq, json!("investor"), false)]
    #[case::gt(FilterOp::Gt, json!(7.0), true)]
    #[case::ge_equal(FilterOp::Ge, json!(7.5), true)]
    #[case::lt(FilterOp::Lt, json!(7.5), false)]
    #[case::type_mismatch(FilterOp::Gt, json!("7"), false)]
    fn filter_ops_compare_scalars(
        #[case] op: FilterOp,
        #[case] value: Value,
        #[case] expected: bool,
    ) {
        let body = data(json!({"role": "startup", "score": 7.5}));
        let field = if op == FilterOp::Eq { "role" } else { "score" };
        let filter = FieldFilter {
            field: field.to_owned(),
            op,
            value,
        };
        assert_eq!(filter.matches(&body), expected);
    }

    #[test]
    fn ordered_queries_skip_documents_without_the_field() {
        let query = DocumentQuery::new().newest_first();
        assert!(query.matches(&data(json!({"createdAt": "2024-01-01T00:00:00.000Z"}))));
        assert!(!query.matches(&data(json!({"startupId": "s"}))));
    }

    #[test]
    fn into_json_flattens_identifier() {
        let doc = Document::new("d1", data(json!({"startupId": "s"})));
        assert_eq!(doc.into_json(), json!({"id": "d1", "startupId": "s"}));
    }

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        startup_id: String,
    }

    #[test]
    fn typed_records_round_trip_through_documents() {
        let body = to_document_data(&Sample {
            startup_id: "s".to_owned(),
        })
        .expect("object body");
        let stored = Document::new("d1", body)
            .into_record::<Sample>()
            .expect("typed record");
        assert_eq!(
            serde_json::to_value(&stored).expect("serialise"),
            json!({"id": "d1", "startupId": "s"})
        );
    }

    #[test]
    fn non_object_records_are_rejected() {
        let err = to_document_data(&"plain").expect_err("strings are not documents");
        assert!(matches!(err, DocumentStoreError::Serialization { .. }));
    }
}
