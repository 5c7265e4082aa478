//! Substring search over deal notes for investors.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::company::Company;
use crate::domain::ports::{Collection, Document, DocumentQuery, DocumentStore};
use crate::domain::service_support::map_store_error;
use crate::domain::{Error, Role};

/// Results returned when the request does not set a limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Search request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RagSearchForm {
    pub query: Option<String>,
    pub category: Option<String>,
    pub min_score: Option<f64>,
    pub limit: Option<usize>,
}

/// Filters echoed back with the results.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RagFilters {
    pub category: Option<String>,
    pub min_score: Option<f64>,
}

/// One matching deal note with its company.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RagHit {
    #[schema(value_type = Object)]
    pub deal_note: Value,
    #[schema(value_type = Object)]
    pub company: Value,
}

/// Search response.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RagSearchResult {
    pub results: Vec<RagHit>,
    pub total: usize,
    pub query: String,
    pub filters: RagFilters,
}

/// Deal note search.
pub struct RagService {
    store: Arc<dyn DocumentStore>,
}

impl RagService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Case-insensitive substring match over the newest `limit` deal notes.
    ///
    /// With a category or minimum score, only notes whose startup account
    /// exists and passes both filters are considered. A limit of zero
    /// searches every note.
    ///
    /// # Errors
    /// `query_required` when the query is missing or empty.
    pub async fn search(&self, form: RagSearchForm) -> Result<RagSearchResult, Error> {
        let query = form
            .query
            .filter(|text| !text.is_empty())
            .ok_or_else(|| Error::invalid_request("query_required"))?;
        let filters = RagFilters {
            category: form.category.filter(|text| !text.is_empty()),
            min_score: form.min_score,
        };

        let mut notes_query = DocumentQuery::new().newest_first();
        match form.limit.unwrap_or(DEFAULT_SEARCH_LIMIT) {
            0 => {}
            limit => notes_query = notes_query.limit(limit),
        }
        let notes = self
            .store
            .query(Collection::DealNotes, &notes_query)
            .await
            .map_err(map_store_error)?;

        let needle = query.to_lowercase();
        let mut companies: HashMap<String, Option<Document>> = HashMap::new();
        let mut results = Vec::new();
        for note in notes {
            let Some(body) = note.field("dealNote") else {
                continue;
            };
            if !body.to_string().to_lowercase().contains(&needle) {
                continue;
            }
            let startup_id = note.str_field("startupId").unwrap_or_default().to_owned();
            let account = match companies.get(&startup_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.startup_account(&startup_id).await?;
                    companies.insert(startup_id.clone(), fetched.clone());
                    fetched
                }
            };
            if !passes_filters(account.as_ref(), &filters) {
                continue;
            }
            results.push(RagHit {
                company: company_summary(&startup_id, account.as_ref()),
                deal_note: note.into_json(),
            });
        }

        Ok(RagSearchResult {
            total: results.len(),
            results,
            query,
            filters,
        })
    }

    /// Deal note by identifier with its company summary.
    ///
    /// # Errors
    /// `deal_note_not_found` when absent.
    pub async fn get_with_company(&self, id: &str) -> Result<RagHit, Error> {
        let note = self
            .store
            .get(Collection::DealNotes, id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("deal_note_not_found"))?;
        let startup_id = note.str_field("startupId").unwrap_or_default().to_owned();
        let account = self.startup_account(&startup_id).await?;
        Ok(RagHit {
            company: company_summary(&startup_id, account.as_ref()),
            deal_note: note.into_json(),
        })
    }

    async fn startup_account(&self, startup_id: &str) -> Result<Option<Document>, Error> {
        if startup_id.is_empty() {
            return Ok(None);
        }
        self.store
            .get(Collection::Users, startup_id)
            .await
            .map_err(map_store_error)
    }
}

fn passes_filters(account: Option<&Document>, filters: &RagFilters) -> bool {
    if filters.category.is_none() && filters.min_score.is_none() {
        return true;
    }
    let Some(account) = account.filter(|doc| doc.str_field("role") == Some(Role::Startup.as_str()))
    else {
        return false;
    };
    let category_ok = filters
        .category
        .as_deref()
        .is_none_or(|wanted| account.str_field("category") == Some(wanted));
    let score_ok = filters.min_score.is_none_or(|minimum| {
        account
            .field("score")
            .and_then(Value::as_f64)
            .is_some_and(|score| score >= minimum)
    });
    category_ok && score_ok
}

fn company_summary(startup_id: &str, account: Option<&Document>) -> Value {
    match account {
        Some(document) => Company::from_user(document).summary(),
        None => Company::from_user(&Document::new(startup_id, Default::default())).summary(),
    }
}
