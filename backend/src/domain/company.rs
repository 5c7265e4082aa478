//! Investor-facing company projection.
//!
//! The canonical startup is a `users` document with `role = "startup"`.
//! Legacy `startups` profiles are mapped onto the same projection so older
//! records stay visible.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::{Collection, Document, DocumentQuery, DocumentStore};
use crate::domain::service_support::map_store_error;
use crate::domain::{Error, Role};

/// Listing entry for one startup.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub score: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub company_website: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub created_at: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub updated_at: Option<Value>,
}

impl Company {
    /// Project a startup account.
    pub fn from_user(document: &Document) -> Self {
        let field = |name: &str| document.data.get(name).cloned();
        Self {
            id: document.id.clone(),
            name: field("name"),
            description: field("description"),
            score: field("score"),
            category: field("category"),
            company_website: field("companyWebsite"),
            created_at: field("createdAt"),
            updated_at: field("updatedAt"),
        }
    }

    /// Project a legacy `startups` profile.
    pub fn from_startup_profile(document: &Document) -> Self {
        let field = |name: &str| document.data.get(name).cloned();
        Self {
            id: document.id.clone(),
            name: field("name"),
            description: field("description"),
            score: field("score"),
            category: field("category"),
            company_website: field("website"),
            created_at: field("createdAt"),
            updated_at: field("updatedAt"),
        }
    }

    /// Compact `{id, name, category, score, description}` view used in
    /// search results.
    pub fn summary(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "category": self.category,
            "score": self.score,
            "description": self.description,
        })
    }
}

fn is_startup(document: &Document) -> bool {
    document.str_field("role") == Some(Role::Startup.as_str())
}

/// Read-only company directory for investors.
pub struct CompanyService {
    store: Arc<dyn DocumentStore>,
}

impl CompanyService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Every startup account.
    pub async fn list(&self) -> Result<Vec<Company>, Error> {
        let query = DocumentQuery::new().where_eq("role", Role::Startup.as_str());
        let documents = self
            .store
            .query(Collection::Users, &query)
            .await
            .map_err(map_store_error)?;
        Ok(documents.iter().map(Company::from_user).collect())
    }

    /// One company, falling back to the legacy profile collection.
    ///
    /// # Errors
    /// `company_not_found` when neither representation exists.
    pub async fn get(&self, id: &str) -> Result<Company, Error> {
        if let Some(user) = self
            .store
            .get(Collection::Users, id)
            .await
            .map_err(map_store_error)?
            .filter(is_startup)
        {
            return Ok(Company::from_user(&user));
        }
        self.store
            .get(Collection::Startups, id)
            .await
            .map_err(map_store_error)?
            .map(|profile| Company::from_startup_profile(&profile))
            .ok_or_else(|| Error::not_found("company_not_found"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::outbound::memory::InMemoryDocumentStore;
    use crate::test_support::object;
    use serde_json::json;

    async fn seeded() -> CompanyService {
        let store = Arc::new(InMemoryDocumentStore::new());
        for (id, body) in [
            ("u1", json!({"role": "startup", "name": "Acme", "score": 8.1})),
            ("u2", json!({"role": "investor", "name": "Fund"})),
        ] {
            store
                .set(Collection::Users, id, object(body))
                .await
                .expect("seed user");
        }
        store
            .set(
                Collection::Startups,
                "legacy",
                object(json!({"name": "Old Co", "category": "fintech", "website": "https://old.co"})),
            )
            .await
            .expect("seed profile");
        CompanyService::new(store)
    }

    #[tokio::test]
    async fn lists_only_startups() {
        let companies = seeded().await.list().await.expect("list");
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].name, Some(json!("Acme")));
    }

    #[tokio::test]
    async fn investors_are_not_companies_but_legacy_profiles_are() {
        let service = seeded().await;
        let err = service.get("u2").await.expect_err("investor");
        assert_eq!(err.code(), "company_not_found");

        let legacy = service.get("legacy").await.expect("legacy profile");
        assert_eq!(legacy.category, Some(json!("fintech")));
        assert_eq!(legacy.company_website, Some(json!("https://old.co")));
    }
}
