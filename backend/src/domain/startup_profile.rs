//! Legacy startup profiles in the `startups` collection.

use std::sync::Arc;

use mockable::Clock;
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::ports::{Collection, Document, DocumentStore};
use crate::domain::service_support::{map_store_error, nullable, object, stamped};
use crate::domain::{Error, now_timestamp};

/// Profile creation payload.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StartupProfileForm {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub stage: Option<String>,
    pub geography: Option<String>,
    pub website: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub founders: Option<Vec<Value>>,
    pub tags: Option<Vec<String>>,
}

/// Lowercase `name` with each whitespace run replaced by `-`.
///
/// # Examples
/// ```
/// use dealroom::domain::slugify;
///
/// assert_eq!(slugify("Acme  Robotics Ltd"), "acme-robotics-ltd");
/// ```
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// CRUD for legacy profiles.
pub struct StartupProfileService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl StartupProfileService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a profile with `status = "active"`.
    ///
    /// # Errors
    /// `name_and_category_required` when either is missing.
    pub async fn create(&self, form: StartupProfileForm) -> Result<String, Error> {
        let (Some(name), Some(category)) = (
            form.name.filter(|n| !n.is_empty()),
            form.category.filter(|c| !c.is_empty()),
        ) else {
            return Err(Error::invalid_request("name_and_category_required"));
        };
        let slug = form.slug.unwrap_or_else(|| slugify(&name));
        let data = stamped(
            object(json!({
                "name": name,
                "slug": slug,
                "category": category,
                "stage": nullable(form.stage.as_deref()),
                "geography": nullable(form.geography.as_deref()),
                "website": nullable(form.website.as_deref()),
                "founders": form.founders.unwrap_or_default(),
                "tags": form.tags.unwrap_or_default(),
                "status": "active",
            })),
            &now_timestamp(self.clock.as_ref()),
        );
        self.store
            .add(Collection::Startups, data)
            .await
            .map_err(map_store_error)
    }

    async fn load(&self, id: &str) -> Result<Document, Error> {
        self.store
            .get(Collection::Startups, id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("startup_not_found"))
    }

    /// Full profile.
    pub async fn get(&self, id: &str) -> Result<Value, Error> {
        Ok(self.load(id).await?.into_json())
    }

    /// `{id, name, category, stage, geography}`.
    pub async fn summary(&self, id: &str) -> Result<Value, Error> {
        let document = self.load(id).await?;
        let field = |name: &str| document.data.get(name).cloned().unwrap_or(Value::Null);
        Ok(json!({
            "id": document.id,
            "name": field("name"),
            "category": field("category"),
            "stage": field("stage"),
            "geography": field("geography"),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::outbound::memory::InMemoryDocumentStore;
    use crate::test_support::SteppingClock;
    use rstest::rstest;

    fn service() -> StartupProfileService {
        StartupProfileService::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(SteppingClock::default()),
        )
    }

    #[rstest]
    #[case("Acme", "acme")]
    #[case("  Deep   Tech Labs ", "deep-tech-labs")]
    fn slugs_collapse_whitespace(#[case] name: &str, #[case] slug: &str) {
        assert_eq!(slugify(name), slug);
    }

    #[tokio::test]
    async fn create_then_summarise() {
        let service = service();
        let id = service
            .create(StartupProfileForm {
                name: Some("Deep Tech".to_owned()),
                category: Some("ai".to_owned()),
                ..StartupProfileForm::default()
            })
            .await
            .expect("create");
        let profile = service.get(&id).await.expect("get");
        assert_eq!(profile["slug"], "deep-tech");
        assert_eq!(profile["status"], "active");
        let summary = service.summary(&id).await.expect("summary");
        assert_eq!(summary["stage"], Value::Null);
        assert_eq!(summary["category"], "ai");
    }

    #[tokio::test]
    async fn missing_category_is_rejected() {
        let err = service()
            .create(StartupProfileForm {
                name: Some("Deep Tech".to_owned()),
                ..StartupProfileForm::default()
            })
            .await
            .expect_err("missing category");
        assert_eq!(err.code(), "name_and_category_required");
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let err = service().get("ghost").await.expect_err("missing");
        assert_eq!(err.code(), "startup_not_found");
    }
}
