//! Investor company directory.
//!
//! ```text
//! GET /v1/companies
//! GET /v1/companies/{id}
//! ```
//!
//! Wrapped in `RequireRole::new(Role::Investor)`.

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Company, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Body of `GET /v1/companies`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompaniesResponse {
    pub companies: Vec<Company>,
}

/// Every startup account.
#[utoipa::path(
    get,
    path = "/v1/companies",
    responses(
        (status = 200, description = "Startups", body = CompaniesResponse),
        (status = 403, description = "Caller is not an investor", body = Error)
    ),
    tags = ["companies"],
    operation_id = "listCompanies"
)]
#[get("")]
pub async fn list_companies(state: web::Data<HttpState>) -> ApiResult<web::Json<CompaniesResponse>> {
    let companies = state.companies.list().await?;
    Ok(web::Json(CompaniesResponse { companies }))
}

/// One startup, including legacy profiles.
#[utoipa::path(
    get,
    path = "/v1/companies/{id}",
    params(("id" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Company", body = Company),
        (status = 404, description = "Unknown company", body = Error)
    ),
    tags = ["companies"],
    operation_id = "getCompany"
)]
#[get("/{id}")]
pub async fn get_company(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Company>> {
    state.companies.get(&path.into_inner()).await.map(web::Json)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{Collection, DocumentStore};
    use crate::inbound::http::test_utils::{into_status_and_json, test_app};
    use crate::test_support::{TestPorts, object};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    #[actix_web::test]
    async fn lists_startups_with_the_company_projection() {
        let ports = TestPorts::new();
        ports
            .store
            .set(
                Collection::Users,
                "u1",
                object(json!({"role": "startup", "name": "Acme", "companyWebsite": "https://acme.dev"})),
            )
            .await
            .expect("seed");
        ports
            .store
            .set(Collection::Users, "u2", object(json!({"role": "investor", "name": "Fund"})))
            .await
            .expect("seed");
        let app = test::init_service(
            test_app(ports.state())
                .service(web::scope("/v1/companies").service(list_companies).service(get_company)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/v1/companies").to_request()).await;
        let (status, body) = into_status_and_json(res).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["companies"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["companies"][0]["id"], "u1");
        assert_eq!(body["companies"][0]["companyWebsite"], "https://acme.dev");

        let res = test::call_service(&app, test::TestRequest::get().uri("/v1/companies/u2").to_request()).await;
        let (status, body) = into_status_and_json(res).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "company_not_found");
    }
}
