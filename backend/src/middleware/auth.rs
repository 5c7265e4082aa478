//! Bearer-token authentication and role gating.
//!
//! [`Authenticate`] resolves the caller into an [`AuthenticatedUser`] stored
//! in the request extensions. Handlers read it back through the
//! [`AuthenticatedUser`] extractor. [`RequireRole`] must sit inside
//! `Authenticate`.
//!
//! With development headers enabled, `x-debug-role` (comma separated) and the
//! optional `x-debug-startup-id` replace token verification entirely.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, error};

use crate::domain::ports::{IdentityVerificationError, IdentityVerifier, VerifiedIdentity};
use crate::domain::{AuthenticatedUser, Error, Role};

/// Header carrying development roles.
pub const DEBUG_ROLE_HEADER: &str = "x-debug-role";
/// Header carrying the development startup id.
pub const DEBUG_STARTUP_HEADER: &str = "x-debug-startup-id";

const PUBLIC_PREFIX: &str = "/v1/health";

impl From<VerifiedIdentity> for AuthenticatedUser {
    fn from(identity: VerifiedIdentity) -> Self {
        Self {
            uid: identity.uid,
            email: identity.email,
            roles: identity.roles,
            startup_id: identity.startup_id,
        }
    }
}

fn header<'a>(req: &'a ServiceRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn development_identity(req: &ServiceRequest) -> Option<AuthenticatedUser> {
    let roles = header(req, DEBUG_ROLE_HEADER)?
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_owned)
        .collect();
    let startup_id = header(req, DEBUG_STARTUP_HEADER).map(str::to_owned);
    Some(AuthenticatedUser::development(roles, startup_id))
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = header(req, AUTHORIZATION.as_str())?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_owned())
}

async fn resolve(
    req: &ServiceRequest,
    verifier: &dyn IdentityVerifier,
    dev_headers: bool,
) -> Result<AuthenticatedUser, Error> {
    if dev_headers {
        if let Some(user) = development_identity(req) {
            debug!(roles = ?user.roles, "development identity accepted");
            return Ok(user);
        }
    }
    let token = bearer_token(req).ok_or_else(|| Error::unauthorized("unauthorized"))?;
    match verifier.verify(&token).await {
        Ok(identity) => Ok(identity.into()),
        Err(IdentityVerificationError::NotConfigured) => {
            error!("bearer token presented but identity verification is not configured");
            Err(Error::unauthorized("invalid_token"))
        }
        Err(err) => {
            debug!(error = %err, "bearer token rejected");
            Err(Error::unauthorized("invalid_token"))
        }
    }
}

/// Authentication middleware.
#[derive(Clone)]
pub struct Authenticate {
    verifier: Arc<dyn IdentityVerifier>,
    dev_headers: bool,
}

impl Authenticate {
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            verifier,
            dev_headers: false,
        }
    }

    /// Honour the development headers.
    #[must_use]
    pub fn with_dev_headers(mut self, enabled: bool) -> Self {
        self.dev_headers = enabled;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuthenticateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateMiddleware {
            service: Rc::new(service),
            verifier: Arc::clone(&self.verifier),
            dev_headers: self.dev_headers,
        }))
    }
}

/// Service wrapper produced by [`Authenticate`].
pub struct AuthenticateMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn IdentityVerifier>,
    dev_headers: bool,
}

impl<S, B> Service<ServiceRequest> for AuthenticateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Arc::clone(&self.verifier);
        let dev_headers = self.dev_headers;
        Box::pin(async move {
            if req.path().starts_with(PUBLIC_PREFIX) {
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            }
            match resolve(&req, verifier.as_ref(), dev_headers).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(err) => Ok(req.error_response(err).map_into_right_body()),
            }
        })
    }
}

/// Rejects callers lacking a role with 403 `forbidden`.
#[derive(Clone, Copy)]
pub struct RequireRole {
    role: Role,
}

impl RequireRole {
    pub const fn new(role: Role) -> Self {
        Self { role }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service,
            role: self.role,
        }))
    }
}

/// Service wrapper produced by [`RequireRole`].
pub struct RequireRoleMiddleware<S> {
    service: S,
    role: Role,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verdict = match req.extensions().get::<AuthenticatedUser>() {
            None => Err(Error::unauthorized("unauthorized")),
            Some(user) if user.has_role(self.role) => Ok(()),
            Some(_) => Err(Error::forbidden("forbidden")),
        };
        match verdict {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                debug!(role = %self.role, code = err.code(), "role check failed");
                Box::pin(async move { Ok(req.error_response(err).map_into_right_body()) })
            }
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| Error::unauthorized("unauthorized")),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::MockIdentityVerifier;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().json(json!({
            "uid": user.uid,
            "roles": user.roles,
            "startupId": user.startup_id,
        }))
    }

    fn accepting_verifier() -> Arc<dyn IdentityVerifier> {
        let mut verifier = MockIdentityVerifier::new();
        verifier.expect_verify().returning(|token| {
            if token == "good" {
                Ok(VerifiedIdentity {
                    uid: "uid-7".to_owned(),
                    email: None,
                    roles: vec!["startup".to_owned()],
                    startup_id: Some("s-7".to_owned()),
                })
            } else {
                Err(IdentityVerificationError::rejected("bad signature"))
            }
        });
        Arc::new(verifier)
    }

    async fn call(
        auth: Authenticate,
        request: test::TestRequest,
    ) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new().service(
                web::scope("/v1")
                    .wrap(auth)
                    .route("/health", web::get().to(|| async { HttpResponse::Ok().json(json!({})) }))
                    .route("/me", web::get().to(whoami))
                    .service(
                        web::scope("/investors")
                            .wrap(RequireRole::new(Role::Investor))
                            .route("", web::get().to(whoami)),
                    ),
            ),
        )
        .await;
        let res = test::call_service(&app, request.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[actix_web::test]
    async fn verified_tokens_populate_the_identity() {
        let (status, body) = call(
            Authenticate::new(accepting_verifier()),
            test::TestRequest::get()
                .uri("/v1/me")
                .insert_header((AUTHORIZATION, "Bearer good")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uid"], "uid-7");
        assert_eq!(body["startupId"], "s-7");
    }

    #[rstest]
    #[case::missing(None, "unauthorized")]
    #[case::wrong_scheme(Some("Basic abc"), "unauthorized")]
    #[case::rejected(Some("Bearer forged"), "invalid_token")]
    #[actix_web::test]
    async fn unauthenticated_requests_get_401(
        #[case] authorization: Option<&str>,
        #[case] code: &str,
    ) {
        let mut request = test::TestRequest::get().uri("/v1/me");
        if let Some(value) = authorization {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let (status, body) = call(Authenticate::new(accepting_verifier()), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], code);
    }

    #[actix_web::test]
    async fn dev_headers_are_ignored_unless_enabled() {
        let request = || {
            test::TestRequest::get()
                .uri("/v1/me")
                .insert_header((DEBUG_ROLE_HEADER, "investor, startup"))
                .insert_header((DEBUG_STARTUP_HEADER, "s-1"))
        };
        let (status, _) = call(Authenticate::new(accepting_verifier()), request()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            Authenticate::new(accepting_verifier()).with_dev_headers(true),
            request(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uid"], "debug-user");
        assert_eq!(body["roles"], json!(["investor", "startup"]));
        assert_eq!(body["startupId"], "s-1");
    }

    #[actix_web::test]
    async fn health_bypasses_authentication() {
        let (status, _) = call(
            Authenticate::new(accepting_verifier()),
            test::TestRequest::get().uri("/v1/health"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    #[case::startup("Bearer good", None, StatusCode::FORBIDDEN)]
    #[case::investor("", Some("investor"), StatusCode::OK)]
    #[actix_web::test]
    async fn role_gate_checks_membership(
        #[case] authorization: &str,
        #[case] debug_role: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        let mut request = test::TestRequest::get().uri("/v1/investors");
        if !authorization.is_empty() {
            request = request.insert_header((AUTHORIZATION, authorization));
        }
        if let Some(role) = debug_role {
            request = request.insert_header((DEBUG_ROLE_HEADER, role));
        }
        let (status, body) = call(
            Authenticate::new(accepting_verifier()).with_dev_headers(true),
            request,
        )
        .await;
        assert_eq!(status, expected);
        if expected == StatusCode::FORBIDDEN {
            assert_eq!(body["error"], "forbidden");
        }
    }

    #[actix_web::test]
    async fn extractor_without_middleware_is_unauthorised() {
        let app = test::init_service(App::new().route("/me", web::get().to(whoami))).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
