//! Founder and investor accounts.
//!
//! Both account kinds live in the `users` collection and are discriminated by
//! `role`. The stored password is an Argon2 PHC string and is stripped from
//! every document this module hands back.

use std::sync::Arc;

use mockable::Clock;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::ports::{
    Collection, Document, DocumentData, DocumentQuery, DocumentStore, PasswordHashError,
    PasswordHasher,
};
use crate::domain::service_support::{map_store_error, nullable, object, stamped};
use crate::domain::{Error, Role, now_timestamp};

/// Error code returned when any registration field is missing.
pub const USER_FIELDS_REQUIRED: &str =
    "email_username_password_firstName_lastName_companyName_phoneNumber_role_required";

/// Registration or creation payload as received from clients.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
    pub company_website: Option<String>,
    pub role: Option<String>,
}

/// Validated registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub phone_number: String,
    pub company_website: Option<String>,
    pub role: Role,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

impl UserForm {
    /// Check every required field and the role.
    ///
    /// # Errors
    /// [`USER_FIELDS_REQUIRED`] when a field is missing or blank, and
    /// `invalid_role` when the role is neither `startup` nor `investor`.
    pub fn validate(self) -> Result<NewUser, Error> {
        let missing = || Error::invalid_request(USER_FIELDS_REQUIRED);
        let role = present(self.role).ok_or_else(missing)?;
        let user = NewUser {
            email: present(self.email).ok_or_else(missing)?,
            username: present(self.username).ok_or_else(missing)?,
            password: present(self.password).ok_or_else(missing)?,
            first_name: present(self.first_name).ok_or_else(missing)?,
            last_name: present(self.last_name).ok_or_else(missing)?,
            company_name: present(self.company_name).ok_or_else(missing)?,
            phone_number: present(self.phone_number).ok_or_else(missing)?,
            company_website: present(self.company_website),
            role: role
                .parse()
                .map_err(|_| Error::invalid_request("invalid_role"))?,
        };
        Ok(user)
    }
}

/// Login payload.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Document as returned to clients: `{"id", ...fields}` without `password`.
pub fn public_user(mut document: Document) -> Value {
    document.data.remove("password");
    document.into_json()
}

/// Fixed identity served by `GET /v1/auth/me`.
pub fn current_user_stub() -> Value {
    json!({
        "id": "current_user_id",
        "email": "user@example.com",
        "username": "currentuser",
        "firstName": "Current",
        "lastName": "User",
        "name": "Current Company",
        "phoneNumber": "+1234567890",
        "companyWebsite": "https://currentcompany.com",
        "role": "startup",
    })
}

/// Account management over the `users` collection.
pub struct UserService {
    store: Arc<dyn DocumentStore>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hasher,
            clock,
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Document>, Error> {
        let query = DocumentQuery::new().where_eq("email", email).limit(1);
        let mut found = self
            .store
            .query(Collection::Users, &query)
            .await
            .map_err(map_store_error)?;
        Ok(found.pop())
    }

    /// Register an account. Only the email must be unique.
    ///
    /// # Errors
    /// Validation codes from [`UserForm::validate`], `email_already_exists`,
    /// or `internal_error` when hashing or the store fails.
    pub async fn register(&self, form: UserForm) -> Result<Value, Error> {
        let user = form.validate()?;
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(Error::invalid_request("email_already_exists"));
        }
        let hash = self
            .hasher
            .hash(&user.password)
            .map_err(|err| Error::internal(err.to_string()))?;

        let now = now_timestamp(self.clock.as_ref());
        let data = stamped(
            object(json!({
                "email": user.email,
                "username": user.username,
                "password": hash,
                "firstName": user.first_name,
                "lastName": user.last_name,
                "name": user.company_name,
                "phoneNumber": user.phone_number,
                "companyWebsite": nullable(user.company_website.as_deref()),
                "role": user.role,
            })),
            &now,
        );
        let id = self
            .store
            .add(Collection::Users, data.clone())
            .await
            .map_err(map_store_error)?;
        info!(user_id = %id, role = %user.role, "user registered");
        Ok(public_user(Document::new(id, data)))
    }

    /// Check credentials and return the stored account.
    ///
    /// # Errors
    /// `email_password_required` or `invalid_credentials`.
    pub async fn login(&self, form: LoginForm) -> Result<Value, Error> {
        let (Some(email), Some(password)) = (present(form.email), present(form.password)) else {
            return Err(Error::invalid_request("email_password_required"));
        };
        let rejected = || Error::unauthorized("invalid_credentials");
        let document = self.find_by_email(&email).await?.ok_or_else(rejected)?;
        let stored_hash = document.str_field("password").unwrap_or_default();

        match self.hasher.verify(&password, stored_hash) {
            Ok(true) => Ok(public_user(document)),
            Ok(false) => Err(rejected()),
            Err(PasswordHashError::MalformedHash { message }) => {
                warn!(user_id = %document.id, %message, "stored password hash is unreadable");
                Err(rejected())
            }
            Err(err) => Err(Error::internal(err.to_string())),
        }
    }

    /// All accounts, optionally restricted to one role.
    pub async fn list(&self, role: Option<Role>) -> Result<Vec<Value>, Error> {
        let query = match role {
            Some(role) => DocumentQuery::new().where_eq("role", role.as_str()),
            None => DocumentQuery::new(),
        };
        let documents = self
            .store
            .query(Collection::Users, &query)
            .await
            .map_err(map_store_error)?;
        Ok(documents.into_iter().map(public_user).collect())
    }

    /// One account by identifier.
    ///
    /// # Errors
    /// `user_not_found` when absent.
    pub async fn get(&self, id: &str) -> Result<Value, Error> {
        self.store
            .get(Collection::Users, id)
            .await
            .map_err(map_store_error)?
            .map(public_user)
            .ok_or_else(|| Error::not_found("user_not_found"))
    }

    /// Patch profile fields. `id`, `password` and `createdAt` are ignored.
    ///
    /// # Errors
    /// `no_valid_fields_to_update` when nothing remains after stripping, and
    /// `user_not_found` when the account does not exist.
    pub async fn update(&self, id: &str, mut patch: DocumentData) -> Result<Value, Error> {
        for protected in ["id", "password", "createdAt"] {
            patch.remove(protected);
        }
        if patch.is_empty() {
            return Err(Error::invalid_request("no_valid_fields_to_update"));
        }
        if self
            .store
            .get(Collection::Users, id)
            .await
            .map_err(map_store_error)?
            .is_none()
        {
            return Err(Error::not_found("user_not_found"));
        }
        patch.insert(
            "updatedAt".to_owned(),
            Value::String(now_timestamp(self.clock.as_ref())),
        );
        self.store
            .update(Collection::Users, id, patch)
            .await
            .map_err(map_store_error)?;
        self.get(id).await
    }
}
