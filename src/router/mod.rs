pub mod create;
pub mod login;
pub mod logout;
pub mod users;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ServerError;

/// Reject bodies failing their declared validation rules before handlers run.
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// State over the in-memory store. MUST NEVER be used in production.
#[cfg(test)]
pub(crate) fn state() -> crate::AppState {
    use std::sync::Arc;

    // Cheap hashing parameters, strength is not under test.
    let pwd = crate::crypto::PasswordManager::new(Some(
        crate::config::Argon2 {
            memory_cost: 8 * 1024,
            iterations: 1,
            parallelism: 1,
            hash_length: 32,
        },
    ))
    .expect("argon2 params");

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        users: crate::user::UserService::new(
            Arc::new(crate::user::MemoryUserStore::new()),
            Arc::new(pwd),
        ),
        token: crate::token::TokenManager::new(
            "https://refuel.app/",
            "test-secret-do-not-use",
        ),
    }
}
