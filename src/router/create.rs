use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::token::USER_ROLE;

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(min = 1, message = "Name must not be empty."))]
    pub name: String,
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty."))]
    pub password: String,
    #[validate(length(min = 1, message = "Phone number must not be empty."))]
    pub phone_number: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub token: String,
}

/// Handler to create user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Response>)> {
    let user = state
        .users
        .register(&body.name, &body.email, &body.password, &body.phone_number)
        .await?;
    let token = state.token.create(&user.id, USER_ROLE)?;

    tracing::info!(user_id = %user.id, "account created");

    Ok((
        StatusCode::CREATED,
        Json(Response {
            id: user.id,
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            token,
        }),
    ))
}
