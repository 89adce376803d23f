use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::router::create::Response;
use crate::token::USER_ROLE;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, message = "Email must not be empty."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty."))]
    pub password: String,
}

/// Handler to log a user in.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let user = state.users.authenticate(&body.email, &body.password).await?;
    let token = state.token.create(&user.id, USER_ROLE)?;

    Ok(Json(Response {
        id: user.id,
        name: user.name,
        email: user.email,
        phone_number: user.phone_number,
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::create::tests::signup_body;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn seeded_state() -> AppState {
        let state = router::state();
        let response = make_request(
            app(state.clone()),
            Method::POST,
            "/api/users/signup",
            None,
            signup_body("asha@x.com"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        state
    }

    #[tokio::test]
    async fn test_login_handler() {
        let state = seeded_state().await;

        let response = make_request(
            app(state.clone()),
            Method::POST,
            "/api/users/login",
            None,
            json!({"email": "asha@x.com", "password": "pw123"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.email, "asha@x.com");

        let claims = state.token.decode(&body.token).unwrap();
        assert_eq!(claims.sub, body.id);
        assert_eq!(claims.role, USER_ROLE);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let state = seeded_state().await;

        let wrong_password = make_request(
            app(state.clone()),
            Method::POST,
            "/api/users/login",
            None,
            json!({"email": "asha@x.com", "password": "nope"}).to_string(),
        )
        .await;
        let unknown_email = make_request(
            app(state),
            Method::POST,
            "/api/users/login",
            None,
            json!({"email": "ghost@x.com", "password": "pw123"}).to_string(),
        )
        .await;

        assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
        assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);

        // Byte-identical bodies: no account enumeration.
        let first = wrong_password.into_body().collect().await.unwrap().to_bytes();
        let second = unknown_email.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(first, second);
    }
}
