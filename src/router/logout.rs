use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::user::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
    pub token: String,
}

/// Handler to log a user out.
///
/// No session is kept server-side: the response carries a marker token that
/// expires on its own after a second.
pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Response>> {
    let token = state.token.logout_marker(&user.id)?;

    Ok(Json(Response {
        message: "User successfully logged out".to_owned(),
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::create::tests::signup_body;
    use crate::token::LOGOUT_EXPIRATION_TIME;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_logout_handler() {
        let state = router::state();

        let response = make_request(
            app(state.clone()),
            Method::POST,
            "/api/users/signup",
            None,
            signup_body("asha@x.com"),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let created: router::create::Response =
            serde_json::from_slice(&body).unwrap();

        let response = make_request(
            app(state.clone()),
            Method::GET,
            "/api/users/logout",
            Some(&created.token),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.message, "User successfully logged out");

        let claims = state.token.decode(&body.token).unwrap();
        assert_eq!(claims.sub, created.id);
        assert_eq!(claims.exp, claims.iat + LOGOUT_EXPIRATION_TIME);
    }

    #[tokio::test]
    async fn test_logout_requires_token() {
        let response = make_request(
            app(router::state()),
            Method::GET,
            "/api/users/logout",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
