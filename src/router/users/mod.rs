//! Users-related HTTP API.
mod get;
mod list;
mod location;
mod update;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, put};
use axum::Router;

use crate::user::User;
use crate::{AppState, ServerError};

const BEARER: &str = "Bearer ";

/// Custom middleware for authentification.
///
/// Resolves the token subject and attaches the matching [`User`] to the
/// request. A valid token whose subject no longer exists is a 404, not a 401.
async fn auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ServerError::Unauthorized)?;
    let token = token.replace(BEARER, "");

    let claims = state
        .token
        .decode(&token)
        .map_err(|_| ServerError::Unauthorized)?;

    let user = state.users.find(&claims.sub).await?;
    req.extensions_mut().insert::<User>(user);

    Ok(next.run(req).await)
}

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // `GET /api/users/logout` goes to `logout`. Authorization required.
        .route("/api/users/logout", get(super::logout::handler))
        // `GET /api/users/profile` goes to `get`. Authorization required.
        .route("/api/users/profile", get(get::handler))
        // `PATCH /api/users/update-profile` goes to `update`. Authorization required.
        .route("/api/users/update-profile", patch(update::handler))
        // `PUT /api/users/location` goes to `location`. Authorization required.
        .route("/api/users/location", put(location::handler))
        .route_layer(middleware::from_fn_with_state(state, auth));

    Router::new()
        // `GET /api/users` goes to `list`. Public.
        .route("/api/users", get(list::handler))
        .merge(protected)
}
