//! Public user listing.

use axum::{Json, extract::State};

use crate::AppState;
use crate::error::Result;
use crate::user::PublicUser;

/// Always the [`PublicUser`] projection, never storage records.
pub async fn handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>> {
    Ok(Json(state.users.list().await?))
}
