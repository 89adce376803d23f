//! Get the authenticated user's profile.

use axum::{Extension, Json, extract::State};

use crate::AppState;
use crate::error::Result;
use crate::user::{Profile, User};

pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Profile>> {
    // Re-read so a record gone since token issuance turns into a 404.
    let profile = state.users.profile(&user.id).await?;

    Ok(Json(profile))
}
