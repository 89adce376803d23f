//! Update the authenticated user's profile.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{Profile, ProfilePatch, User};

/// Allow-listed patch: unknown fields, `email` and any password field
/// included, are rejected outright.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Body {
    #[validate(length(min = 1, message = "Name must not be empty."))]
    name: Option<String>,
    #[validate(length(min = 1, message = "Phone number must not be empty."))]
    phone_number: Option<String>,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<Json<Profile>> {
    let patch = ProfilePatch {
        name: body.name,
        phone_number: body.phone_number,
    };
    let profile = state.users.update_profile(&user.id, patch).await?;

    Ok(Json(profile))
}
