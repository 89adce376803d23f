//! Update the authenticated user's last-known coordinates.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{Location, PublicUser, User};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(range(
        min = -90.0,
        max = 90.0,
        message = "Latitude must be between -90 and 90."
    ))]
    latitude: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180."
    ))]
    longitude: f64,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<Json<PublicUser>> {
    let location = Location {
        latitude: body.latitude,
        longitude: body.longitude,
    };
    let user = state.users.set_location(&user.id, location).await?;

    Ok(Json(user))
}
