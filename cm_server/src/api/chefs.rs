//! Chef profile handlers.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chef_market::auth::{ChefProfilePayload, SessionIdentity};
use serde::{Deserialize, Serialize};

use super::{AppState, auth::UserResponse, error::ApiError};

/// Body of `PUT /chefs`
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialtyPayload {
    pub cuisine_specialty: Vec<String>,
}

/// Register the current user as a chef.
///
/// # Request Body
///
/// ```json
/// { "cuisineSpecialty": ["Thai", "Vegan"], "bio": "Street food at home" }
/// ```
///
/// # Response
///
/// `201 Created` with `{"user": {..}}`.
pub async fn register_chef(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    payload: Result<Json<ChefProfilePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(payload) = payload?;

    let user = state
        .auth_manager
        .register_chef(identity.id, payload)
        .await?;
    tracing::info!(user_id = %user.id, "Chef profile created");

    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

/// Replace the current chef's cuisine specialty.
///
/// # Errors
///
/// - `400 Bad Request`: the user has no chef profile yet
pub async fn update_specialty(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    payload: Result<Json<SpecialtyPayload>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(payload) = payload?;

    let user = state
        .auth_manager
        .update_chef_specialty(identity.id, payload.cuisine_specialty)
        .await?;

    Ok(Json(UserResponse { user }))
}
