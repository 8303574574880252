//! Buyer company profile routes.

use axum::{Json, extract::State};
use tracing::{info, instrument};

use wholesale_core::profile::{BuyerProfile, ProfileUpdate};

use crate::db::ProfileRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireBuyer;
use crate::state::AppState;

/// The buyer's profile, or a blank one prefilled with the sign-in email.
///
/// GET /api/profile
pub async fn show(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
) -> Result<Json<BuyerProfile>> {
    let profile = ProfileRepository::new(state.pool())
        .get(buyer.id)
        .await?
        .unwrap_or_else(|| BuyerProfile::blank(buyer.id, buyer.email));
    Ok(Json(profile))
}

/// Replace the buyer's profile.
///
/// PUT /api/profile
#[instrument(skip_all, fields(user_id = %buyer.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<BuyerProfile>> {
    let profile = update
        .into_profile(buyer.id)
        .map_err(|e| AppError::Unprocessable(e.to_string()))?;
    let saved = ProfileRepository::new(state.pool()).upsert(&profile).await?;
    info!("Profile updated");
    Ok(Json(saved))
}
