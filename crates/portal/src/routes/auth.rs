//! Session routes.
//!
//! Sign-in itself happens at the identity service; these endpoints only bind
//! a verified identity to the portal session.

use axum::{Json, extract::State, http::StatusCode};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument};

use wholesale_core::{BuyerId, PortalRole};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_buyer, set_current_buyer};
use crate::models::CurrentBuyer;
use crate::state::AppState;

/// Token exchange request.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub access_token: SecretString,
}

/// The identity now bound to the session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: BuyerId,
    pub email: String,
    pub role: PortalRole,
}

/// Exchange an identity access token for a portal session.
///
/// POST /auth/session
#[instrument(skip_all)]
pub async fn create_session(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionResponse>> {
    let user = state.identity().verify(&request.access_token).await?;
    let buyer = CurrentBuyer::from(user);

    set_current_buyer(&session, &buyer).await?;
    set_sentry_user(&buyer.id, Some(&buyer.email));
    info!(user_id = %buyer.id, role = %buyer.role, "Session started");

    Ok(Json(SessionResponse {
        id: buyer.id,
        email: buyer.email,
        role: buyer.role,
    }))
}

/// Drop the session, including its cart.
///
/// POST /auth/logout
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_buyer(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
