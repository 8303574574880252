//! Authentication extractors.
//!
//! The signed-in identity is read from the session. [`RequireBuyer`] accepts
//! any signed-in user; [`RequireStaff`] additionally requires the staff role.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentBuyer, session_keys};

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireBuyer(buyer): RequireBuyer) -> impl IntoResponse {
///     format!("Hello, {}!", buyer.email)
/// }
/// ```
pub struct RequireBuyer(pub CurrentBuyer);

/// Extractor that requires a signed-in staff member.
pub struct RequireStaff(pub CurrentBuyer);

/// Rejection for the authentication extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No identity in the session.
    Unauthorized,
    /// Signed in, but not allowed here.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Not signed in").into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Staff access required").into_response(),
        }
    }
}

async fn current_buyer(parts: &Parts) -> Option<CurrentBuyer> {
    // Set by SessionManagerLayer
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentBuyer>(session_keys::CURRENT_BUYER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireBuyer
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_buyer(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_buyer(parts)
            .await
            .ok_or(AuthRejection::Unauthorized)?;
        if !user.is_staff() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-staff user on admin route");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Helper to set the current buyer in the session.
///
/// The session ID is cycled first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_buyer(
    session: &Session,
    buyer: &CurrentBuyer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_BUYER, buyer).await
}

/// Helper to clear the session on logout, cart included.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_buyer(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
