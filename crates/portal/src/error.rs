//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use wholesale_core::order::SubmissionError;

use crate::db::RepositoryError;
use crate::identity::IdentityError;
use crate::services::{CheckoutError, OrderServiceError};
use crate::shopify::ShopifyError;

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Identity service operation failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Order submission failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request understood but rejected by a business rule.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// State changed underneath the request, or the transition is not allowed.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<OrderServiceError> for AppError {
    fn from(err: OrderServiceError) -> Self {
        match err {
            OrderServiceError::NotFound(id) => Self::NotFound(format!("Order {id}")),
            OrderServiceError::IllegalTransition { .. } => Self::Conflict(err.to_string()),
            OrderServiceError::Repository(RepositoryError::Conflict(msg)) => Self::Conflict(msg),
            OrderServiceError::Repository(e) => Self::Database(e),
        }
    }
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Shopify(_) | Self::Session(_) | Self::Internal(_) => true,
            Self::Identity(e) => !matches!(e, IdentityError::InvalidToken),
            Self::Checkout(e) => matches!(
                e,
                CheckoutError::Header(_) | CheckoutError::PartialWrite { .. }
            ),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::Identity(IdentityError::InvalidToken) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Identity(_) => StatusCode::BAD_GATEWAY,
            Self::Checkout(e) => match e {
                CheckoutError::Invalid(SubmissionError::EmptyCart) => StatusCode::BAD_REQUEST,
                CheckoutError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::InProgress => StatusCode::CONFLICT,
                CheckoutError::Header(_) | CheckoutError::PartialWrite { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(_)) => {
                "The resource was modified concurrently, please retry".to_string()
            }
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Shopify(_) => "External service error".to_string(),
            Self::Identity(IdentityError::InvalidToken) => {
                "Invalid or expired access token".to_string()
            }
            Self::Identity(_) => "External service error".to_string(),
            Self::Checkout(e) => match e {
                CheckoutError::Invalid(inner) => inner.to_string(),
                CheckoutError::InProgress => e.to_string(),
                CheckoutError::Header(_) | CheckoutError::PartialWrite { .. } => {
                    "Your order could not be saved, please try again".to_string()
                }
            },
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg)
            | Self::Unprocessable(msg)
            | Self::Conflict(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let mut body = json!({ "error": self.public_message() });
        if let Self::Checkout(CheckoutError::Invalid(SubmissionError::BelowMinimum {
            status: minimum,
            ..
        })) = &self
        {
            body["minimum_order"] = json!(minimum);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", "gid://shopify/ProductVariant/1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wholesale_core::OrderId;
    use wholesale_core::OrderStatus;
    use wholesale_core::cart::MinimumOrderStatus;
    use rust_decimal::Decimal;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order-123".to_string());
        assert_eq!(err.to_string(), "Not found: order-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::RateLimited(1))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Identity(IdentityError::InvalidToken)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_checkout_status_codes() {
        assert_eq!(
            get_status(CheckoutError::Invalid(SubmissionError::EmptyCart).into()),
            StatusCode::BAD_REQUEST
        );
        let status = MinimumOrderStatus::for_total(Decimal::from(100));
        let below = SubmissionError::BelowMinimum {
            status,
            message: status.message().unwrap(),
        };
        assert_eq!(
            get_status(CheckoutError::Invalid(below).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(CheckoutError::InProgress.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(
                CheckoutError::PartialWrite {
                    order_id: OrderId::random(),
                    compensated: false,
                    source: RepositoryError::NotFound,
                }
                .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_illegal_transition_is_conflict() {
        let err: AppError = OrderServiceError::IllegalTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        }
        .into();
        assert_eq!(get_status(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "negative quantity".to_string(),
        ));
        assert_eq!(err.public_message(), "Internal server error");
    }
}
