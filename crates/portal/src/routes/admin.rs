//! Staff order management routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use wholesale_core::document::DocumentKind;
use wholesale_core::order::Order;
use wholesale_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, OrderStore};
use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::services::{OrderWithItems, change_status, load_order, render_order_document};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

/// All orders, newest first.
///
/// GET /api/admin/orders
pub async fn list_orders(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>> {
    let mut orders = OrderRepository::new(state.pool()).list_orders(None).await?;
    if let Some(status) = query.status {
        orders.retain(|o| o.status == status);
    }
    Ok(Json(orders))
}

/// GET /api/admin/orders/{id}
pub async fn show_order(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    let store = OrderRepository::new(state.pool());
    Ok(Json(load_order(&store, id, None).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Move an order along its lifecycle.
///
/// PUT /api/admin/orders/{id}/status
#[instrument(skip_all, fields(order_id = %id, staff_id = %staff.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<OrderId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let store = OrderRepository::new(state.pool());
    Ok(Json(change_status(&store, id, update.status).await?))
}

#[derive(Debug, Deserialize)]
pub struct NotesUpdate {
    pub admin_notes: Option<String>,
}

/// Replace the internal notes on an order. Blank clears them.
///
/// PUT /api/admin/orders/{id}/notes
pub async fn update_notes(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<OrderId>,
    Json(update): Json<NotesUpdate>,
) -> Result<Json<Order>> {
    let notes = update
        .admin_notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let order = OrderRepository::new(state.pool())
        .update_admin_notes(id, notes)
        .await?;
    Ok(Json(order))
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    /// `json` (default) or `text`.
    pub format: Option<String>,
}

/// Render an order confirmation or invoice.
///
/// GET /api/admin/orders/{id}/documents/{kind}
#[instrument(skip_all, fields(order_id = %id, kind = %kind))]
pub async fn document(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path((id, kind)): Path<(OrderId, String)>,
    Query(query): Query<DocumentQuery>,
) -> Result<Response> {
    let kind: DocumentKind = kind
        .parse()
        .map_err(|_| AppError::NotFound(format!("Document kind {kind}")))?;
    let store = OrderRepository::new(state.pool());
    let document = render_order_document(&store, id, kind, &state.config().seller).await?;

    match query.format.as_deref() {
        None | Some("json") => Ok(Json(document).into_response()),
        Some("text") => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            document.to_string(),
        )
            .into_response()),
        Some(other) => Err(AppError::BadRequest(format!("Unknown format: {other}"))),
    }
}
