use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    companies, dashboard, events, health_check, orders, organizers, ticket_types, tickets, uploads,
    users,
};
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/events", post(events::create_event).get(events::list_events))
        .route(
            "/events/:id",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/:id/ticket-types",
            post(ticket_types::create_ticket_type).get(ticket_types::list_ticket_types),
        )
        .route(
            "/ticket-types/:id",
            patch(ticket_types::update_ticket_type).delete(ticket_types::delete_ticket_type),
        )
        .route(
            "/events/:id/organizers",
            put(organizers::grant_role).get(organizers::list_organizers),
        )
        .route("/events/:id/organizers/:user_id", delete(organizers::revoke_role))
        .route("/orders", post(orders::checkout).get(orders::list_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/status", post(orders::review_order))
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets/generate", post(tickets::generate_tickets))
        .route("/tickets/:id/validate", post(tickets::validate_ticket))
        .route("/uploads/receipts", post(uploads::upload_receipt))
        .route("/uploads/images", post(uploads::upload_image))
        .route("/dashboard/summary", get(dashboard::summary))
        .route("/users/me", put(users::sync_profile))
        .route(
            "/companies",
            post(companies::create_company).get(companies::list_companies),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
