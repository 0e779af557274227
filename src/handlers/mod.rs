use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod companies;
pub mod dashboard;
pub mod events;
pub mod orders;
pub mod organizers;
pub mod ticket_types;
pub mod tickets;
pub mod uploads;
pub mod users;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "boletera-api",
    };

    success(payload, "Health check successful")
}
