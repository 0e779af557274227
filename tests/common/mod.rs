#![allow(dead_code)]

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use boletera_server::auth::{AuthUser, Role};
use boletera_server::models::event::{Event, EventChanges, EventStatus, NewEvent};
use boletera_server::models::order::{Checkout, Order};
use boletera_server::models::ticket_type::{NewTicketType, TicketType};
use boletera_server::models::user::{SyncProfile, User, UserRole};

pub fn auth(role: Role) -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        role,
        company_id: None,
    }
}

pub async fn seed_user(pool: &PgPool, auth: &AuthUser, name: &str) -> User {
    let role = match auth.role {
        Role::Admin => UserRole::Admin,
        Role::Organizer => UserRole::Organizer,
        Role::Validator => UserRole::Validator,
        Role::Customer => UserRole::Customer,
    };

    User::sync(
        pool,
        auth.id,
        role,
        auth.company_id,
        &SyncProfile {
            name: name.to_string(),
            email: format!("{}@example.com", auth.id),
        },
    )
    .await
    .expect("seed user")
}

/// Creates an event and moves it to `active` so orders can be placed.
pub async fn seed_active_event(pool: &PgPool, organizer: &AuthUser, name: &str) -> Event {
    let event = Event::create(
        pool,
        organizer,
        NewEvent {
            name: name.to_string(),
            description: None,
            category: Some("music".to_string()),
            date: Utc::now() + Duration::days(30),
            location: "Lima".to_string(),
            image_url: None,
            company_id: None,
            informative_only: false,
        },
    )
    .await
    .expect("seed event");

    Event::update(
        pool,
        event.id,
        EventChanges {
            status: Some(EventStatus::Active),
            ..Default::default()
        },
    )
    .await
    .expect("activate event")
}

pub async fn seed_ticket_type(
    pool: &PgPool,
    event: &Event,
    price: Decimal,
    quantity_available: Option<i32>,
) -> TicketType {
    TicketType::create(
        pool,
        event.id,
        NewTicketType {
            name: "General".to_string(),
            price,
            quantity_available,
        },
    )
    .await
    .expect("seed ticket type")
}

pub async fn seed_pending_order(
    pool: &PgPool,
    customer: &AuthUser,
    event: &Event,
    ticket_type: &TicketType,
    quantity: i32,
) -> Order {
    Order::checkout(
        pool,
        customer.id,
        Checkout {
            event_id: event.id,
            ticket_type_id: ticket_type.id,
            quantity,
            receipt_url: "/uploads/receipts/1-test.png".to_string(),
        },
    )
    .await
    .expect("seed order")
}

pub async fn stock_of(pool: &PgPool, ticket_type_id: Uuid) -> Option<i32> {
    TicketType::find(pool, ticket_type_id)
        .await
        .expect("find ticket type")
        .expect("ticket type exists")
        .quantity_available
}
