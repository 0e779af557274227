mod common;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use boletera_server::auth::Role;
use boletera_server::models::event::{Event, EventChanges, NewEvent};
use boletera_server::models::order::OrderStatus;
use boletera_server::models::order::Order;
use boletera_server::utils::error::AppError;

use common::{auth, seed_active_event, seed_pending_order, seed_ticket_type, seed_user};

fn new_event(name: &str) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        description: None,
        category: None,
        date: Utc::now() + Duration::days(10),
        location: "Arequipa".to_string(),
        image_url: None,
        company_id: None,
        informative_only: false,
    }
}

#[sqlx::test]
async fn slugs_are_derived_and_deduplicated(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    seed_user(&pool, &organizer, "Olga Organizer").await;

    let first = Event::create(&pool, &organizer, new_event("Mi Evento!"))
        .await
        .unwrap();
    assert_eq!(first.slug, "mi-evento");

    let second = Event::create(&pool, &organizer, new_event("Mi Evento!"))
        .await
        .unwrap();
    assert_eq!(second.slug, "mi-evento-1");

    let third = Event::create(&pool, &organizer, new_event("Mi Evento!"))
        .await
        .unwrap();
    assert_eq!(third.slug, "mi-evento-2");
}

#[sqlx::test]
async fn renaming_regenerates_the_slug_excluding_the_event_itself(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    seed_user(&pool, &organizer, "Olga Organizer").await;

    let gala = Event::create(&pool, &organizer, new_event("Gala")).await.unwrap();
    let fiesta = Event::create(&pool, &organizer, new_event("Fiesta")).await.unwrap();
    assert_eq!(gala.slug, "gala");
    assert_eq!(fiesta.slug, "fiesta");

    // Renaming into a taken name picks the next free suffix.
    let renamed = Event::update(
        &pool,
        fiesta.id,
        EventChanges {
            name: Some("Gala".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.slug, "gala-1");

    // An update that keeps the name keeps the slug; the event's own row
    // is excluded from the collision check.
    let untouched = Event::update(
        &pool,
        gala.id,
        EventChanges {
            name: Some("Gala".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(untouched.slug, "gala");
}

#[sqlx::test]
async fn deleting_an_event_is_blocked_while_orders_reference_it(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    let customer = auth(Role::Customer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    seed_user(&pool, &customer, "Carla Customer").await;

    let event = seed_active_event(&pool, &organizer, "Protected Fest").await;
    let ticket_type = seed_ticket_type(&pool, &event, Decimal::new(2000, 2), Some(10)).await;
    seed_pending_order(&pool, &customer, &event, &ticket_type, 1).await;

    let err = Event::delete(&pool, event.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(Event::find(&pool, event.id).await.unwrap().is_some());
}

#[sqlx::test]
async fn deleting_an_event_without_orders_cascades_ticket_types(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    seed_user(&pool, &organizer, "Olga Organizer").await;

    let event = seed_active_event(&pool, &organizer, "Ephemeral Fest").await;
    seed_ticket_type(&pool, &event, Decimal::new(2000, 2), Some(10)).await;

    Event::delete(&pool, event.id).await.unwrap();

    assert!(Event::find(&pool, event.id).await.unwrap().is_none());
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ticket_types")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[sqlx::test]
async fn checkout_rejects_informative_and_inactive_events(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    let customer = auth(Role::Customer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    seed_user(&pool, &customer, "Carla Customer").await;

    // Draft event: not purchasable yet.
    let draft = Event::create(&pool, &organizer, new_event("Draft Fest")).await.unwrap();
    let ticket_type = seed_ticket_type(&pool, &draft, Decimal::new(2000, 2), Some(10)).await;

    let err = Order::checkout(
        &pool,
        customer.id,
        boletera_server::models::order::Checkout {
            event_id: draft.id,
            ticket_type_id: ticket_type.id,
            quantity: 1,
            receipt_url: "/uploads/receipts/r.png".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let orders = Order::list(
        &pool,
        boletera_server::auth::AccessScope::Admin,
        Some(OrderStatus::Pending),
    )
    .await
    .unwrap();
    assert!(orders.is_empty());
}
