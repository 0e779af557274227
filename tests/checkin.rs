mod common;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use boletera_server::auth::Role;
use boletera_server::models::ticket::{GenerateTickets, Ticket, TicketStatus, ValidationOutcome};

use common::{auth, seed_active_event, seed_ticket_type, seed_user, stock_of};

#[sqlx::test]
async fn scanning_a_verified_ticket_grants_access_exactly_once(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    let event = seed_active_event(&pool, &organizer, "Scan Fest").await;

    let tickets = Ticket::generate(
        &pool,
        GenerateTickets {
            event_id: event.id,
            holder_name: "Guest Uno".to_string(),
            quantity: 1,
            ticket_type_name: "VIP".to_string(),
        },
    )
    .await
    .unwrap();
    let ticket_id = tickets[0].id;

    let first = Ticket::redeem(&pool, ticket_id).await.unwrap();
    let first_used_at = match first {
        ValidationOutcome::AccessGranted { holder_name, used_at } => {
            assert_eq!(holder_name, "Guest Uno");
            used_at.expect("used_at stamped on redemption")
        }
        other => panic!("expected AccessGranted, got {:?}", other),
    };

    // The second scan is informational and does not move the timestamp.
    let second = Ticket::redeem(&pool, ticket_id).await.unwrap();
    match second {
        ValidationOutcome::AlreadyUsed { holder_name, used_at } => {
            assert_eq!(holder_name, "Guest Uno");
            assert_eq!(used_at, Some(first_used_at));
        }
        other => panic!("expected AlreadyUsed, got {:?}", other),
    }

    let ticket = Ticket::find(&pool, ticket_id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Used);
    assert_eq!(ticket.used_at, Some(first_used_at));
}

#[sqlx::test]
async fn scanning_an_unknown_ticket_mutates_nothing(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    let event = seed_active_event(&pool, &organizer, "Strict Gate").await;

    Ticket::generate(
        &pool,
        GenerateTickets {
            event_id: event.id,
            holder_name: "Guest Dos".to_string(),
            quantity: 2,
            ticket_type_name: "General".to_string(),
        },
    )
    .await
    .unwrap();

    let outcome = Ticket::redeem(&pool, Uuid::new_v4()).await.unwrap();
    assert!(matches!(outcome, ValidationOutcome::TicketNotFound));

    let used_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE status = 'used'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(used_count, 0);
}

#[sqlx::test]
async fn manual_generation_bypasses_orders_and_inventory(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    let event = seed_active_event(&pool, &organizer, "Comp Night").await;
    let ticket_type = seed_ticket_type(&pool, &event, Decimal::new(3000, 2), Some(5)).await;

    let tickets = Ticket::generate(
        &pool,
        GenerateTickets {
            event_id: event.id,
            holder_name: "Invitado".to_string(),
            quantity: 5,
            ticket_type_name: "Cortesia".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(tickets.len(), 5);
    for ticket in &tickets {
        assert_eq!(ticket.order_id, None);
        assert_eq!(ticket.user_id, None);
        assert_eq!(ticket.status, TicketStatus::Verified);
        assert_eq!(ticket.holder_name, "Invitado");
    }

    assert_eq!(stock_of(&pool, ticket_type.id).await, Some(5));
}

#[sqlx::test]
async fn generating_for_a_missing_event_fails(pool: PgPool) {
    let err = Ticket::generate(
        &pool,
        GenerateTickets {
            event_id: Uuid::new_v4(),
            holder_name: "Nadie".to_string(),
            quantity: 1,
            ticket_type_name: "General".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        boletera_server::utils::error::AppError::NotFound(_)
    ));
}
