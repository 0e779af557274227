mod common;

use rust_decimal::Decimal;
use sqlx::PgPool;

use boletera_server::auth::Role;
use boletera_server::models::order::{Order, OrderStatus};
use boletera_server::models::ticket::TicketStatus;
use boletera_server::models::ticket_type::{TicketType, TicketTypeChanges};
use boletera_server::utils::error::AppError;

use common::{auth, seed_active_event, seed_pending_order, seed_ticket_type, seed_user, stock_of};

#[sqlx::test]
async fn approving_an_order_decrements_stock_and_mints_tickets(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    let customer = auth(Role::Customer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    seed_user(&pool, &customer, "Carla Customer").await;

    let event = seed_active_event(&pool, &organizer, "UNIDAFEST 2025").await;
    let ticket_type = seed_ticket_type(&pool, &event, Decimal::new(5000, 2), Some(10)).await;
    let order = seed_pending_order(&pool, &customer, &event, &ticket_type, 3).await;

    let reviewed = Order::set_status(&pool, order.id, organizer.id, OrderStatus::Approved)
        .await
        .unwrap();

    assert_eq!(reviewed.order.status, OrderStatus::Approved);
    assert_eq!(reviewed.order.reviewed_by, Some(organizer.id));
    assert!(reviewed.order.reviewed_at.is_some());

    assert_eq!(reviewed.tickets.len(), 3);
    for ticket in &reviewed.tickets {
        assert_eq!(ticket.order_id, Some(order.id));
        assert_eq!(ticket.user_id, Some(customer.id));
        assert_eq!(ticket.event_id, event.id);
        assert_eq!(ticket.status, TicketStatus::Verified);
        assert_eq!(ticket.ticket_type_name, "General");
        assert_eq!(ticket.holder_name, "Carla Customer");
    }

    assert_eq!(stock_of(&pool, ticket_type.id).await, Some(7));
}

#[sqlx::test]
async fn approving_beyond_stock_changes_nothing(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    let customer = auth(Role::Customer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    seed_user(&pool, &customer, "Carla Customer").await;

    let event = seed_active_event(&pool, &organizer, "Sold Out Fest").await;
    let ticket_type = seed_ticket_type(&pool, &event, Decimal::new(2500, 2), Some(2)).await;
    let order = seed_pending_order(&pool, &customer, &event, &ticket_type, 5).await;

    let err = Order::set_status(&pool, order.id, organizer.id, OrderStatus::Approved)
        .await
        .unwrap_err();

    match err {
        AppError::InsufficientStock { remaining } => assert_eq!(remaining, 2),
        other => panic!("expected InsufficientStock, got {:?}", other),
    }

    // Stock untouched, no tickets, order still pending and retryable.
    assert_eq!(stock_of(&pool, ticket_type.id).await, Some(2));
    let order = Order::find(&pool, order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let ticket_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(ticket_count, 0);
}

#[sqlx::test]
async fn rejected_orders_never_mint_and_cannot_be_reapproved(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    let customer = auth(Role::Customer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    seed_user(&pool, &customer, "Carla Customer").await;

    let event = seed_active_event(&pool, &organizer, "Gala Night").await;
    let ticket_type = seed_ticket_type(&pool, &event, Decimal::new(10000, 2), Some(4)).await;
    let order = seed_pending_order(&pool, &customer, &event, &ticket_type, 2).await;

    let reviewed = Order::set_status(&pool, order.id, organizer.id, OrderStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(reviewed.order.status, OrderStatus::Rejected);
    assert!(reviewed.tickets.is_empty());
    assert_eq!(stock_of(&pool, ticket_type.id).await, Some(4));

    // The review is terminal; a second attempt conflicts and mints nothing.
    let err = Order::set_status(&pool, order.id, organizer.id, OrderStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let ticket_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(ticket_count, 0);
    assert_eq!(stock_of(&pool, ticket_type.id).await, Some(4));
}

#[sqlx::test]
async fn unlimited_stock_is_never_checked_or_decremented(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    let customer = auth(Role::Customer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    seed_user(&pool, &customer, "Carla Customer").await;

    let event = seed_active_event(&pool, &organizer, "Open Air").await;
    let ticket_type = seed_ticket_type(&pool, &event, Decimal::new(1500, 2), None).await;
    let order = seed_pending_order(&pool, &customer, &event, &ticket_type, 4).await;

    let reviewed = Order::set_status(&pool, order.id, organizer.id, OrderStatus::Approved)
        .await
        .unwrap();

    assert_eq!(reviewed.tickets.len(), 4);
    assert_eq!(stock_of(&pool, ticket_type.id).await, None);
}

#[sqlx::test]
async fn order_total_is_computed_once_at_checkout(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    let customer = auth(Role::Customer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    seed_user(&pool, &customer, "Carla Customer").await;

    let event = seed_active_event(&pool, &organizer, "Price Change Fest").await;
    let ticket_type = seed_ticket_type(&pool, &event, Decimal::new(5000, 2), Some(10)).await;
    let order = seed_pending_order(&pool, &customer, &event, &ticket_type, 2).await;

    assert_eq!(order.total_price, Decimal::new(10000, 2));

    // A later price change does not retroactively alter the order.
    TicketType::update(
        &pool,
        ticket_type.id,
        TicketTypeChanges {
            price: Some(Decimal::new(8000, 2)),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let order = Order::find(&pool, order.id).await.unwrap().unwrap();
    assert_eq!(order.total_price, Decimal::new(10000, 2));
}

#[sqlx::test]
async fn reviewer_cannot_set_non_terminal_statuses(pool: PgPool) {
    let organizer = auth(Role::Organizer);
    let customer = auth(Role::Customer);
    seed_user(&pool, &organizer, "Olga Organizer").await;
    seed_user(&pool, &customer, "Carla Customer").await;

    let event = seed_active_event(&pool, &organizer, "No Cancel Fest").await;
    let ticket_type = seed_ticket_type(&pool, &event, Decimal::new(1000, 2), Some(5)).await;
    let order = seed_pending_order(&pool, &customer, &event, &ticket_type, 1).await;

    for target in [OrderStatus::Pending, OrderStatus::Cancelled] {
        let err = Order::set_status(&pool, order.id, organizer.id, target)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
