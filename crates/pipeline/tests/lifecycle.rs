//! Integration tests for `OrderLifecycle` against a real database, including
//! event publication and the importer running through the lifecycle.

use std::sync::Arc;

use assert_matches::assert_matches;
use shopfloor_core::error::CoreError;
use shopfloor_core::importer::ImportBatchResult;
use shopfloor_core::orders::{OrderPriority, OrderStatus};
use shopfloor_core::workbook::SheetRows;
use shopfloor_db::models::order::{CreateOrder, TransitionOrder};
use shopfloor_db::models::user::CreateUser;
use shopfloor_db::repositories::{OrderHistoryRepo, UserRepo};
use shopfloor_events::{ChangeAction, ChangeEvent, ChangeTopic, EventBus};
use shopfloor_pipeline::{import_sheet, OrderLifecycle};
use sqlx::PgPool;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: "planner".to_string(),
            full_name: "Pat Planner".to_string(),
            role: "manager".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn lifecycle(pool: &PgPool) -> (OrderLifecycle, broadcast::Receiver<ChangeEvent>) {
    let bus = Arc::new(EventBus::default());
    let rx = bus.subscribe();
    (OrderLifecycle::new(pool.clone(), bus), rx)
}

fn new_order(order_number: &str, created_by: i64) -> CreateOrder {
    CreateOrder {
        order_number: order_number.to_string(),
        customer_name: "Initech".to_string(),
        product_name: "Stapler".to_string(),
        quantity: 2,
        status: OrderStatus::Pending,
        priority: OrderPriority::Low,
        delivery_date: Some("2024-06-30".to_string()),
        kanban_id: None,
        notes: None,
        created_by,
    }
}

fn drain(rx: &mut broadcast::Receiver<ChangeEvent>) -> Vec<ChangeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ---------------------------------------------------------------------------
// Create / transition
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_publishes_created_event(pool: PgPool) {
    let user = seed_user(&pool).await;
    let (orders, mut rx) = lifecycle(&pool);

    let order = orders.create(new_order("PO-100", user)).await.unwrap();

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].topic, ChangeTopic::Order);
    assert_eq!(events[0].action, ChangeAction::Created);
    assert_eq!(events[0].entity_id, order.id);
    assert_eq!(events[0].actor_user_id, Some(user));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_create_is_conflict_and_silent(pool: PgPool) {
    let user = seed_user(&pool).await;
    let (orders, mut rx) = lifecycle(&pool);

    orders.create(new_order("PO-100", user)).await.unwrap();
    drain(&mut rx);

    let err = orders.create(new_order("PO-100", user)).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg == "Order number 'PO-100' already exists");
    assert!(drain(&mut rx).is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_creates_yield_one_conflict(pool: PgPool) {
    let user = seed_user(&pool).await;
    let (orders, _rx) = lifecycle(&pool);

    let (a, b) = tokio::join!(
        orders.create(new_order("PO-RACE", user)),
        orders.create(new_order("PO-RACE", user)),
    );

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(CoreError::Conflict(_))))
            .count(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transition_rules(pool: PgPool) {
    let user = seed_user(&pool).await;
    let (orders, mut rx) = lifecycle(&pool);
    let order = orders.create(new_order("PO-100", user)).await.unwrap();
    drain(&mut rx);

    let empty = orders
        .transition(order.id, &TransitionOrder::default(), user)
        .await
        .unwrap_err();
    assert_matches!(empty, CoreError::Validation(msg) if msg == "No fields to update");

    let missing = orders
        .transition(
            order.id + 1000,
            &TransitionOrder {
                status: Some(OrderStatus::Completed),
                assigned_to: None,
            },
            user,
        )
        .await
        .unwrap_err();
    assert_matches!(missing, CoreError::NotFound { entity: "Order", .. });
    assert!(drain(&mut rx).is_empty());

    let updated = orders
        .transition(
            order.id,
            &TransitionOrder {
                status: Some(OrderStatus::InProgress),
                assigned_to: Some(Some(user)),
            },
            user,
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "in_progress");
    assert_eq!(updated.assigned_to, Some(user));

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, ChangeAction::Updated);

    let history = orders.history(order.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].entry.status, "in_progress");
    assert_eq!(history[1].entry.notes.as_deref(), Some("Order created"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_assignee_is_invalid(pool: PgPool) {
    let user = seed_user(&pool).await;
    let (orders, _rx) = lifecycle(&pool);
    let order = orders.create(new_order("PO-100", user)).await.unwrap();

    let err = orders
        .transition(
            order.id,
            &TransitionOrder {
                status: None,
                assigned_to: Some(Some(user + 500)),
            },
            user,
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_of_missing_order_is_not_found(pool: PgPool) {
    let (orders, _rx) = lifecycle(&pool);
    assert_matches!(
        orders.history(424242).await,
        Err(CoreError::NotFound { id: 424242, .. })
    );
}

// ---------------------------------------------------------------------------
// Import through the lifecycle
// ---------------------------------------------------------------------------

fn sheet(rows: &[[&str; 6]]) -> SheetRows {
    let mut all = vec![vec![
        "Kanban ID".to_string(),
        "Customer".to_string(),
        "Sale Part".to_string(),
        "Order No".to_string(),
        "Delivery Date".to_string(),
        "Qty".to_string(),
    ]];
    all.extend(rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()));
    SheetRows {
        name: "Sheet3".to_string(),
        first_row: 1,
        rows: all,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_persists_rows_with_history_and_events(pool: PgPool) {
    let user = seed_user(&pool).await;
    let (orders, mut rx) = lifecycle(&pool);
    orders.create(new_order("PO-TAKEN", user)).await.unwrap();
    drain(&mut rx);

    let rows = sheet(&[
        ["K-1", "Acme", "Bolt", "PO-1", "2024-07-01", "5"],
        ["", "Acme", "Nut", "", "", "1"],
        ["K-3", "Acme", "Washer", "PO-TAKEN", "", "2"],
    ]);

    let result: ImportBatchResult = import_sheet(&orders, &rows, user).await.unwrap();
    assert_eq!(result.imported, 1);
    assert_eq!(result.total, 3);
    assert_eq!(
        result.errors,
        vec!["Row 4: Order number 'PO-TAKEN' already exists".to_string()]
    );

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, ChangeAction::Created);

    let listing = orders.list(None).await.unwrap();
    let imported = listing
        .iter()
        .find(|o| o.order.order_number == "PO-1")
        .expect("imported order is listed");
    assert_eq!(imported.order.kanban_id.as_deref(), Some("K-1"));
    assert_eq!(imported.order.quantity, 5);
    assert_eq!(imported.created_name.as_deref(), Some("Pat Planner"));
    assert_eq!(
        OrderHistoryRepo::count_for_order(&pool, imported.order.id)
            .await
            .unwrap(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_keeps_long_cells_verbatim(pool: PgPool) {
    let user = seed_user(&pool).await;
    let (orders, _rx) = lifecycle(&pool);

    let customer = "Northern Fabrication and Assembly Cooperative ".repeat(8);
    let kanban = "K".repeat(300);
    assert!(customer.len() > 255);

    let rows = sheet(&[[kanban.as_str(), customer.as_str(), "Bolt", "", "", "3"]]);
    let result = import_sheet(&orders, &rows, user).await.unwrap();
    assert_eq!(result.imported, 1);
    assert!(result.errors.is_empty());

    let stored = &orders.list(None).await.unwrap()[0].order;
    assert_eq!(stored.customer_name, customer.trim());
    assert_eq!(stored.order_number, format!("ORD-{kanban}-2"));
}
