// tests/order_flow.rs
//
// Fluxos completos contra um Postgres real. Rodar com:
//   DATABASE_URL=postgres://... cargo test -- --ignored

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{body_json, get, json_request, spawn_app_with_db, TestApp};
use restaurant_pos::models::auth::{RegisterUserPayload, Role, UpdateUserPayload};

async fn staff_token(app: &TestApp, role: Role) -> String {
    let username = format!("{}-{}", role.as_str(), Uuid::new_v4().simple());
    let user = app
        .state
        .auth_service
        .register_user(&RegisterUserPayload {
            username: username.clone(),
            full_name: Some(format!("Test {}", role.as_str())),
            password: "secret123".into(),
            role: Role::Waiter,
        })
        .await
        .unwrap();
    let user = if role == Role::Waiter {
        user
    } else {
        app.state
            .user_service
            .update_user(
                user.id,
                &UpdateUserPayload {
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    };
    app.state
        .auth_service
        .create_token(&user, Duration::hours(1))
        .unwrap()
}

async fn menu_item(app: &TestApp, name: &str, price: Decimal) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO menu_items (name, price, is_veg) VALUES ($1, $2, TRUE) RETURNING id",
    )
    .bind(name)
    .bind(price)
    .fetch_one(&app.state.db_pool)
    .await
    .unwrap()
}

async fn table(app: &TestApp) -> Uuid {
    let number = format!("T{}", &Uuid::new_v4().simple().to_string()[..6]);
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO restaurant_tables (table_number) VALUES ($1) RETURNING id",
    )
    .bind(number)
    .fetch_one(&app.state.db_pool)
    .await
    .unwrap()
}

#[tokio::test]
#[ignore]
async fn online_order_snapshots_menu_prices() {
    let app = spawn_app_with_db().await;
    let item = menu_item(&app, "Masala Dosa", Decimal::new(750, 2)).await;

    let response = app
        .send(json_request(
            "POST",
            "/api/orders",
            None,
            json!({ "name": "Ana", "email": "ana@example.com", "items": [{ "itemId": item, "quantity": 2 }] }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let order = &body["order"];
    assert_eq!(order["orderType"], "online");
    assert_eq!(order["items"][0]["name"], "Masala Dosa");
    assert_eq!(order["items"][0]["price"], 7.5);
    assert!(order["orderCode"].as_str().unwrap().starts_with("ORD"));

    let response = app
        .send(get("/api/orders/history?email=ana@example.com", None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    assert!(history.as_array().is_some_and(|orders| !orders.is_empty()));
}

#[tokio::test]
#[ignore]
async fn dine_in_occupies_and_completion_releases_the_table() {
    let app = spawn_app_with_db().await;
    let waiter = staff_token(&app, Role::Waiter).await;
    let item = menu_item(&app, "Thali", Decimal::new(1200, 2)).await;
    let table_id = table(&app).await;

    let payload = json!({ "tableId": table_id, "items": [{ "itemId": item, "quantity": 1 }] });
    let response = app
        .send(json_request("POST", "/api/orders/dinein", Some(&waiter), payload.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order_id = body_json(response).await["order"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Segunda tentativa na mesma mesa
    let response = app
        .send(json_request("POST", "/api/orders/dinein", Some(&waiter), payload))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .send(get(&format!("/api/orders/by-table/{}", table_id), Some(&waiter)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(json_request(
            "PATCH",
            &format!("/api/orders/{}/complete", order_id),
            Some(&waiter),
            json!({}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(get(&format!("/api/tables/{}", table_id), Some(&waiter)))
        .await;
    let table: Value = body_json(response).await;
    assert_eq!(table["status"], "available");
    assert!(table["currentOrderId"].is_null());
}

#[tokio::test]
#[ignore]
async fn modifying_an_order_leaves_an_audit_trail() {
    let app = spawn_app_with_db().await;
    let manager = staff_token(&app, Role::Manager).await;
    let samosa = menu_item(&app, "Samosa", Decimal::new(300, 2)).await;
    let lassi = menu_item(&app, "Lassi", Decimal::new(400, 2)).await;

    let response = app
        .send(json_request(
            "POST",
            "/api/orders/walkin",
            Some(&manager),
            json!({ "name": "Walk-in", "items": [{ "itemId": samosa, "quantity": 2 }] }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order_id = body_json(response).await["order"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .send(json_request(
            "PATCH",
            &format!("/api/orders/{}/modify", order_id),
            Some(&manager),
            json!({
                "updatedItems": [
                    { "itemId": samosa, "quantity": 1 },
                    { "itemId": lassi, "quantity": 1 }
                ],
                "reason": "Customer changed their mind"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await["order"].clone();
    let actions: Vec<&str> = order["modifications"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["action"].as_str())
        .collect();
    assert!(actions.contains(&"quantity-changed"));
    assert!(actions.contains(&"item-added"));

    let response = app
        .send(get(&format!("/api/orders/{}/modifications", order_id), Some(&manager)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let logs = body_json(response).await;
    assert_eq!(logs.as_array().map(Vec::len), Some(1));
    assert_eq!(logs[0]["reason"], "Customer changed their mind");
}

async fn dine_in(app: &TestApp, token: &str, table_id: Uuid, item: Uuid) -> String {
    let response = app
        .send(json_request(
            "POST",
            "/api/orders/dinein",
            Some(token),
            json!({ "tableId": table_id, "items": [{ "itemId": item, "quantity": 1 }] }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["order"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn walk_in(app: &TestApp, token: &str, name: &str, item: Uuid) -> String {
    let response = app
        .send(json_request(
            "POST",
            "/api/orders/walkin",
            Some(token),
            json!({ "name": name, "items": [{ "itemId": item, "quantity": 1 }] }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["order"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn patch(app: &TestApp, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    let response = app.send(json_request("PATCH", uri, Some(token), body)).await;
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
#[ignore]
async fn paying_an_old_order_keeps_the_table_of_the_next_one() {
    let app = spawn_app_with_db().await;
    let waiter = staff_token(&app, Role::Waiter).await;
    let item = menu_item(&app, "Chole Bhature", Decimal::new(900, 2)).await;
    let table_id = table(&app).await;

    let first = dine_in(&app, &waiter, table_id, item).await;
    let (status, _) = patch(&app, &format!("/api/orders/{}/complete", first), &waiter, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let second = dine_in(&app, &waiter, table_id, item).await;

    let (status, _) = patch(
        &app,
        &format!("/api/orders/{}/pay", first),
        &waiter,
        json!({ "paymentMode": "cash", "amountPaid": 9 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .send(get(&format!("/api/tables/{}", table_id), Some(&waiter)))
        .await;
    let table = body_json(response).await;
    assert_ne!(table["status"], "available");
    assert_eq!(table["currentOrderId"], second.as_str());
}

#[tokio::test]
#[ignore]
async fn pay_releases_a_dine_in_table() {
    let app = spawn_app_with_db().await;
    let waiter = staff_token(&app, Role::Waiter).await;
    let item = menu_item(&app, "Pav Bhaji", Decimal::new(800, 2)).await;
    let table_id = table(&app).await;

    let order_id = dine_in(&app, &waiter, table_id, item).await;
    let (status, body) = patch(
        &app,
        &format!("/api/orders/{}/pay", order_id),
        &waiter,
        json!({ "paymentMode": "cash", "amountPaid": 10, "changeReturned": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["paymentStatus"], "paid");

    let response = app
        .send(get(&format!("/api/tables/{}", table_id), Some(&waiter)))
        .await;
    let table = body_json(response).await;
    assert_eq!(table["status"], "available");
    assert!(table["currentOrderId"].is_null());
}

#[tokio::test]
#[ignore]
async fn completed_orders_cannot_be_modified() {
    let app = spawn_app_with_db().await;
    let waiter = staff_token(&app, Role::Waiter).await;
    let item = menu_item(&app, "Vada Pav", Decimal::new(250, 2)).await;

    let order_id = walk_in(&app, &waiter, "Modify late", item).await;
    let (status, _) = patch(&app, &format!("/api/orders/{}/complete", order_id), &waiter, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = patch(
        &app,
        &format!("/api/orders/{}/modify", order_id),
        &waiter,
        json!({ "updatedItems": [{ "itemId": item, "quantity": 3 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore]
async fn paid_orders_cannot_be_marked_paid_again() {
    let app = spawn_app_with_db().await;
    let waiter = staff_token(&app, Role::Waiter).await;
    let item = menu_item(&app, "Jalebi", Decimal::new(300, 2)).await;
    let order_id = walk_in(&app, &waiter, "Twice paid", item).await;

    let cash_uri = format!("/api/payments/stripe/mark-cash-paid/{}", order_id);
    let card_uri = format!("/api/payments/stripe/mark-paid/{}", order_id);

    let (status, _) = patch(&app, &cash_uri, &waiter, json!({ "amountPaid": 5, "changeReturned": 2 })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = patch(&app, &cash_uri, &waiter, json!({ "amountPaid": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = patch(&app, &card_uri, &waiter, json!({ "paymentIntentId": "pi_123" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn item_status_rejects_bad_values_and_unknown_items() {
    let app = spawn_app_with_db().await;
    let admin = staff_token(&app, Role::Admin).await;
    let item = menu_item(&app, "Kulfi", Decimal::new(350, 2)).await;
    let order_id = walk_in(&app, &admin, "Kitchen", item).await;

    let (status, body) = patch(
        &app,
        &format!("/api/orders/{}/item/{}/status", order_id, item),
        &admin,
        json!({ "status": "in-progress" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["status"], "in-progress");

    let (status, _) = patch(
        &app,
        &format!("/api/orders/{}/item/{}/status", order_id, item),
        &admin,
        json!({ "status": "done" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = patch(
        &app,
        &format!("/api/orders/{}/item/{}/status", order_id, Uuid::new_v4()),
        &admin,
        json!({ "status": "ready" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn completed_listing_reports_pages() {
    let app = spawn_app_with_db().await;
    let waiter = staff_token(&app, Role::Waiter).await;
    let item = menu_item(&app, "Rasmalai", Decimal::new(450, 2)).await;
    let name = format!("Paging {}", Uuid::new_v4().simple());

    for _ in 0..3 {
        let order_id = walk_in(&app, &waiter, &name, item).await;
        let (status, _) = patch(&app, &format!("/api/orders/{}/complete", order_id), &waiter, json!({})).await;
        assert_eq!(status, StatusCode::OK);
    }

    let uri = format!("/api/orders/completed?name={}&page=2&limit=2", name.replace(' ', "%20"));
    let response = app.send(get(&uri, Some(&waiter))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["totalOrders"], 3);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["orders"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore]
async fn analytics_and_revenue_chart_read_stored_orders() {
    let app = spawn_app_with_db().await;
    let admin = staff_token(&app, Role::Admin).await;

    // Dia reservado a este teste
    sqlx::query("DELETE FROM orders WHERE created_at >= '1999-12-31' AND created_at < '2000-01-01'")
        .execute(&app.state.db_pool)
        .await
        .unwrap();
    let rows = [
        ("Pending", json!([{ "itemId": Uuid::new_v4(), "name": "Idli", "price": 2.5, "quantity": 4 }])),
        ("Completed", json!([{ "itemId": Uuid::new_v4(), "name": "Dosa", "price": 7, "quantity": 1 }])),
    ];
    for (status, items) in rows {
        sqlx::query(
            "INSERT INTO orders (order_code, name, items, status, created_at)
             VALUES ($1, 'Analytics', $2, $3::order_status, '1999-12-31T12:00:00Z')",
        )
        .bind(format!("T{}", Uuid::new_v4().simple()))
        .bind(items)
        .bind(status)
        .execute(&app.state.db_pool)
        .await
        .unwrap();
    }

    let response = app
        .send(get("/api/orders/analytics?from=1999-12-31&to=1999-12-31", Some(&admin)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["totalOrdersToday"], 2);
    assert_eq!(summary["pendingCount"], 1);
    assert_eq!(summary["completedCount"], 1);
    assert_eq!(summary["totalRevenue"].as_f64(), Some(17.0));
    assert_eq!(summary["topItems"][0]["name"], "Idli");
    assert_eq!(summary["topItems"][0]["quantity"], 4);

    let response = app
        .send(get("/api/orders/revenue-chart?range=custom", Some(&admin)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let chart = body_json(response).await;
    let labels: Vec<&str> = chart["labels"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let position = labels.iter().position(|l| *l == "1999-12-31").unwrap();
    assert_eq!(chart["values"][position], "17.00");
}

#[tokio::test]
#[ignore]
async fn references_to_missing_rows_are_404() {
    let app = spawn_app_with_db().await;
    let manager = staff_token(&app, Role::Manager).await;

    let response = app
        .send(json_request(
            "POST",
            "/api/reservations",
            Some(&manager),
            json!({
                "name": "Ravi",
                "phone": "555-0101",
                "guestCount": 2,
                "date": "2030-01-01T19:00:00Z",
                "tableId": Uuid::new_v4()
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Table not found.");

    let table_id = table(&app).await;
    let (status, body) = patch(
        &app,
        &format!("/api/tables/{}", table_id),
        &manager,
        json!({ "waiterId": Uuid::new_v4() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found.");
}
