//! Integration tests for the dashboard endpoints.

use chrono::{Datelike, Duration, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use encore_integration_tests::{TestApp, decimal, product, settled_order};

#[tokio::test]
async fn dashboard_stats_assembles_every_block() {
    let app = TestApp::new();
    let now = Utc::now();
    app.store.push_order(settled_order(
        "vip@example.com",
        "Val Important",
        600,
        now - Duration::days(3),
    ));
    app.store.push_order(settled_order(
        "new@example.com",
        "Finn First",
        40,
        now - Duration::days(2),
    ));
    app.store.push_product(product("Tour Hoodie", None, 4, 80));
    app.store.push_product(product("Poster", Some("PST-01"), 200, 15));

    let (status, body) = app.get("/dashboard/stats").await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], json!(true));
    let data = &body["data"];

    assert_eq!(data["overview"]["totalProducts"], json!(2));
    assert_eq!(data["overview"]["totalCustomers"], json!(0));
    assert_eq!(data["overview"]["totalOrders"], json!(2));
    assert_eq!(decimal(&data["overview"]["totalRevenue"]), Decimal::from(640));
    assert_eq!(
        decimal(&data["overview"]["averageOrderValue"]),
        Decimal::from(320)
    );

    assert_eq!(data["customersByType"]["vip"], json!(1));
    assert_eq!(data["customersByType"]["new"], json!(1));

    assert_eq!(data["stockInsights"]["lowStockCount"], json!(1));
    let low = &data["stockInsights"]["lowStockProducts"][0];
    assert_eq!(low["name"], json!("Tour Hoodie"));
    assert_eq!(low["quantity"], json!(4));
    // Products without a SKU fall back to the uppercased name prefix.
    assert_eq!(low["sku"], json!("TOUR H"));

    assert_eq!(data["performance"]["lowStockAlert"], json!(true));
    assert_eq!(data["performance"]["revenueGrowth"], json!("N/A"));
    assert_eq!(data["performance"]["orderTrend"], json!("N/A"));
}

#[tokio::test]
async fn dashboard_stats_caps_recent_orders_at_five() {
    let app = TestApp::new();
    let now = Utc::now();
    for i in 0..7 {
        app.store.push_order(settled_order(
            "buyer@example.com",
            "Sam Buyer",
            10 + i,
            now - Duration::hours(i),
        ));
    }

    let (_, body) = app.get("/dashboard/stats").await;

    let recent = body["data"]["recentOrders"].as_array().expect("array");
    assert_eq!(recent.len(), 5);
    assert_eq!(decimal(&recent[0]["total"]), Decimal::from(10));
    assert_eq!(recent[0]["customerName"], json!("Sam Buyer"));
    assert_eq!(recent[0]["customerEmail"], json!("buyer@example.com"));
    assert_eq!(recent[0]["status"], json!("succeeded"));
    assert_eq!(recent[0]["items"], json!(1));
}

#[tokio::test]
async fn dashboard_stats_ignores_healthy_stock() {
    let app = TestApp::new();
    app.store.push_product(product("Plenty", Some("PL-1"), 50, 20));
    app.store.push_product(product("Sold Out", Some("SO-1"), 0, 20));

    let (_, body) = app.get("/dashboard/stats").await;

    let insights = &body["data"]["stockInsights"];
    // Zero-quantity products are out of stock, not low stock.
    assert_eq!(insights["lowStockCount"], json!(0));
    assert_eq!(body["data"]["performance"]["lowStockAlert"], json!(false));
}

fn month_start_of(now: chrono::DateTime<Utc>) -> chrono::DateTime<Utc> {
    let first = now.date_naive().with_day(1).expect("day one exists");
    Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN))
}

#[tokio::test]
async fn dashboard_insights_compares_calendar_months() {
    let app = TestApp::new();
    let now = Utc::now();
    let this_start = month_start_of(now);
    let last_start = month_start_of(this_start - Duration::days(1));

    app.store.push_order(settled_order(
        "a@example.com",
        "A",
        100,
        last_start + Duration::hours(5),
    ));
    app.store
        .push_order(settled_order("a@example.com", "A", 90, this_start));
    app.store
        .push_order(settled_order("b@example.com", "B", 60, now));

    let (status, body) = app.get("/dashboard/insights").await;

    assert_eq!(status, 200);
    let data = &body["data"];
    assert_eq!(decimal(&data["lastMonth"]["revenue"]), Decimal::from(100));
    assert_eq!(data["lastMonth"]["orders"], json!(1));
    assert_eq!(data["lastMonth"]["customers"], json!(1));
    assert_eq!(decimal(&data["thisMonth"]["revenue"]), Decimal::from(150));
    assert_eq!(data["thisMonth"]["orders"], json!(2));
    assert_eq!(data["thisMonth"]["customers"], json!(2));
    assert_eq!(decimal(&data["growth"]["revenue"]), Decimal::from(50));
    assert_eq!(decimal(&data["growth"]["orders"]), Decimal::from(100));
    assert_eq!(decimal(&data["growth"]["customers"]), Decimal::from(100));
}

#[tokio::test]
async fn dashboard_insights_growth_from_nothing_is_one_hundred() {
    let app = TestApp::new();
    app.store
        .push_order(settled_order("a@example.com", "A", 120, Utc::now()));

    let (_, body) = app.get("/dashboard/insights").await;

    let data = &body["data"];
    assert_eq!(decimal(&data["lastMonth"]["revenue"]), Decimal::ZERO);
    assert_eq!(decimal(&data["growth"]["revenue"]), Decimal::from(100));
    assert_eq!(decimal(&data["growth"]["orders"]), Decimal::from(100));
    assert_eq!(decimal(&data["growth"]["customers"]), Decimal::from(100));
}

#[tokio::test]
async fn dashboard_insights_empty_store_is_flat() {
    let app = TestApp::new();

    let (status, body) = app.get("/dashboard/insights").await;

    assert_eq!(status, 200);
    let growth = &body["data"]["growth"];
    assert_eq!(decimal(&growth["revenue"]), Decimal::ZERO);
    assert_eq!(decimal(&growth["orders"]), Decimal::ZERO);
    assert_eq!(decimal(&growth["customers"]), Decimal::ZERO);
}
