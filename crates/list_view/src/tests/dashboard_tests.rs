use super::*;
use shared::domain::{ActivityStatus, ClientKind, OrderItem, PaymentStatus};

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn order(id: &str, date: NaiveDate, client_id: &str, status: OrderStatus, lines: &[(&str, u32, f64)]) -> Order {
    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(product_id, quantity, price)| OrderItem {
            product_id: RecordId::from(*product_id),
            quantity: *quantity,
            price: *price,
        })
        .collect();
    let total: f64 = items.iter().map(|item| f64::from(item.quantity) * item.price).sum();
    Order {
        id: RecordId::from(id),
        date,
        client_id: RecordId::from(client_id),
        items,
        status,
        payment_status: PaymentStatus::Paid,
        notes: String::new(),
        total,
    }
}

fn invoice(id: &str, date: NaiveDate, client_id: &str, status: InvoiceStatus, total: f64) -> Invoice {
    Invoice {
        id: RecordId::from(id),
        date,
        due_date: date,
        client_id: RecordId::from(client_id),
        order_id: None,
        items: Vec::new(),
        status,
        notes: String::new(),
        total,
    }
}

fn client(id: &str, name: &str) -> Client {
    Client {
        id: RecordId::from(id),
        name: name.to_string(),
        email: String::new(),
        phone: String::new(),
        kind: ClientKind::Company,
        address: String::new(),
        status: ActivityStatus::Active,
        total_orders: 0,
    }
}

fn product(id: &str, name: &str) -> Product {
    Product {
        id: RecordId::from(id),
        name: name.to_string(),
        description: String::new(),
        long_description: String::new(),
        price: 0.0,
        category: "Books".into(),
        stock: 1,
        image: String::new(),
        status: ActivityStatus::Active,
    }
}

fn fixture_orders() -> Vec<Order> {
    vec![
        order("1", day(2024, 3, 2), "1", OrderStatus::Pending, &[("1", 3, 50.0)]),
        order("2", day(2024, 3, 10), "2", OrderStatus::Shipped, &[("2", 1, 50.0)]),
        order("3", day(2024, 2, 20), "1", OrderStatus::Delivered, &[("1", 2, 50.0)]),
        order("4", day(2023, 12, 31), "9", OrderStatus::Pending, &[("3", 1, 20.0)]),
    ]
}

#[test]
fn year_month_steps_back_across_years() {
    let march = YearMonth::of(day(2024, 3, 15));
    assert_eq!(march.back(0), march);
    assert_eq!(march.back(3), YearMonth { year: 2023, month: 12 });
    assert_eq!(march.back(15), YearMonth { year: 2022, month: 12 });
}

#[test]
fn summary_compares_current_and_previous_month() {
    let invoices = vec![
        invoice("1", day(2024, 3, 1), "1", InvoiceStatus::Unpaid, 10.0),
        invoice("2", day(2024, 3, 1), "1", InvoiceStatus::Overdue, 10.0),
        invoice("3", day(2024, 3, 1), "2", InvoiceStatus::Paid, 10.0),
    ];
    let clients = vec![client("1", "Acme"), client("2", "Globex")];

    let summary = summary(&fixture_orders(), &clients, &invoices, day(2024, 3, 15));

    assert!((summary.total_revenue - 320.0).abs() < 1e-9);
    assert_eq!(summary.total_orders, 4);
    assert_eq!(summary.total_clients, 2);
    assert_eq!(summary.unpaid_invoices, 1);
    assert!((summary.revenue_change_percent - 100.0).abs() < 1e-9);
}

#[test]
fn revenue_change_is_zero_without_previous_revenue() {
    let orders = vec![order("1", day(2024, 3, 2), "1", OrderStatus::Pending, &[("1", 1, 10.0)])];
    let summary = summary(&orders, &[], &[], day(2024, 3, 15));
    assert_eq!(summary.revenue_change_percent, 0.0);
}

#[test]
fn monthly_trend_lists_oldest_month_first() {
    let trend = monthly_trend(&fixture_orders(), day(2024, 3, 15), 4);
    let months: Vec<_> = trend.iter().map(|point| (point.month.year, point.month.month)).collect();
    assert_eq!(months, vec![(2023, 12), (2024, 1), (2024, 2), (2024, 3)]);

    assert_eq!(trend[0].orders, 1);
    assert_eq!(trend[1].orders, 0);
    assert!((trend[2].revenue - 100.0).abs() < 1e-9);
    assert!((trend[3].revenue - 200.0).abs() < 1e-9);
    assert_eq!(trend[3].orders, 2);
}

#[test]
fn status_counts_skip_empty_statuses() {
    let counts = order_status_counts(&fixture_orders());
    assert_eq!(
        counts,
        vec![
            (OrderStatus::Pending, 2),
            (OrderStatus::Shipped, 1),
            (OrderStatus::Delivered, 1),
        ]
    );
}

#[test]
fn top_products_rank_by_line_revenue() {
    let products = vec![product("1", "Lamp"), product("2", "Chair")];
    let top = top_products(&fixture_orders(), &products, 2);

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].name, "Lamp");
    assert!((top[0].revenue - 250.0).abs() < 1e-9);
    assert_eq!(top[1].name, "Chair");

    let all = top_products(&fixture_orders(), &products, 10);
    assert_eq!(all.last().map(|sale| sale.name.as_str()), Some(UNKNOWN_PRODUCT));
}

#[test]
fn recent_activity_is_newest_first_with_client_names() {
    let clients = vec![client("1", "Acme"), client("2", "Globex")];
    let invoices = vec![invoice("1", day(2024, 3, 12), "2", InvoiceStatus::Unpaid, 75.0)];

    let activity = recent_activity(&fixture_orders(), &invoices, &clients, 3);

    assert_eq!(activity.len(), 3);
    assert_eq!(activity[0].kind, ActivityKind::Invoice);
    assert_eq!(activity[0].description, "Invoice for Globex");
    assert_eq!(activity[0].status, "unpaid");
    assert_eq!(activity[1].description, "New order from Globex");
    assert_eq!(activity[2].description, "New order from Acme");

    let everything = recent_activity(&fixture_orders(), &[], &clients, 10);
    assert_eq!(
        everything.last().map(|entry| entry.description.as_str()),
        Some("New order from Unknown Client")
    );
}
