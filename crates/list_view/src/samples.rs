//! Synthetic collections used when neither the remote source nor the
//! persisted store has anything to offer.

use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use shared::{
    domain::{
        ActivityStatus, Client, ClientKind, Invoice, InvoiceItem, InvoiceStatus, Order, OrderItem,
        OrderStatus, PaymentStatus, Product, RecordId, User, UserRole, PRODUCT_CATEGORIES,
    },
    Record,
};

/// Records that can be generated as a stand-in collection.
///
/// Ids run `"1"..="count"`; the other field values are randomized.
pub trait SampleRecords: Record {
    const DEFAULT_SAMPLE_COUNT: usize;

    fn samples(count: usize) -> Vec<Self>;
}

fn pick<T: Copy>(rng: &mut impl Rng, values: &[T]) -> T {
    values[rng.random_range(0..values.len())]
}

fn money(rng: &mut impl Rng, low: f64, high: f64) -> f64 {
    (rng.random_range(low..high) * 100.0).round() / 100.0
}

fn days_from_today(offset: i64) -> NaiveDate {
    let today = Utc::now().date_naive();
    let shifted = if offset < 0 {
        today.checked_sub_days(Days::new(offset.unsigned_abs()))
    } else {
        today.checked_add_days(Days::new(offset.unsigned_abs()))
    };
    shifted.unwrap_or(today)
}

fn sequential_id(index: usize) -> RecordId {
    RecordId::from((index + 1).to_string())
}

impl SampleRecords for Client {
    const DEFAULT_SAMPLE_COUNT: usize = 15;

    fn samples(count: usize) -> Vec<Self> {
        let mut rng = rand::rng();
        (0..count)
            .map(|i| {
                let n = i + 1;
                Client {
                    id: sequential_id(i),
                    name: format!("Client {n}"),
                    email: format!("client{n}@example.com"),
                    phone: format!("+1 555-{n:04}"),
                    kind: if i % 2 == 0 {
                        ClientKind::Individual
                    } else {
                        ClientKind::Company
                    },
                    address: format!("{n} Business Street, City"),
                    status: ActivityStatus::Active,
                    total_orders: rng.random_range(0..50),
                }
            })
            .collect()
    }
}

impl SampleRecords for Product {
    const DEFAULT_SAMPLE_COUNT: usize = 50;

    fn samples(count: usize) -> Vec<Self> {
        let mut rng = rand::rng();
        (0..count)
            .map(|i| {
                let n = i + 1;
                Product {
                    id: sequential_id(i),
                    name: format!("Product {n}"),
                    description: format!("Sample product number {n}"),
                    long_description: String::new(),
                    price: money(&mut rng, 10.0, 110.0),
                    category: PRODUCT_CATEGORIES[n % PRODUCT_CATEGORIES.len()].to_string(),
                    stock: rng.random_range(0..100),
                    image: format!("https://picsum.photos/seed/{n}/400/300"),
                    status: ActivityStatus::Active,
                }
            })
            .collect()
    }
}

impl SampleRecords for Order {
    const DEFAULT_SAMPLE_COUNT: usize = 15;

    fn samples(count: usize) -> Vec<Self> {
        let mut rng = rand::rng();
        (0..count)
            .map(|i| {
                let items = vec![OrderItem {
                    product_id: RecordId::from(
                        rng.random_range(1..=Product::DEFAULT_SAMPLE_COUNT as u64),
                    ),
                    quantity: rng.random_range(1..=5),
                    price: money(&mut rng, 20.0, 120.0),
                }];
                let total: f64 = items
                    .iter()
                    .map(|item| f64::from(item.quantity) * item.price)
                    .sum();
                Order {
                    id: sequential_id(i),
                    date: days_from_today(-rng.random_range(0..30)),
                    client_id: RecordId::from(
                        rng.random_range(1..=Client::DEFAULT_SAMPLE_COUNT as u64),
                    ),
                    items,
                    status: pick(&mut rng, OrderStatus::ALL),
                    payment_status: pick(&mut rng, PaymentStatus::ALL),
                    notes: String::new(),
                    total,
                }
            })
            .collect()
    }
}

impl SampleRecords for Invoice {
    const DEFAULT_SAMPLE_COUNT: usize = 15;

    fn samples(count: usize) -> Vec<Self> {
        let mut rng = rand::rng();
        (0..count)
            .map(|i| {
                let items = vec![InvoiceItem {
                    description: "Sample Item".to_string(),
                    quantity: rng.random_range(1..=5),
                    price: money(&mut rng, 20.0, 120.0),
                }];
                let total: f64 = items
                    .iter()
                    .map(|item| f64::from(item.quantity) * item.price)
                    .sum();
                let order_id = if rng.random_bool(0.5) {
                    Some(RecordId::from(
                        rng.random_range(1..=Order::DEFAULT_SAMPLE_COUNT as u64),
                    ))
                } else {
                    None
                };
                Invoice {
                    id: sequential_id(i),
                    date: days_from_today(-rng.random_range(0..30)),
                    due_date: days_from_today(rng.random_range(0..30)),
                    client_id: RecordId::from(
                        rng.random_range(1..=Client::DEFAULT_SAMPLE_COUNT as u64),
                    ),
                    order_id,
                    items,
                    status: pick(&mut rng, InvoiceStatus::ALL),
                    notes: String::new(),
                    total,
                }
            })
            .collect()
    }
}

impl SampleRecords for User {
    const DEFAULT_SAMPLE_COUNT: usize = 10;

    fn samples(count: usize) -> Vec<Self> {
        let mut rng = rand::rng();
        (0..count)
            .map(|i| {
                let n = i + 1;
                User {
                    id: sequential_id(i),
                    name: format!("User {n}"),
                    username: format!("user{n}"),
                    email: format!("user{n}@example.com"),
                    phone: format!("+1 555-{:04}", 1000 + n),
                    website: format!("user{n}.example.com"),
                    company: format!("Company {}", rng.random_range(1..=5)),
                    role: if i == 0 {
                        UserRole::Admin
                    } else {
                        pick(&mut rng, &[UserRole::Manager, UserRole::User])
                    },
                    status: pick(&mut rng, ActivityStatus::ALL),
                    avatar: format!("https://i.pravatar.cc/150?img={n}"),
                    address: format!("{n} Main Street, City"),
                }
            })
            .collect()
    }
}
