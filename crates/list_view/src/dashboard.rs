//! Aggregates shown on the dashboard landing page.
//!
//! All functions are pure over borrowed collections and take `today`
//! explicitly so month boundaries are testable.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use shared::domain::{Client, Invoice, InvoiceStatus, Order, OrderStatus, Product, RecordId};

use crate::criteria::NameDirectory;

pub const UNKNOWN_CLIENT: &str = "Unknown Client";
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub total_clients: usize,
    pub unpaid_invoices: usize,
    /// Current calendar month against the previous one; 0 when there is no
    /// previous revenue to compare with.
    pub revenue_change_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month `months` before this one.
    pub fn back(self, months: u32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) - i64::from(months);
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    pub month: YearMonth,
    pub revenue: f64,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub product_id: RecordId,
    pub name: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Order,
    Invoice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub date: NaiveDate,
    pub kind: ActivityKind,
    pub description: String,
    pub status: String,
    pub amount: f64,
}

fn revenue_in(orders: &[Order], month: YearMonth) -> f64 {
    orders
        .iter()
        .filter(|order| YearMonth::of(order.date) == month)
        .map(|order| order.total)
        .sum()
}

pub fn summary(
    orders: &[Order],
    clients: &[Client],
    invoices: &[Invoice],
    today: NaiveDate,
) -> DashboardSummary {
    let this_month = YearMonth::of(today);
    let current = revenue_in(orders, this_month);
    let previous = revenue_in(orders, this_month.back(1));
    let revenue_change_percent = if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    };

    DashboardSummary {
        total_revenue: orders.iter().map(|order| order.total).sum(),
        total_orders: orders.len(),
        total_clients: clients.len(),
        unpaid_invoices: invoices
            .iter()
            .filter(|invoice| invoice.status == InvoiceStatus::Unpaid)
            .count(),
        revenue_change_percent,
    }
}

/// Revenue and order count for the last `months` calendar months, oldest first.
pub fn monthly_trend(orders: &[Order], today: NaiveDate, months: u32) -> Vec<MonthlyPoint> {
    let this_month = YearMonth::of(today);
    (0..months)
        .rev()
        .map(|back| {
            let month = this_month.back(back);
            let in_month = orders.iter().filter(|order| YearMonth::of(order.date) == month);
            MonthlyPoint {
                month,
                revenue: in_month.clone().map(|order| order.total).sum(),
                orders: in_month.count(),
            }
        })
        .collect()
}

/// Orders per status, in status declaration order, omitting empty statuses.
pub fn order_status_counts(orders: &[Order]) -> Vec<(OrderStatus, usize)> {
    OrderStatus::ALL
        .iter()
        .map(|status| {
            let count = orders.iter().filter(|order| order.status == *status).count();
            (*status, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Best-selling products by line revenue (`quantity * price`).
pub fn top_products(orders: &[Order], products: &[Product], limit: usize) -> Vec<ProductSales> {
    let names = NameDirectory::from_records(products, |product| product.name.as_str());
    let mut revenue: HashMap<&RecordId, f64> = HashMap::new();
    for item in orders.iter().flat_map(|order| order.items.iter()) {
        *revenue.entry(&item.product_id).or_default() += f64::from(item.quantity) * item.price;
    }

    let mut sales: Vec<ProductSales> = revenue
        .into_iter()
        .map(|(id, revenue)| ProductSales {
            product_id: id.clone(),
            name: names.name_of(id).unwrap_or(UNKNOWN_PRODUCT).to_string(),
            revenue,
        })
        .collect();
    sales.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    sales.truncate(limit);
    sales
}

/// Most recent orders and invoices, newest first.
pub fn recent_activity(
    orders: &[Order],
    invoices: &[Invoice],
    clients: &[Client],
    limit: usize,
) -> Vec<Activity> {
    let names = NameDirectory::from_records(clients, |client| client.name.as_str());
    let client_name = |id: &RecordId| names.name_of(id).unwrap_or(UNKNOWN_CLIENT).to_string();

    let mut activity: Vec<Activity> = orders
        .iter()
        .map(|order| Activity {
            date: order.date,
            kind: ActivityKind::Order,
            description: format!("New order from {}", client_name(&order.client_id)),
            status: order.status.to_string(),
            amount: order.total,
        })
        .chain(invoices.iter().map(|invoice| Activity {
            date: invoice.date,
            kind: ActivityKind::Invoice,
            description: format!("Invoice for {}", client_name(&invoice.client_id)),
            status: invoice.status.to_string(),
            amount: invoice.total,
        }))
        .collect();

    activity.sort_by(|a, b| b.date.cmp(&a.date));
    activity.truncate(limit);
    activity
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
