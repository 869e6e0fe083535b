//! Plain-text tables for the terminal. Everything here consumes page slices
//! and aggregates; nothing reaches back into controllers.

use std::fmt::Write as _;

use list_view::{
    criteria::{NameDirectory, StockLevel},
    dashboard::{Activity, DashboardSummary, MonthlyPoint, ProductSales, UNKNOWN_CLIENT},
    PageSlice,
};
use shared::domain::{CartItem, Client, Invoice, Order, OrderStatus, Product, User};

pub fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

pub fn footer<T>(slice: &PageSlice<'_, T>) -> String {
    if slice.total_items == 0 {
        return "no matching records".to_string();
    }
    if slice.is_empty() {
        return format!(
            "page {} is past the end ({} records, {} pages)",
            slice.page, slice.total_items, slice.total_pages
        );
    }
    format!(
        "showing {}-{} of {} (page {} of {})",
        slice.first_position(),
        slice.last_position(),
        slice.total_items,
        slice.page,
        slice.total_pages
    )
}

fn with_footer<T>(body: String, slice: &PageSlice<'_, T>) -> String {
    format!("{body}{}\n", footer(slice))
}

pub fn clients(slice: &PageSlice<'_, Client>) -> String {
    let rows: Vec<Vec<String>> = slice
        .items
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.email.clone(),
                c.kind.to_string(),
                c.status.to_string(),
                c.total_orders.to_string(),
            ]
        })
        .collect();
    with_footer(
        table(&["ID", "NAME", "EMAIL", "TYPE", "STATUS", "ORDERS"], &rows),
        slice,
    )
}

pub fn products(slice: &PageSlice<'_, Product>) -> String {
    let rows: Vec<Vec<String>> = slice
        .items
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.category.clone(),
                money(p.price),
                p.stock.to_string(),
                p.status.to_string(),
            ]
        })
        .collect();
    with_footer(
        table(&["ID", "NAME", "CATEGORY", "PRICE", "STOCK", "STATUS"], &rows),
        slice,
    )
}

pub fn orders(slice: &PageSlice<'_, Order>, clients: &NameDirectory) -> String {
    let rows: Vec<Vec<String>> = slice
        .items
        .iter()
        .map(|o| {
            vec![
                o.id.to_string(),
                o.date.to_string(),
                clients.name_of(&o.client_id).unwrap_or(UNKNOWN_CLIENT).to_string(),
                o.items.len().to_string(),
                money(o.total),
                o.status.to_string(),
                o.payment_status.to_string(),
            ]
        })
        .collect();
    with_footer(
        table(
            &["ID", "DATE", "CLIENT", "ITEMS", "TOTAL", "STATUS", "PAYMENT"],
            &rows,
        ),
        slice,
    )
}

pub fn invoices(slice: &PageSlice<'_, Invoice>, clients: &NameDirectory) -> String {
    let rows: Vec<Vec<String>> = slice
        .items
        .iter()
        .map(|i| {
            vec![
                i.id.to_string(),
                i.date.to_string(),
                i.due_date.to_string(),
                clients.name_of(&i.client_id).unwrap_or(UNKNOWN_CLIENT).to_string(),
                i.order_id.as_ref().map(ToString::to_string).unwrap_or_default(),
                money(i.total),
                i.status.to_string(),
            ]
        })
        .collect();
    with_footer(
        table(
            &["ID", "DATE", "DUE", "CLIENT", "ORDER", "TOTAL", "STATUS"],
            &rows,
        ),
        slice,
    )
}

pub fn users(slice: &PageSlice<'_, User>) -> String {
    let rows: Vec<Vec<String>> = slice
        .items
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.name.clone(),
                u.username.clone(),
                u.email.clone(),
                u.role.to_string(),
                u.status.to_string(),
            ]
        })
        .collect();
    with_footer(
        table(&["ID", "NAME", "USERNAME", "EMAIL", "ROLE", "STATUS"], &rows),
        slice,
    )
}

fn stock_label(stock: i64) -> &'static str {
    match StockLevel::of(stock) {
        StockLevel::InStock => "in stock",
        StockLevel::Low => "low stock",
        StockLevel::Out => "out of stock",
    }
}

pub fn storefront(slice: &PageSlice<'_, Product>) -> String {
    let rows: Vec<Vec<String>> = slice
        .items
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.category.clone(),
                money(p.price),
                stock_label(p.stock).to_string(),
            ]
        })
        .collect();
    with_footer(
        table(&["ID", "PRODUCT", "CATEGORY", "PRICE", "AVAILABILITY"], &rows),
        slice,
    )
}

pub fn cart(items: &[CartItem], total: f64) -> String {
    if items.is_empty() {
        return "cart is empty\n".to_string();
    }
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            vec![
                item.id.to_string(),
                item.name.clone(),
                item.quantity.to_string(),
                money(item.price),
                money(item.price * f64::from(item.quantity)),
            ]
        })
        .collect();
    format!(
        "{}total: {}\n",
        table(&["ID", "PRODUCT", "QTY", "PRICE", "SUBTOTAL"], &rows),
        money(total)
    )
}

pub fn dashboard(
    summary: &DashboardSummary,
    trend: &[MonthlyPoint],
    statuses: &[(OrderStatus, usize)],
    top: &[ProductSales],
    activity: &[Activity],
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "revenue {} ({:+.1}% vs last month)",
        money(summary.total_revenue),
        summary.revenue_change_percent
    );
    let _ = writeln!(
        out,
        "orders {}  clients {}  unpaid invoices {}\n",
        summary.total_orders, summary.total_clients, summary.unpaid_invoices
    );

    let trend_rows: Vec<Vec<String>> = trend
        .iter()
        .map(|point| {
            vec![
                format!("{}-{:02}", point.month.year, point.month.month),
                money(point.revenue),
                point.orders.to_string(),
            ]
        })
        .collect();
    out.push_str(&table(&["MONTH", "REVENUE", "ORDERS"], &trend_rows));
    out.push('\n');

    let status_rows: Vec<Vec<String>> = statuses
        .iter()
        .map(|(status, count)| vec![status.to_string(), count.to_string()])
        .collect();
    out.push_str(&table(&["STATUS", "ORDERS"], &status_rows));
    out.push('\n');

    let top_rows: Vec<Vec<String>> = top
        .iter()
        .map(|sale| vec![sale.name.clone(), money(sale.revenue)])
        .collect();
    out.push_str(&table(&["TOP PRODUCT", "REVENUE"], &top_rows));
    out.push('\n');

    let activity_rows: Vec<Vec<String>> = activity
        .iter()
        .map(|entry| {
            vec![
                entry.date.to_string(),
                entry.description.clone(),
                entry.status.clone(),
                money(entry.amount),
            ]
        })
        .collect();
    out.push_str(&table(&["DATE", "ACTIVITY", "STATUS", "AMOUNT"], &activity_rows));
    out
}
