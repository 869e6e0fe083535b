//! Search and filter criteria for each dashboard collection.
//!
//! Every criteria value AND-combines a case-insensitive text search with
//! optional exact-match filters. An empty search and `None` filters match
//! everything.

use std::{cmp::Ordering, collections::HashMap, str::FromStr};

use chrono::NaiveDate;
use shared::{
    domain::{
        ActivityStatus, Client, ClientKind, Invoice, InvoiceStatus, Order, OrderStatus,
        PaymentStatus, Product, User, UserRole,
    },
    Record, RecordId,
};
use storage::CollectionStore;

use crate::controller::ListViewController;

pub trait Criteria<T> {
    fn matches(&self, record: &T) -> bool;
}

/// Lower-cased, trimmed search text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchText(String);

impl SearchText {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, field: &str) -> bool {
        self.0.is_empty() || field.to_lowercase().contains(&self.0)
    }

    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        self.0.is_empty() || fields.into_iter().any(|field| self.matches(field))
    }
}

impl From<&str> for SearchText {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn allows<V: PartialEq>(filter: &Option<V>, value: &V) -> bool {
    filter.as_ref().map_or(true, |wanted| wanted == value)
}

/// Display names by id, used to search one collection by names held in another.
#[derive(Debug, Clone, Default)]
pub struct NameDirectory {
    names: HashMap<RecordId, String>,
}

impl NameDirectory {
    pub fn from_records<'a, T: Record>(
        records: impl IntoIterator<Item = &'a T>,
        name: impl Fn(&T) -> &str,
    ) -> Self {
        let names = records
            .into_iter()
            .map(|record| (record.id().clone(), name(record).to_string()))
            .collect();
        Self { names }
    }

    pub fn name_of(&self, id: &RecordId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientCriteria {
    pub search: SearchText,
    pub kind: Option<ClientKind>,
    pub status: Option<ActivityStatus>,
}

impl Criteria<Client> for ClientCriteria {
    fn matches(&self, client: &Client) -> bool {
        self.search
            .matches_any([client.name.as_str(), client.email.as_str()])
            && allows(&self.kind, &client.kind)
            && allows(&self.status, &client.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    /// More than ten units.
    InStock,
    /// One to ten units.
    Low,
    Out,
}

impl StockLevel {
    pub fn of(stock: i64) -> Self {
        if stock <= 0 {
            Self::Out
        } else if stock <= 10 {
            Self::Low
        } else {
            Self::InStock
        }
    }
}

impl FromStr for StockLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in" | "in-stock" => Ok(Self::InStock),
            "low" | "low-stock" => Ok(Self::Low),
            "out" | "out-of-stock" => Ok(Self::Out),
            other => Err(format!("unknown stock level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductCriteria {
    pub search: SearchText,
    pub category: Option<String>,
    pub stock: Option<StockLevel>,
}

impl Criteria<Product> for ProductCriteria {
    fn matches(&self, product: &Product) -> bool {
        self.search
            .matches_any([product.name.as_str(), product.description.as_str()])
            && allows(&self.category, &product.category)
            && self
                .stock
                .map_or(true, |level| StockLevel::of(product.stock) == level)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserCriteria {
    pub search: SearchText,
    pub role: Option<UserRole>,
    pub status: Option<ActivityStatus>,
}

impl Criteria<User> for UserCriteria {
    fn matches(&self, user: &User) -> bool {
        self.search
            .matches_any([user.name.as_str(), user.email.as_str(), user.role.as_str()])
            && allows(&self.role, &user.role)
            && allows(&self.status, &user.status)
    }
}

/// Order filter. The search also covers the ordering client's name and the
/// names of ordered products, looked up through the directories.
#[derive(Debug, Clone, Default)]
pub struct OrderCriteria {
    pub search: SearchText,
    pub status: Option<OrderStatus>,
    pub payment: Option<PaymentStatus>,
    pub date: Option<NaiveDate>,
    pub client_id: Option<RecordId>,
    pub clients: NameDirectory,
    pub products: NameDirectory,
}

impl Criteria<Order> for OrderCriteria {
    fn matches(&self, order: &Order) -> bool {
        let matches_search = self.search.is_empty()
            || self.search.matches(order.id.as_str())
            || self
                .clients
                .name_of(&order.client_id)
                .is_some_and(|name| self.search.matches(name))
            || order.items.iter().any(|item| {
                self.products
                    .name_of(&item.product_id)
                    .is_some_and(|name| self.search.matches(name))
            });

        matches_search
            && allows(&self.status, &order.status)
            && allows(&self.payment, &order.payment_status)
            && allows(&self.date, &order.date)
            && allows(&self.client_id, &order.client_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceCriteria {
    pub search: SearchText,
    pub status: Option<InvoiceStatus>,
    pub date: Option<NaiveDate>,
    pub client_id: Option<RecordId>,
    pub clients: NameDirectory,
}

impl Criteria<Invoice> for InvoiceCriteria {
    fn matches(&self, invoice: &Invoice) -> bool {
        let matches_search = self.search.is_empty()
            || self.search.matches(invoice.id.as_str())
            || self
                .clients
                .name_of(&invoice.client_id)
                .is_some_and(|name| self.search.matches(name))
            || invoice
                .items
                .iter()
                .any(|item| self.search.matches(&item.description));

        matches_search
            && allows(&self.status, &invoice.status)
            && allows(&self.date, &invoice.date)
            && allows(&self.client_id, &invoice.client_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorefrontSort {
    #[default]
    Name,
    PriceLow,
    PriceHigh,
}

impl StorefrontSort {
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::PriceLow => a.price.total_cmp(&b.price),
            Self::PriceHigh => b.price.total_cmp(&a.price),
        }
    }
}

impl FromStr for StorefrontSort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "price-low" | "price_low" => Ok(Self::PriceLow),
            "price-high" | "price_high" => Ok(Self::PriceHigh),
            other => Err(format!("unknown sort '{other}'")),
        }
    }
}

/// Storefront catalogue query: search, category and sort order.
#[derive(Debug, Clone, Default)]
pub struct StorefrontQuery {
    pub search: SearchText,
    pub category: Option<String>,
    pub sort: StorefrontSort,
}

impl Criteria<Product> for StorefrontQuery {
    fn matches(&self, product: &Product) -> bool {
        self.search
            .matches_any([product.name.as_str(), product.description.as_str()])
            && allows(&self.category, &product.category)
    }
}

impl StorefrontQuery {
    pub fn apply<S: CollectionStore>(
        self,
        controller: &mut ListViewController<Product, S>,
    ) -> &[Product] {
        let sort = self.sort;
        controller.apply_filter_sorted(
            move |product| self.matches(product),
            move |a, b| sort.compare(a, b),
        )
    }
}

#[cfg(test)]
#[path = "tests/criteria_tests.rs"]
mod tests;
