use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{
    ActivityStatus, Client, ClientKind, Invoice, InvoiceItem, InvoiceStatus, Order, OrderItem,
    OrderStatus, PaymentStatus, Product, RecordId, User, UserRole,
};

/// An entity kept in a persisted collection and addressed by a unique id.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key of the whole collection in the persisted store.
    const COLLECTION: &'static str;

    /// Partial update; `None` fields keep the current value.
    type Patch: Default + Send;

    fn id(&self) -> &RecordId;
    fn set_id(&mut self, id: RecordId);
    fn apply_patch(&mut self, patch: Self::Patch);
}

macro_rules! merge {
    ($target:expr, $patch:expr, [$($field:ident),+ $(,)?]) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )+
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub kind: Option<ClientKind>,
    pub address: Option<String>,
    pub status: Option<ActivityStatus>,
    pub total_orders: Option<u32>,
}

impl Record for Client {
    const COLLECTION: &'static str = "clients";
    type Patch = ClientPatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply_patch(&mut self, patch: ClientPatch) {
        merge!(self, patch, [name, email, phone, kind, address, status, total_orders]);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<String>,
    pub status: Option<ActivityStatus>,
}

impl Record for Product {
    const COLLECTION: &'static str = "products";
    type Patch = ProductPatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply_patch(&mut self, patch: ProductPatch) {
        merge!(
            self,
            patch,
            [name, description, long_description, price, category, stock, image, status]
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub date: Option<NaiveDate>,
    pub client_id: Option<RecordId>,
    pub items: Option<Vec<OrderItem>>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
    pub total: Option<f64>,
}

impl Record for Order {
    const COLLECTION: &'static str = "orders";
    type Patch = OrderPatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply_patch(&mut self, patch: OrderPatch) {
        merge!(
            self,
            patch,
            [date, client_id, items, status, payment_status, notes, total]
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoicePatch {
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub client_id: Option<RecordId>,
    pub order_id: Option<Option<RecordId>>,
    pub items: Option<Vec<InvoiceItem>>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
    pub total: Option<f64>,
}

impl Record for Invoice {
    const COLLECTION: &'static str = "invoices";
    type Patch = InvoicePatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply_patch(&mut self, patch: InvoicePatch) {
        merge!(
            self,
            patch,
            [date, due_date, client_id, order_id, items, status, notes, total]
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub company: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<ActivityStatus>,
    pub avatar: Option<String>,
    pub address: Option<String>,
}

impl Record for User {
    const COLLECTION: &'static str = "users";
    type Patch = UserPatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply_patch(&mut self, patch: UserPatch) {
        merge!(
            self,
            patch,
            [name, username, email, phone, website, company, role, status, avatar, address]
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client {
            id: RecordId::from("7"),
            name: "Client 7".into(),
            email: "client7@example.com".into(),
            phone: "+1 555-0007".into(),
            kind: ClientKind::Company,
            address: "7 Business Street, City".into(),
            status: ActivityStatus::Active,
            total_orders: 12,
        }
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut record = client();
        record.apply_patch(ClientPatch {
            status: Some(ActivityStatus::Inactive),
            ..Default::default()
        });

        let mut expected = client();
        expected.status = ActivityStatus::Inactive;
        assert_eq!(record, expected);
    }

    #[test]
    fn invoice_patch_can_clear_order_link() {
        let mut invoice = Invoice {
            id: RecordId::from("1"),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 31).expect("date"),
            client_id: RecordId::from("2"),
            order_id: Some(RecordId::from("9")),
            items: Vec::new(),
            status: InvoiceStatus::Unpaid,
            notes: String::new(),
            total: 10.0,
        };
        invoice.apply_patch(InvoicePatch {
            order_id: Some(None),
            ..Default::default()
        });
        assert_eq!(invoice.order_id, None);
        assert_eq!(invoice.client_id, RecordId::from("2"));
    }

    #[test]
    fn client_serializes_with_dashboard_field_names() {
        let value = serde_json::to_value(client()).expect("json");
        assert_eq!(value["type"], "company");
        assert_eq!(value["totalOrders"], 12);
        assert_eq!(value["status"], "active");
    }
}
