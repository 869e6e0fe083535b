//! Command-line input for new records and edits, checked before it reaches a controller.

use chrono::{Days, NaiveDate};
use clap::Args;
use shared::{
    domain::{
        ActivityStatus, Client, ClientKind, Invoice, InvoiceItem, InvoiceStatus, Order, OrderItem,
        OrderStatus, PaymentStatus, Product, User, UserRole,
    },
    error::ControllerResult,
    record::{ClientPatch, InvoicePatch, OrderPatch, ProductPatch, UserPatch},
    ControllerError, RecordId,
};

/// Days between an invoice date and its default due date.
pub const PAYMENT_TERMS_DAYS: u64 = 30;

fn invalid(message: impl Into<String>) -> ControllerError {
    ControllerError::Validation(message.into())
}

fn required(field: &str, value: &str) -> ControllerResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn email(value: &str) -> ControllerResult<String> {
    let value = required("email", value)?;
    if !value.contains('@') {
        return Err(invalid(format!("email '{value}' has no '@'")));
    }
    Ok(value)
}

fn price(field: &str, value: f64) -> ControllerResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("{field} must not be negative")))
    }
}

fn stock(value: i64) -> ControllerResult<i64> {
    if value < 0 {
        return Err(invalid("stock must not be negative"));
    }
    Ok(value)
}

fn quantity(raw: &str) -> ControllerResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(quantity) if quantity >= 1 => Ok(quantity),
        _ => Err(invalid(format!("quantity '{raw}' must be a whole number of at least 1"))),
    }
}

fn known_client(clients: &[Client], raw: &str) -> ControllerResult<RecordId> {
    let id = RecordId::from(raw.trim());
    if clients.iter().any(|client| client.id == id) {
        Ok(id)
    } else {
        Err(invalid(format!("no client with id={id}")))
    }
}

fn changes<P: Default + PartialEq>(patch: P) -> ControllerResult<P> {
    if patch == P::default() {
        return Err(invalid("nothing to change"));
    }
    Ok(patch)
}

/// Parses `product_id:quantity` entries and prices them from the catalogue.
pub fn order_items(raw: &[String], products: &[Product]) -> ControllerResult<Vec<OrderItem>> {
    if raw.is_empty() {
        return Err(invalid("an order needs at least one item"));
    }

    raw.iter()
        .map(|entry| {
            let (product_id, qty) = entry
                .split_once(':')
                .ok_or_else(|| invalid(format!("item '{entry}' is not product_id:quantity")))?;
            let product_id = RecordId::from(product_id.trim());
            let product = products
                .iter()
                .find(|product| product.id == product_id)
                .ok_or_else(|| invalid(format!("no product with id={product_id}")))?;
            Ok(OrderItem {
                product_id,
                quantity: quantity(qty)?,
                price: product.price,
            })
        })
        .collect()
}

/// Parses `description:quantity:price` entries. The description may contain colons.
pub fn invoice_lines(raw: &[String]) -> ControllerResult<Vec<InvoiceItem>> {
    if raw.is_empty() {
        return Err(invalid("an invoice needs at least one line"));
    }

    raw.iter()
        .map(|entry| {
            let malformed = || invalid(format!("line '{entry}' is not description:quantity:price"));
            let mut parts = entry.rsplitn(3, ':');
            let (Some(unit_price), Some(qty), Some(description)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(malformed());
            };
            let unit_price = unit_price.trim().parse::<f64>().map_err(|_| malformed())?;
            Ok(InvoiceItem {
                description: required("line description", description)?,
                quantity: quantity(qty)?,
                price: price("line price", unit_price)?,
            })
        })
        .collect()
}

/// Invoice lines for an order, described by product name when the product still exists.
pub fn lines_from_order(order: &Order, products: &[Product]) -> Vec<InvoiceItem> {
    order
        .items
        .iter()
        .map(|item| InvoiceItem {
            description: products
                .iter()
                .find(|product| product.id == item.product_id)
                .map_or_else(|| format!("Product {}", item.product_id), |p| p.name.clone()),
            quantity: item.quantity,
            price: item.price,
        })
        .collect()
}

#[derive(Args, Debug)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "individual")]
    pub kind: ClientKind,
    #[arg(long, default_value = "")]
    pub address: String,
}

impl NewClient {
    pub fn into_record(self) -> ControllerResult<Client> {
        Ok(Client {
            id: RecordId::from(""),
            name: required("name", &self.name)?,
            email: email(&self.email)?,
            phone: self.phone.trim().to_string(),
            kind: self.kind,
            address: self.address.trim().to_string(),
            status: ActivityStatus::Active,
            total_orders: 0,
        })
    }
}

#[derive(Args, Debug)]
pub struct NewProduct {
    pub name: String,
    #[arg(allow_negative_numbers = true)]
    pub price: f64,
    #[arg(long, default_value = "Electronics")]
    pub category: String,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub stock: i64,
    #[arg(long, default_value = "")]
    pub description: String,
}

impl NewProduct {
    pub fn into_record(self) -> ControllerResult<Product> {
        Ok(Product {
            id: RecordId::from(""),
            name: required("name", &self.name)?,
            description: self.description.trim().to_string(),
            long_description: String::new(),
            price: price("price", self.price)?,
            category: required("category", &self.category)?,
            stock: stock(self.stock)?,
            image: String::new(),
            status: ActivityStatus::Active,
        })
    }
}

#[derive(Args, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Defaults to the name, lowercased without spaces.
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long, default_value = "user")]
    pub role: UserRole,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub website: String,
    #[arg(long, default_value = "")]
    pub company: String,
    #[arg(long, default_value = "")]
    pub address: String,
}

impl NewUser {
    pub fn into_record(self) -> ControllerResult<User> {
        let name = required("name", &self.name)?;
        let username = match self.username {
            Some(username) => required("username", &username)?,
            None => name.to_lowercase().split_whitespace().collect(),
        };
        Ok(User {
            id: RecordId::from(""),
            name,
            username,
            email: email(&self.email)?,
            phone: self.phone.trim().to_string(),
            website: self.website.trim().to_string(),
            company: self.company.trim().to_string(),
            role: self.role,
            status: ActivityStatus::Active,
            avatar: String::new(),
            address: self.address.trim().to_string(),
        })
    }
}

#[derive(Args, Debug)]
pub struct NewOrder {
    pub client_id: String,
    /// Repeatable; the unit price is taken from the product.
    #[arg(long = "item", value_name = "PRODUCT_ID:QTY", required = true)]
    pub items: Vec<String>,
    /// Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    pub notes: String,
}

impl NewOrder {
    pub fn into_record(
        self,
        clients: &[Client],
        products: &[Product],
        today: NaiveDate,
    ) -> ControllerResult<Order> {
        let mut order = Order {
            id: RecordId::from(""),
            date: self.date.unwrap_or(today),
            client_id: known_client(clients, &self.client_id)?,
            items: order_items(&self.items, products)?,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            notes: self.notes.trim().to_string(),
            total: 0.0,
        };
        order.total = order.items_total();
        Ok(order)
    }
}

#[derive(Args, Debug)]
pub struct NewInvoice {
    /// Bill an existing order: client and lines are copied from it.
    #[arg(long, value_name = "ORDER_ID", conflicts_with_all = ["client", "lines"])]
    pub from_order: Option<String>,
    #[arg(long, required_unless_present = "from_order")]
    pub client: Option<String>,
    /// Repeatable.
    #[arg(long = "line", value_name = "DESCRIPTION:QTY:PRICE")]
    pub lines: Vec<String>,
    /// Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Defaults to the invoice date plus the payment terms.
    #[arg(long)]
    pub due_date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    pub notes: String,
}

impl NewInvoice {
    pub fn into_record(
        self,
        clients: &[Client],
        orders: &[Order],
        products: &[Product],
        today: NaiveDate,
    ) -> ControllerResult<Invoice> {
        let date = self.date.unwrap_or(today);
        let due_date = match self.due_date {
            Some(due_date) => due_date,
            None => date
                .checked_add_days(Days::new(PAYMENT_TERMS_DAYS))
                .ok_or_else(|| invalid(format!("no due date after {date}")))?,
        };
        if due_date < date {
            return Err(invalid(format!("due date {due_date} is before {date}")));
        }

        let (client_id, order_id, items) = match self.from_order {
            Some(order_id) => {
                let order_id = RecordId::from(order_id.trim());
                let order = orders
                    .iter()
                    .find(|order| order.id == order_id)
                    .ok_or_else(|| invalid(format!("no order with id={order_id}")))?;
                if order.items.is_empty() {
                    return Err(invalid(format!("order {order_id} has no items to bill")));
                }
                (
                    order.client_id.clone(),
                    Some(order_id),
                    lines_from_order(order, products),
                )
            }
            None => {
                let client = self.client.as_deref().unwrap_or_default();
                (known_client(clients, client)?, None, invoice_lines(&self.lines)?)
            }
        };

        let mut invoice = Invoice {
            id: RecordId::from(""),
            date,
            due_date,
            client_id,
            order_id,
            items,
            status: InvoiceStatus::Unpaid,
            notes: self.notes.trim().to_string(),
            total: 0.0,
        };
        invoice.total = invoice.items_total();
        Ok(invoice)
    }
}

#[derive(Args, Debug, Default)]
pub struct ClientEdit {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub kind: Option<ClientKind>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub status: Option<ActivityStatus>,
}

impl ClientEdit {
    pub fn into_patch(self) -> ControllerResult<ClientPatch> {
        changes(ClientPatch {
            name: self.name.as_deref().map(|v| required("name", v)).transpose()?,
            email: self.email.as_deref().map(email).transpose()?,
            phone: self.phone,
            kind: self.kind,
            address: self.address,
            status: self.status,
            total_orders: None,
        })
    }
}

#[derive(Args, Debug, Default)]
pub struct ProductEdit {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub long_description: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub price: Option<f64>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub stock: Option<i64>,
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub status: Option<ActivityStatus>,
}

impl ProductEdit {
    pub fn into_patch(self) -> ControllerResult<ProductPatch> {
        changes(ProductPatch {
            name: self.name.as_deref().map(|v| required("name", v)).transpose()?,
            description: self.description,
            long_description: self.long_description,
            price: self.price.map(|v| price("price", v)).transpose()?,
            category: self
                .category
                .as_deref()
                .map(|v| required("category", v))
                .transpose()?,
            stock: self.stock.map(stock).transpose()?,
            image: self.image,
            status: self.status,
        })
    }
}

#[derive(Args, Debug, Default)]
pub struct OrderEdit {
    pub id: String,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub client: Option<String>,
    /// Replaces every item; the total is recomputed.
    #[arg(long = "item", value_name = "PRODUCT_ID:QTY")]
    pub items: Vec<String>,
    #[arg(long)]
    pub status: Option<OrderStatus>,
    #[arg(long)]
    pub payment: Option<PaymentStatus>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl OrderEdit {
    pub fn into_patch(self, clients: &[Client], products: &[Product]) -> ControllerResult<OrderPatch> {
        let items = if self.items.is_empty() {
            None
        } else {
            Some(order_items(&self.items, products)?)
        };
        let total = items.as_ref().map(|items| {
            items
                .iter()
                .map(|item| f64::from(item.quantity) * item.price)
                .sum::<f64>()
        });
        changes(OrderPatch {
            date: self.date,
            client_id: self
                .client
                .as_deref()
                .map(|id| known_client(clients, id))
                .transpose()?,
            items,
            status: self.status,
            payment_status: self.payment,
            notes: self.notes,
            total,
        })
    }
}

#[derive(Args, Debug, Default)]
pub struct InvoiceEdit {
    pub id: String,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub due_date: Option<NaiveDate>,
    #[arg(long)]
    pub client: Option<String>,
    #[arg(long, conflicts_with = "no_order")]
    pub order: Option<String>,
    /// Detach the invoice from its order.
    #[arg(long)]
    pub no_order: bool,
    /// Replaces every line; the total is recomputed.
    #[arg(long = "line", value_name = "DESCRIPTION:QTY:PRICE")]
    pub lines: Vec<String>,
    #[arg(long)]
    pub status: Option<InvoiceStatus>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl InvoiceEdit {
    pub fn into_patch(self, clients: &[Client], orders: &[Order]) -> ControllerResult<InvoicePatch> {
        if let (Some(date), Some(due_date)) = (self.date, self.due_date) {
            if due_date < date {
                return Err(invalid(format!("due date {due_date} is before {date}")));
            }
        }

        let order_id = match (self.order, self.no_order) {
            (_, true) => Some(None),
            (Some(raw), false) => {
                let id = RecordId::from(raw.trim());
                if !orders.iter().any(|order| order.id == id) {
                    return Err(invalid(format!("no order with id={id}")));
                }
                Some(Some(id))
            }
            (None, false) => None,
        };
        let items = if self.lines.is_empty() {
            None
        } else {
            Some(invoice_lines(&self.lines)?)
        };
        let total = items.as_ref().map(|items| {
            items
                .iter()
                .map(|item| f64::from(item.quantity) * item.price)
                .sum::<f64>()
        });

        changes(InvoicePatch {
            date: self.date,
            due_date: self.due_date,
            client_id: self
                .client
                .as_deref()
                .map(|id| known_client(clients, id))
                .transpose()?,
            order_id,
            items,
            status: self.status,
            notes: self.notes,
            total,
        })
    }
}

#[derive(Args, Debug, Default)]
pub struct UserEdit {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub role: Option<UserRole>,
    #[arg(long)]
    pub status: Option<ActivityStatus>,
    #[arg(long)]
    pub avatar: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
}

impl UserEdit {
    pub fn into_patch(self) -> ControllerResult<UserPatch> {
        changes(UserPatch {
            name: self.name.as_deref().map(|v| required("name", v)).transpose()?,
            username: self
                .username
                .as_deref()
                .map(|v| required("username", v))
                .transpose()?,
            email: self.email.as_deref().map(email).transpose()?,
            phone: self.phone,
            website: self.website,
            company: self.company,
            role: self.role,
            status: self.status,
            avatar: self.avatar,
            address: self.address,
        })
    }
}

#[cfg(test)]
mod tests {
    use shared::ErrorCode;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).expect("valid date")
    }

    fn client(id: &str) -> Client {
        NewClient {
            name: format!("Client {id}"),
            email: format!("c{id}@example.com"),
            phone: String::new(),
            kind: ClientKind::Company,
            address: String::new(),
        }
        .into_record()
        .map(|mut client| {
            client.id = RecordId::from(id);
            client
        })
        .expect("valid client")
    }

    fn product(id: &str, price: f64) -> Product {
        NewProduct {
            name: format!("Product {id}"),
            price,
            category: "Books".into(),
            stock: 10,
            description: String::new(),
        }
        .into_record()
        .map(|mut product| {
            product.id = RecordId::from(id);
            product
        })
        .expect("valid product")
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn assert_invalid<T: std::fmt::Debug>(result: ControllerResult<T>) {
        let error = result.expect_err("input should be rejected");
        assert_eq!(error.code(), ErrorCode::Validation, "{error}");
    }

    #[test]
    fn blank_names_and_emails_are_rejected() {
        let blank_name = NewClient {
            name: "  ".into(),
            email: "a@b.c".into(),
            phone: String::new(),
            kind: ClientKind::Individual,
            address: String::new(),
        };
        assert_invalid(blank_name.into_record());

        let no_email = NewUser {
            name: "Ana Lima".into(),
            email: String::new(),
            username: None,
            role: UserRole::User,
            phone: String::new(),
            website: String::new(),
            company: String::new(),
            address: String::new(),
        };
        assert_invalid(no_email.into_record());

        assert_invalid(
            UserEdit {
                id: "1".into(),
                email: Some("not-an-address".into()),
                ..Default::default()
            }
            .into_patch(),
        );
    }

    #[test]
    fn new_user_username_defaults_to_compact_name() {
        let user = NewUser {
            name: " Ana  Lima ".into(),
            email: "ana@example.com".into(),
            username: None,
            role: UserRole::Manager,
            phone: String::new(),
            website: String::new(),
            company: String::new(),
            address: String::new(),
        }
        .into_record()
        .expect("valid user");
        assert_eq!(user.name, "Ana  Lima");
        assert_eq!(user.username, "analima");
        assert_eq!(user.status, ActivityStatus::Active);
    }

    #[test]
    fn negative_price_and_stock_are_rejected() {
        let negative_price = NewProduct {
            name: "Lamp".into(),
            price: -1.0,
            category: "Home".into(),
            stock: 3,
            description: String::new(),
        };
        assert_invalid(negative_price.into_record());

        let negative_stock = NewProduct {
            name: "Lamp".into(),
            price: 20.0,
            category: "Home".into(),
            stock: -3,
            description: String::new(),
        };
        assert_invalid(negative_stock.into_record());

        assert_invalid(
            ProductEdit {
                id: "1".into(),
                price: Some(f64::NAN),
                ..Default::default()
            }
            .into_patch(),
        );
    }

    #[test]
    fn order_prices_come_from_the_catalogue() {
        let clients = [client("1")];
        let products = [product("7", 12.5), product("8", 3.0)];
        let order = NewOrder {
            client_id: "1".into(),
            items: strings(&["7:2", "8:3"]),
            date: None,
            notes: String::new(),
        }
        .into_record(&clients, &products, date(4))
        .expect("valid order");

        assert_eq!(order.date, date(4));
        assert_eq!(order.items[0].price, 12.5);
        assert_eq!(order.items[1].quantity, 3);
        assert!((order.total - 34.0).abs() < 1e-9);
        assert!((order.total - order.items_total()).abs() < 1e-9);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn order_items_need_a_known_product_and_positive_quantity() {
        let products = [product("7", 12.5)];
        assert_invalid(order_items(&strings(&["7:0"]), &products));
        assert_invalid(order_items(&strings(&["7:-2"]), &products));
        assert_invalid(order_items(&strings(&["7"]), &products));
        assert_invalid(order_items(&strings(&["9:1"]), &products));
        assert_invalid(order_items(&[], &products));
    }

    #[test]
    fn order_for_unknown_client_is_rejected() {
        let order = NewOrder {
            client_id: "42".into(),
            items: strings(&["7:1"]),
            date: None,
            notes: String::new(),
        };
        assert_invalid(order.into_record(&[client("1")], &[product("7", 1.0)], date(1)));
    }

    #[test]
    fn invoice_from_order_copies_client_and_lines() {
        let products = [product("7", 12.5)];
        let order = NewOrder {
            client_id: "1".into(),
            items: strings(&["7:2", "9:1"]),
            date: None,
            notes: String::new(),
        }
        .into_record(&[client("1")], &[products[0].clone(), product("9", 4.0)], date(2))
        .map(|mut order| {
            order.id = RecordId::from("30");
            order
        })
        .expect("valid order");

        let invoice = NewInvoice {
            from_order: Some("30".into()),
            client: None,
            lines: Vec::new(),
            date: Some(date(5)),
            due_date: None,
            notes: String::new(),
        }
        .into_record(&[], &[order.clone()], &products, date(9))
        .expect("valid invoice");

        assert_eq!(invoice.client_id, order.client_id);
        assert_eq!(invoice.order_id, Some(RecordId::from("30")));
        assert_eq!(invoice.items[0].description, "Product 7");
        assert_eq!(invoice.items[1].description, "Product 9");
        assert!((invoice.total - order.total).abs() < 1e-9);
        assert_eq!(invoice.due_date, date(5) + Days::new(PAYMENT_TERMS_DAYS));
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
    }

    #[test]
    fn invoice_lines_keep_colons_in_descriptions() {
        let lines = invoice_lines(&strings(&["Support: March:2:40.5"])).expect("valid line");
        assert_eq!(lines[0].description, "Support: March");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].price, 40.5);

        assert_invalid(invoice_lines(&strings(&[":1:2"])));
        assert_invalid(invoice_lines(&strings(&["Setup:1:-5"])));
        assert_invalid(invoice_lines(&strings(&["Setup:0:5"])));
        assert_invalid(invoice_lines(&strings(&["Setup:1"])));
    }

    #[test]
    fn invoice_due_date_cannot_precede_its_date() {
        let invoice = NewInvoice {
            from_order: None,
            client: Some("1".into()),
            lines: strings(&["Setup:1:5"]),
            date: Some(date(10)),
            due_date: Some(date(9)),
            notes: String::new(),
        };
        assert_invalid(invoice.into_record(&[client("1")], &[], &[], date(10)));
    }

    #[test]
    fn edits_without_changes_are_rejected() {
        assert_invalid(
            ClientEdit {
                id: "1".into(),
                ..Default::default()
            }
            .into_patch(),
        );
        assert_invalid(
            OrderEdit {
                id: "1".into(),
                ..Default::default()
            }
            .into_patch(&[], &[]),
        );
    }

    #[test]
    fn order_edit_recomputes_total_from_new_items() {
        let patch = OrderEdit {
            id: "3".into(),
            items: strings(&["7:4"]),
            payment: Some(PaymentStatus::Paid),
            ..Default::default()
        }
        .into_patch(&[], &[product("7", 2.5)])
        .expect("valid patch");

        assert_eq!(patch.total, Some(10.0));
        assert_eq!(patch.payment_status, Some(PaymentStatus::Paid));
        assert_eq!(patch.client_id, None);
    }

    #[test]
    fn invoice_edit_can_detach_its_order() {
        let patch = InvoiceEdit {
            id: "5".into(),
            no_order: true,
            ..Default::default()
        }
        .into_patch(&[], &[])
        .expect("valid patch");
        assert_eq!(patch.order_id, Some(None));

        assert_invalid(
            InvoiceEdit {
                id: "5".into(),
                order: Some("404".into()),
                ..Default::default()
            }
            .into_patch(&[], &[]),
        );
    }
}
