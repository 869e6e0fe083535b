use super::*;
use shared::domain::ActivityStatus;
use storage::{CollectionStore, Storage};

fn product(id: &str, price: f64, stock: i64) -> Product {
    Product {
        id: RecordId::from(id),
        name: format!("Product {id}"),
        description: String::new(),
        long_description: String::new(),
        price,
        category: "Books".into(),
        stock,
        image: format!("https://picsum.photos/seed/{id}/400/400"),
        status: ActivityStatus::Active,
    }
}

async fn empty_cart() -> Cart<Storage> {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    Cart::load(storage).await
}

#[tokio::test]
async fn adding_twice_increments_quantity() {
    let mut cart = empty_cart().await;
    let book = product("1", 12.5, 5);

    cart.add(&book).await.expect("first add");
    let line = cart.add(&book).await.expect("second add");

    assert_eq!(line.quantity, 2);
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.item_count(), 2);
    assert!((cart.total() - 25.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn out_of_stock_products_are_refused() {
    let mut cart = empty_cart().await;
    let sold_out = product("2", 9.0, 0);
    assert_eq!(
        cart.add(&sold_out).await,
        Err(CartError::OutOfStock(RecordId::from("2")))
    );
    assert!(cart.is_empty());
}

#[tokio::test]
async fn quantity_cannot_exceed_stock() {
    let mut cart = empty_cart().await;
    let scarce = product("3", 4.0, 1);
    cart.add(&scarce).await.expect("add");

    assert_eq!(
        cart.add(&scarce).await,
        Err(CartError::StockExhausted(RecordId::from("3")))
    );
    assert_eq!(
        cart.set_quantity(&scarce, 2).await,
        Err(CartError::StockExhausted(RecordId::from("3")))
    );
    assert_eq!(cart.item_count(), 1);
}

#[tokio::test]
async fn setting_zero_quantity_removes_the_line() {
    let mut cart = empty_cart().await;
    let mug = product("4", 7.0, 10);
    cart.add(&mug).await.expect("add");
    cart.set_quantity(&mug, 4).await.expect("set");
    assert_eq!(cart.item_count(), 4);

    cart.set_quantity(&mug, 0).await.expect("set zero");
    assert!(cart.is_empty());
    assert_eq!(
        cart.set_quantity(&mug, 1).await,
        Err(CartError::NotInCart(RecordId::from("4")))
    );
}

#[tokio::test]
async fn cart_survives_reload_from_store() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut cart = Cart::load(storage.clone()).await;
    cart.add(&product("5", 3.0, 9)).await.expect("add");
    cart.add(&product("6", 8.0, 9)).await.expect("add");
    assert!(cart.remove(&RecordId::from("5")).await.expect("remove"));
    assert!(!cart.remove(&RecordId::from("5")).await.expect("remove again"));

    let reloaded = Cart::load(storage).await;
    assert_eq!(reloaded.items(), cart.items());
    assert_eq!(reloaded.items()[0].id, RecordId::from("6"));
}

#[tokio::test]
async fn unreadable_saved_cart_starts_empty() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.write(CART_KEY, "[{\"broken\":").await.expect("seed");

    let mut cart = Cart::load(storage).await;
    assert!(cart.is_empty());
    cart.add(&product("7", 1.0, 1)).await.expect("add");
    cart.clear().await.expect("clear");
    assert!(cart.is_empty());
}

#[tokio::test]
async fn quantity_stops_at_the_largest_line_size() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let warehouse = product("8", 0.5, i64::from(u32::MAX) + 10);
    let line = CartItem {
        id: warehouse.id.clone(),
        name: warehouse.name.clone(),
        price: warehouse.price,
        image: String::new(),
        quantity: u32::MAX,
    };
    storage
        .write(CART_KEY, &serde_json::to_string(&[line]).expect("json"))
        .await
        .expect("seed");

    let mut cart = Cart::load(storage).await;
    assert_eq!(
        cart.add(&warehouse).await,
        Err(CartError::StockExhausted(RecordId::from("8")))
    );
    assert_eq!(cart.item_count(), u32::MAX);
}
