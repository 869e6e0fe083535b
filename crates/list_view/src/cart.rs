use shared::{
    domain::{CartItem, Product},
    CartError, RecordId,
};
use storage::{read_collection, CollectionStore};
use tracing::{info, warn};

pub const CART_KEY: &str = "cart";

/// Storefront cart, persisted under [`CART_KEY`] after every change.
pub struct Cart<S: CollectionStore> {
    store: S,
    items: Vec<CartItem>,
}

impl<S: CollectionStore> Cart<S> {
    /// Restores the saved cart. A missing or unreadable cart starts empty.
    pub async fn load(store: S) -> Self {
        let items = match read_collection::<CartItem, S>(&store, CART_KEY).await {
            Ok(items) => items.unwrap_or_default(),
            Err(error) => {
                warn!(error = %format!("{error:#}"), "saved cart unreadable, starting empty");
                Vec::new()
            }
        };
        Self { store, items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }

    /// Adds one unit of `product`, refusing to go past its stock.
    pub async fn add(&mut self, product: &Product) -> Result<CartItem, CartError> {
        if product.stock <= 0 {
            return Err(CartError::OutOfStock(product.id.clone()));
        }

        let previous = self.items.clone();
        let item = match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => {
                let quantity = item
                    .quantity
                    .checked_add(1)
                    .filter(|quantity| i64::from(*quantity) <= product.stock)
                    .ok_or_else(|| CartError::StockExhausted(product.id.clone()))?;
                item.quantity = quantity;
                item.clone()
            }
            None => {
                let item = CartItem {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    price: product.price,
                    image: product.image.clone(),
                    quantity: 1,
                };
                self.items.push(item.clone());
                item
            }
        };

        self.save_or_restore(previous).await?;
        info!(product = %product.id, quantity = item.quantity, "added to cart");
        Ok(item)
    }

    /// Sets the quantity of a line; zero removes it.
    pub async fn set_quantity(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        let Some(index) = self.position(&product.id) else {
            return Err(CartError::NotInCart(product.id.clone()));
        };
        if i64::from(quantity) > product.stock {
            return Err(CartError::StockExhausted(product.id.clone()));
        }

        let previous = self.items.clone();
        if quantity == 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = quantity;
        }
        self.save_or_restore(previous).await
    }

    pub async fn remove(&mut self, id: &RecordId) -> Result<bool, CartError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let previous = self.items.clone();
        self.items.remove(index);
        self.save_or_restore(previous).await?;
        Ok(true)
    }

    pub async fn clear(&mut self) -> Result<(), CartError> {
        let previous = std::mem::take(&mut self.items);
        self.save_or_restore(previous).await
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    async fn save_or_restore(&mut self, previous: Vec<CartItem>) -> Result<(), CartError> {
        let saved = match serde_json::to_string(&self.items) {
            Ok(payload) => self
                .store
                .write(CART_KEY, &payload)
                .await
                .map_err(|error| CartError::Storage(format!("{error:#}"))),
            Err(error) => Err(CartError::Storage(error.to_string())),
        };
        if saved.is_err() {
            self.items = previous;
        }
        saved
    }
}

#[cfg(test)]
#[path = "tests/cart_tests.rs"]
mod tests;
