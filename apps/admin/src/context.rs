use anyhow::{Context, Result};
use list_view::{Cart, IdStrategy, ListViewController, LoadOrder};
use remote::{NoRemote, PlaceholderApi, RemoteSource};
use shared::{
    domain::{Client, Invoice, Order, Product, User},
    Record,
};
use storage::Storage;
use tracing::{info, warn};

use crate::config::{prepare_database_url, Settings};

fn controller<T: Record>(
    storage: &Storage,
    page_size: usize,
    order: LoadOrder,
    ids: IdStrategy,
) -> ListViewController<T, Storage> {
    ListViewController::new(storage.clone(), page_size)
        .with_load_order(order)
        .with_id_strategy(ids)
}

/// One controller per dashboard collection over a shared store.
pub struct AdminContext {
    pub settings: Settings,
    pub storage: Storage,
    api: Option<PlaceholderApi>,
    pub clients: ListViewController<Client, Storage>,
    pub products: ListViewController<Product, Storage>,
    pub orders: ListViewController<Order, Storage>,
    pub invoices: ListViewController<Invoice, Storage>,
    pub users: ListViewController<User, Storage>,
}

impl AdminContext {
    pub async fn open(settings: Settings) -> Result<Self> {
        let database_url = prepare_database_url(&settings.database_url);
        let storage = Storage::new(&database_url)
            .await
            .with_context(|| format!("failed to open admin database '{database_url}'"))?;
        storage.health_check().await?;

        let api = if settings.remote_enabled {
            match PlaceholderApi::with_timeout(&settings.api_base_url, settings.request_timeout()) {
                Ok(api) => Some(api),
                Err(error) => {
                    warn!(error = %format!("{error:#}"), "remote api disabled");
                    None
                }
            }
        } else {
            None
        };

        let sizes = settings.page_sizes;
        let order = settings.load_order;
        let ids = settings.id_strategy;
        info!(%database_url, remote = api.is_some(), ?order, ?ids, "admin context ready");

        Ok(Self {
            clients: controller(&storage, sizes.clients, order, ids),
            products: controller(&storage, sizes.products, order, ids),
            orders: controller(&storage, sizes.orders, order, ids),
            invoices: controller(&storage, sizes.invoices, order, ids),
            users: controller(&storage, sizes.users, order, ids),
            settings,
            storage,
            api,
        })
    }

    /// Loads every collection concurrently.
    pub async fn load_all(&mut self) -> Result<()> {
        let users_remote: &dyn RemoteSource<User> = match &self.api {
            Some(api) => api,
            None => &NoRemote,
        };
        let products_remote: &dyn RemoteSource<Product> = match &self.api {
            Some(api) => api,
            None => &NoRemote,
        };

        futures::try_join!(
            self.clients.load(&NoRemote),
            self.products.load(products_remote),
            self.orders.load(&NoRemote),
            self.invoices.load(&NoRemote),
            self.users.load(users_remote),
        )?;
        Ok(())
    }

    pub async fn cart(&self) -> Cart<Storage> {
        Cart::load(self.storage.clone()).await
    }
}
