mod config;
mod context;
mod forms;
mod render;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use list_view::{
    criteria::{
        ClientCriteria, InvoiceCriteria, NameDirectory, OrderCriteria, ProductCriteria,
        SearchText, StockLevel, StorefrontQuery, StorefrontSort, UserCriteria,
    },
    dashboard, paginate, ListViewController,
};
use shared::{
    domain::{Client, ClientKind, InvoiceStatus, OrderStatus, PaymentStatus, Product, UserRole},
    record::{ClientPatch, InvoicePatch, OrderPatch, ProductPatch, UserPatch},
    ControllerError, RecordId,
};
use storage::Storage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::load_settings,
    context::AdminContext,
    forms::{
        ClientEdit, InvoiceEdit, NewClient, NewInvoice, NewOrder, NewProduct, NewUser, OrderEdit,
        ProductEdit, UserEdit,
    },
};

#[derive(Parser, Debug)]
#[command(name = "admin", about = "Business admin dashboard and storefront")]
struct Cli {
    /// Overrides the configured database url.
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Skip the remote api and load from the local store or samples.
    #[arg(long, global = true)]
    offline: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Entity {
    Clients,
    Products,
    Orders,
    Invoices,
    Users,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of a collection, optionally filtered.
    List(ListArgs),
    AddClient(NewClient),
    AddProduct(NewProduct),
    AddUser(NewUser),
    /// Record an order; each `--item product_id:qty` is priced from the catalogue.
    AddOrder(NewOrder),
    /// Bill an order with `--from-order`, or a client with `--client` and `--line` entries.
    AddInvoice(NewInvoice),
    /// Change any field of a record.
    Edit {
        #[command(subcommand)]
        target: EditTarget,
    },
    /// Change the status of a record. Orders accept `--payment` as well.
    SetStatus {
        entity: Entity,
        id: String,
        status: Option<String>,
        #[arg(long)]
        payment: Option<PaymentStatus>,
    },
    Delete {
        entity: Entity,
        id: String,
    },
    /// Forget a stored collection; the next load starts over.
    Reset {
        entity: Entity,
    },
    Dashboard,
    /// Browse the storefront catalogue.
    Shop(ShopArgs),
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand, Debug)]
enum EditTarget {
    Client(ClientEdit),
    Product(ProductEdit),
    Order(OrderEdit),
    Invoice(InvoiceEdit),
    User(UserEdit),
}

#[derive(Args, Debug)]
struct ListArgs {
    entity: Entity,
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    kind: Option<ClientKind>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    stock: Option<StockLevel>,
    #[arg(long)]
    role: Option<UserRole>,
    #[arg(long)]
    payment: Option<PaymentStatus>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    client: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: i64,
}

#[derive(Args, Debug)]
struct ShopArgs {
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long)]
    category: Option<String>,
    #[arg(long, default_value = "name")]
    sort: StorefrontSort,
    #[arg(long, default_value_t = 1)]
    page: i64,
}

#[derive(Subcommand, Debug)]
enum CartAction {
    Add { product_id: String },
    Set { product_id: String, quantity: u32 },
    Remove { product_id: String },
    Clear,
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.database_url {
        settings.database_url = url;
    }
    if cli.offline {
        settings.remote_enabled = false;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = AdminContext::open(settings).await?;
    ctx.load_all().await?;

    match cli.command {
        Command::List(args) => list(&mut ctx, args)?,
        Command::AddClient(form) => {
            let created = ctx.clients.create(form.into_record()?).await?;
            println!("created client id={}", created.id);
        }
        Command::AddProduct(form) => {
            let created = ctx.products.create(form.into_record()?).await?;
            println!("created product id={}", created.id);
        }
        Command::AddUser(form) => {
            let created = ctx.users.create(form.into_record()?).await?;
            println!("created user id={} username={}", created.id, created.username);
        }
        Command::AddOrder(form) => {
            let today = Utc::now().date_naive();
            let draft = form.into_record(ctx.clients.records(), ctx.products.records(), today)?;
            let created = ctx.orders.create(draft).await?;
            println!("created order id={} total={:.2}", created.id, created.total);
        }
        Command::AddInvoice(form) => {
            let today = Utc::now().date_naive();
            let draft = form.into_record(
                ctx.clients.records(),
                ctx.orders.records(),
                ctx.products.records(),
                today,
            )?;
            let created = ctx.invoices.create(draft).await?;
            println!(
                "created invoice id={} total={:.2} due={}",
                created.id, created.total, created.due_date
            );
        }
        Command::Edit { target } => edit(&mut ctx, target).await?,
        Command::SetStatus {
            entity,
            id,
            status,
            payment,
        } => set_status(&mut ctx, entity, RecordId::from(id), status, payment).await?,
        Command::Delete { entity, id } => {
            let id = RecordId::from(id);
            let removed = match entity {
                Entity::Clients => ctx.clients.delete(&id).await?,
                Entity::Products => ctx.products.delete(&id).await?,
                Entity::Orders => ctx.orders.delete(&id).await?,
                Entity::Invoices => ctx.invoices.delete(&id).await?,
                Entity::Users => ctx.users.delete(&id).await?,
            };
            if removed {
                println!("deleted {entity:?} id={id}");
            } else {
                println!("no {entity:?} record with id={id}");
            }
        }
        Command::Reset { entity } => {
            let existed = match entity {
                Entity::Clients => ctx.clients.reset().await?,
                Entity::Products => ctx.products.reset().await?,
                Entity::Orders => ctx.orders.reset().await?,
                Entity::Invoices => ctx.invoices.reset().await?,
                Entity::Users => ctx.users.reset().await?,
            };
            info!(?entity, existed, "collection reset");
            println!("reset {entity:?}");
        }
        Command::Dashboard => {
            let today = Utc::now().date_naive();
            let orders = ctx.orders.records();
            let summary = dashboard::summary(orders, ctx.clients.records(), ctx.invoices.records(), today);
            let trend = dashboard::monthly_trend(orders, today, 6);
            let statuses = dashboard::order_status_counts(orders);
            let top = dashboard::top_products(orders, ctx.products.records(), 5);
            let activity =
                dashboard::recent_activity(orders, ctx.invoices.records(), ctx.clients.records(), 5);
            print!("{}", render::dashboard(&summary, &trend, &statuses, &top, &activity));
        }
        Command::Shop(args) => {
            let page_size = ctx.settings.page_sizes.storefront;
            let query = StorefrontQuery {
                search: SearchText::new(&args.search),
                category: args.category,
                sort: args.sort,
            };
            let view = query.apply(&mut ctx.products);
            let (slice, _) = paginate(view, args.page, page_size);
            print!("{}", render::storefront(&slice));
        }
        Command::Cart { action } => cart(&ctx, action).await?,
    }

    Ok(())
}

fn parse_status<T>(raw: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|error| ControllerError::Validation(error).into())
}

fn show_page<T, S>(controller: &mut ListViewController<T, S>, page: i64)
where
    T: shared::Record,
    S: storage::CollectionStore,
{
    if page != 1 && !controller.go_to_page(page) {
        warn!(page, total_pages = controller.total_pages(), "page out of range, showing page 1");
    }
}

fn list(ctx: &mut AdminContext, args: ListArgs) -> Result<()> {
    let search = SearchText::new(&args.search);
    let client_id = args.client.map(RecordId::from);

    let output = match args.entity {
        Entity::Clients => {
            ctx.clients.apply_criteria(ClientCriteria {
                search,
                kind: args.kind,
                status: args.status.as_deref().map(parse_status).transpose()?,
            });
            show_page(&mut ctx.clients, args.page);
            render::clients(&ctx.clients.current_slice())
        }
        Entity::Products => {
            ctx.products.apply_criteria(ProductCriteria {
                search,
                category: args.category,
                stock: args.stock,
            });
            show_page(&mut ctx.products, args.page);
            render::products(&ctx.products.current_slice())
        }
        Entity::Orders => {
            let clients = client_names(ctx.clients.records());
            ctx.orders.apply_criteria(OrderCriteria {
                search,
                status: args.status.as_deref().map(parse_status::<OrderStatus>).transpose()?,
                payment: args.payment,
                date: args.date,
                client_id,
                clients: clients.clone(),
                products: NameDirectory::from_records(ctx.products.records(), |p| p.name.as_str()),
            });
            show_page(&mut ctx.orders, args.page);
            render::orders(&ctx.orders.current_slice(), &clients)
        }
        Entity::Invoices => {
            let clients = client_names(ctx.clients.records());
            ctx.invoices.apply_criteria(InvoiceCriteria {
                search,
                status: args
                    .status
                    .as_deref()
                    .map(parse_status::<InvoiceStatus>)
                    .transpose()?,
                date: args.date,
                client_id,
                clients: clients.clone(),
            });
            show_page(&mut ctx.invoices, args.page);
            render::invoices(&ctx.invoices.current_slice(), &clients)
        }
        Entity::Users => {
            ctx.users.apply_criteria(UserCriteria {
                search,
                role: args.role,
                status: args.status.as_deref().map(parse_status).transpose()?,
            });
            show_page(&mut ctx.users, args.page);
            render::users(&ctx.users.current_slice())
        }
    };

    print!("{output}");
    Ok(())
}

fn client_names(clients: &[Client]) -> NameDirectory {
    NameDirectory::from_records(clients, |c| c.name.as_str())
}

async fn set_status(
    ctx: &mut AdminContext,
    entity: Entity,
    id: RecordId,
    status: Option<String>,
    payment: Option<PaymentStatus>,
) -> Result<()> {
    if status.is_none() && payment.is_none() {
        return Err(ControllerError::Validation(
            "nothing to change: pass a status or --payment".into(),
        )
        .into());
    }
    if payment.is_some() && !matches!(entity, Entity::Orders) {
        return Err(
            ControllerError::Validation("--payment only applies to orders".into()).into(),
        );
    }

    match entity {
        Entity::Clients => {
            let patch = ClientPatch {
                status: status.as_deref().map(parse_status).transpose()?,
                ..Default::default()
            };
            ctx.clients.update(&id, patch).await?;
        }
        Entity::Products => {
            let patch = ProductPatch {
                status: status.as_deref().map(parse_status).transpose()?,
                ..Default::default()
            };
            ctx.products.update(&id, patch).await?;
        }
        Entity::Orders => {
            let patch = OrderPatch {
                status: status.as_deref().map(parse_status).transpose()?,
                payment_status: payment,
                ..Default::default()
            };
            ctx.orders.update(&id, patch).await?;
        }
        Entity::Invoices => {
            let patch = InvoicePatch {
                status: status.as_deref().map(parse_status).transpose()?,
                ..Default::default()
            };
            ctx.invoices.update(&id, patch).await?;
        }
        Entity::Users => {
            let patch = UserPatch {
                status: status.as_deref().map(parse_status).transpose()?,
                ..Default::default()
            };
            ctx.users.update(&id, patch).await?;
        }
    }

    println!("updated {entity:?} id={id}");
    Ok(())
}

async fn edit(ctx: &mut AdminContext, target: EditTarget) -> Result<()> {
    let (entity, id) = match target {
        EditTarget::Client(form) => {
            let id = RecordId::from(form.id.as_str());
            ctx.clients.update(&id, form.into_patch()?).await?;
            (Entity::Clients, id)
        }
        EditTarget::Product(form) => {
            let id = RecordId::from(form.id.as_str());
            ctx.products.update(&id, form.into_patch()?).await?;
            (Entity::Products, id)
        }
        EditTarget::Order(form) => {
            let id = RecordId::from(form.id.as_str());
            let patch = form.into_patch(ctx.clients.records(), ctx.products.records())?;
            ctx.orders.update(&id, patch).await?;
            (Entity::Orders, id)
        }
        EditTarget::Invoice(form) => {
            let id = RecordId::from(form.id.as_str());
            let patch = form.into_patch(ctx.clients.records(), ctx.orders.records())?;
            ctx.invoices.update(&id, patch).await?;
            (Entity::Invoices, id)
        }
        EditTarget::User(form) => {
            let id = RecordId::from(form.id.as_str());
            ctx.users.update(&id, form.into_patch()?).await?;
            (Entity::Users, id)
        }
    };

    println!("updated {entity:?} id={id}");
    Ok(())
}

fn product_for<'a>(
    products: &'a ListViewController<Product, Storage>,
    product_id: &RecordId,
) -> Result<&'a Product> {
    products
        .find(product_id)
        .ok_or_else(|| anyhow!("no product with id={product_id}"))
}

async fn cart(ctx: &AdminContext, action: CartAction) -> Result<()> {
    let mut cart = ctx.cart().await;

    match action {
        CartAction::Add { product_id } => {
            let product = product_for(&ctx.products, &RecordId::from(product_id))?;
            let line = cart.add(product).await?;
            println!("{} x{} in cart", line.name, line.quantity);
        }
        CartAction::Set {
            product_id,
            quantity,
        } => {
            let product = product_for(&ctx.products, &RecordId::from(product_id))?;
            cart.set_quantity(product, quantity).await?;
        }
        CartAction::Remove { product_id } => {
            if !cart.remove(&RecordId::from(product_id)).await? {
                println!("product was not in the cart");
            }
        }
        CartAction::Clear => cart.clear().await?,
        CartAction::Show => {}
    }

    print!("{}", render::cart(cart.items(), cart.total()));
    if !cart.is_empty() {
        println!("{} item(s)", cart.item_count());
    }
    Ok(())
}
