//! Subcommand definitions and dispatch.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bazaar_core::api::ApiError;
use bazaar_core::config::StorageBackend;
use bazaar_core::models::{
    ApplicationStatus, Category, CreateOrderRequest, ListQuery, ModerationDecision, NewProduct,
    OrderStatus, Plan, Product, ProductQuery, ProductStatus, RegisterRequest, ReviewDecision,
    SellerApplication, ShippingAddress, StatusUpdate, UploadedMedia,
};
use bazaar_core::onboarding::{OnboardingStep, SellerOnboarding};
use bazaar_core::payment::{CheckoutOptions, PaymentConfirmation};
use bazaar_core::{ApiClient, Config};
use clap::{Subcommand, ValueEnum};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::app::App;
use crate::output;

#[derive(Subcommand)]
pub enum Command {
    /// Sign in with email and password, or a Google ID token
    Login {
        #[arg(long)]
        email: Option<String>,

        /// Google ID token instead of a password
        #[arg(long, value_name = "ID_TOKEN")]
        google: Option<String>,
    },

    /// Create a customer account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// List product categories
    Categories {
        /// Show the nested category tree
        #[arg(long)]
        tree: bool,
    },

    /// Browse products
    Products {
        #[arg(long, short = 'c')]
        category: Option<String>,
        #[arg(long, short = 's')]
        search: Option<String>,
        /// Sort key understood by the server (e.g. price, -createdAt)
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show one or more products
    Product {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show or change the shopping cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },

    /// Order history and tracking
    Orders {
        #[command(subcommand)]
        action: Option<OrderAction>,
    },

    /// Seller onboarding and console
    Seller {
        #[command(subcommand)]
        action: SellerAction,
    },

    /// Admin console
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Upload images to the media CDN
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    Add {
        product_id: String,
        #[arg(long, short = 'q', default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes it)
    Update { product_id: String, quantity: u32 },
    Remove { product_id: String },
    Clear,
    /// Create an order and print the checkout widget options
    Checkout {
        /// JSON file with the shipping address
        #[arg(long, value_name = "FILE")]
        address: PathBuf,
        #[arg(long, default_value = "razorpay")]
        payment_method: String,
    },
    /// Verify a completed checkout with the widget's response
    Pay {
        /// JSON file with the widget's success payload
        #[arg(value_name = "FILE")]
        response: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum OrderAction {
    List {
        #[arg(long)]
        page: Option<u32>,
    },
    Show { id: String },
    Track { id: String },
    Cancel {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Change an order's status (sellers and admins)
    SetStatus {
        id: String,
        status: String,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        tracking_number: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SellerAction {
    /// Application status and the next onboarding step
    Status,
    /// Submit the seller application from a JSON file
    Apply {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List subscription plans
    Plans,
    /// Start the registration fee payment
    PayRegistration,
    /// Verify the registration fee payment
    ConfirmRegistration {
        #[arg(value_name = "FILE")]
        response: PathBuf,
    },
    /// Start a subscription to a plan
    Subscribe { plan_id: String },
    /// Verify the subscription payment
    ConfirmSubscription {
        #[arg(value_name = "FILE")]
        response: PathBuf,
    },
    Products {
        #[arg(long)]
        page: Option<u32>,
    },
    /// Create a product from a JSON file
    AddProduct {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    UpdateProduct {
        id: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    DeleteProduct { id: String },
    Dashboard,
    Orders {
        #[arg(long)]
        page: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum AdminAction {
    Users {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        search: Option<String>,
    },
    Activate { id: String },
    Deactivate { id: String },
    Sellers {
        #[arg(long)]
        page: Option<u32>,
    },
    /// Seller applications awaiting review
    Applications {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    Approve { id: String },
    Reject { id: String, reason: String },
    Products {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Approve, reject or deactivate a product listing
    Moderate {
        id: String,
        decision: Moderation,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Dashboard stats and recent orders
    Stats,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Set {
        /// API origin (the /api/v1 prefix is added)
        #[arg(long)]
        api_url: Option<String>,
        /// Public key id for the checkout widget
        #[arg(long)]
        razorpay_key: Option<String>,
        #[arg(long)]
        storage: Option<Storage>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Moderation {
    Approve,
    Reject,
    Deactivate,
}

impl From<Moderation> for ProductStatus {
    fn from(m: Moderation) -> Self {
        match m {
            Moderation::Approve => ProductStatus::Approved,
            Moderation::Reject => ProductStatus::Rejected,
            Moderation::Deactivate => ProductStatus::Inactive,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Storage {
    File,
    Keyring,
}

impl From<Storage> for StorageBackend {
    fn from(s: Storage) -> Self {
        match s {
            Storage::File => StorageBackend::File,
            Storage::Keyring => StorageBackend::Keyring,
        }
    }
}

impl Command {
    /// Shell route the command stands for.
    fn view(&self) -> &'static str {
        match self {
            Command::Login { .. } | Command::Register { .. } => "/login",
            Command::Logout | Command::Config { .. } => "/",
            Command::Whoami => "/profile",
            Command::Categories { .. } | Command::Products { .. } | Command::Product { .. } => {
                "/products"
            }
            Command::Cart { .. } => "/cart",
            Command::Orders { .. } => "/orders",
            Command::Seller { .. } => "/seller",
            Command::Admin { .. } => "/admin",
            Command::Upload { .. } => "/seller/products",
        }
    }
}

/// Onboarding position reported by `seller status` and `seller apply`.
#[derive(Serialize)]
struct OnboardingView {
    step: OnboardingStep,
    status: ApplicationStatus,
}

impl OnboardingView {
    fn of(wizard: &SellerOnboarding<'_>) -> Self {
        Self {
            step: wizard.step(),
            status: wizard.status().clone(),
        }
    }

    fn print(&self) {
        output::print_application_status(&self.status, Some(self.step));
    }
}

pub async fn run(command: Command, json: bool) -> Result<()> {
    if let Command::Config { action } = command {
        return run_config(action);
    }

    let mut app = App::new(json, command.view())?;
    let client = app.client.clone();

    match command {
        Command::Login { email, google } => login(&mut app, email, google).await,
        Command::Register { name, email, phone } => {
            let password = rpassword::prompt_password("Password: ")?;
            let confirm = rpassword::prompt_password("Confirm password: ")?;
            if password != confirm {
                bail!("Passwords do not match");
            }
            let request = RegisterRequest {
                name,
                email,
                password,
                phone,
            };
            app.report(client.auth().register(&request), |user| {
                println!("Welcome, {}! You are signed in.", user.name)
            })
            .await
        }
        Command::Logout => {
            app.report(client.auth().logout(), |_| println!("Signed out."))
                .await
        }
        Command::Whoami => app.report(client.auth().me(), output::print_user).await,
        Command::Categories { tree } => {
            let catalog = client.catalog();
            if tree {
                app.report(catalog.category_tree(), |c: &Vec<Category>| output::print_categories(c, true))
                    .await
            } else {
                app.report(catalog.categories(), |c: &Vec<Category>| output::print_categories(c, false))
                    .await
            }
        }
        Command::Products {
            category,
            search,
            sort,
            min_price,
            max_price,
            page,
            limit,
        } => {
            let query = ProductQuery {
                category,
                search,
                sort,
                min_price,
                max_price,
                page,
                limit,
            };
            app.report(client.catalog().products(&query), output::print_products)
                .await
        }
        Command::Product { ids } => {
            let catalog = client.catalog();
            let fetch = try_join_all(ids.iter().map(|id| catalog.product(id)));
            app.report(fetch, |products: &Vec<Product>| {
                for (i, product) in products.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    output::print_product(product);
                }
            })
            .await
        }
        Command::Cart { action } => cart(&app, &client, action.unwrap_or(CartAction::Show)).await,
        Command::Orders { action } => {
            orders(&app, &client, action.unwrap_or(OrderAction::List { page: None })).await
        }
        Command::Seller { action } => seller(&app, &client, action).await,
        Command::Admin { action } => admin(&app, &client, action).await,
        Command::Upload { files } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("image")
                    .to_string();
                uploads.push((name, bytes));
            }
            app.report(client.media().upload_images(uploads), |media: &Vec<UploadedMedia>| {
                for item in media {
                    println!("{}", item.url);
                }
            })
            .await
        }
        Command::Config { .. } => Ok(()),
    }
}

async fn login(app: &mut App, email: Option<String>, google: Option<String>) -> Result<()> {
    let client = app.client.clone();

    if let Some(credential) = google {
        return app
            .report(client.auth().google(&credential), |user| {
                println!("Signed in as {} ({})", user.name, user.role)
            })
            .await;
    }

    let email = match email {
        Some(e) => e,
        None => prompt("Email", app.config.last_email.as_deref())?,
    };
    if email.is_empty() {
        bail!("Email is required");
    }
    let password = match std::env::var("BAZAAR_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ => rpassword::prompt_password("Password: ")?,
    };

    app.report(client.auth().login(&email, &password), |user| {
        println!("Signed in as {} ({})", user.name, user.role)
    })
    .await?;

    app.config.last_email = Some(email);
    if let Err(e) = app.config.save() {
        warn!(error = %e, "Failed to save config");
    }
    Ok(())
}

async fn cart(app: &App, client: &ApiClient, action: CartAction) -> Result<()> {
    let cart = client.cart();
    match action {
        CartAction::Show => app.report(cart.cart(), output::print_cart).await,
        CartAction::Add {
            product_id,
            quantity,
        } => {
            app.report(cart.add_to_cart(&product_id, quantity), output::print_cart)
                .await
        }
        CartAction::Update {
            product_id,
            quantity,
        } => {
            app.report(cart.update_cart_item(&product_id, quantity), output::print_cart)
                .await
        }
        CartAction::Remove { product_id } => {
            app.report(cart.remove_from_cart(&product_id), output::print_cart)
                .await
        }
        CartAction::Clear => app.report(cart.clear_cart(), |_| println!("Cart cleared.")).await,
        CartAction::Checkout {
            address,
            payment_method,
        } => {
            let shipping_address: ShippingAddress = read_json(&address)?;
            let request = CreateOrderRequest {
                shipping_address,
                payment_method,
            };
            let key = app.config.razorpay_key_id();
            let checkout = async {
                let checkout = cart.create_order(&request).await?;
                let options = match (checkout.gateway_order.as_ref(), key.as_deref()) {
                    (Some(gateway), Some(key)) => {
                        Some(with_prefill(client, CheckoutOptions::for_order(key, gateway)).await)
                    }
                    _ => None,
                };
                Ok::<_, ApiError>((checkout, options))
            };
            app.report(checkout, |(checkout, options)| {
                if let Some(ref order) = checkout.order {
                    println!("Order {} created.", order.reference());
                }
                match options {
                    Some(options) => print_widget_options(options),
                    None => println!("No online payment required or no payment key configured."),
                }
            })
            .await
        }
        CartAction::Pay { response } => {
            let payload: serde_json::Value = read_json(&response)?;
            let verify = async {
                let confirmation = PaymentConfirmation::from_gateway_response(&payload)?;
                cart.verify_payment(&confirmation).await
            };
            app.report(verify, |receipt| match receipt.order {
                Some(ref order) => println!("Payment verified for order {}.", order.reference()),
                None => println!("Payment verified."),
            })
            .await
        }
    }
}

async fn orders(app: &App, client: &ApiClient, action: OrderAction) -> Result<()> {
    let orders = client.orders();
    match action {
        OrderAction::List { page } => {
            let query = ListQuery {
                page,
                ..Default::default()
            };
            app.report(orders.my_orders(&query), output::print_orders).await
        }
        OrderAction::Show { id } => app.report(orders.order(&id), output::print_order).await,
        OrderAction::Track { id } => app.report(orders.track(&id), output::print_tracking).await,
        OrderAction::Cancel { id, reason } => {
            app.report(orders.cancel(&id, reason.as_deref()), |order| {
                println!("Order {} is now {}.", order.reference(), order.status)
            })
            .await
        }
        OrderAction::SetStatus {
            id,
            status,
            note,
            tracking_number,
        } => {
            let Some(status) = OrderStatus::parse(&status) else {
                bail!("Unknown order status: {}", status);
            };
            let update = StatusUpdate {
                status,
                note,
                tracking_number,
            };
            app.report(orders.update_status(&id, &update), output::print_order)
                .await
        }
    }
}

async fn seller(app: &App, client: &ApiClient, action: SellerAction) -> Result<()> {
    let seller = client.seller();
    match action {
        SellerAction::Status => {
            let view = async {
                let wizard = SellerOnboarding::start(client).await?;
                Ok::<_, ApiError>(OnboardingView::of(&wizard))
            };
            app.report(view, OnboardingView::print).await
        }
        SellerAction::Apply { file } => {
            let application: SellerApplication = read_json(&file)?;
            let submit = async {
                let mut wizard = SellerOnboarding::start(client).await?;
                wizard.submit_application(application).await?;
                Ok::<_, ApiError>(OnboardingView::of(&wizard))
            };
            app.report(submit, OnboardingView::print).await
        }
        SellerAction::Plans => {
            app.report(client.subscription().plans(), |plans: &Vec<Plan>| output::print_plans(plans))
                .await
        }
        SellerAction::PayRegistration => {
            let key = app.razorpay_key()?;
            let begin = async {
                let wizard = SellerOnboarding::start(client).await?;
                let options = wizard.begin_registration_payment(&key).await?;
                Ok::<_, ApiError>(with_prefill(client, options).await)
            };
            app.report(begin, print_widget_options).await
        }
        SellerAction::ConfirmRegistration { response } => {
            let payload: serde_json::Value = read_json(&response)?;
            let complete = async {
                let confirmation = PaymentConfirmation::from_gateway_response(&payload)?;
                let mut wizard = SellerOnboarding::start(client).await?;
                wizard.complete_registration_payment(&confirmation).await?;
                Ok::<_, ApiError>(OnboardingView::of(&wizard))
            };
            app.report(complete, OnboardingView::print).await
        }
        SellerAction::Subscribe { plan_id } => {
            let key = app.razorpay_key()?;
            let begin = async {
                let wizard = SellerOnboarding::start(client).await?;
                let options = wizard.begin_subscription(&key, &plan_id).await?;
                Ok::<_, ApiError>(with_prefill(client, options).await)
            };
            app.report(begin, print_widget_options).await
        }
        SellerAction::ConfirmSubscription { response } => {
            let payload: serde_json::Value = read_json(&response)?;
            let complete = async {
                let confirmation = PaymentConfirmation::from_gateway_response(&payload)?;
                let mut wizard = SellerOnboarding::start(client).await?;
                wizard.complete_subscription(&confirmation).await?;
                Ok::<_, ApiError>(OnboardingView::of(&wizard))
            };
            app.report(complete, OnboardingView::print).await
        }
        SellerAction::Products { page } => {
            app.report(seller.products(&page_query(page)), output::print_products)
                .await
        }
        SellerAction::AddProduct { file } => {
            let product: NewProduct = read_json(&file)?;
            app.report(seller.create_product(&product), output::print_product)
                .await
        }
        SellerAction::UpdateProduct { id, file } => {
            let product: NewProduct = read_json(&file)?;
            app.report(seller.update_product(&id, &product), output::print_product)
                .await
        }
        SellerAction::DeleteProduct { id } => {
            app.report(seller.delete_product(&id), |_| println!("Product deleted."))
                .await
        }
        SellerAction::Dashboard => {
            app.report(seller.dashboard(), output::print_seller_dashboard)
                .await
        }
        SellerAction::Orders { page } => {
            app.report(seller.orders(&page_query(page)), output::print_orders)
                .await
        }
    }
}

async fn admin(app: &App, client: &ApiClient, action: AdminAction) -> Result<()> {
    let admin = client.admin();
    match action {
        AdminAction::Users { page, search } => {
            let query = ListQuery {
                page,
                search,
                ..Default::default()
            };
            app.report(admin.users(&query), output::print_users).await
        }
        AdminAction::Activate { id } => {
            app.report(admin.update_user_status(&id, true), |user| {
                println!("{} reactivated.", user.email)
            })
            .await
        }
        AdminAction::Deactivate { id } => {
            app.report(admin.update_user_status(&id, false), |user| {
                println!("{} deactivated.", user.email)
            })
            .await
        }
        AdminAction::Sellers { page } => {
            app.report(admin.sellers(&page_query(page)), output::print_sellers)
                .await
        }
        AdminAction::Applications { status, page } => {
            let query = ListQuery {
                page,
                status,
                ..Default::default()
            };
            app.report(admin.seller_applications(&query), output::print_applications)
                .await
        }
        AdminAction::Approve { id } => {
            app.report(admin.review_application(&id, &ReviewDecision::approve()), |_| {
                println!("Application approved.")
            })
            .await
        }
        AdminAction::Reject { id, reason } => {
            app.report(admin.review_application(&id, &ReviewDecision::reject(reason)), |_| {
                println!("Application rejected.")
            })
            .await
        }
        AdminAction::Products { status, page } => {
            let query = ListQuery {
                page,
                status,
                ..Default::default()
            };
            app.report(admin.products(&query), output::print_products).await
        }
        AdminAction::Moderate {
            id,
            decision,
            reason,
        } => {
            let decision = ModerationDecision {
                status: decision.into(),
                reason,
            };
            app.report(admin.moderate_product(&id, &decision), output::print_product)
                .await
        }
        AdminAction::Stats => app.report(admin.overview(), output::print_overview).await,
    }
}

fn run_config(action: ConfigAction) -> Result<()> {
    let mut config = Config::load().context("Failed to load config")?;
    match action {
        ConfigAction::Show => {
            println!("Config file:   {}", Config::config_path()?.display());
            println!("API base URL:  {}", config.client_config().base_url);
            println!(
                "Payment key:   {}",
                config.razorpay_key_id().as_deref().unwrap_or("(not set)")
            );
            println!("Token storage: {:?}", config.token_storage);
            if let Some(ref email) = config.last_email {
                println!("Last login:    {}", email);
            }
            Ok(())
        }
        ConfigAction::Set {
            api_url,
            razorpay_key,
            storage,
        } => {
            if let Some(url) = api_url {
                config.api_url = Some(url);
            }
            if let Some(key) = razorpay_key {
                config.razorpay_key_id = Some(key);
            }
            if let Some(storage) = storage {
                config.token_storage = storage.into();
            }
            config.save().context("Failed to save config")?;
            println!("Configuration saved.");
            Ok(())
        }
    }
}

/// Prefill the widget with the signed-in account, when it can be fetched.
/// The lookup is optional, so its failures raise no notice.
async fn with_prefill(client: &ApiClient, options: CheckoutOptions) -> CheckoutOptions {
    let quiet = client.quietly();
    match quiet.auth().me().await {
        Ok(user) => options.with_prefill(&user),
        Err(e) => {
            debug!(error = %e, "Could not load account for checkout prefill");
            options
        }
    }
}

fn print_widget_options(options: &CheckoutOptions) {
    println!("Open the checkout widget with these options:");
    match serde_json::to_string_pretty(options) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!(error = %e, "Failed to encode checkout options"),
    }
}

fn page_query(page: Option<u32>) -> ListQuery {
    ListQuery {
        page,
        ..Default::default()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read a line from stdin, offering `default` when given.
fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}
