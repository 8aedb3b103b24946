//! Human-readable rendering of command results.

use bazaar_core::models::{
    flatten_tree, ApplicationList, ApplicationStatus, Cart, Category, Order, OrderList, Pagination,
    Plan, Product, ProductList, SellerDashboard, SellerList, Tracking, User, UserList,
};
use bazaar_core::onboarding::OnboardingStep;
use bazaar_core::services::AdminOverview;
use bazaar_core::utils::{format_date, format_phone, format_price, truncate_string};
use bazaar_core::ApiError;

/// Column width for names in tables
const NAME_WIDTH: usize = 36;

pub fn print_error(error: &ApiError) {
    match error.server_message() {
        Some(message) => eprintln!("Error: {}", message),
        None => eprintln!("Error: {}", error),
    }
    for detail in error.details() {
        match &detail.field {
            Some(field) => eprintln!("  - {}: {}", field, detail.message),
            None => eprintln!("  - {}", detail.message),
        }
    }
}

fn print_pagination(pagination: Option<&Pagination>) {
    if let Some(p) = pagination {
        println!("{}", p.display());
    }
}

pub fn print_user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("  Role:    {}", user.role);
    if let Some(ref phone) = user.phone {
        println!("  Phone:   {}", format_phone(phone));
    }
    println!("  Status:  {}", if user.is_active { "active" } else { "deactivated" });
    println!("  Joined:  {}", format_date(user.created_at.as_ref()));
}

pub fn print_categories(categories: &[Category], tree: bool) {
    if tree {
        for node in flatten_tree(categories) {
            println!("{}{} ({})", "  ".repeat(node.depth), node.category.name, node.category.id);
        }
    } else {
        for category in categories {
            println!("{:<24} {}", category.id, category.name);
        }
    }
}

pub fn print_products(list: &ProductList) {
    if list.products.is_empty() {
        println!("No products found.");
        return;
    }
    for product in &list.products {
        let stock = if product.in_stock() { "" } else { "  (out of stock)" };
        println!(
            "{:<24} {:<width$} {:>14}{}",
            product.id,
            truncate_string(&product.name, NAME_WIDTH),
            format_price(product.price),
            stock,
            width = NAME_WIDTH
        );
    }
    print_pagination(list.pagination.as_ref());
}

pub fn print_product(product: &Product) {
    println!("{}", product.name);
    match (product.original_price, product.discount_percent()) {
        (Some(original), Some(discount)) => println!(
            "  Price:   {} (was {}, {}% off)",
            format_price(product.price),
            format_price(original),
            discount
        ),
        _ => println!("  Price:   {}", format_price(product.price)),
    }
    println!("  Stock:   {}", product.stock);
    if let Some(status) = product.status {
        println!("  Status:  {}", status);
    }
    if let Some(image) = product.primary_image() {
        println!("  Image:   {}", image);
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}

pub fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in &cart.items {
        let name = item
            .product
            .product()
            .map(|p| p.name.as_str())
            .unwrap_or_else(|| item.product.id());
        println!(
            "{:<width$} x{:<3} {:>14}",
            truncate_string(name, NAME_WIDTH),
            item.quantity,
            format_price(item.line_total()),
            width = NAME_WIDTH
        );
    }
    println!("{} items, total {}", cart.item_count(), format_price(cart.total()));
}

fn order_line(order: &Order) -> String {
    format!(
        "{:<16} {:<12} {:>14}  {}",
        order.reference(),
        order.status.label(),
        format_price(order.total_amount),
        format_date(order.created_at.as_ref())
    )
}

pub fn print_orders(list: &OrderList) {
    if list.orders.is_empty() {
        println!("No orders yet.");
        return;
    }
    for order in &list.orders {
        println!("{}", order_line(order));
    }
    print_pagination(list.pagination.as_ref());
}

pub fn print_order(order: &Order) {
    println!("{}", order_line(order));
    for item in &order.items {
        println!("  {} x{}  {}", item.display_name(), item.quantity, format_price(item.price));
    }
    if let Some(ref address) = order.shipping_address {
        println!("  Ship to: {}, {}", address.full_name, address.one_line());
    }
    if order.status.is_cancellable() {
        println!("  This order can still be cancelled.");
    }
}

pub fn print_tracking(tracking: &Tracking) {
    println!("Status: {}", tracking.status);
    if let Some(ref courier) = tracking.courier {
        println!("Courier: {} {}", courier, tracking.tracking_number.as_deref().unwrap_or(""));
    }
    if tracking.estimated_delivery.is_some() {
        println!("Expected: {}", format_date(tracking.estimated_delivery.as_ref()));
    }
    for event in &tracking.timeline {
        println!(
            "  {:<14} {:<12} {}",
            format_date(event.timestamp.as_ref()),
            event.status.label(),
            event.note.as_deref().unwrap_or("")
        );
    }
}

pub fn print_application_status(status: &ApplicationStatus, step: Option<OnboardingStep>) {
    println!("Application: {}", status.state());
    if let Some(ref reason) = status.rejection_reason {
        println!("  Reason:  {}", reason);
    }
    if status.submitted_at.is_some() {
        println!("  Submitted: {}", format_date(status.submitted_at.as_ref()));
    }
    if let Some(step) = step {
        println!("  Next step: {} ({}/4)", step.title(), (step.index() + 1).min(4));
    }
}

pub fn print_seller_dashboard(dashboard: &SellerDashboard) {
    println!("Products: {} ({} active)", dashboard.total_products, dashboard.active_products);
    println!("Orders:   {} ({} pending)", dashboard.total_orders, dashboard.pending_orders);
    println!("Revenue:  {}", format_price(dashboard.total_revenue));
    for order in &dashboard.recent_orders {
        println!("  {}", order_line(order));
    }
}

pub fn print_plans(plans: &[Plan]) {
    for plan in plans {
        println!("{:<24} {:<20} {} / {}", plan.id, plan.name, format_price(plan.price), plan.interval);
        for feature in &plan.features {
            println!("    - {}", feature);
        }
    }
}

pub fn print_users(list: &UserList) {
    for user in &list.users {
        println!(
            "{:<24} {:<28} {:<9} {}",
            user.id,
            truncate_string(&user.email, 28),
            user.role.to_string(),
            if user.is_active { "active" } else { "deactivated" }
        );
    }
    print_pagination(list.pagination.as_ref());
}

pub fn print_sellers(list: &SellerList) {
    for seller in &list.sellers {
        println!(
            "{:<24} {:<width$} {}",
            seller.id,
            truncate_string(&seller.business_name, NAME_WIDTH),
            seller.status,
            width = NAME_WIDTH
        );
    }
    print_pagination(list.pagination.as_ref());
}

pub fn print_applications(list: &ApplicationList) {
    if list.applications.is_empty() {
        println!("No applications.");
        return;
    }
    for application in &list.applications {
        println!(
            "{:<24} {:<width$} {:<13} {}",
            application.id,
            truncate_string(&application.business_name, NAME_WIDTH),
            application.status.to_string(),
            format_date(application.submitted_at.as_ref()),
            width = NAME_WIDTH
        );
    }
    print_pagination(list.pagination.as_ref());
}

pub fn print_overview(overview: &AdminOverview) {
    let stats = &overview.stats;
    println!("Users:    {}", stats.total_users);
    println!("Sellers:  {} ({} applications pending)", stats.total_sellers, stats.pending_applications);
    println!("Products: {} ({} awaiting moderation)", stats.total_products, stats.pending_products);
    println!("Orders:   {}", stats.total_orders);
    println!("Revenue:  {}", format_price(stats.total_revenue));
    if !overview.recent_orders.is_empty() {
        println!();
        println!("Recent orders:");
        for order in &overview.recent_orders {
            println!("  {}", order_line(order));
        }
    }
}
