//! Data models for marketplace entities.
//!
//! This module contains the payload types carried in the envelope `data`
//! field:
//!
//! - `User`, `AuthPayload`: accounts and login results
//! - `Category`, `Product`: catalog browsing
//! - `Cart`, `Order`, `Tracking`: purchase flow and order lifecycle
//! - `SellerApplication`, `ApplicationStatus`: seller onboarding
//! - `DashboardStats`, `ReviewDecision`: admin console
//! - `Plan`, `RegistrationOrder`, `SubscriptionOrder`: recurring billing
//!
//! Server documents use `_id` identifiers and camelCase fields. References
//! to other documents may arrive either as an id string or as a populated
//! object; `common::deserialize_ref` accepts both.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod common;
pub mod media;
pub mod order;
pub mod seller;
pub mod subscription;
pub mod user;

pub use admin::{
    ApplicationList, DashboardStats, ModerationDecision, RecentOrders, ReviewDecision,
    SellerApplicationRecord, SellerList, SellerProfile, UserList, UserStatusUpdate,
};
pub use cart::{AddToCartRequest, Cart, CartItem, CartResponse, UpdateCartRequest};
pub use catalog::{
    flatten_tree, Category, CategoryList, CategoryNode, NewProduct, Product, ProductList,
    ProductQuery, ProductRef, ProductResponse, ProductStatus,
};
pub use common::{ListQuery, Pagination};
pub use media::UploadedMedia;
pub use order::{
    CheckoutOrder, CreateOrderRequest, GatewayOrder, Order, OrderItem, OrderList, OrderResponse,
    OrderStatus, PaymentStatus, ShippingAddress, StatusUpdate, Tracking, TrackingEvent,
};
pub use seller::{
    ApplicationState, ApplicationStatus, BankDetails, BusinessAddress, DocumentKind,
    SellerApplication, SellerDashboard, SellerDocument,
};
pub use subscription::{
    CreateSubscriptionRequest, Plan, PlanList, RegistrationOrder, SubscriptionOrder,
    SubscriptionState, SubscriptionStatus,
};
pub use user::{AuthPayload, GoogleLoginRequest, LoginRequest, RegisterRequest, Role, User, UserResponse};
