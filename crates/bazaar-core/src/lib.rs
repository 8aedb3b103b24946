//! Core library for the Bazaar marketplace client.
//!
//! This crate contains everything that talks to the marketplace REST API:
//!
//! - `api`: the HTTP client core (credential attachment, one-shot token
//!   refresh, error normalization, response envelope)
//! - `auth`: session store for the access/refresh token pair
//! - `services`: typed wrappers for each endpoint group
//! - `models`: payload types for catalog, cart, orders, sellers and admin
//! - `onboarding`: the seller application wizard
//! - `payment`: hosted checkout widget options
//! - `config`: application and client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod onboarding;
pub mod payment;
pub mod services;
pub mod utils;

pub use api::{api_call, ApiClient, ApiError, ApiOutcome, Notice, Notifier};
pub use auth::{login_redirect, Session, SessionEvent};
pub use config::{ClientConfig, Config};
