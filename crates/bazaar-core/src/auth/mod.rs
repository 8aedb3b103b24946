//! Authentication module for managing the session credential pair.
//!
//! This module provides:
//! - `Session`: owner of the access/refresh tokens, the refresh lock and
//!   the session event channel
//! - `TokenStorage`: persisted key-value store behind the session, with
//!   in-memory, file and OS keychain implementations

pub mod credentials;
pub mod session;
pub mod storage;

pub use credentials::KeyringStorage;
pub use session::{
    login_redirect, Session, SessionEvent, SessionFlag, TokenPair, ACCESS_TOKEN_KEY, LOGIN_PATH,
    REFRESH_TOKEN_KEY,
};
pub use storage::{FileStorage, MemoryStorage, TokenStorage};
