use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, warn};

use super::storage::{MemoryStorage, TokenStorage};

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Login entry point of the application shell
pub const LOGIN_PATH: &str = "/login";

/// Buffer size for the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Session lifecycle signals for the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    Refreshed,
    /// Refresh failed or was impossible; both tokens have been cleared.
    Expired,
    LoggedOut,
}

/// Wizard progress flags persisted next to the tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlag {
    RegistrationPaymentCompleted,
    SubscriptionCompleted,
}

impl SessionFlag {
    pub fn key(&self) -> &'static str {
        match self {
            SessionFlag::RegistrationPaymentCompleted => "registrationPaymentCompleted",
            SessionFlag::SubscriptionCompleted => "subscriptionCompleted",
        }
    }
}

/// Owner of the session credential pair.
///
/// All token reads and writes go through here. `refresh_guard` serializes
/// refresh exchanges so concurrent 401s share a single refresh.
pub struct Session {
    storage: Arc<dyn TokenStorage>,
    refresh_lock: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            refresh_lock: Mutex::new(()),
            events,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Read a value, treating storage errors and empty strings as absent.
    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Failed to read session storage");
                None
            }
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Persist a new pair. A pair without a refresh token keeps the stored one.
    pub fn store_tokens(&self, pair: &TokenPair) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, &pair.access_token)?;
        if let Some(ref refresh) = pair.refresh_token {
            self.storage.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        debug!(rotated_refresh = pair.refresh_token.is_some(), "Session tokens stored");
        Ok(())
    }

    pub fn set_access_token(&self, token: &str) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, token)
    }

    /// Remove both tokens. Both removals are attempted even if one fails.
    pub fn clear(&self) -> Result<()> {
        let access = self.storage.remove(ACCESS_TOKEN_KEY);
        let refresh = self.storage.remove(REFRESH_TOKEN_KEY);
        debug!("Session tokens cleared");
        access.and(refresh)
    }

    pub fn flag(&self, flag: SessionFlag) -> bool {
        self.read(flag.key()).as_deref() == Some("true")
    }

    pub fn set_flag(&self, flag: SessionFlag, value: bool) -> Result<()> {
        if value {
            self.storage.set(flag.key(), "true")
        } else {
            self.storage.remove(flag.key())
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Hold while exchanging the refresh token.
    pub async fn refresh_guard(&self) -> MutexGuard<'_, ()> {
        self.refresh_lock.lock().await
    }
}

/// Where the shell should navigate after the session expired, or `None` when
/// the current view already is the login entry point.
pub fn login_redirect(current_view: &str) -> Option<&'static str> {
    let path = current_view
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');

    if path == LOGIN_PATH || path.starts_with("/login/") {
        None
    } else {
        Some(LOGIN_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_clear_tokens() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());

        session
            .store_tokens(&TokenPair {
                access_token: "access".to_string(),
                refresh_token: Some("refresh".to_string()),
            })
            .unwrap();
        assert_eq!(session.access_token().as_deref(), Some("access"));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh"));

        session.clear().unwrap();
        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
    }

    #[test]
    fn test_pair_without_refresh_keeps_existing() {
        let session = Session::in_memory();
        session
            .store_tokens(&TokenPair {
                access_token: "a1".to_string(),
                refresh_token: Some("r1".to_string()),
            })
            .unwrap();
        session
            .store_tokens(&TokenPair {
                access_token: "a2".to_string(),
                refresh_token: None,
            })
            .unwrap();

        assert_eq!(session.access_token().as_deref(), Some("a2"));
        assert_eq!(session.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let session = Session::in_memory();
        session.set_access_token("").unwrap();
        assert_eq!(session.access_token(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_flags() {
        let session = Session::in_memory();
        assert!(!session.flag(SessionFlag::SubscriptionCompleted));

        session.set_flag(SessionFlag::SubscriptionCompleted, true).unwrap();
        assert!(session.flag(SessionFlag::SubscriptionCompleted));
        assert!(!session.flag(SessionFlag::RegistrationPaymentCompleted));

        session.set_flag(SessionFlag::SubscriptionCompleted, false).unwrap();
        assert!(!session.flag(SessionFlag::SubscriptionCompleted));
    }

    #[test]
    fn test_events_reach_subscribers() {
        let session = Session::in_memory();
        let mut rx = session.subscribe();
        session.emit(SessionEvent::Expired);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Expired);
    }

    #[test]
    fn test_login_redirect() {
        assert_eq!(login_redirect("/seller/dashboard"), Some(LOGIN_PATH));
        assert_eq!(login_redirect("/"), Some(LOGIN_PATH));
        assert_eq!(login_redirect("/login"), None);
        assert_eq!(login_redirect("/login/"), None);
        assert_eq!(login_redirect("/login?next=/cart"), None);
        assert_eq!(login_redirect("/login/google"), None);
        assert_eq!(login_redirect("/loginhelp"), Some(LOGIN_PATH));
    }
}
