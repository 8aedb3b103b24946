//! Shell state shared by every command: configuration, session and client.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use bazaar_core::api::{Notice, Notifier};
use bazaar_core::auth::{FileStorage, KeyringStorage, MemoryStorage, TokenStorage};
use bazaar_core::config::StorageBackend;
use bazaar_core::{api_call, login_redirect, ApiClient, ApiError, Config, Session, SessionEvent};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::output;

/// A command failed and the failure has already been reported.
#[derive(Error, Debug)]
#[error("command failed")]
pub struct CommandFailed;

/// Prints notices on stderr as they happen.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("! {}", notice);
    }
}

pub struct App {
    pub config: Config,
    pub client: ApiClient,
    /// Print `{success, data|error}` JSON instead of tables
    pub json: bool,
    /// Route of the running command, for login redirect decisions
    view: String,
    events: Mutex<broadcast::Receiver<SessionEvent>>,
}

impl App {
    pub fn new(json: bool, view: impl Into<String>) -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let storage = Self::open_storage(&config);
        let session = Arc::new(Session::new(storage));
        let events = session.subscribe();

        let client_config = config.client_config();
        debug!(base_url = %client_config.base_url, "Client configured");
        let client = ApiClient::new(client_config, session)?.with_notifier(Arc::new(StderrNotifier));

        Ok(Self {
            config,
            client,
            json,
            view: view.into(),
            events: Mutex::new(events),
        })
    }

    fn open_storage(config: &Config) -> Arc<dyn TokenStorage> {
        match config.token_storage {
            StorageBackend::Keyring => Arc::new(KeyringStorage::new()),
            StorageBackend::File => {
                let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
                match FileStorage::open(&cache_dir) {
                    Ok(storage) => {
                        debug!(path = %storage.path().display(), "Session file opened");
                        Arc::new(storage)
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to open session file, session will not persist");
                        Arc::new(MemoryStorage::new())
                    }
                }
            }
        }
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    /// Await `call` and report it: the outcome JSON in `--json` mode,
    /// otherwise `human` on success or the error on stderr.
    pub async fn report<T, F>(&self, call: F, human: impl FnOnce(&T)) -> Result<()>
    where
        T: Serialize,
        F: Future<Output = Result<T, ApiError>>,
    {
        let succeeded = if self.json {
            let outcome = api_call(call).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            outcome.is_success()
        } else {
            match call.await {
                Ok(data) => {
                    human(&data);
                    true
                }
                Err(e) => {
                    output::print_error(&e);
                    false
                }
            }
        };

        self.drain_session_events();
        if succeeded {
            Ok(())
        } else {
            Err(CommandFailed.into())
        }
    }

    /// React to session changes made while the command ran.
    pub fn drain_session_events(&self) {
        let Ok(mut events) = self.events.lock() else {
            return;
        };
        while let Ok(event) = events.try_recv() {
            debug!(?event, "Session event");
            if event == SessionEvent::Expired {
                if let Some(target) = login_redirect(&self.view) {
                    eprintln!("Session expired. Run `bazaar login` to sign in again ({}).", target);
                }
            }
        }
    }

    pub fn razorpay_key(&self) -> Result<String> {
        self.config.razorpay_key_id().ok_or_else(|| {
            anyhow::anyhow!(
                "No payment key configured. Set VITE_RAZORPAY_KEY_ID or `bazaar config set --razorpay-key`"
            )
        })
    }
}
