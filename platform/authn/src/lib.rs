//! Session state provider.
//!
//! [`SessionStore`] owns the signed-in identity: it restores it from persisted
//! local state at startup, replaces it on login and clears it on logout.
//! Everything else reads it through [`SessionStore::snapshot`] or a
//! [`SessionStore::subscribe`] receiver.

mod identity;

use std::sync::Arc;

use platform_api::{ApiClient, User};
use platform_storage::Storage;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub use identity::{Identity, LoginFailure, LoginOutcome, Profile};

/// Storage key of the persisted session record.
pub const SESSION_KEY: &str = "user";

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    /// True until the persisted session has been looked at.
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn Storage>,
    state: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionStore {
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot {
            identity: None,
            loading: true,
        });
        Self {
            api,
            storage,
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Load the persisted session. Unreadable or malformed records leave the
    /// store unauthenticated; a malformed record is also deleted.
    pub fn restore(&self) {
        let identity = match self.storage.get_item(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => {
                    debug!(username = %identity.username, "restored persisted session");
                    Some(identity)
                }
                Err(err) => {
                    warn!(error = %err, "discarding malformed persisted session");
                    if let Err(err) = self.storage.remove_item(SESSION_KEY) {
                        warn!(error = %err, "failed to remove malformed session");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "failed to read persisted session");
                None
            }
        };
        self.state.send_modify(|state| {
            state.identity = identity;
            state.loading = false;
        });
    }

    /// Authenticate against `auth/login`. Never fails: every error is folded
    /// into [`LoginOutcome::Failure`].
    pub async fn login(&self, username: &str, password: &str) -> LoginOutcome {
        let response = match self.api.auth().login(username, password).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%username, error = %err, "login failed");
                return err.into();
            }
        };
        if !response.success {
            info!(%username, "login rejected");
            return LoginOutcome::rejected(response.message);
        }
        let Some(user) = response.user else {
            return LoginOutcome::malformed("login response did not include a user");
        };
        let Some(id) = user.id else {
            return LoginOutcome::malformed("login response did not include a user id");
        };

        let identity = Identity {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            employee: self.load_profile(id, &user).await,
        };
        self.persist(&identity);
        self.state.send_modify(|state| {
            state.identity = Some(identity.clone());
            state.loading = false;
        });
        info!(username = %identity.username, role = %identity.role, "signed in");
        LoginOutcome::Success(identity)
    }

    pub fn logout(&self) {
        if let Err(err) = self.storage.remove_item(SESSION_KEY) {
            warn!(error = %err, "failed to clear persisted session");
        }
        self.state.send_modify(|state| {
            state.identity = None;
            state.loading = false;
        });
        info!("signed out");
    }

    async fn load_profile(&self, id: i64, user: &User) -> Profile {
        match self.api.employees().get(id).await {
            Ok(employee) => Profile::from_employee(id, employee),
            Err(err) => {
                debug!(
                    user_id = id,
                    error = %err,
                    "no employee record, deriving profile from account"
                );
                Profile::from_user(id, user)
            }
        }
    }

    fn persist(&self, identity: &Identity) {
        let result = serde_json::to_string(identity)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                self.storage
                    .set_item(SESSION_KEY, &raw)
                    .map_err(|err| err.to_string())
            });
        if let Err(error) = result {
            warn!(%error, "failed to persist session; it will not survive a restart");
        }
    }
}
