//! Scoped session context.
//!
//! `SessionProvider` owns the session for one run of the app: it hydrates
//! from the token store, reacts to authorization loss reported by the API
//! client, and hands out cheap [`SessionHandle`] clones to everything that
//! needs to read or mutate the session.

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::claims;
use super::token_store::SharedTokenStore;
use crate::adapters::AuthEvent;
use crate::domain::User;
use crate::routing::{NavCommand, Route};

/// Point-in-time view of the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub user: Option<User>,
    /// False until hydration has run; the route guard waits on it
    pub ready: bool,
}

impl SessionSnapshot {
    pub fn display_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

/// Cloneable accessor passed down to pages and commands
#[derive(Clone)]
pub struct SessionHandle {
    store: SharedTokenStore,
    state: std::sync::Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionHandle {
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().authenticated
    }

    /// Persist the credential and mark the session authenticated
    pub fn login(&self, credential: &str, user: Option<User>) {
        self.store.set(credential);
        info!(user = ?user.as_ref().map(|u| &u.username), "session started");
        self.state.send_replace(SessionSnapshot {
            authenticated: true,
            user,
            ready: true,
        });
    }

    /// Drop the credential and the cached user
    pub fn logout(&self) {
        self.store.clear();
        let was_authenticated = self.state.borrow().authenticated;
        self.state.send_replace(SessionSnapshot {
            authenticated: false,
            user: None,
            ready: true,
        });
        if was_authenticated {
            info!("session ended");
        }
    }

    /// Attach the profile fetched after login; ignored once logged out
    pub fn set_user(&self, user: User) {
        self.state.send_if_modified(|snapshot| {
            if snapshot.authenticated {
                snapshot.user = Some(user);
                true
            } else {
                false
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn store(&self) -> &SharedTokenStore {
        &self.store
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("snapshot", &*self.state.borrow())
            .finish()
    }
}

pub struct SessionProvider {
    handle: SessionHandle,
    nav_tx: mpsc::UnboundedSender<NavCommand>,
    nav_rx: Option<mpsc::UnboundedReceiver<NavCommand>>,
    listener: Option<JoinHandle<()>>,
}

impl SessionProvider {
    /// Create an un-hydrated session (`ready == false`)
    pub fn new(store: SharedTokenStore) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        let (nav_tx, nav_rx) = mpsc::unbounded_channel();
        Self {
            handle: SessionHandle {
                store,
                state: std::sync::Arc::new(state),
            },
            nav_tx,
            nav_rx: Some(nav_rx),
            listener: None,
        }
    }

    /// Read the token store once and mark the session ready.
    ///
    /// A JWT whose `exp` has passed is treated as absent and cleared.
    pub fn hydrate(&self) -> SessionSnapshot {
        let store = &self.handle.store;
        let authenticated = match store.get() {
            Some(token) if claims::is_expired(&token, Utc::now()) => {
                info!("stored credential has expired, discarding it");
                store.clear();
                false
            }
            Some(_) => true,
            None => false,
        };

        let snapshot = SessionSnapshot {
            authenticated,
            user: None,
            ready: true,
        };
        self.handle.state.send_replace(snapshot.clone());
        debug!(authenticated, "session hydrated");
        snapshot
    }

    /// Subscribe to authorization-loss events; each one logs out and
    /// requests a redirect to the login route.
    pub fn attach(&mut self, mut events: broadcast::Receiver<AuthEvent>) {
        if let Some(previous) = self.listener.take() {
            previous.abort();
        }

        let handle = self.handle.clone();
        let nav_tx = self.nav_tx.clone();
        self.listener = Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::AuthorizationLost { path }) => {
                        warn!(path = %path, "authorization lost, returning to login");
                    }
                    // Dropped events collapse into a single logout and
                    // redirect, since each would have done the same thing.
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "authorization events lagged, returning to login");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                handle.logout();
                if nav_tx.send(NavCommand::Redirect(Route::Login)).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Navigation requests produced by the session; can be taken once
    pub fn take_navigation(&mut self) -> Option<mpsc::UnboundedReceiver<NavCommand>> {
        self.nav_rx.take()
    }

    /// Stop reacting to authorization events
    pub fn shutdown(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
            debug!("session listener stopped");
        }
    }
}

impl Drop for SessionProvider {
    fn drop(&mut self) {
        self.shutdown();
    }
}
