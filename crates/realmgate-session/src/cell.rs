//! Per-domain session state: token, hydrated identity, change notifications.
//!
//! A [`SessionCell`] is a two-state machine with an orthogonal hydration
//! sub-state:
//!
//! ```text
//!   Unauthenticated ──(set_token)──→ Authenticated / profile absent
//!          ↑                                 │
//!          │                          (commit ticket)
//!          │                                 ▼
//!          └────────(clear)──────── Authenticated / profile present
//! ```
//!
//! # Stale hydration
//!
//! Hydration is asynchronous: a "who am I" call can still be in flight when
//! the user logs out or a 401 clears the credential. Every token change bumps
//! a generation counter. [`SessionCell::begin_hydration`] captures the token
//! and generation in a [`HydrationTicket`], and [`SessionCell::commit`] only
//! stores the profile if both still match. A late answer for an old token
//! is dropped instead of bringing the session back.

use std::sync::Arc;

use parking_lot::Mutex;
use realmgate_protocol::Domain;
use tokio::sync::{watch, MutexGuard};

use crate::CredentialStore;

/// What observers see when a session changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    /// Which domain this status belongs to.
    pub domain: Domain,
    /// A token is present.
    pub authenticated: bool,
    /// A profile is present.
    pub hydrated: bool,
    /// Bumped on every change; lets observers skip duplicate renders.
    pub revision: u64,
}

/// Proof of which credential a hydration started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationTicket {
    token: String,
    generation: u64,
}

impl HydrationTicket {
    /// The token the hydration call is authenticated with.
    pub fn token(&self) -> &str {
        &self.token
    }
}

struct Inner<P> {
    token: Option<String>,
    identity: Option<Arc<P>>,
    generation: u64,
    commits: u64,
    revision: u64,
}

/// Token + hydrated identity for one domain.
///
/// The cell is the only owner of this state. Reads are cheap snapshot
/// clones; writes go through `set_token`, `clear` and `commit`, each of
/// which persists the credential and notifies subscribers.
pub struct SessionCell<P> {
    domain: Domain,
    store: CredentialStore,
    inner: Mutex<Inner<P>>,
    status: watch::Sender<SessionStatus>,
    hydration: tokio::sync::Mutex<()>,
}

impl<P> SessionCell<P> {
    /// Creates the cell, reading any persisted token (cold start).
    pub fn new(domain: Domain, store: CredentialStore) -> Self {
        let token = store.get(domain);
        let status = SessionStatus {
            domain,
            authenticated: token.is_some(),
            hydrated: false,
            revision: 0,
        };
        let (status_tx, _) = watch::channel(status);
        tracing::debug!(%domain, has_token = token.is_some(), "session restored from storage");
        Self {
            domain,
            store,
            inner: Mutex::new(Inner {
                token,
                identity: None,
                generation: 0,
                commits: 0,
                revision: 0,
            }),
            status: status_tx,
            hydration: tokio::sync::Mutex::new(()),
        }
    }

    /// The domain this cell belongs to.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// The current token, if any.
    pub fn token(&self) -> Option<String> {
        self.inner.lock().token.clone()
    }

    /// Returns `true` if a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.inner.lock().token.is_some()
    }

    /// The hydrated identity, if any.
    pub fn identity(&self) -> Option<Arc<P>> {
        self.inner.lock().identity.clone()
    }

    /// Returns `true` if a profile is present.
    pub fn is_hydrated(&self) -> bool {
        self.inner.lock().identity.is_some()
    }

    /// Number of successful commits so far.
    pub fn commits(&self) -> u64 {
        self.inner.lock().commits
    }

    /// Current status snapshot.
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Stores a fresh credential. Any profile belongs to the old credential
    /// and is dropped.
    pub fn set_token(&self, token: &str) {
        if token.is_empty() {
            self.clear();
            return;
        }
        self.store.set(self.domain, token);
        let status = {
            let mut inner = self.inner.lock();
            inner.token = Some(token.to_string());
            inner.identity = None;
            inner.generation += 1;
            self.bump(&mut inner)
        };
        self.status.send_replace(status);
        tracing::info!(domain = %self.domain, "credential stored");
    }

    /// Drops token and profile. Returns `false` if there was nothing to clear.
    pub fn clear(&self) -> bool {
        self.store.clear(self.domain);
        let status = {
            let mut inner = self.inner.lock();
            if inner.token.is_none() && inner.identity.is_none() {
                return false;
            }
            inner.token = None;
            inner.identity = None;
            inner.generation += 1;
            self.bump(&mut inner)
        };
        self.status.send_replace(status);
        tracing::info!(domain = %self.domain, "credential cleared");
        true
    }

    /// Captures the current credential for a hydration call.
    ///
    /// `None` when there's no token: nothing to hydrate.
    pub fn begin_hydration(&self) -> Option<HydrationTicket> {
        let inner = self.inner.lock();
        inner.token.as_ref().map(|token| HydrationTicket {
            token: token.clone(),
            generation: inner.generation,
        })
    }

    /// Stores `identity` if the ticket's credential is still current.
    ///
    /// Returns `false` (and stores nothing) when the credential changed or
    /// was cleared since the ticket was taken.
    pub fn commit(&self, ticket: &HydrationTicket, identity: P) -> bool {
        let status = {
            let mut inner = self.inner.lock();
            let current = inner.generation == ticket.generation
                && inner.token.as_deref() == Some(ticket.token.as_str());
            if !current {
                drop(inner);
                tracing::debug!(domain = %self.domain, "discarding stale hydration result");
                return false;
            }
            inner.identity = Some(Arc::new(identity));
            inner.commits += 1;
            self.bump(&mut inner)
        };
        self.status.send_replace(status);
        true
    }

    /// Serializes hydrations for this domain.
    ///
    /// `clear` and `set_token` never take this lock, so a logout is never
    /// held up behind an in-flight "who am I" call.
    pub async fn lock_hydration(&self) -> MutexGuard<'_, ()> {
        self.hydration.lock().await
    }

    fn bump(&self, inner: &mut Inner<P>) -> SessionStatus {
        inner.revision += 1;
        SessionStatus {
            domain: self.domain,
            authenticated: inner.token.is_some(),
            hydrated: inner.identity.is_some(),
            revision: inner.revision,
        }
    }
}

impl<P> std::fmt::Debug for SessionCell<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SessionCell")
            .field("domain", &self.domain)
            .field("authenticated", &inner.token.is_some())
            .field("hydrated", &inner.identity.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// CredentialSource
// ---------------------------------------------------------------------------

/// What the gateway needs from a session: read the credential at request
/// time, and drop it when the server says it's no longer valid.
pub trait CredentialSource: Send + Sync {
    /// The domain the credential belongs to.
    fn domain(&self) -> Domain;

    /// The credential to send right now, if any.
    fn credential(&self) -> Option<String>;

    /// Drops credential and profile. Returns `false` if already empty.
    fn invalidate(&self) -> bool;
}

impl<P: Send + Sync> CredentialSource for SessionCell<P> {
    fn domain(&self) -> Domain {
        self.domain
    }

    fn credential(&self) -> Option<String> {
        self.token()
    }

    fn invalidate(&self) -> bool {
        self.clear()
    }
}
