//! The session context: one object holding everything a host needs.
//!
//! Built once at process start and passed by reference to the router, the
//! capability gate and views. It owns the credential store, the three
//! gateways, both realm sessions, the route table and the guard.

use std::sync::Arc;

use realmgate_gateway::{
    DomainPolicy, Gateway, Host, MemoryNavigator, Messages, Navigator, Notifier, TracingNotifier,
};
use realmgate_guard::{CapabilityGate, Decision, RouteGuard, RouteTable};
use realmgate_protocol::{Domain, Location, PendingRedirect};
use realmgate_session::{
    AccountProfile, AdminIdentity, CredentialStore, FileStorage, SessionCell, SessionStatus,
};
use realmgate_transport::{HttpTransport, ReqwestTransport};
use tokio::sync::watch;

use crate::config::ENV_BASE_URL;
use crate::{AccountSession, AdminSession, RealmgateConfig, RealmgateError};

/// Redirect hops followed by one navigation before giving up.
const MAX_HOPS: usize = 4;

/// Everything session-related, wired together.
pub struct SessionContext<T: HttpTransport> {
    store: CredentialStore,
    admin: AdminSession<T>,
    account: AccountSession<T>,
    public: Arc<Gateway<T>>,
    routes: RouteTable,
    guard: RouteGuard,
    gate: CapabilityGate,
    navigator: Arc<dyn Navigator>,
    admin_home: String,
    account_home: String,
}

impl SessionContext<ReqwestTransport> {
    /// Builds a context talking HTTP through reqwest, with tokens persisted
    /// to `config.storage_path` when set.
    ///
    /// # Errors
    /// Returns [`RealmgateError::Config`] if `config.base_url` is empty, and
    /// [`RealmgateError::Transport`] if it isn't an absolute URL or the HTTP
    /// client can't be built.
    pub fn from_config(config: &RealmgateConfig, routes: RouteTable) -> Result<Self, RealmgateError> {
        if config.base_url.is_empty() {
            return Err(RealmgateError::Config(format!(
                "{ENV_BASE_URL} is required to talk to the API over HTTP"
            )));
        }
        let transport = Arc::new(ReqwestTransport::new(&config.base_url, config.timeout)?);
        let store = match &config.storage_path {
            Some(path) => CredentialStore::new(Arc::new(FileStorage::new(path.clone()))),
            None => CredentialStore::in_memory(),
        };
        Ok(SessionContextBuilder::new(transport)
            .config(config)
            .store(store)
            .routes(routes)
            .build())
    }
}

impl<T: HttpTransport> SessionContext<T> {
    /// Starts a builder over `transport`.
    pub fn builder(transport: Arc<T>) -> SessionContextBuilder<T> {
        SessionContextBuilder::new(transport)
    }

    pub fn admin(&self) -> &AdminSession<T> {
        &self.admin
    }

    pub fn account(&self) -> &AccountSession<T> {
        &self.account
    }

    /// The anonymous gateway.
    pub fn public(&self) -> &Gateway<T> {
        &self.public
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The UI gate, reading the admin session's permissions.
    pub fn gate(&self) -> &CapabilityGate {
        &self.gate
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Status changes for `domain`'s session. `None` for the public realm.
    pub fn subscribe(&self, domain: Domain) -> Option<watch::Receiver<SessionStatus>> {
        match domain {
            Domain::Admin => Some(self.admin.cell().subscribe()),
            Domain::Account => Some(self.account.cell().subscribe()),
            Domain::Public => None,
        }
    }

    /// Checks navigation to `to` and moves there, or to wherever the guard
    /// redirects.
    ///
    /// Returns the guard's decision for `to` itself. Redirect targets are
    /// checked too; after too many hops the navigation is abandoned.
    ///
    /// A hydration rejected with 401 while the guard runs already sends the
    /// host to the login page, carrying the location the user was leaving.
    /// The final landing then replaces that entry, so the host sees one
    /// login page carrying the real destination.
    pub async fn navigate(&self, to: &str) -> Decision {
        let mut target = Location::parse(to);
        let mut first = None;
        let before = self.navigator.current();

        for _ in 0..MAX_HOPS {
            let chain = self.routes.resolve_meta(target.path());
            let decision = self.guard.check(&target, &chain, &self.admin, &self.account).await;
            let next = decision.target().map(Location::parse);
            first.get_or_insert(decision);

            match next {
                None => {
                    if self.navigator.current() == before {
                        self.navigator.go(&target.full_path());
                    } else {
                        self.navigator.replace(&target.full_path());
                    }
                    return first.unwrap_or(Decision::Proceed);
                }
                Some(next) => target = next,
            }
        }

        tracing::warn!(to, "redirect loop, navigation abandoned");
        first.unwrap_or(Decision::Proceed)
    }

    /// Signs the admin in and lands on the pending redirect, or the admin
    /// home. Returns where it went.
    ///
    /// # Errors
    /// Whatever [`AdminSession::login`] rejects with; nothing navigates then.
    pub async fn admin_login(&self, username: &str, password: &str) -> Result<String, RealmgateError> {
        self.admin.login(username, password).await?;
        Ok(self.land(&self.admin_home).await)
    }

    /// Signs the account in and lands like [`SessionContext::admin_login`].
    ///
    /// # Errors
    /// Whatever [`AccountSession::login`] rejects with.
    pub async fn account_login(&self, username: &str, password: &str) -> Result<String, RealmgateError> {
        self.account.login(username, password).await?;
        Ok(self.land(&self.account_home).await)
    }

    /// Registers, signs in, and lands like [`SessionContext::account_login`].
    ///
    /// # Errors
    /// Whatever [`AccountSession::register`] rejects with.
    pub async fn account_register(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, RealmgateError> {
        self.account.register(username, password, display_name).await?;
        Ok(self.land(&self.account_home).await)
    }

    /// Signs the admin out and goes to the admin login page.
    pub async fn admin_logout(&self) {
        self.admin.logout().await;
        let login = self.guard.paths().admin_login.clone();
        self.navigate(&login).await;
    }

    /// Signs the account out and goes to the account home.
    pub async fn account_logout(&self) {
        self.account.logout().await;
        self.navigate(&self.account_home).await;
    }

    async fn land(&self, home: &str) -> String {
        let here = self.navigator.current();
        let target = match PendingRedirect::from_location(&here, &self.guard.paths().redirect_param) {
            Ok(Some(pending)) => pending.target().to_string(),
            Ok(None) => home.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring pending redirect");
                home.to_string()
            }
        };
        self.navigate(&target).await;
        target
    }
}

impl<T: HttpTransport> std::fmt::Debug for SessionContext<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("admin", &self.admin)
            .field("account", &self.account)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`SessionContext`].
///
/// Defaults: in-memory storage, empty route table, a [`MemoryNavigator`]
/// at `/`, notices written to the log, stock paths and texts.
pub struct SessionContextBuilder<T: HttpTransport> {
    transport: Arc<T>,
    store: CredentialStore,
    routes: RouteTable,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    config: RealmgateConfig,
}

impl<T: HttpTransport> SessionContextBuilder<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            store: CredentialStore::in_memory(),
            routes: RouteTable::default(),
            navigator: Arc::new(MemoryNavigator::default()),
            notifier: Arc::new(TracingNotifier),
            config: RealmgateConfig::default(),
        }
    }

    /// Takes paths, homes and texts from `config`.
    pub fn config(mut self, config: &RealmgateConfig) -> Self {
        self.config = config.clone();
        self
    }

    pub fn store(mut self, store: CredentialStore) -> Self {
        self.store = store;
        self
    }

    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Overrides the notice texts.
    pub fn messages(mut self, messages: Messages) -> Self {
        self.config.messages = messages;
        self
    }

    /// Wires everything together. Persisted tokens are read here.
    pub fn build(self) -> SessionContext<T> {
        let Self {
            transport,
            store,
            routes,
            navigator,
            notifier,
            config,
        } = self;
        let paths = config.paths;

        let host = Host {
            notifier,
            navigator: navigator.clone(),
            messages: config.messages,
        };
        let admin_policy = DomainPolicy::admin()
            .with_login_path(paths.admin_login.clone())
            .with_redirect_param(paths.redirect_param.clone());
        let account_policy = DomainPolicy::account()
            .with_login_path(paths.account_login.clone())
            .with_redirect_param(paths.redirect_param.clone());

        let admin_cell: Arc<SessionCell<AdminIdentity>> = Arc::new(SessionCell::new(Domain::Admin, store.clone()));
        let account_cell: Arc<SessionCell<AccountProfile>> =
            Arc::new(SessionCell::new(Domain::Account, store.clone()));

        let admin_gateway =
            Gateway::new(transport.clone(), admin_policy, host.clone()).with_credentials(admin_cell.clone());
        let account_gateway =
            Gateway::new(transport.clone(), account_policy, host.clone()).with_credentials(account_cell.clone());
        let public_gateway = Gateway::new(transport, DomainPolicy::public(), host);

        tracing::debug!(
            admin_token = admin_cell.is_authenticated(),
            account_token = account_cell.is_authenticated(),
            "session context built"
        );

        SessionContext {
            store,
            gate: CapabilityGate::new(admin_cell.clone()),
            admin: AdminSession::new(admin_cell, Arc::new(admin_gateway)),
            account: AccountSession::new(account_cell, Arc::new(account_gateway)),
            public: Arc::new(public_gateway),
            routes,
            guard: RouteGuard::new(paths),
            navigator,
            admin_home: config.admin_home,
            account_home: config.account_home,
        }
    }
}
