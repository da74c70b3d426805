//! # Realmgate
//!
//! Session and authorization core for a single-page client with two
//! independently authenticated realms (an admin back office and a
//! community front end) plus an anonymous public surface.
//!
//! The host builds one [`SessionContext`] at startup and hands it to its
//! router, views and permission-gated controls. The context owns:
//!
//! - the credential store and one session per realm ([`AdminSession`],
//!   [`AccountSession`]);
//! - one gateway per realm, which injects the realm's token and recovers
//!   from 401s by clearing that realm and redirecting to its login page;
//! - the route table and guard deciding every navigation;
//! - the capability gate for permission-bound UI elements.
//!
//! # How it fits in the stack
//!
//! ```text
//! Host router / views
//!     ↕
//! realmgate (this crate)  ← SessionContext, realm sessions, config, tracing setup
//!     ↕                              ↕
//! realmgate-guard                realmgate-gateway  ← token injection, 401/403 recovery
//! (route decisions, UI gating)       ↕           ↘
//!     ↕                              ↕       realmgate-transport  ← HTTP (reqwest)
//! realmgate-session  ← tokens, hydrated profiles, permission sets
//!
//! realmgate-protocol  ← envelope, codec, locations; shared by every layer
//! ```
//!
//! The guard only reads sessions; the gateways are what clear them on a
//! 401. Both see the same [`session::SessionCell`]s, which is how a
//! rejected token turns into a login redirect on the next navigation.
//!
//! The sub-crates are re-exported as [`gateway`], [`guard`], [`protocol`],
//! [`session`] and [`transport`]; [`prelude`] covers the usual imports.
//!
//! ## Quick Start
//!
//! `REALMGATE_BASE_URL` must name the API origin; [`SessionContext::from_config`]
//! fails with [`RealmgateError::Config`] without it.
//!
//! ```rust,no_run
//! use realmgate::prelude::*;
//!
//! # async fn run() -> Result<(), RealmgateError> {
//! realmgate::telemetry::init_tracing("info");
//! let config = RealmgateConfig::from_env()?;
//! let routes = RouteTable::new(vec![
//!     RouteRecord::new("/admin/login"),
//!     RouteRecord::new("/admin").requires_auth().children(vec![
//!         RouteRecord::new("users").perm("user:list"),
//!     ]),
//! ]);
//! let ctx = SessionContext::from_config(&config, routes)?;
//! ctx.navigate("/admin/users").await;
//! # Ok(())
//! # }
//! ```

mod account;
mod admin;
mod config;
mod context;
mod error;

pub mod telemetry;

pub use account::AccountSession;
pub use admin::AdminSession;
pub use config::{RealmgateConfig, ENV_BASE_URL, ENV_FORBIDDEN_PATH, ENV_STORAGE_PATH, ENV_TIMEOUT_SECS};
pub use context::{SessionContext, SessionContextBuilder};
pub use error::RealmgateError;

pub use realmgate_gateway as gateway;
pub use realmgate_guard as guard;
pub use realmgate_protocol as protocol;
pub use realmgate_session as session;
pub use realmgate_transport as transport;

/// The types most hosts need.
pub mod prelude {
    pub use realmgate_gateway::{
        ApiRequest, CallOptions, GatewayError, MemoryNavigator, Navigator, Notice, NoticeKind, NoticeQueue,
        Notifier,
    };
    pub use realmgate_guard::{
        Affordance, CapabilityGate, Decision, ElementState, GateBinding, GateMode, Gated, RouteRecord, RouteTable,
    };
    pub use realmgate_protocol::{Domain, Location};
    pub use realmgate_session::{AccountProfile, AdminIdentity, CredentialStore, SessionStatus};

    pub use crate::{AccountSession, AdminSession, RealmgateConfig, RealmgateError, SessionContext};
}
