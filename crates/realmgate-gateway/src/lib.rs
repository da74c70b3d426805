//! Domain-scoped API gateways for Realmgate.
//!
//! Three [`Gateway`] instances exist per process (admin, account, public).
//! Each one injects its own domain's credential, unwraps the response
//! envelope, and turns every failure into one [`GatewayError`] kind after
//! doing the domain-specific recovery:
//!
//! | Outcome | Notice (unless suppressed) | Side effect |
//! |---|---|---|
//! | envelope `code != 0` | server message | none |
//! | HTTP 401 | session expired | clear credential + profile, redirect to login |
//! | HTTP 403 | forbidden | none |
//! | network / timeout / other status | underlying message | none |
//!
//! # How it fits in the stack
//!
//! ```text
//! Session operations / views (above)  ← call gateways, get payloads or errors
//!     ↕
//! Gateway Layer (this crate)  ← credential injection + classification
//!     ↕
//! Transport + Protocol (below)  ← raw HTTP and the envelope format
//! ```

mod error;
mod gateway;
mod navigate;
mod notify;
mod policy;

pub mod api;

pub use error::GatewayError;
pub use gateway::{ApiRequest, CallOptions, Gateway, Host, Payload};
pub use navigate::{MemoryNavigator, Navigator};
pub use notify::{Notice, NoticeKind, NoticeQueue, Notifier, TracingNotifier};
pub use policy::{DomainPolicy, Messages, ACCOUNT_TOKEN_HEADER, ADMIN_TOKEN_HEADER};
