//! Session state for Realmgate's identity domains.
//!
//! This crate holds everything a domain remembers about who is signed in:
//!
//! 1. **Credentials**: the opaque bearer token per domain, persisted in
//!    durable client storage ([`CredentialStore`]).
//! 2. **Session state**: token + hydrated profile, with hydration tickets
//!    that stop a stale "who am I" answer from resurrecting a session that
//!    was logged out meanwhile ([`SessionCell`]).
//! 3. **Permissions**: the admin permission set and the evaluator with its
//!    admin bypass ([`PermissionSet`], [`has_permission`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Guard / UI gate (above)  ← read session state and permissions
//!     ↕
//! Session Layer (this crate)  ← owns token + profile per domain
//!     ↕
//! Protocol Layer (below)  ← provides Domain
//! ```
//!
//! The gateway sits beside this crate: it reads the credential through
//! [`CredentialSource`] at request time and invalidates it on a 401.

mod cell;
mod error;
mod permission;
mod profile;
mod store;

pub use cell::{CredentialSource, HydrationTicket, SessionCell, SessionStatus};
pub use error::SessionError;
pub use permission::{has_permission, PermissionSet};
pub use profile::{AccountProfile, AdminIdentity, AdminProfile};
pub use store::{
    CredentialStore, FileStorage, MemoryStorage, StorageBackend, UnavailableStorage, ACCOUNT_TOKEN_KEY,
    ADMIN_TOKEN_KEY,
};
