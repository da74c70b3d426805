//! Navigation and UI gating for Realmgate.
//!
//! - [`RouteTable`] matches a path to its chain of [`RouteRecord`]s.
//! - [`RouteGuard`] turns a chain plus the two realms into a [`Decision`],
//!   hydrating each realm at most once along the way.
//! - [`CapabilityGate`] applies a [`GateBinding`] to an element's
//!   [`ElementState`], hiding or disabling it when the admin lacks the code.
//!
//! # How it fits in the stack
//!
//! ```text
//! Host router / views (above)  ← ask for decisions, render gated elements
//!     ↕
//! Guard Layer (this crate)  ← reads sessions, never writes them
//!     ↕
//! Session Layer (below)  ← permission sets and hydration state
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod gate;
mod guard;
mod route;

pub use error::GuardError;
pub use gate::{Affordance, CapabilityGate, ElementState, GateBinding, GateMode, Gated, PERM_DISABLED_CLASS};
pub use guard::{Decision, GuardPaths, PermissionCheck, Realm, RedirectReason, RouteGuard};
pub use route::{RouteMeta, RouteRecord, RouteTable};
