//! Wire protocol for Realmgate.
//!
//! This crate defines what travels between the browser-side session core
//! and the API:
//!
//! - **Types** ([`Domain`], [`Envelope`], [`Decoded`]): the identity
//!   realms and the uniform `{ code, message, data }` response wrapper.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how request bodies and
//!   response bodies are converted to/from bytes.
//! - **Locations** ([`Location`], [`PendingRedirect`]): the navigation
//!   targets that get preserved across a forced login detour.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding or
//!   decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw HTTP) and the gateway
//! (domain-scoped calls). It doesn't know about tokens or sessions; it
//! only knows how to read and write the wire format.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Gateway (payload or error)
//! ```

mod codec;
mod error;
mod location;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use location::{Location, PendingRedirect, DEFAULT_REDIRECT_PARAM};
pub use types::{Decoded, Domain, Envelope, OK_CODE};
