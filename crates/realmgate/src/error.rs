//! Unified error type for Realmgate.

use realmgate_gateway::GatewayError;
use realmgate_guard::GuardError;
use realmgate_protocol::ProtocolError;
use realmgate_session::SessionError;
use realmgate_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RealmgateError {
    /// The HTTP client couldn't be set up or a raw send failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encoding, decoding, or an invalid in-app location.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Missing token after login, or no session where one is needed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A classified gateway failure (logical, 401, 403, transport).
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Route table setup.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// A required setting is missing or an environment value couldn't be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RealmgateError {
    /// The gateway failure behind this error, if that's what it is.
    pub fn as_gateway(&self) -> Option<&GatewayError> {
        match self {
            Self::Gateway(e) => Some(e),
            _ => None,
        }
    }
}
