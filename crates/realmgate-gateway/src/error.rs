//! The failure taxonomy every gateway call resolves to.

use realmgate_protocol::ProtocolError;

/// Why a gateway call was rejected.
///
/// The gateway is the single place that classifies failures. Callers
/// branch on the variant if they care; notification and 401 recovery have
/// already happened by the time they see it.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The envelope arrived but its code wasn't the success code.
    #[error("{message}")]
    Logical {
        /// Envelope code; `None` if the server sent a non-integer code.
        code: Option<i64>,
        /// The server's message.
        message: String,
    },

    /// HTTP 401: the credential was rejected and has been cleared.
    #[error("unauthorized")]
    Unauthorized,

    /// HTTP 403: signed in, but not allowed.
    #[error("forbidden")]
    Forbidden,

    /// No usable response: network error, timeout, or an unexpected
    /// HTTP status (5xx and friends).
    #[error("{message}")]
    Transport {
        /// The HTTP status, when a response did arrive.
        status: Option<u16>,
        /// The underlying error text.
        message: String,
    },

    /// The payload arrived but couldn't be encoded or decoded as asked.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl GatewayError {
    /// Returns `true` for the 401 case.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
