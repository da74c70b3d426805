//! Error types for the session layer.

/// Errors that can occur while managing a domain's session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Durable storage couldn't be read or written.
    ///
    /// The credential store never lets this escape: it logs and degrades to
    /// "logged out". Backends return it so the store can tell what happened.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// A login or register call succeeded but carried no token.
    #[error("login response for {0} carried no token")]
    MissingToken(realmgate_protocol::Domain),

    /// The operation needs a signed-in session and there isn't one.
    #[error("{0} session is not authenticated")]
    NotAuthenticated(realmgate_protocol::Domain),
}
