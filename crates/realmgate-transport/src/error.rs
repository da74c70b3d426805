/// Errors that can occur in the transport layer.
///
/// These are failures to get any HTTP response at all. A response with a
/// 4xx/5xx status is not a transport error; the gateway classifies those.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request didn't complete within the configured timeout.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The server couldn't be reached.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request could not be built (bad URL, bad header, bad part).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other failure while sending or reading the response.
    #[error("request failed: {0}")]
    Request(String),
}
