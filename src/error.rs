//! Error type shared by the sync and async clients.

/// Result type alias using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while talking to the controller.
///
/// Operations that report success through a boolean or a zero delay never
/// produce [`Error::Status`]; they still surface transport failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The controller answered a read operation with a non-success status.
    #[error("controller returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, lossily decoded
        body: String,
    },

    /// The body was not valid JSON or lacked a required field.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL could not be parsed.
    #[error("invalid controller URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
