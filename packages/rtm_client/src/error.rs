use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failure at the HTTP request layer (the API collaborator).
#[derive(Debug, Error)]
#[error("api request failed: {0}")]
pub struct ApiError(#[from] pub reqwest::Error);

impl ApiError {
    /// Whether the request died on a per-call deadline.
    pub fn is_timeout(&self) -> bool {
        self.0.is_timeout()
    }

    /// Whether the request never reached the service at all.
    pub fn is_connect(&self) -> bool {
        self.0.is_connect()
    }
}

/// Failure negotiating the stream connection itself.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket connect failed: {0}")]
    Connect(#[from] tungstenite::Error),

    #[error("invalid proxy url: {0}")]
    Proxy(String),
}

/// Failure establishing (or re-establishing) a streaming session.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The handshake request came back with a non-success HTTP status.
    #[error("handshake returned HTTP status {status}")]
    Transport { status: u16 },

    /// The handshake request succeeded but the service rejected the login.
    #[error("login rejected: {reason}")]
    Login { reason: String },

    /// The handshake body was not a decodable handshake response.
    #[error("malformed handshake response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The handshake reported success but carried no stream URL.
    #[error("handshake response missing stream url")]
    MissingUrl,

    /// Opening the stream connection failed.
    #[error("failed to open stream: {0}")]
    Stream(#[from] TransportError),

    /// The handshake request itself could not be carried out.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Failure writing a frame to the stream.
///
/// The facade's send path applies a one-reconnect-one-resend recovery
/// policy; a recovery handshake that itself fails surfaces here as
/// [`SendError::Reconnect`] so the caller sees the underlying cause.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("not connected")]
    NotConnected,

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("websocket send failed: {0}")]
    Socket(#[from] tungstenite::Error),

    #[error("reconnect after send failure did not succeed: {0}")]
    Reconnect(#[from] ConnectionError),
}

/// Failure reading from the stream.
///
/// "No data available yet" is not a failure — the non-blocking receive
/// returns an empty string for that case.
#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("not connected")]
    NotConnected,

    #[error("stream closed by peer")]
    Closed,

    #[error("websocket receive failed: {0}")]
    Socket(#[from] tungstenite::Error),
}
