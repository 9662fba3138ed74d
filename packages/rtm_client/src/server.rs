use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

use rtm_wire::{Frame, HandshakeResponse};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::directory::Directory;
use crate::error::{ApiError, ConnectionError, ReceiveError, SendError};
use crate::session::{ConnectOptions, SessionManager};
use crate::transport::ProxyConfig;

/// Facade over the API client, session manager and directory — the one type
/// most callers need. An explicit instance with no process-wide state:
/// construct it, connect it, pass it around.
#[derive(Debug)]
pub struct Server {
    api: ApiClient,
    session: SessionManager,
    directory: Directory,
    handshake_timeout: Duration,
}

impl Server {
    pub fn new(config: ClientConfig) -> Result<Self, ConnectionError> {
        let proxy = match config.proxy.as_deref() {
            Some(raw) => Some(ProxyConfig::from_url(raw)?),
            None => None,
        };
        let api = ApiClient::new(&config.token, &config.api_base, config.proxy.as_deref())?;
        Ok(Self {
            api,
            session: SessionManager::new(proxy),
            directory: Directory::new(),
            handshake_timeout: config.handshake_timeout(),
        })
    }

    /// Connect with the full-snapshot handshake and default options.
    pub async fn connect(&mut self) -> Result<(), ConnectionError> {
        self.connect_with(ConnectOptions {
            timeout: Some(self.handshake_timeout),
            ..Default::default()
        })
        .await
    }

    pub async fn connect_with(&mut self, options: ConnectOptions) -> Result<(), ConnectionError> {
        self.session
            .connect(&self.api, &mut self.directory, options)
            .await
    }

    /// Re-run the handshake and replace the transport. The directory is
    /// never cleared or repopulated here.
    pub async fn reconnect(&mut self) -> Result<(), ConnectionError> {
        self.session
            .reconnect(&self.api, &mut self.directory, Some(self.handshake_timeout))
            .await
    }

    /// Write one frame, applying the recovery policy: **one reconnect, one
    /// resend**. A socket-level send failure triggers exactly one
    /// `reconnect`; if that fails its [`ConnectionError`] surfaces, and if
    /// the resend fails too that [`SendError`] surfaces. Encoding failures
    /// are not connection drops and propagate immediately.
    pub async fn send_frame(&mut self, frame: &Frame) -> Result<(), SendError> {
        let err = match self.session.send(frame).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        if matches!(err, SendError::Encode(_)) {
            return Err(err);
        }

        warn!(error = %err, "send failed, attempting recovery reconnect");
        self.session.disconnect();
        self.reconnect().await?;
        self.session.send(frame).await
    }

    /// Send a chat message. `thread` is the parent message timestamp when
    /// replying in a thread; `reply_broadcast` only applies when a thread is
    /// given.
    pub async fn send_message(
        &mut self,
        channel: &str,
        text: &str,
        thread: Option<&str>,
        reply_broadcast: bool,
    ) -> Result<(), SendError> {
        let frame = Frame::message(channel, text, thread, reply_broadcast);
        self.send_frame(&frame).await
    }

    /// Send a typed keep-alive frame.
    pub async fn ping(&mut self) -> Result<(), SendError> {
        self.send_frame(&Frame::Ping).await
    }

    /// Read from the stream. Blocking mode waits for one frame;
    /// non-blocking mode drains whatever is pending and returns `""` when
    /// nothing is.
    pub async fn read(&mut self, blocking: bool) -> Result<String, ReceiveError> {
        self.session.receive(blocking).await
    }

    /// Call an arbitrary API method and return the raw response body.
    pub async fn call(
        &self,
        method: &str,
        params: &HashMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<String, ApiError> {
        Ok(self.api.invoke(method, params, timeout).await?.body)
    }

    /// Join a channel by name. Some credential types (bots) may not join
    /// channels; that denial comes back in the response body as an
    /// API-level error, not as a failure here.
    pub async fn join_channel(
        &self,
        name: &str,
        timeout: Option<Duration>,
    ) -> Result<String, ApiError> {
        let mut params = HashMap::new();
        params.insert("name".to_string(), name.to_string());
        self.call("channels.join", &params, timeout).await
    }

    /// Append a `name/version` segment to the outgoing User-Agent header.
    pub fn append_user_agent(&mut self, name: &str, version: &str) {
        self.api.append_user_agent(name, version);
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Mutable directory access, e.g. to attach a channel learned
    /// mid-session from a stream event.
    pub fn directory_mut(&mut self) -> &mut Directory {
        &mut self.directory
    }

    pub fn connected(&self) -> bool {
        self.session.connected()
    }

    pub fn stream_url(&self) -> Option<&str> {
        self.session.stream_url()
    }

    pub fn team_domain(&self) -> Option<&str> {
        self.session.team_domain()
    }

    pub fn self_name(&self) -> Option<&str> {
        self.session.self_name()
    }

    /// The retained handshake snapshot from the most recent connect.
    pub fn login_data(&self) -> Option<&HandshakeResponse> {
        self.session.login_data()
    }
}
