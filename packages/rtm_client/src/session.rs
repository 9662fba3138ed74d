use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info};

use rtm_wire::{Frame, HandshakeResponse, RawChannel, RawUser};

use crate::api::ApiClient;
use crate::directory::Directory;
use crate::error::{ConnectionError, ReceiveError, SendError};
use crate::transport::{ProxyConfig, StreamTransport};

/// Sentinel timezone for users whose snapshot record carries none.
pub const UNKNOWN_TZ: &str = "unknown";

/// Handshake method returning the stream URL plus a full state snapshot.
const FULL_HANDSHAKE: &str = "rtm.start";
/// Handshake method returning the stream URL only.
const LIGHTWEIGHT_HANDSHAKE: &str = "rtm.connect";

/// Options for [`SessionManager::connect`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Use the full-snapshot handshake variant (the default).
    pub full_snapshot: bool,
    /// Re-establish the transport without touching the directory.
    pub reconnect: bool,
    /// Deadline for the handshake request.
    pub timeout: Option<Duration>,
    /// Extra request parameters forwarded to the handshake call.
    pub extra_params: HashMap<String, String>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            full_snapshot: true,
            reconnect: false,
            timeout: None,
            extra_params: HashMap::new(),
        }
    }
}

/// Owns the streaming session.
///
/// Performs the handshake, opens and replaces the [`StreamTransport`], and
/// populates the [`Directory`] exactly once per full connect. Reconnects
/// replace the transport and stream URL but never clear or repopulate the
/// directory: known users and channels keep their identities across drops.
#[derive(Debug)]
pub struct SessionManager {
    transport: Option<StreamTransport>,
    proxy: Option<ProxyConfig>,
    connected: bool,
    stream_url: Option<String>,
    team_domain: Option<String>,
    self_name: Option<String>,
    login_data: Option<HandshakeResponse>,
}

impl SessionManager {
    pub fn new(proxy: Option<ProxyConfig>) -> Self {
        Self {
            transport: None,
            proxy,
            connected: false,
            stream_url: None,
            team_domain: None,
            self_name: None,
            login_data: None,
        }
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn stream_url(&self) -> Option<&str> {
        self.stream_url.as_deref()
    }

    pub fn team_domain(&self) -> Option<&str> {
        self.team_domain.as_deref()
    }

    pub fn self_name(&self) -> Option<&str> {
        self.self_name.as_deref()
    }

    /// The retained handshake snapshot, kept for inspection after the
    /// directory has been populated from it.
    pub fn login_data(&self) -> Option<&HandshakeResponse> {
        self.login_data.as_ref()
    }

    /// Establish the streaming session.
    ///
    /// Runs the handshake through `api`, opens the transport against the
    /// returned stream URL, and — unless this is a reconnect — populates
    /// `directory` from whatever snapshot lists the response carries.
    /// Handshake failures abort outright; there is no retry in here.
    pub async fn connect(
        &mut self,
        api: &ApiClient,
        directory: &mut Directory,
        options: ConnectOptions,
    ) -> Result<(), ConnectionError> {
        let method = if options.full_snapshot {
            FULL_HANDSHAKE
        } else {
            LIGHTWEIGHT_HANDSHAKE
        };
        let reply = api
            .invoke(method, &options.extra_params, options.timeout)
            .await?;
        if !reply.is_success() {
            return Err(ConnectionError::Transport {
                status: reply.status,
            });
        }

        let login: HandshakeResponse = serde_json::from_str(&reply.body)?;
        if !login.ok {
            return Err(ConnectionError::Login {
                reason: login
                    .error
                    .unwrap_or_else(|| "unspecified".to_string()),
            });
        }
        let url = login.url.clone().ok_or(ConnectionError::MissingUrl)?;

        let transport = StreamTransport::open(&url, self.proxy.as_ref()).await?;

        if !options.reconnect {
            // Attaches are idempotent, so populate from whatever lists the
            // response carries regardless of handshake variant.
            parse_channel_data(directory, &login.channels);
            parse_channel_data(directory, &login.groups);
            parse_user_data(directory, &login.users);
            parse_channel_data(directory, &login.ims);
            debug!(
                users = directory.user_count(),
                channels = directory.channel_count(),
                "directory populated from snapshot"
            );
        }

        self.team_domain = login.team.as_ref().map(|t| t.domain.clone());
        self.self_name = login.self_info.as_ref().map(|s| s.name.clone());
        self.login_data = Some(login);
        self.stream_url = Some(url);
        self.transport = Some(transport);
        self.connected = true;
        info!(method, reconnect = options.reconnect, "streaming session established");
        Ok(())
    }

    /// Replace a dropped transport: re-run the handshake and open a fresh
    /// stream. Directory state is assumed still valid and is left as-is.
    pub async fn reconnect(
        &mut self,
        api: &ApiClient,
        directory: &mut Directory,
        timeout: Option<Duration>,
    ) -> Result<(), ConnectionError> {
        self.connect(
            api,
            directory,
            ConnectOptions {
                reconnect: true,
                timeout,
                ..Default::default()
            },
        )
        .await
    }

    /// Send a frame on the current transport.
    pub async fn send(&mut self, frame: &Frame) -> Result<(), SendError> {
        match self.transport.as_mut() {
            Some(transport) => transport.send(frame).await,
            None => Err(SendError::NotConnected),
        }
    }

    /// Read from the current transport (see [`StreamTransport::receive`]).
    pub async fn receive(&mut self, blocking: bool) -> Result<String, ReceiveError> {
        match self.transport.as_mut() {
            Some(transport) => transport.receive(blocking).await,
            None => Err(ReceiveError::NotConnected),
        }
    }

    /// Drop the current transport and mark the session disconnected.
    /// Called on a send failure before the recovery reconnect.
    pub fn disconnect(&mut self) {
        self.transport = None;
        self.connected = false;
    }
}

/// Fold raw snapshot channel records into the directory. A missing `name`
/// defaults to the channel id (IMs carry no name); a missing member list
/// defaults to empty. Attaching an already-known id is a no-op.
pub fn parse_channel_data(directory: &mut Directory, records: &[RawChannel]) {
    for record in records {
        let name = record.name.clone().unwrap_or_else(|| record.id.clone());
        let members = record.members.clone().unwrap_or_default();
        directory.attach_channel(name, record.id.clone(), members);
    }
}

/// Fold raw snapshot user records into the directory. A missing `tz`
/// defaults to [`UNKNOWN_TZ`]; a missing `real_name` defaults to the display
/// name. Re-attaching an id overwrites the previous record.
pub fn parse_user_data(directory: &mut Directory, records: &[RawUser]) {
    for record in records {
        let real_name = record.real_name.clone().unwrap_or_else(|| record.name.clone());
        let tz = record.tz.clone().unwrap_or_else(|| UNKNOWN_TZ.to_string());
        directory.attach_user(record.name.clone(), record.id.clone(), real_name, tz);
    }
}
