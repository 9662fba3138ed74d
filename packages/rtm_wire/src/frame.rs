use serde::{Deserialize, Serialize};

/// One outbound frame on the persistent stream connection.
///
/// Serializes with a lowercase `type` tag. Optional message fields are
/// omitted entirely when unset, so a plain message is exactly
/// `{"type":"message","channel":...,"text":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    Message {
        channel: String,
        text: String,
        /// Parent message timestamp when replying in a thread.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread_ts: Option<String>,
        /// Whether a thread reply is also broadcast to the channel.
        /// Only meaningful together with `thread_ts`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_broadcast: Option<bool>,
    },
    /// Keep-alive frame, `{"type":"ping"}`.
    Ping,
}

impl Frame {
    /// Build a message frame.
    ///
    /// `thread` is the parent message timestamp when replying in a thread.
    /// `reply_broadcast` only takes effect when a thread is given; without
    /// one, both thread fields are left off the wire.
    pub fn message(
        channel: impl Into<String>,
        text: impl Into<String>,
        thread: Option<&str>,
        reply_broadcast: bool,
    ) -> Self {
        let thread_ts = thread.map(str::to_owned);
        let reply_broadcast = if thread_ts.is_some() && reply_broadcast {
            Some(true)
        } else {
            None
        };
        Frame::Message {
            channel: channel.into(),
            text: text.into(),
            thread_ts,
            reply_broadcast,
        }
    }
}
