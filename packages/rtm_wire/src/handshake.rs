use serde::{Deserialize, Serialize};

/// Response body of a handshake call.
///
/// Only `ok` is guaranteed to be present. The full handshake variant carries
/// the stream URL plus a snapshot of the team's channels, groups, IMs and
/// users; the lightweight variant carries the URL only. All list fields
/// default to empty so both variants deserialize into the same shape, and
/// unrecognized fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandshakeResponse {
    pub ok: bool,
    /// Streaming endpoint URL; present whenever `ok` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Error code reported by the service when `ok` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamInfo>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_info: Option<SelfInfo>,
    #[serde(default)]
    pub channels: Vec<RawChannel>,
    #[serde(default)]
    pub groups: Vec<RawChannel>,
    #[serde(default)]
    pub ims: Vec<RawChannel>,
    #[serde(default)]
    pub users: Vec<RawUser>,
}

/// The team the credential belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub domain: String,
}

/// The authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfInfo {
    pub name: String,
}

/// A channel record as it appears in the snapshot.
///
/// `name` and `members` are frequently absent (IMs carry neither); the
/// directory applies defaults when attaching — `name` falls back to `id`,
/// `members` to an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChannel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
}

/// A user record as it appears in the snapshot.
///
/// `real_name` falls back to `name` and `tz` to `"unknown"` when attaching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUser {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tz: Option<String>,
}
