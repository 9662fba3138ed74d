//! Wire types for the RTM streaming protocol.
//!
//! Two concerns live here, shared by the client and by anything that wants
//! to speak the protocol in tests:
//!
//! - [`Frame`] — outbound frames written to the persistent stream
//!   connection, serialized with a `type` tag (`{"type":"message",...}`,
//!   `{"type":"ping"}`).
//! - [`HandshakeResponse`] — the JSON body returned by the handshake call
//!   that yields the stream URL and, in the full variant, a snapshot of the
//!   team's channels and users. All snapshot fields are optional at the
//!   schema level; the client fills in documented defaults when attaching
//!   records to its directory.

mod frame;
mod handshake;

pub use frame::Frame;
pub use handshake::{HandshakeResponse, RawChannel, RawUser, SelfInfo, TeamInfo};
