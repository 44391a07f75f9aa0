//! Native-messaging wire protocol: one length-prefixed JSON frame in each
//! direction over the host's standard streams.

pub mod channel;
pub mod error;
pub mod frame;
pub mod request;

pub use channel::Channel;
pub use error::ProtocolError;
pub use frame::{decode_payload, encode_frame, read_frame, MAX_OUTBOUND_BYTES};
pub use request::Request;
