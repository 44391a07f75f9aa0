//! Frame encoding: a `u32` byte count in the host's native byte order,
//! followed by that many bytes of UTF-8 JSON.
//!
//! Native order is what browsers write on the sending side, so a host built
//! for a big-endian target would misread frames from a little-endian
//! browser. The prefix is kept native for compatibility with existing
//! extensions rather than pinned to a portable order.

use std::io::{ErrorKind, Read};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProtocolError;

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Largest payload a host may send back to the browser (1 MiB).
pub const MAX_OUTBOUND_BYTES: usize = 1024 * 1024;

/// Serialize `value` as compact JSON and prepend the native-order length.
pub fn encode_frame<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload = serde_json::to_vec(value)?;
    if payload.len() > MAX_OUTBOUND_BYTES {
        return Err(ProtocolError::Oversized {
            len: payload.len(),
            max: MAX_OUTBOUND_BYTES,
        });
    }
    let len = u32::try_from(payload.len()).map_err(|_| ProtocolError::Oversized {
        len: payload.len(),
        max: MAX_OUTBOUND_BYTES,
    })?;

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
    frame.extend_from_slice(&len.to_ne_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Read one raw frame payload from `reader`.
///
/// Returns `Ok(None)` when the stream ends before any prefix byte arrives.
/// The payload buffer only grows with bytes actually received, so a bogus
/// length cannot force a large allocation up front.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, ProtocolError> {
    let mut prefix = [0u8; LENGTH_PREFIX_BYTES];
    match fill(reader, &mut prefix)? {
        0 => return Ok(None),
        LENGTH_PREFIX_BYTES => {}
        received => return Err(ProtocolError::TruncatedPrefix { received }),
    }

    let expected = u32::from_ne_bytes(prefix);
    let mut payload = Vec::new();
    reader
        .by_ref()
        .take(u64::from(expected))
        .read_to_end(&mut payload)?;

    if payload.len() != expected as usize {
        return Err(ProtocolError::TruncatedPayload {
            expected,
            received: payload.len(),
        });
    }
    Ok(Some(payload))
}

/// Strictly decode a payload as UTF-8 and parse it as JSON.
pub fn decode_payload<T: DeserializeOwned>(payload: Vec<u8>) -> Result<T, ProtocolError> {
    let text = String::from_utf8(payload)?;
    Ok(serde_json::from_str(&text)?)
}

/// Read until `buf` is full or the stream ends; returns the bytes read.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, ProtocolError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
