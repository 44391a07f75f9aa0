use std::io::{self, Read, StdinLock, StdoutLock, Write};

use serde::Serialize;
use tracing::debug;

use crate::error::ProtocolError;
use crate::frame::{decode_payload, encode_frame, read_frame};
use crate::request::Request;

/// Blocking, single-message channel over a reader/writer pair.
pub struct Channel<R, W> {
    reader: R,
    writer: W,
}

impl Channel<StdinLock<'static>, StdoutLock<'static>> {
    /// Channel bound to the process's standard input and output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout().lock())
    }
}

impl<R: Read, W: Write> Channel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read one request.
    ///
    /// An input that closes before any byte arrives yields an empty
    /// request: the host was started without a pending message.
    pub fn receive(&mut self) -> Result<Request, ProtocolError> {
        match read_frame(&mut self.reader)? {
            Some(payload) => {
                debug!(bytes = payload.len(), "Received frame");
                decode_payload(payload)
            }
            None => {
                debug!("Input closed before any frame");
                Ok(Request::default())
            }
        }
    }

    /// Write `value` as one frame and flush it.
    pub fn send<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ProtocolError> {
        let frame = encode_frame(value)?;
        self.writer.write_all(&frame)?;
        self.writer.flush()?;
        debug!(bytes = frame.len(), "Sent frame");
        Ok(())
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
