//! [`CommandCodec`] – wire discipline for request and response frames.
//!
//! Inbound frames must be valid UTF-8 and at most the configured length;
//! surrounding ASCII whitespace is tolerated and stripped.  Outbound
//! responses are compact JSON terminated by `\r\n` – the only newline a
//! response ever contains.

use serde_json::Value;

/// A frame that violated the wire discipline.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The frame exceeds the configured maximum command length.
    #[error("frame is {len} bytes, exceeding the {max}-byte limit")]
    Oversize { len: usize, max: usize },

    /// The frame is not valid UTF-8.
    #[error("frame is not valid UTF-8")]
    NotUtf8,
}

/// Decodes inbound frames and encodes outbound JSON responses.
#[derive(Debug, Clone, Copy)]
pub struct CommandCodec {
    max_len: usize,
}

impl CommandCodec {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Decode a terminator-stripped frame into a command string.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] for over-length or non-UTF-8 frames.  Both map
    /// to the same `invalid command` envelope on the wire.
    pub fn decode(&self, frame: &[u8]) -> Result<String, CodecError> {
        if frame.len() > self.max_len {
            return Err(CodecError::Oversize {
                len: frame.len(),
                max: self.max_len,
            });
        }
        let text = std::str::from_utf8(frame).map_err(|_| CodecError::NotUtf8)?;
        Ok(text
            .trim_matches(|c: char| c.is_ascii_whitespace())
            .to_string())
    }

    /// Encode a response value as compact JSON plus the frame terminator.
    pub fn encode(&self, response: &Value) -> Vec<u8> {
        let mut out = response.to_string().into_bytes();
        out.extend_from_slice(b"\r\n");
        out
    }
}
