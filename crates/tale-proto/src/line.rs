//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines out of the socket buffer, carrying a
//! partial trailing line across physical reads. A line that arrives split
//! over two reads is reassembled before it is ever yielded.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Maximum line length per the IRC standard.
pub const MAX_LINE_LEN: usize = 512;

/// Line codec yielding complete lines with their endings stripped.
pub struct LineCodec {
    /// Index of next byte to check for newline.
    next_index: usize,
    /// Maximum line length.
    max_len: usize,
    /// Skipping the remainder of an oversized line.
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the standard 512-byte line limit.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: MAX_LINE_LEN,
            discarding: false,
        }
    }

    /// Create a codec with a custom line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len,
            ..Self::new()
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            // Look for newline starting from where we left off
            let newline = src[self.next_index..].iter().position(|b| *b == b'\n');

            if self.discarding {
                match newline {
                    Some(offset) => {
                        let _ = src.split_to(self.next_index + offset + 1);
                        self.next_index = 0;
                        self.discarding = false;
                        continue;
                    }
                    None => {
                        self.next_index = 0;
                        src.clear();
                        return Ok(None);
                    }
                }
            }

            match newline {
                Some(offset) => {
                    let line = src.split_to(self.next_index + offset + 1);
                    self.next_index = 0;

                    if line.len() > self.max_len {
                        return Err(error::ProtocolError::LineTooLong {
                            actual: line.len(),
                            limit: self.max_len,
                        });
                    }

                    let data = String::from_utf8(line.to_vec())?;
                    return Ok(Some(data.trim_end_matches(['\r', '\n']).to_string()));
                }
                None => {
                    // No complete line yet - remember where we stopped
                    self.next_index = src.len();

                    // A partial line already past the limit can never become
                    // valid; skip ahead to the next newline instead of
                    // erroring forever on the same buffer.
                    if src.len() > self.max_len {
                        self.discarding = true;
                        src.clear();
                        self.next_index = 0;
                        return Err(error::ProtocolError::LineTooLong {
                            actual: src.len(),
                            limit: self.max_len,
                        });
                    }

                    return Ok(None);
                }
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(msg.as_bytes());
        Ok(())
    }
}
