//! Wire codec
//!
//! Frame-level encoding and decoding plus the receive-side reassembly
//! buffer. Encoding consumes its input so large base64 payloads move into
//! the output without an extra copy.
//!
//! ## Framing
//! ```text
//! ┌────────────────────────────┬──────────────┐
//! │       UTF-8 payload        │  \r\n\r\n    │
//! │  (JSON object, or plain    │ (terminator, │
//! │   text for the stats path) │   4 bytes)   │
//! └────────────────────────────┴──────────────┘
//! ```
//! The terminator never appears inside a JSON payload (JSON escapes control
//! characters), so scanning for it is unambiguous.

use bytes::{Bytes, BytesMut};

use crate::error::{DepotError, Result};
use crate::protocol::command::{Command, WireRequest};
use crate::protocol::response::{Response, Status, WireResponse};
use crate::stats::StatsSnapshot;

/// Frame terminator separating messages on the stream
pub const FRAME_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Plain-text request line for the statistics query
pub const STATS_REQUEST: &str = "GET_SERVER_STATS";

/// Initial capacity of a reassembly buffer
const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a command into a terminated frame
pub fn encode_command(command: Command) -> Result<Vec<u8>> {
    let mut message = match command.into_wire() {
        Some(wire) => serde_json::to_vec(&wire)?,
        None => STATS_REQUEST.as_bytes().to_vec(),
    };
    message.extend_from_slice(FRAME_TERMINATOR);
    Ok(message)
}

/// Encode a response into a terminated frame
pub fn encode_response(response: Response) -> Result<Vec<u8>> {
    let mut message = match response {
        Response::Listing(filenames) => serde_json::to_vec(&WireResponse::Listing {
            status: Status::Ok,
            data: filenames,
        })?,
        Response::File { filename, content } => serde_json::to_vec(&WireResponse::File {
            status: Status::Ok,
            data_namafile: filename,
            data_file: content,
        })?,
        Response::Message(text) => serde_json::to_vec(&WireResponse::Message {
            status: Status::Ok,
            data: text,
        })?,
        Response::Error(text) => serde_json::to_vec(&WireResponse::Message {
            status: Status::Error,
            data: text,
        })?,
        Response::Stats(snapshot) => format!(
            "SERVER_STATS_SUCCESS:{}\r\nSERVER_STATS_FAILED:{}",
            snapshot.successful, snapshot.failed
        )
        .into_bytes(),
    };
    message.extend_from_slice(FRAME_TERMINATOR);
    Ok(message)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one frame (terminator already stripped) into a command
pub fn decode_command(frame: &[u8]) -> Result<Command> {
    let text = std::str::from_utf8(frame)
        .map_err(|e| DepotError::Protocol(format!("Malformed request: {}", e)))?;

    // The stats query is plain text, not JSON
    if text.trim() == STATS_REQUEST {
        return Ok(Command::Stats);
    }

    let wire: WireRequest = serde_json::from_str(text)
        .map_err(|e| DepotError::Protocol(format!("Malformed request: {}", e)))?;
    Command::try_from(wire)
}

/// Decode one JSON response frame (terminator already stripped)
pub fn decode_response(frame: &[u8]) -> Result<Response> {
    let wire: WireResponse = serde_json::from_slice(frame)
        .map_err(|e| DepotError::Protocol(format!("Malformed response: {}", e)))?;

    Ok(match wire {
        WireResponse::File {
            data_namafile,
            data_file,
            ..
        } => Response::File {
            filename: data_namafile,
            content: data_file,
        },
        WireResponse::Listing { data, .. } => Response::Listing(data),
        WireResponse::Message {
            status: Status::Error,
            data,
        } => Response::Error(data),
        WireResponse::Message {
            status: Status::Ok,
            data,
        } => Response::Message(data),
    })
}

/// Decode the plain-text reply to a statistics query
pub fn decode_stats_response(frame: &[u8]) -> Result<StatsSnapshot> {
    let text = std::str::from_utf8(frame)
        .map_err(|e| DepotError::Protocol(format!("Malformed statistics reply: {}", e)))?;

    let mut successful = None;
    let mut failed = None;
    for line in text.split("\r\n") {
        if let Some(value) = line.strip_prefix("SERVER_STATS_SUCCESS:") {
            successful = value.trim().parse().ok();
        } else if let Some(value) = line.strip_prefix("SERVER_STATS_FAILED:") {
            failed = value.trim().parse().ok();
        }
    }

    match (successful, failed) {
        (Some(successful), Some(failed)) => Ok(StatsSnapshot { successful, failed }),
        _ => Err(DepotError::Protocol(format!(
            "Malformed statistics reply: {:?}",
            text
        ))),
    }
}

// =============================================================================
// Frame reassembly
// =============================================================================

/// Receive-side reassembly buffer.
///
/// Bytes are appended as they arrive; complete frames are split off as soon
/// as a terminator is found. The scan position is remembered across calls so
/// a frame arriving in many small reads is not rescanned from the start
/// each time.
#[derive(Debug)]
pub struct FrameBuffer {
    buf: BytesMut,

    /// Offset the next terminator scan starts from
    scan_from: usize,
}

impl FrameBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            scan_from: 0,
        }
    }

    /// Append bytes received from the stream
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Split off the next complete frame, without its terminator.
    ///
    /// Returns `None` until a terminator has arrived. Call repeatedly after
    /// each `extend`: one read may complete several pipelined frames, and
    /// they come back in arrival order.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        let found = self.buf[self.scan_from..]
            .windows(FRAME_TERMINATOR.len())
            .position(|window| window == FRAME_TERMINATOR)
            .map(|p| self.scan_from + p);

        match found {
            Some(at) => {
                let mut frame = self.buf.split_to(at + FRAME_TERMINATOR.len());
                frame.truncate(at);
                self.scan_from = 0;
                Some(frame.freeze())
            }
            None => {
                // A terminator may be split across reads, so the last three
                // bytes must be rescanned next time
                self.scan_from = self.buf.len().saturating_sub(FRAME_TERMINATOR.len() - 1);
                None
            }
        }
    }

    /// Bytes currently buffered (complete or partial)
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds no bytes at all
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
