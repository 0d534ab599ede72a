//! Connection Handler
//!
//! Runs one client session: reassembles frames from the stream, dispatches
//! each command, writes the response, and keeps the shared counters honest.
//!
//! ## Session lifecycle
//! ```text
//! OPEN ──(EOF / reset / timeout / fatal error / stats reply)──▶ CLOSING ──▶ CLOSED
//! ```
//! The state lives implicitly in `handle()`: the loop body is OPEN, every
//! `return` is the CLOSING transition, and dropping the connection closes
//! the socket.

use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatcher::Dispatcher;
use crate::error::{DepotError, Result};
use crate::protocol::{self, Command, FrameBuffer, Response};
use crate::stats::ServerStats;

/// Bytes requested from the stream per read
const READ_CHUNK_SIZE: usize = 4096;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Command executor shared by all sessions
    dispatcher: Arc<Dispatcher>,

    /// Shared operation counters
    stats: Arc<ServerStats>,

    /// Reassembly buffer for partial frames
    buffer: FrameBuffer,

    /// Upper bound on one frame; exceeding it ends the session
    max_frame_bytes: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O; timeouts are configured separately.
    pub fn new(
        stream: TcpStream,
        dispatcher: Arc<Dispatcher>,
        stats: Arc<ServerStats>,
        max_frame_bytes: usize,
    ) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dispatcher,
            stats,
            buffer: FrameBuffer::new(),
            max_frame_bytes,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed).
    ///
    /// Drains every complete frame in arrival order before blocking on the
    /// next read, so pipelined requests are answered strictly in order.
    /// Returns when the client disconnects or an error ends the session.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            // Several frames may have arrived in one read
            while let Some(frame) = self.buffer.next_frame() {
                if frame.len() > self.max_frame_bytes {
                    return self.reject_oversized(frame.len());
                }
                if !self.process_frame(&frame)? {
                    return Ok(());
                }
            }

            // A partial frame larger than the limit can never complete
            if self.buffer.len() > self.max_frame_bytes {
                return self.reject_oversized(self.buffer.len());
            }

            let read = match self.reader.read(&mut chunk) {
                Ok(0) => {
                    // Client closed its end
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(n) => n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(ref e)
                    if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
                {
                    // Read timeout: treat like a graceful disconnect
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(ref e)
                    if e.kind() == ErrorKind::ConnectionReset
                        || e.kind() == ErrorKind::ConnectionAborted =>
                {
                    // Abrupt disconnect mid-session counts against the peer
                    tracing::debug!("Connection reset by client {}", self.peer_addr);
                    self.stats.record_failure();
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    self.stats.record_failure();
                    return Err(e.into());
                }
            };

            self.buffer.extend(&chunk[..read]);
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Decode, dispatch, and answer one frame.
    ///
    /// Returns `Ok(false)` when the session should end: the statistics query
    /// was answered, or the peer vanished mid-write.
    fn process_frame(&mut self, frame: &[u8]) -> Result<bool> {
        let response = match protocol::decode_command(frame) {
            Ok(Command::Stats) => {
                // Observation only: the query itself is never counted, and
                // the connection closes once the counters have been sent
                let snapshot = self.stats.snapshot();
                self.send_response(Response::stats(snapshot))?;
                tracing::debug!("Served statistics query for {}", self.peer_addr);
                return Ok(false);
            }
            Ok(command) => {
                tracing::trace!("Received {} from {}", command.name(), self.peer_addr);
                self.dispatcher.dispatch(command)
            }
            // A malformed frame is answered on the same connection, which
            // stays open; only transport failures end the session
            Err(DepotError::Protocol(message)) => Response::error(message),
            Err(e) => Response::error(e.to_string()),
        };

        let is_error = response.is_error();
        match self.send_response(response) {
            Ok(true) => {
                // Count only what the client actually received
                if is_error {
                    self.stats.record_failure();
                } else {
                    self.stats.record_success();
                }
                Ok(true)
            }
            Ok(false) => {
                // Peer went away before the response landed
                self.stats.record_failure();
                Ok(false)
            }
            Err(e) => {
                self.stats.record_failure();
                Err(e)
            }
        }
    }

    /// Refuse a frame that exceeds the configured limit and end the session.
    ///
    /// The peer may still be mid-write, so the error reply is best effort.
    fn reject_oversized(&mut self, observed: usize) -> Result<()> {
        self.stats.record_failure();
        let _ = self.send_response(Response::error(format!(
            "Request exceeds maximum frame size of {} bytes.",
            self.max_frame_bytes
        )));
        tracing::warn!(
            "Closing {}: {} byte frame exceeds the {} byte limit",
            self.peer_addr,
            observed,
            self.max_frame_bytes
        );
        Ok(())
    }

    /// Encode and send one response.
    ///
    /// Returns `Ok(false)` if the peer disconnected before the write could
    /// complete; other write failures propagate.
    fn send_response(&mut self, response: Response) -> Result<bool> {
        let bytes = protocol::encode_response(response)?;
        let result = self
            .writer
            .write_all(&bytes)
            .and_then(|_| self.writer.flush());

        match result {
            Ok(()) => Ok(true),
            Err(ref e)
                if e.kind() == ErrorKind::BrokenPipe
                    || e.kind() == ErrorKind::ConnectionAborted
                    || e.kind() == ErrorKind::ConnectionReset =>
            {
                tracing::debug!(
                    "Client {} disconnected before response could be sent",
                    self.peer_addr
                );
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                Err(e.into())
            }
        }
    }
}
