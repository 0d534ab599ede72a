//! Depot client
//!
//! Blocking TCP client speaking the depot wire protocol over one persistent
//! connection. File content crosses the API as raw bytes; base64 is handled
//! here and never leaks to callers.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

use crate::error::{DepotError, Result};
use crate::protocol::{self, Command, FrameBuffer, Response};
use crate::stats::StatsSnapshot;

/// Connection attempts made by [`DepotClient::connect_with_retry`]
pub const DEFAULT_RETRIES: u32 = 3;

/// Pause between connection attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Bytes requested from the stream per read
const READ_CHUNK_SIZE: usize = 4096;

/// A client for the depot file service
pub struct DepotClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    buffer: FrameBuffer,
}

impl DepotClient {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            buffer: FrameBuffer::new(),
        })
    }

    /// Connect, retrying a fixed number of times with a pause in between
    pub fn connect_with_retry<A: ToSocketAddrs>(
        addr: A,
        retries: u32,
        delay: Duration,
    ) -> Result<Self> {
        let attempts = retries.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match Self::connect(&addr) {
                Ok(client) => {
                    tracing::debug!("Connected on attempt {}/{}", attempt, attempts);
                    return Ok(client);
                }
                Err(e) => {
                    tracing::warn!("Connection attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                }
            }
            if attempt < attempts {
                thread::sleep(delay);
            }
        }

        Err(DepotError::Connection(match last_error {
            Some(e) => format!("failed to connect after {} attempts: {}", attempts, e),
            None => format!("failed to connect after {} attempts", attempts),
        }))
    }

    /// List stored filenames
    pub fn list(&mut self) -> Result<Vec<String>> {
        match self.request(Command::List)? {
            Response::Listing(filenames) => Ok(filenames),
            other => Err(unexpected(&other)),
        }
    }

    /// Download a file, returning its raw bytes
    pub fn get(&mut self, filename: &str) -> Result<Vec<u8>> {
        let command = Command::Get {
            filename: filename.to_string(),
        };
        match self.request(command)? {
            Response::File { content, .. } => Ok(STANDARD.decode(content)?),
            other => Err(unexpected(&other)),
        }
    }

    /// Upload raw bytes under the given name, returning the confirmation
    pub fn upload(&mut self, filename: &str, content: &[u8]) -> Result<String> {
        let command = Command::Upload {
            filename: filename.to_string(),
            payload: STANDARD.encode(content),
        };
        match self.request(command)? {
            Response::Message(message) => Ok(message),
            other => Err(unexpected(&other)),
        }
    }

    /// Delete a stored file, returning the confirmation
    pub fn delete(&mut self, filename: &str) -> Result<String> {
        let command = Command::Delete {
            filename: filename.to_string(),
        };
        match self.request(command)? {
            Response::Message(message) => Ok(message),
            other => Err(unexpected(&other)),
        }
    }

    /// Query the server's operation counters.
    ///
    /// Consumes the client: the server closes the connection after replying.
    pub fn server_stats(mut self) -> Result<StatsSnapshot> {
        self.send(Command::Stats)?;
        let frame = self.read_frame()?;
        protocol::decode_stats_response(&frame)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Send a command and read its response, surfacing ERROR as `Remote`
    fn request(&mut self, command: Command) -> Result<Response> {
        self.send(command)?;
        let frame = self.read_frame()?;
        match protocol::decode_response(&frame)? {
            Response::Error(message) => Err(DepotError::Remote(message)),
            response => Ok(response),
        }
    }

    fn send(&mut self, command: Command) -> Result<()> {
        let bytes = protocol::encode_command(command)?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Read until one complete frame is buffered
    fn read_frame(&mut self) -> Result<Bytes> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(frame) = self.buffer.next_frame() {
                return Ok(frame);
            }
            let read = self.reader.read(&mut chunk)?;
            if read == 0 {
                return Err(DepotError::Connection(
                    "server closed the connection".to_string(),
                ));
            }
            self.buffer.extend(&chunk[..read]);
        }
    }
}

/// Error for a response whose shape does not match the request
fn unexpected(response: &Response) -> DepotError {
    DepotError::Protocol(format!("unexpected {} response", response.kind()))
}
