//! Dispatcher Module
//!
//! Maps decoded commands to storage calls and builds the response for each.
//!
//! ## Responsibilities
//! - Execute LIST/GET/UPLOAD/DELETE against the file store
//! - Base64-encode file content on the way out, decode it on the way in
//! - Convert every backend failure into an ERROR response
//! - Answer the statistics query from the shared counters
//!
//! `dispatch` is infallible by construction: a command always yields a
//! response, so one bad request cannot take down the session that sent it.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::Result;
use crate::protocol::{Command, Response};
use crate::stats::ServerStats;
use crate::storage::FileStore;

/// Executes commands against the file store
pub struct Dispatcher {
    /// Storage backend, shared by every session
    store: FileStore,

    /// Process-wide operation counters, read by the statistics query
    stats: Arc<ServerStats>,
}

impl Dispatcher {
    /// Create a dispatcher over the given store and counters
    pub fn new(store: FileStore, stats: Arc<ServerStats>) -> Self {
        Self { store, stats }
    }

    /// Execute a command and build its response
    pub fn dispatch(&self, command: Command) -> Response {
        match command {
            Command::List => self.list(),
            Command::Get { filename } => self.get(&filename),
            Command::Upload { filename, payload } => self.upload(&filename, &payload),
            Command::Delete { filename } => self.delete(&filename),
            Command::Stats => Response::stats(self.stats.snapshot()),
        }
    }

    // =========================================================================
    // Per-command handlers
    // =========================================================================

    fn list(&self) -> Response {
        match self.store.list() {
            Ok(filenames) => Response::listing(filenames),
            Err(e) => Response::error(e.to_string()),
        }
    }

    fn get(&self, filename: &str) -> Response {
        match self.store.read(filename) {
            Ok(bytes) => Response::file(filename, STANDARD.encode(bytes)),
            Err(e) => Response::error(e.to_string()),
        }
    }

    fn upload(&self, filename: &str, payload: &str) -> Response {
        match self.try_upload(filename, payload) {
            Ok(()) => Response::message(format!("{} uploaded", filename)),
            Err(e) => Response::error(e.to_string()),
        }
    }

    fn delete(&self, filename: &str) -> Response {
        match self.store.delete(filename) {
            Ok(()) => Response::message(format!("{} deleted", filename)),
            Err(e) => Response::error(e.to_string()),
        }
    }

    /// Decode the payload and write it; either step can fail
    fn try_upload(&self, filename: &str, payload: &str) -> Result<()> {
        let bytes = STANDARD.decode(payload)?;
        self.store.write(filename, &bytes)
    }
}
