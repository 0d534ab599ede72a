//! Response definitions
//!
//! Represents responses sent back to clients.

use serde::{Deserialize, Serialize};

use crate::stats::StatsSnapshot;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
}

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Filename listing (LIST)
    Listing(Vec<String>),

    /// File content as base64 text (GET)
    File { filename: String, content: String },

    /// Confirmation message (UPLOAD, DELETE)
    Message(String),

    /// Failure of any command, with a human-readable message
    Error(String),

    /// Counter snapshot (statistics query; plain-text wire form)
    Stats(StatsSnapshot),
}

impl Response {
    /// Create a listing response
    pub fn listing(filenames: Vec<String>) -> Self {
        Response::Listing(filenames)
    }

    /// Create a file-content response
    pub fn file(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Response::File {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Create a confirmation response
    pub fn message(text: impl Into<String>) -> Self {
        Response::Message(text.into())
    }

    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }

    /// Create a statistics response
    pub fn stats(snapshot: StatsSnapshot) -> Self {
        Response::Stats(snapshot)
    }

    /// Whether this response reports a failure
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    /// Short name of the response shape, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Listing(_) => "listing",
            Response::File { .. } => "file",
            Response::Message(_) => "message",
            Response::Error(_) => "error",
            Response::Stats(_) => "stats",
        }
    }
}

/// The JSON shapes a response frame can take.
///
/// GET replies carry their own field names; everything else is a `data`
/// field whose type depends on the command. Untagged so each serializes to
/// exactly its historical shape, with variants ordered so deserialization
/// tries the most specific shape first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireResponse {
    File {
        status: Status,
        data_namafile: String,
        data_file: String,
    },
    Listing {
        status: Status,
        data: Vec<String>,
    },
    Message {
        status: Status,
        data: String,
    },
}
