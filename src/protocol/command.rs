//! Command definitions
//!
//! Represents commands from clients, validated at decode time so the rest
//! of the server only ever sees well-formed requests.

use serde::{Deserialize, Serialize};

use crate::error::{DepotError, Result};

/// A parsed, validated command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List stored filenames
    List,

    /// Fetch a file by name
    Get { filename: String },

    /// Store a file (payload is base64 text, decoded by the dispatcher)
    Upload { filename: String, payload: String },

    /// Remove a file by name
    Delete { filename: String },

    /// Read the server's success/failure counters
    Stats,
}

/// The JSON shape of a request frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRequest {
    /// Command name (LIST, GET, UPLOAD, DELETE)
    pub command: String,

    /// Positional string arguments
    #[serde(default)]
    pub params: Vec<String>,
}

impl Command {
    /// Command name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Command::List => "LIST",
            Command::Get { .. } => "GET",
            Command::Upload { .. } => "UPLOAD",
            Command::Delete { .. } => "DELETE",
            Command::Stats => "STATS",
        }
    }

    /// JSON wire representation of this command, if it has one.
    ///
    /// STATS travels as a plain-text frame instead, so it returns `None`.
    pub fn into_wire(self) -> Option<WireRequest> {
        let (command, params) = match self {
            Command::List => ("LIST", vec![]),
            Command::Get { filename } => ("GET", vec![filename]),
            Command::Upload { filename, payload } => ("UPLOAD", vec![filename, payload]),
            Command::Delete { filename } => ("DELETE", vec![filename]),
            Command::Stats => return None,
        };
        Some(WireRequest {
            command: command.to_string(),
            params,
        })
    }
}

impl TryFrom<WireRequest> for Command {
    type Error = DepotError;

    /// Validate arity and emptiness per command. The messages are part of
    /// the wire contract and must not be reworded.
    fn try_from(wire: WireRequest) -> Result<Self> {
        let WireRequest {
            command,
            mut params,
        } = wire;

        match command.as_str() {
            "LIST" => {
                if !params.is_empty() {
                    return Err(DepotError::Protocol(
                        "LIST takes no parameters.".to_string(),
                    ));
                }
                Ok(Command::List)
            }
            "GET" => {
                let filename = take_filename(&mut params, "GET")?;
                Ok(Command::Get { filename })
            }
            "DELETE" => {
                let filename = take_filename(&mut params, "DELETE")?;
                Ok(Command::Delete { filename })
            }
            "UPLOAD" => match params.len() {
                0 | 1 => Err(DepotError::Protocol(
                    "Filename or filedata parameters missing.".to_string(),
                )),
                2 => {
                    let filename = params.remove(0);
                    let payload = params.remove(0);
                    if filename.is_empty() || payload.is_empty() {
                        return Err(DepotError::Protocol(
                            "Filename or file data cannot be empty.".to_string(),
                        ));
                    }
                    Ok(Command::Upload { filename, payload })
                }
                _ => Err(DepotError::Protocol(
                    "UPLOAD expects filename and filedata parameters.".to_string(),
                )),
            },
            other => Err(DepotError::Protocol(format!("Unknown command: {}", other))),
        }
    }
}

/// Pop the single filename argument for GET/DELETE
fn take_filename(params: &mut Vec<String>, name: &str) -> Result<String> {
    match params.len() {
        0 => Err(DepotError::Protocol(
            "Filename parameter missing.".to_string(),
        )),
        1 => {
            let filename = params.remove(0);
            if filename.is_empty() {
                return Err(DepotError::Protocol(
                    "Filename cannot be empty.".to_string(),
                ));
            }
            Ok(filename)
        }
        _ => Err(DepotError::Protocol(format!(
            "{} expects a single filename parameter.",
            name
        ))),
    }
}
