//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Wire Format (JSON + CRLF framing)
//!
//! Every frame is UTF-8 text followed by the 4-byte terminator `\r\n\r\n`.
//!
//! ### Request Format
//! ```text
//! {"command": "<NAME>", "params": ["<arg>", ...]}\r\n\r\n
//! ```
//!
//! ### Commands
//! - LIST       params: []
//! - GET        params: [filename]
//! - UPLOAD     params: [filename, base64 file data]
//! - DELETE     params: [filename]
//!
//! ### Response Format
//! ```text
//! {"status": "OK", "data": [...filenames...]}                         (LIST)
//! {"status": "OK", "data_namafile": "f", "data_file": "<base64>"}     (GET)
//! {"status": "OK", "data": "f uploaded"}                              (UPLOAD)
//! {"status": "OK", "data": "f deleted"}                               (DELETE)
//! {"status": "ERROR", "data": "<message>"}                            (any failure)
//! ```
//!
//! ### Statistics Query (out of band)
//! The plain-text frame `GET_SERVER_STATS\r\n\r\n` is answered with
//! `SERVER_STATS_SUCCESS:<n>\r\nSERVER_STATS_FAILED:<n>\r\n\r\n`, after
//! which the server closes the connection.

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, decode_stats_response, encode_command, encode_response,
    FrameBuffer, FRAME_TERMINATOR, STATS_REQUEST,
};
pub use command::{Command, WireRequest};
pub use response::{Response, Status, WireResponse};
