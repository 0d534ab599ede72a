//! # Depot
//!
//! A networked file-storage service:
//! - LIST / GET / UPLOAD / DELETE over a JSON wire protocol with CRLF framing
//! - Base64-encoded file payloads
//! - Bounded worker pool, one blocking session per connection
//! - Mutex-guarded server statistics with an out-of-band plain-text query
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TCP Listener                         │
//! │                  (accepts, never serves)                    │
//! └─────────────────────────────┬───────────────────────────────┘
//!                               │ one session per connection
//! ┌─────────────────────────────▼───────────────────────────────┐
//! │                         Worker Pool                         │
//! │              (shared-queue or rayon discipline)             │
//! └─────────────────────────────┬───────────────────────────────┘
//!                               │
//!                ┌──────────────┴──────────────┐
//!                │                             │
//!                ▼                             ▼
//!         ┌─────────────┐               ┌─────────────┐
//!         │   Session   │──────────────▶│ Dispatcher  │
//!         │(FrameBuffer │               │  (base64,   │
//!         │ reassembly) │               │  responses) │
//!         └──────┬──────┘               └──────┬──────┘
//!                │                             │
//!                ▼                             ▼
//!         ┌─────────────┐               ┌─────────────┐
//!         │ ServerStats │               │  FileStore  │
//!         │   (mutex)   │               │ (flat dir)  │
//!         └─────────────┘               └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod client;
pub mod dispatcher;
pub mod network;
pub mod protocol;
pub mod stats;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::DepotClient;
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{DepotError, Result};
pub use stats::{ServerStats, StatsSnapshot};
pub use storage::FileStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of depot
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
