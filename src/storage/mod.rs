//! Storage Module
//!
//! Flat file-backed storage keyed by filename.
//!
//! ## Responsibilities
//! - Map filename -> bytes under one root directory
//! - Reject names that could escape the root (the namespace is flat)
//! - Report not-found and I/O failures distinctly
//!
//! ## Layout
//! ```text
//! {storage_dir}/
//!   ├── report.pdf
//!   ├── photo.jpg
//!   └── ...            (one entry per stored file, no subdirectories)
//! ```

mod store;

pub use store::FileStore;
