//! Network Module
//!
//! TCP server and connection handling.
//!
//! ## Architecture
//! - Single acceptor thread, never serves a session itself
//! - Worker pool running one session per accepted connection
//! - Two interchangeable pool disciplines behind one trait
//! - Commands routed through the shared `Dispatcher`

mod connection;
mod pool;
mod server;

pub use connection::Connection;
pub use pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};
pub use server::{Server, ShutdownHandle};
