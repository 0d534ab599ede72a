//! TCP Server
//!
//! Accepts connections and hands each one to the worker pool as a session.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::{DepotError, Result};
use crate::stats::ServerStats;
use crate::storage::FileStore;

use super::connection::Connection;
use super::pool::ThreadPool;

/// TCP server, generic over the worker-pool discipline
pub struct Server<P: ThreadPool> {
    /// Server configuration
    config: Config,

    /// Command executor shared with every session
    dispatcher: Arc<Dispatcher>,

    /// Process-wide operation counters
    stats: Arc<ServerStats>,

    /// Bound listener; accepting starts in `run`
    listener: TcpListener,

    /// Pool running one session per accepted connection
    pool: P,

    /// Set by a `ShutdownHandle` to stop the accept loop
    shutdown: Arc<AtomicBool>,
}

impl<P: ThreadPool> Server<P> {
    /// Bind a server: open the store, build the pool, bind the listener.
    ///
    /// Binding is separate from running so callers can learn the bound
    /// address first (port 0 picks a free port).
    pub fn bind(config: Config) -> Result<Self> {
        if config.worker_threads == 0 {
            return Err(DepotError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }

        let store = FileStore::open(config.storage_dir.clone())?;
        let stats = Arc::new(ServerStats::new());
        let dispatcher = Arc::new(Dispatcher::new(store, Arc::clone(&stats)));
        let listener = TcpListener::bind(&config.listen_addr)?;
        let pool = P::new(config.worker_threads)?;

        tracing::info!(
            "Listening on {} with {} workers",
            listener.local_addr()?,
            config.worker_threads
        );

        Ok(Self {
            config,
            dispatcher,
            stats,
            listener,
            pool,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Counters shared with the sessions
    pub fn stats(&self) -> Arc<ServerStats> {
        Arc::clone(&self.stats)
    }

    /// Handle for stopping the accept loop from another thread
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr: self.listener.local_addr()?,
        })
    }

    /// Accept connections until shutdown (blocking).
    ///
    /// Each accepted connection goes straight to the pool; the accept loop
    /// never waits on a session.
    pub fn run(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                tracing::info!("Shutdown requested, no longer accepting connections");
                break;
            }

            match stream {
                Ok(stream) => self.serve_connection(stream),
                Err(e) => tracing::error!("Failed to accept connection: {}", e),
            }
        }
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Hand one accepted connection to the pool
    fn serve_connection(&self, stream: TcpStream) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let stats = Arc::clone(&self.stats);
        let max_frame_bytes = self.config.max_frame_bytes;
        let read_timeout_ms = self.config.read_timeout_ms;
        let write_timeout_ms = self.config.write_timeout_ms;

        self.pool.spawn(move || {
            let mut connection = match Connection::new(stream, dispatcher, stats, max_frame_bytes)
            {
                Ok(connection) => connection,
                Err(e) => {
                    tracing::error!("Failed to set up connection: {}", e);
                    return;
                }
            };

            if let Err(e) = connection.set_timeouts(read_timeout_ms, write_timeout_ms) {
                tracing::error!(
                    "Failed to configure timeouts for {}: {}",
                    connection.peer_addr(),
                    e
                );
                return;
            }

            if let Err(e) = connection.handle() {
                tracing::warn!(
                    "Session for {} ended with error: {}",
                    connection.peer_addr(),
                    e
                );
            }
        });
    }
}

/// Stops a running server's accept loop.
///
/// Cloneable and independent of the server's lifetime. The final
/// self-connect wakes a listener that is parked in `accept`.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Request shutdown; sessions already running finish on their workers
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
        // Wake the accept loop so it observes the flag
        let _ = TcpStream::connect(self.addr);
    }
}
