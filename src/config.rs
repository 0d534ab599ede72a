//! Configuration for the depot server
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a depot server instance
#[derive(Debug, Clone)]
pub struct Config {
    // Storage Configuration
    /// Root directory for stored files (flat namespace, created on open)
    pub storage_dir: PathBuf,

    // Network Configuration
    /// TCP listen address (host:port)
    pub listen_addr: String,

    /// Number of worker threads serving connections
    pub worker_threads: u32,

    /// Per-connection read timeout in milliseconds (0 = block indefinitely)
    pub read_timeout_ms: u64,

    /// Per-connection write timeout in milliseconds (0 = block indefinitely)
    pub write_timeout_ms: u64,

    // Protocol Configuration
    /// Upper bound on a single request frame, in bytes
    pub max_frame_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./depot_files"),
            listen_addr: "127.0.0.1:6666".to_string(),
            worker_threads: 20,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            max_frame_bytes: 256 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Create a new configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for creating custom configurations
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the storage directory
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = dir.into();
        self
    }

    /// Set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, workers: u32) -> Self {
        self.config.worker_threads = workers;
        self
    }

    /// Set the read timeout in milliseconds (0 disables)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout in milliseconds (0 disables)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum request frame size in bytes
    pub fn max_frame_bytes(mut self, bytes: usize) -> Self {
        self.config.max_frame_bytes = bytes;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}
