//! Server statistics
//!
//! Process-wide counters for completed operations, shared by every session
//! and read by the out-of-band statistics query.

use parking_lot::Mutex;

/// Counter pair guarded by one mutex.
///
/// Both counters live under a single lock so a snapshot can never observe
/// a torn pair.
#[derive(Debug, Default)]
struct Counters {
    successful: u64,
    failed: u64,
}

/// Shared success/failure counters for one server process.
///
/// Created once at server start and handed to each session behind an `Arc`.
/// Every read-modify-write goes through the internal mutex, which is held
/// only for the increment or copy itself.
#[derive(Debug, Default)]
pub struct ServerStats {
    counters: Mutex<Counters>,
}

impl ServerStats {
    /// Create a fresh counter pair, both at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one successfully answered operation
    pub fn record_success(&self) {
        self.counters.lock().successful += 1;
    }

    /// Count one failed operation (error response or transport failure)
    pub fn record_failure(&self) {
        self.counters.lock().failed += 1;
    }

    /// Read both counters atomically
    pub fn snapshot(&self) -> StatsSnapshot {
        let counters = self.counters.lock();
        StatsSnapshot {
            successful: counters.successful,
            failed: counters.failed,
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Operations answered with an OK response
    pub successful: u64,

    /// Operations answered with an ERROR response or lost to the transport
    pub failed: u64,
}

// =============================================================================
// Tests
// =============================================================================
