//! Subsystem identities and the lifecycle journal
//!
//! The journal is how the composition root makes its ordering contract
//! observable: every subsystem records its construction and its drop, and the
//! aggregate records the moment it is published.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Subsystems owned by the composition root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    /// Chain state
    Blockchain,
    /// Transaction pool
    TxPool,
    /// Masternode registry
    MasternodeList,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subsystem::Blockchain => write!(f, "blockchain"),
            Subsystem::TxPool => write!(f, "tx pool"),
            Subsystem::MasternodeList => write!(f, "masternode list"),
        }
    }
}

/// Lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Subsystem constructor finished
    Constructed {
        /// Which subsystem
        subsystem: Subsystem,
        /// Whether its sibling handle could be resolved at that point
        siblings_reachable: bool,
    },
    /// Aggregate handed out to callers
    Published,
    /// Subsystem dropped
    Dropped(Subsystem),
}

/// Shared, append-only record of lifecycle events
///
/// Cloning shares the same underlying log.
#[derive(Debug, Clone, Default)]
pub struct LifecycleJournal {
    events: Arc<Mutex<Vec<LifecycleEvent>>>,
}

impl LifecycleJournal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&self, event: LifecycleEvent) {
        self.events.lock().push(event);
    }

    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().clone()
    }

    /// Subsystems in the order they were constructed
    pub fn construction_order(&self) -> Vec<Subsystem> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                LifecycleEvent::Constructed { subsystem, .. } => Some(*subsystem),
                _ => None,
            })
            .collect()
    }

    /// Subsystems in the order they were dropped
    pub fn teardown_order(&self) -> Vec<Subsystem> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                LifecycleEvent::Dropped(subsystem) => Some(*subsystem),
                _ => None,
            })
            .collect()
    }
}
