use thiserror::Error;

use crate::entity::entity::EntityKind;
use crate::entity::pool::EntityRef;

/// Failures reported by the entity pools.
///
/// Both variants are recoverable: a failed spawn is dropped (and counted),
/// a stale release means the caller must re-resolve its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// No free slot left in the pool for this kind. Pools are fixed-capacity;
    /// the request is dropped, never queued.
    #[error("entity pool exhausted for kind {kind:?}")]
    PoolExhausted { kind: EntityKind },
    /// The referenced slot has been recycled since the reference was taken.
    #[error("stale entity reference {reference:?}")]
    StaleReference { reference: EntityRef },
}

/// Failures reported by the loop driver itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoopError {
    /// `start()` was called while another loop instance holds the
    /// process-wide slot.
    #[error("a simulation loop is already running")]
    AlreadyRunning,
}

/// An unexpected fault inside a simulation tick.
///
/// Contained at the loop boundary: the tick's partial mutations are
/// discarded and the loop resumes on the next tick.
#[derive(Debug, Clone, Error)]
pub enum TickError {
    /// A sub-system panicked mid-tick.
    #[error("tick panicked: {0}")]
    Panicked(String),
    /// Test-only fail point, used to exercise the rollback path.
    #[cfg(test)]
    #[error("injected fault")]
    Injected,
}
