/// Monotonic health counters for one simulation session.
///
/// Every degradation path in the core (dropped ticks, dropped sounds,
/// skipped spawns, input overflow, faulted ticks) increments a counter
/// instead of failing loudly; this is the observable record of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimMetrics {
    /// Fixed ticks actually run.
    pub ticks_run: u64,
    /// Ticks owed but dropped by the per-step cap.
    pub ticks_dropped: u64,
    /// Ticks discarded after an unexpected fault.
    pub tick_faults: u64,
    /// Raw input events lost to ring-buffer overflow.
    pub input_overflow: u64,
    /// Audio requests dropped with no claimable voice.
    pub sounds_dropped: u64,
    /// Pattern or fire attempts blocked by caps or pool exhaustion.
    pub spawns_skipped: u64,
}
