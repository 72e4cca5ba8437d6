//! Clock pacing for continuous runs.
//!
//! Pacing is checked once per batch of instructions. At each batch boundary
//! the run loop spins until `PACING_BATCH * period` has elapsed since the
//! previous boundary, so the average instruction rate tracks the configured
//! clock while individual instructions run at host speed.

use std::time::{Duration, Instant};

/// Number of instructions between pacing checkpoints.
pub const PACING_BATCH: u64 = 1_000;

/// Converts a clock frequency into a per-instruction period.
///
/// Returns [`Duration::ZERO`] for `0 Hz`, which means unpaced.
#[must_use]
pub fn period_from_hz(clock_hz: u64) -> Duration {
    if clock_hz == 0 {
        Duration::ZERO
    } else {
        Duration::from_nanos(1_000_000_000 / clock_hz)
    }
}

/// Batch-granular busy-wait pacer.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    checkpoint: Instant,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer {
    /// Starts a pacer with its checkpoint at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            checkpoint: Instant::now(),
        }
    }

    /// Returns `true` when `instruction_count` sits on a batch boundary.
    #[must_use]
    pub const fn is_checkpoint(instruction_count: u64) -> bool {
        instruction_count % PACING_BATCH == 0
    }

    /// Time one batch should take at `period` per instruction.
    #[must_use]
    pub fn batch_budget(period: Duration) -> Duration {
        period.saturating_mul(u32::try_from(PACING_BATCH).unwrap_or(u32::MAX))
    }

    /// Spins until the batch budget has elapsed since the last checkpoint,
    /// then moves the checkpoint to now.
    ///
    /// `period` is re-read while spinning so a clock change takes effect
    /// mid-wait; a zero period only refreshes the checkpoint. `keep_waiting`
    /// is polled too, so a cancelled run is not held up by pacing.
    pub fn wait_for_batch(
        &mut self,
        period: impl Fn() -> Duration,
        keep_waiting: impl Fn() -> bool,
    ) {
        while self.checkpoint.elapsed() < Self::batch_budget(period()) && keep_waiting() {
            std::hint::spin_loop();
        }
        self.checkpoint = Instant::now();
    }
}
