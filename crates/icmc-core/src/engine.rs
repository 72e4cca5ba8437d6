//! Continuous execution, cooperative cancellation, and the processor facade.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::disasm::{disassemble_window, mnemonic_at, DisassemblyRow, DisassemblyView};
use crate::execute::step_one_traced;
use crate::timing::{period_from_hz, Pacer};
use crate::{
    CoreConfig, CoreState, IoHooks, NullTrace, RunOutcome, RunState, StepOutcome, TraceEvent,
    TraceSink,
};

const IDLE: u8 = 0;
const ARMED: u8 = 1;
const CANCELLED: u8 = 2;

/// Shareable handle controlling a continuous run.
///
/// Clones share the same atomics, so a handle kept by a UI thread can stop a
/// run or retune its clock while another thread owns the core.
///
/// A control is idle, armed, or cancelled. [`run_until_halt`] arms an idle
/// control itself, but a [`stop`](Self::stop) only applies once the control
/// is armed. To cancel reliably from another thread, call
/// [`arm`](Self::arm) before handing the core over; a stop issued after that
/// ends the run even if the loop has not started yet.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    phase: Arc<AtomicU8>,
    period_nanos: Arc<AtomicU64>,
}

impl RunControl {
    /// Creates an idle control with the given per-instruction period.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        let control = Self::default();
        control.set_instruction_period(period);
        control
    }

    /// Creates a control paced at `clock_hz` (`0` for unpaced).
    #[must_use]
    pub fn with_clock_hz(clock_hz: u64) -> Self {
        Self::new(period_from_hz(clock_hz))
    }

    /// Marks a run as pending so that a later [`stop`](Self::stop) is kept
    /// even if it lands before the run loop starts.
    pub fn arm(&self) {
        self.phase.store(ARMED, Ordering::Release);
    }

    /// Requests the armed or active run to stop after the current
    /// instruction. Has no effect on an idle control.
    pub fn stop(&self) {
        let _ = self
            .phase
            .compare_exchange(ARMED, CANCELLED, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Returns `true` while a run is armed or in progress and not cancelled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase.load(Ordering::Acquire) == ARMED
    }

    /// Arms an idle control; returns `false` when a stop is already pending.
    fn start(&self) -> bool {
        match self
            .phase
            .compare_exchange(IDLE, ARMED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(phase) => phase == ARMED,
        }
    }

    fn finish(&self) {
        self.phase.store(IDLE, Ordering::Release);
    }

    /// Changes the average period between instructions.
    ///
    /// Takes effect at the next pacing checkpoint.
    pub fn set_instruction_period(&self, period: Duration) {
        let nanos = u64::try_from(period.as_nanos()).unwrap_or(u64::MAX);
        self.period_nanos.store(nanos, Ordering::Relaxed);
    }

    /// Changes the target clock rate; `0` disables pacing.
    pub fn set_clock_hz(&self, clock_hz: u64) {
        self.set_instruction_period(period_from_hz(clock_hz));
    }

    /// Current per-instruction period.
    #[must_use]
    pub fn instruction_period(&self) -> Duration {
        Duration::from_nanos(self.period_nanos.load(Ordering::Relaxed))
    }
}

/// Steps until `halt`, `breakp`, a fault, or cancellation through `control`.
///
/// Sets the run state to [`RunState::Running`] for the duration of the loop;
/// on return it is `Halted`, `Faulted`, or `Idle` after a cancellation. A
/// stop issued on an armed control before the call returns immediately with
/// no steps. The control is left idle in every case.
pub fn run_until_halt(
    state: &mut CoreState,
    io: &mut dyn IoHooks,
    control: &RunControl,
    trace: &mut dyn TraceSink,
) -> RunOutcome {
    let started = Instant::now();
    let mut pacer = Pacer::new();
    let mut steps = 0;
    let mut final_step = StepOutcome::Continue;

    if !control.start() {
        control.finish();
        return RunOutcome {
            steps,
            final_step,
            elapsed: started.elapsed(),
        };
    }
    state.run_state = RunState::Running;

    while control.is_running() {
        final_step = step_one_traced(state, io, trace);
        steps += 1;
        if final_step.ends_run() {
            break;
        }

        if Pacer::is_checkpoint(state.instruction_count) {
            pacer.wait_for_batch(|| control.instruction_period(), || control.is_running());
        }
    }

    control.finish();
    if state.run_state == RunState::Running {
        state.run_state = RunState::Idle;
    }

    RunOutcome {
        steps,
        final_step,
        elapsed: started.elapsed(),
    }
}

/// Processor facade owning the machine state, the I/O hooks, and a run
/// control.
#[derive(Debug)]
pub struct Processor<H> {
    state: CoreState,
    hooks: H,
    config: CoreConfig,
    control: RunControl,
    trace: Vec<TraceEvent>,
}

impl<H: IoHooks> Processor<H> {
    /// Creates a processor with empty memory.
    #[must_use]
    pub fn new(hooks: H, config: CoreConfig) -> Self {
        let control = RunControl::with_clock_hz(config.clock_hz);
        Self {
            state: CoreState::default(),
            hooks,
            config,
            control,
            trace: Vec::new(),
        }
    }

    /// Creates a processor whose baseline holds `words` from address 0.
    #[must_use]
    pub fn with_program(hooks: H, config: CoreConfig, words: &[u16]) -> Self {
        let mut processor = Self::new(hooks, config);
        processor.state.load_program_words(words);
        processor
    }

    /// Machine state.
    #[must_use]
    pub const fn state(&self) -> &CoreState {
        &self.state
    }

    /// Mutable machine state, for loaders and memory editors.
    pub const fn state_mut(&mut self) -> &mut CoreState {
        &mut self.state
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// The I/O hooks.
    pub const fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// A clone of the run control, usable from another thread.
    #[must_use]
    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    /// Updates the clock rate for this and later runs.
    pub fn set_clock_hz(&mut self, clock_hz: u64) {
        self.config.clock_hz = clock_hz;
        self.control.set_clock_hz(clock_hz);
    }

    /// Executes exactly one instruction.
    pub fn step(&mut self) -> StepOutcome {
        if self.config.tracing_enabled {
            step_one_traced(&mut self.state, &mut self.hooks, &mut self.trace)
        } else {
            step_one_traced(&mut self.state, &mut self.hooks, &mut NullTrace)
        }
    }

    /// Runs until a stop, a fault, or [`RunControl::stop`].
    pub fn run_until_halt(&mut self) -> RunOutcome {
        if self.config.tracing_enabled {
            run_until_halt(
                &mut self.state,
                &mut self.hooks,
                &self.control,
                &mut self.trace,
            )
        } else {
            run_until_halt(
                &mut self.state,
                &mut self.hooks,
                &self.control,
                &mut NullTrace,
            )
        }
    }

    /// Restores memory from the baseline and resets registers.
    pub fn reset(&mut self) {
        self.state.reset_canonical();
    }

    /// Drains the trace events recorded since the last call.
    pub fn take_trace(&mut self) -> Vec<TraceEvent> {
        std::mem::take(&mut self.trace)
    }

    /// Text for the word at `loc` (see [`mnemonic_at`]).
    #[must_use]
    pub fn mnemonic_at(&self, loc: u16, view: DisassemblyView) -> Option<String> {
        mnemonic_at(&self.state.memory, loc, view)
    }

    /// Listing rows around `center` (see [`disassemble_window`]).
    #[must_use]
    pub fn disassemble_window(
        &self,
        center: u16,
        before: u16,
        after: u16,
        view: DisassemblyView,
    ) -> Vec<DisassemblyRow> {
        disassemble_window(&self.state.memory, center, before, after, view)
    }
}
