//! Public host-facing API contracts for embedding the emulator core.

use std::time::Duration;

use crate::memory::{
    decode_code_image, new_address_space, read_word, validate_data_address, write_word,
    ImageError, ADDRESS_SPACE_WORDS,
};
use crate::timing::period_from_hz;
use crate::{ArchitecturalState, FaultCode, RunState};

/// Conventional value the input hook returns when no key is available.
pub const NO_KEY: u8 = 255;

/// Top-level configuration for a core instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Target average instruction rate for continuous runs; `0` runs unpaced.
    pub clock_hz: u64,
    /// Enables trace callback dispatch.
    pub tracing_enabled: bool,
}

impl CoreConfig {
    /// Average period between instructions implied by `clock_hz`.
    ///
    /// Returns [`Duration::ZERO`] for an unpaced configuration.
    #[must_use]
    pub fn instruction_period(&self) -> Duration {
        period_from_hz(self.clock_hz)
    }
}

/// Complete host-visible machine state.
///
/// The state is exclusively owned by the embedder. Nothing in the core
/// synchronizes access to it; callers running a continuous loop on another
/// thread must serialize edits themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// Register file: `R0..R7`, `PC`, `SP`, `FR`.
    pub arch: ArchitecturalState,
    /// Live unified code/data/stack memory.
    pub memory: Box<[u16]>,
    /// Last loaded program image, restored into `memory` on reset.
    baseline: Box<[u16]>,
    /// Instructions retired since the core was created.
    pub instruction_count: u64,
    /// Current execution state.
    pub run_state: RunState,
    /// Program counter at which the latched fault was observed.
    pub last_fault_pc: Option<u16>,
}

impl Default for CoreState {
    fn default() -> Self {
        Self {
            arch: ArchitecturalState::default(),
            memory: new_address_space(),
            baseline: new_address_space(),
            instruction_count: 0,
            run_state: RunState::Idle,
            last_fault_pc: None,
        }
    }
}

impl CoreState {
    /// Creates a core whose baseline image holds `words` starting at address 0.
    ///
    /// Words beyond the address space are ignored.
    #[must_use]
    pub fn with_program(words: &[u16]) -> Self {
        let mut state = Self::default();
        state.load_program_words(words);
        state
    }

    /// Replaces the baseline with `words` at address 0 (rest zeroed) and resets.
    pub fn load_program_words(&mut self, words: &[u16]) {
        let len = words.len().min(ADDRESS_SPACE_WORDS);
        self.baseline.fill(0);
        self.baseline[..len].copy_from_slice(&words[..len]);
        self.reset_canonical();
    }

    /// Replaces the baseline with a full big-endian image and resets.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] when `bytes` is not exactly 65536 bytes long;
    /// the current state is left untouched.
    pub fn load_program_image(&mut self, bytes: &[u8]) -> Result<(), ImageError> {
        self.baseline = decode_code_image(bytes)?;
        self.reset_canonical();
        Ok(())
    }

    /// Read-only view of the baseline image.
    #[must_use]
    pub fn baseline(&self) -> &[u16] {
        &self.baseline
    }

    /// Applies reset semantics.
    ///
    /// Live memory is restored from the baseline, registers and flags are
    /// zeroed, `PC` returns to 0 and `SP` to the top of the stack. The
    /// instruction counter keeps counting across resets.
    pub fn reset_canonical(&mut self) {
        self.memory.copy_from_slice(&self.baseline);
        self.arch = ArchitecturalState::default();
        self.run_state = RunState::Idle;
        self.last_fault_pc = None;
    }

    /// Reads a live memory word for inspection tools.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::InvalidAddress`] when `addr` is outside memory.
    pub fn read_word(&self, addr: u16) -> Result<u16, FaultCode> {
        read_word(&self.memory, addr)
    }

    /// Writes a live memory word from an editing tool.
    ///
    /// The reserved last word is refused like any guest store would be.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::InvalidAddress`] when `addr` is at or past the
    /// reserved last word.
    pub fn write_word(&mut self, addr: u16, value: u16) -> Result<(), FaultCode> {
        validate_data_address(addr)?;
        write_word(&mut self.memory, addr, value)
    }
}

/// I/O hook failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoError {
    /// The input device could not be read.
    InputFailed,
    /// The output device could not be written.
    OutputFailed,
    /// The output hook refused the character or screen position.
    Rejected,
}

impl IoError {
    /// Maps a hook failure to the canonical fault code surface.
    #[must_use]
    pub const fn fault_code(self) -> FaultCode {
        match self {
            Self::InputFailed => FaultCode::InputHookFailed,
            Self::OutputFailed | Self::Rejected => FaultCode::OutputHookFailed,
        }
    }
}

/// Environment hooks consumed by `inchar` and `outchar`.
pub trait IoHooks {
    /// Polls for a key without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`] when the input device fails. An empty input is
    /// not an error: return [`NO_KEY`].
    fn input(&mut self) -> Result<u8, IoError>;

    /// Draws `character` at screen `position`.
    ///
    /// The core does not validate either value; printable ranges and screen
    /// bounds are the hook's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`] when the character or position is refused or the
    /// device fails.
    fn output(&mut self, character: u16, position: u16) -> Result<(), IoError>;
}

/// Hooks that report no input and discard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIo;

impl IoHooks for NullIo {
    fn input(&mut self) -> Result<u8, IoError> {
        Ok(NO_KEY)
    }

    fn output(&mut self, _character: u16, _position: u16) -> Result<(), IoError> {
        Ok(())
    }
}

/// Adapter building [`IoHooks`] from a pair of closures.
pub struct HookFns<I, O> {
    input: I,
    output: O,
}

impl<I, O> HookFns<I, O>
where
    I: FnMut() -> Result<u8, IoError>,
    O: FnMut(u16, u16) -> Result<(), IoError>,
{
    /// Wraps an input poller and an output writer.
    pub const fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}

impl<I, O> IoHooks for HookFns<I, O>
where
    I: FnMut() -> Result<u8, IoError>,
    O: FnMut(u16, u16) -> Result<(), IoError>,
{
    fn input(&mut self) -> Result<u8, IoError> {
        (self.input)()
    }

    fn output(&mut self, character: u16, position: u16) -> Result<(), IoError> {
        (self.output)(character, position)
    }
}

/// Why execution stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StopReason {
    /// `halt` retired; `PC` still addresses the halt word.
    Halt,
    /// `breakp` retired; `PC` addresses the following instruction.
    Breakpoint,
}

/// Outcome of one instruction retirement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction retired; execution may continue.
    Continue,
    /// Instruction retired and requested a stop.
    Stop(StopReason),
    /// Step faulted.
    Fault(FaultCode),
}

impl StepOutcome {
    /// Returns `true` when a continuous run must end after this outcome.
    #[must_use]
    pub const fn ends_run(self) -> bool {
        !matches!(self, Self::Continue)
    }

    /// Returns the fault carried by this outcome, if any.
    #[must_use]
    pub const fn fault(self) -> Option<FaultCode> {
        match self {
            Self::Fault(cause) => Some(cause),
            Self::Continue | Self::Stop(_) => None,
        }
    }
}

/// Aggregated outcome from a continuous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of steps attempted during this run call.
    pub steps: u64,
    /// Last step-level status observed; `Continue` when cancelled externally.
    pub final_step: StepOutcome,
    /// Wall-clock time spent in the run loop.
    pub elapsed: Duration,
}

impl RunOutcome {
    /// Measured average instruction rate for a clock display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn instructions_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.steps as f64 / secs
        } else {
            0.0
        }
    }
}

/// Trace events emitted at step boundaries when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Instruction fetched and about to execute.
    InstructionStart {
        /// Program counter used for this fetch.
        pc: u16,
        /// Raw instruction word.
        word: u16,
    },
    /// Instruction retired.
    InstructionRetired {
        /// Program counter of the retired instruction.
        pc: u16,
        /// Instruction counter after retirement.
        count: u64,
    },
    /// Memory write committed by a store, push, or call.
    MemoryWrite {
        /// Target address.
        addr: u16,
        /// Value written.
        value: u16,
    },
    /// Halt or breakpoint retired.
    Stopped {
        /// Stop cause.
        reason: StopReason,
        /// Program counter of the stopping instruction.
        pc: u16,
    },
    /// Fault raised.
    FaultRaised {
        /// Raised fault code.
        cause: FaultCode,
        /// Program counter active when the fault was observed.
        pc: u16,
    },
}

/// Sink trait for trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        CoreConfig, CoreState, HookFns, IoError, IoHooks, NullIo, RunOutcome, StepOutcome,
        StopReason, NO_KEY,
    };
    use crate::memory::CODE_IMAGE_BYTES;
    use crate::{
        ArchitecturalState, FaultCode, GeneralRegister, ImageError, RunState,
        INITIAL_STACK_POINTER,
    };

    #[test]
    fn default_core_config_is_unpaced_without_tracing() {
        let config = CoreConfig::default();
        assert_eq!(config.clock_hz, 0);
        assert!(!config.tracing_enabled);
        assert_eq!(config.instruction_period(), Duration::ZERO);
    }

    #[test]
    fn clock_rate_maps_to_instruction_period() {
        let config = CoreConfig {
            clock_hz: 1_000_000,
            ..CoreConfig::default()
        };
        assert_eq!(config.instruction_period(), Duration::from_micros(1));
    }

    #[test]
    fn core_state_default_allocates_full_address_space() {
        let state = CoreState::default();
        assert_eq!(state.memory.len(), 1 << 15);
        assert_eq!(state.baseline().len(), 1 << 15);
        assert_eq!(state.arch.sp(), INITIAL_STACK_POINTER);
        assert_eq!(state.run_state, RunState::Idle);
    }

    #[test]
    fn canonical_reset_restores_baseline_and_register_defaults() {
        let mut state = CoreState::with_program(&[0xE000, 0x0005]);
        state.arch.set_gpr(GeneralRegister::R0, 0x1234);
        state.arch.set_pc(0x0456);
        state.arch.set_sp(0x0100);
        state.arch.set_flags(u16::MAX);
        state.memory[0] = 0xFFFF;
        state.memory[0x2000] = 0xAAAA;
        state.run_state = RunState::Faulted(FaultCode::UnknownOpcode);
        state.instruction_count = 17;

        state.reset_canonical();

        assert_eq!(state.arch, ArchitecturalState::default());
        assert_eq!(state.memory[0], 0xE000);
        assert_eq!(state.memory[1], 0x0005);
        assert_eq!(state.memory[0x2000], 0);
        assert_eq!(state.run_state, RunState::Idle);
        assert_eq!(state.instruction_count, 17);
    }

    #[test]
    fn image_loading_rejects_wrong_size_without_side_effects() {
        let mut state = CoreState::with_program(&[0x3C00]);
        let err = state.load_program_image(&[0; 10]).unwrap_err();
        assert_eq!(
            err,
            ImageError::WrongLength {
                expected: CODE_IMAGE_BYTES,
                actual: 10
            }
        );
        assert_eq!(state.baseline()[0], 0x3C00);
    }

    #[test]
    fn image_loading_replaces_baseline_and_live_memory() {
        let mut bytes = vec![0u8; CODE_IMAGE_BYTES];
        bytes[0] = 0x3C;
        bytes[3] = 0x07;
        let mut state = CoreState::default();
        state.load_program_image(&bytes).expect("exact image");

        assert_eq!(state.memory[0], 0x3C00);
        assert_eq!(state.memory[1], 0x0007);
        assert_eq!(state.baseline()[1], 0x0007);
    }

    #[test]
    fn inspection_writes_refuse_the_reserved_word() {
        let mut state = CoreState::default();
        assert_eq!(state.write_word(0x7FFE, 9), Ok(()));
        assert_eq!(state.read_word(0x7FFE), Ok(9));
        assert_eq!(state.write_word(0x7FFF, 9), Err(FaultCode::InvalidAddress));
        assert_eq!(state.read_word(0x8000), Err(FaultCode::InvalidAddress));
    }

    #[test]
    fn io_errors_map_to_hook_faults() {
        assert_eq!(IoError::InputFailed.fault_code(), FaultCode::InputHookFailed);
        assert_eq!(IoError::OutputFailed.fault_code(), FaultCode::OutputHookFailed);
        assert_eq!(IoError::Rejected.fault_code(), FaultCode::OutputHookFailed);
    }

    #[test]
    fn null_io_reports_no_key() {
        let mut io = NullIo;
        assert_eq!(io.input(), Ok(NO_KEY));
        assert_eq!(io.output(b'A'.into(), 0), Ok(()));
    }

    #[test]
    fn closure_hooks_forward_calls() {
        let mut written = Vec::new();
        {
            let mut io = HookFns::new(
                || Ok(b'x'),
                |character, position| {
                    written.push((character, position));
                    Ok(())
                },
            );
            assert_eq!(io.input(), Ok(b'x'));
            assert_eq!(io.output(65, 40), Ok(()));
        }
        assert_eq!(written, vec![(65, 40)]);
    }

    #[test]
    fn only_continue_keeps_a_run_going() {
        assert!(!StepOutcome::Continue.ends_run());
        assert!(StepOutcome::Stop(StopReason::Halt).ends_run());
        assert!(StepOutcome::Fault(FaultCode::PcOutOfRange).ends_run());
        assert_eq!(
            StepOutcome::Fault(FaultCode::PcOutOfRange).fault(),
            Some(FaultCode::PcOutOfRange)
        );
    }

    #[test]
    fn run_outcome_rate_handles_zero_elapsed() {
        let outcome = RunOutcome {
            steps: 2_000,
            final_step: StepOutcome::Stop(StopReason::Halt),
            elapsed: Duration::from_millis(500),
        };
        assert!((outcome.instructions_per_second() - 4_000.0).abs() < f64::EPSILON);

        let instant = RunOutcome {
            elapsed: Duration::ZERO,
            ..outcome
        };
        assert!(instant.instructions_per_second().abs() < f64::EPSILON);
    }
}
