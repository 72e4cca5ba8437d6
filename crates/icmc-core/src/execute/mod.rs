//! Instruction execution pipeline for the ICMC ISA.
//!
//! Each execution routine reads the current state, checks its preconditions,
//! and stages its side effects in an [`ExecuteState`]:
//! 1. Read source registers and operand words
//! 2. Validate stack pointer / addresses / condition code
//! 3. Stage the memory write, destination register, `SP`, and FR update
//! 4. Choose the next `PC`
//!
//! Staged effects are committed only when the routine succeeds, so a faulting
//! instruction changes nothing except the forward `PC` advance applied by
//! [`step_one`]. A staged `PC` or `SP` past the address space is itself a
//! fault, so both registers stay within `0..=0x7FFF`.

mod alu;
mod condition;
mod control;
mod flags;
mod memory_ops;
mod special;

pub use condition::Condition;
pub use flags::{FlagsUpdate, DIVIDE_BY_ZERO};

use crate::encoding::Opcode;
use crate::memory::{
    read_word, validate_fetch_address, validate_pc_register, validate_sp_register,
    LAST_VALID_ADDRESS,
};
use crate::{
    CoreState, DecodedInstruction, Decoder, FaultCode, GeneralRegister, IoHooks, NullTrace,
    RunState, StepOutcome, StopReason, TraceEvent, TraceSink,
};

/// Side effects staged by one instruction, applied by [`commit_execution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteState {
    /// Destination register and the value to write to it.
    pub dest: Option<(GeneralRegister, u16)>,
    /// New `SP` value.
    pub sp: Option<u16>,
    /// Memory write as `(address, value)`.
    pub memory_write: Option<(u16, u16)>,
    /// FR update to apply.
    pub flags_update: FlagsUpdate,
    /// `PC` after commit.
    pub next_pc: u16,
    /// Stop request raised by `halt`/`breakp`.
    pub stop: Option<StopReason>,
}

impl ExecuteState {
    /// Creates an execute state whose next `PC` falls through the instruction.
    #[must_use]
    pub const fn new(pc: u16, instr: DecodedInstruction) -> Self {
        Self {
            dest: None,
            sp: None,
            memory_write: None,
            flags_update: FlagsUpdate::None,
            next_pc: pc.wrapping_add(instr.word_size()),
            stop: None,
        }
    }
}

/// Executes a single decoded instruction against the current state.
///
/// Returns the staged side effects on success. On fault nothing is staged;
/// the caller must not apply any side effect of the instruction.
///
/// # Errors
///
/// Returns the [`FaultCode`] raised by the instruction's precondition checks
/// or by an I/O hook.
pub fn execute_instruction(
    instr: DecodedInstruction,
    state: &CoreState,
    io: &mut dyn IoHooks,
) -> Result<ExecuteState, FaultCode> {
    let pc = state.arch.pc();
    let mut exec = ExecuteState::new(pc, instr);

    match instr.opcode {
        Opcode::Add => alu::execute_binary(instr, state, &mut exec, u32::wrapping_add),
        Opcode::Sub => alu::execute_binary(instr, state, &mut exec, u32::wrapping_sub),
        Opcode::Mult => alu::execute_binary(instr, state, &mut exec, u32::wrapping_mul),
        Opcode::And => alu::execute_binary(instr, state, &mut exec, |a, b| a & b),
        Opcode::Or => alu::execute_binary(instr, state, &mut exec, |a, b| a | b),
        Opcode::Xor => alu::execute_binary(instr, state, &mut exec, |a, b| a ^ b),
        Opcode::Div => alu::execute_division(instr, state, &mut exec, |a, b| a / b),
        Opcode::Mod => alu::execute_division(instr, state, &mut exec, |a, b| a % b),
        Opcode::Not => alu::execute_not(instr, state, &mut exec),
        Opcode::IncDec => alu::execute_inc_dec(instr, state, &mut exec),
        Opcode::RotateShift => alu::execute_rotate_shift(instr, state, &mut exec),
        Opcode::Mov => alu::execute_mov(instr, state, &mut exec),
        Opcode::Cmp => alu::execute_cmp(instr, state, &mut exec),
        Opcode::Jmp => control::execute_jmp(instr, state, &mut exec)?,
        Opcode::Call => control::execute_call(instr, state, &mut exec)?,
        Opcode::Rts => control::execute_rts(state, &mut exec)?,
        Opcode::Push => memory_ops::execute_push(instr, state, &mut exec)?,
        Opcode::Pop => memory_ops::execute_pop(instr, state, &mut exec)?,
        Opcode::Loadn => memory_ops::execute_loadn(instr, state, &mut exec)?,
        Opcode::Load => memory_ops::execute_load(instr, state, &mut exec)?,
        Opcode::Store => memory_ops::execute_store(instr, state, &mut exec)?,
        Opcode::Loadi => memory_ops::execute_loadi(instr, state, &mut exec)?,
        Opcode::Storei => memory_ops::execute_storei(instr, state, &mut exec)?,
        Opcode::Nop => {}
        Opcode::Halt => special::execute_halt(pc, &mut exec),
        Opcode::Breakpoint => special::execute_breakpoint(&mut exec),
        Opcode::CarryControl => special::execute_carry_control(instr, &mut exec),
        Opcode::Inchar => special::execute_inchar(instr, io, &mut exec)?,
        Opcode::Outchar => special::execute_outchar(instr, state, io)?,
    }

    validate_pc_register(exec.next_pc)?;
    if let Some(sp) = exec.sp {
        validate_sp_register(sp)?;
    }
    Ok(exec)
}

/// Applies the staged side effects from execution to the core state.
pub fn commit_execution(state: &mut CoreState, exec: &ExecuteState, trace: &mut dyn TraceSink) {
    if let Some((addr, value)) = exec.memory_write {
        if let Some(slot) = state.memory.get_mut(usize::from(addr)) {
            *slot = value;
            trace.on_event(TraceEvent::MemoryWrite { addr, value });
        }
    }

    if let Some((reg, value)) = exec.dest {
        state.arch.set_gpr(reg, value);
    }

    if let Some(sp) = exec.sp {
        state.arch.set_sp(sp);
    }

    let flags = exec.flags_update.apply(state.arch.flags());
    state.arch.set_flags(flags);

    state.arch.set_pc(exec.next_pc);
}

/// Reads the word at `PC + 1` of a two-word instruction.
pub(crate) fn operand_word(state: &CoreState) -> Result<u16, FaultCode> {
    let pc = state.arch.pc();
    validate_fetch_address(pc)?;
    read_word(&state.memory, pc + 1)
}

fn fetch_and_decode(state: &CoreState) -> Result<DecodedInstruction, FaultCode> {
    let pc = state.arch.pc();
    validate_fetch_address(pc)?;
    let word = read_word(&state.memory, pc).map_err(|_| FaultCode::PcOutOfRange)?;
    Decoder::decode(word).into()
}

/// Executes one instruction at `PC` without tracing.
pub fn step_one(state: &mut CoreState, io: &mut dyn IoHooks) -> StepOutcome {
    step_one_traced(state, io, &mut NullTrace)
}

/// Executes one instruction at `PC`, reporting trace events to `trace`.
///
/// - `PC` at or past the last valid address faults with nothing changed.
/// - An unknown opcode advances `PC` by one word and faults, so repeated
///   steps always make progress.
/// - Otherwise the instruction executes; `PC` advances by its word size (or
///   to the jump target), and the instruction counter increments, even when
///   the instruction faults. A faulting instruction stages no other effect,
///   and its forward advance stops at the last valid address.
/// - `halt` leaves `PC` on itself; `breakp` advances past itself.
pub fn step_one_traced(
    state: &mut CoreState,
    io: &mut dyn IoHooks,
    trace: &mut dyn TraceSink,
) -> StepOutcome {
    let pc = state.arch.pc();

    let outcome = match fetch_and_decode(state) {
        Err(cause) => {
            if cause == FaultCode::UnknownOpcode {
                state.arch.set_pc(pc.wrapping_add(1));
            }
            StepOutcome::Fault(cause)
        }
        Ok(instr) => {
            trace.on_event(TraceEvent::InstructionStart {
                pc,
                word: instr.word,
            });

            let outcome = match execute_instruction(instr, state, io) {
                Ok(exec) => {
                    commit_execution(state, &exec, trace);
                    exec.stop.map_or(StepOutcome::Continue, StepOutcome::Stop)
                }
                Err(cause) => {
                    let skipped = pc.saturating_add(instr.word_size()).min(LAST_VALID_ADDRESS);
                    state.arch.set_pc(skipped);
                    StepOutcome::Fault(cause)
                }
            };

            state.instruction_count = state.instruction_count.wrapping_add(1);
            trace.on_event(TraceEvent::InstructionRetired {
                pc,
                count: state.instruction_count,
            });
            outcome
        }
    };

    match outcome {
        StepOutcome::Continue => {
            if state.run_state != RunState::Running {
                state.run_state = RunState::Idle;
            }
        }
        StepOutcome::Stop(reason) => {
            state.run_state = RunState::Halted;
            trace.on_event(TraceEvent::Stopped { reason, pc });
        }
        StepOutcome::Fault(cause) => {
            state.run_state = RunState::Faulted(cause);
            state.last_fault_pc = Some(pc);
            trace.on_event(TraceEvent::FaultRaised { cause, pc });
        }
    }

    outcome
}
