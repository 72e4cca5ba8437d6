//! Conditional jump/call and return.

use crate::execute::condition::Condition;
use crate::execute::{operand_word, ExecuteState};
use crate::memory::{read_word, validate_push_sp, validate_return_sp};
use crate::{CoreState, DecodedInstruction, FaultCode};

/// Resolves the condition field and evaluates it against FR.
fn condition_holds(instr: DecodedInstruction, state: &CoreState) -> Result<bool, FaultCode> {
    let condition =
        Condition::from_u4(instr.condition_code()).ok_or(FaultCode::InvalidCondition)?;
    Ok(condition.holds(state.arch.flags()))
}

/// `jmp`/`j<cc>`: `PC = memory[PC + 1]` when the condition holds.
pub fn execute_jmp(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let taken = condition_holds(instr, state)?;
    let target = operand_word(state)?;
    if taken {
        exec.next_pc = target;
    }
    Ok(())
}

/// `call`/`c<cc>`: pushes the fall-through address then jumps.
pub fn execute_call(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let taken = condition_holds(instr, state)?;
    let target = operand_word(state)?;
    if !taken {
        return Ok(());
    }

    let sp = state.arch.sp();
    validate_push_sp(sp)?;
    exec.memory_write = Some((sp, exec.next_pc));
    exec.sp = Some(sp - 1);
    exec.next_pc = target;
    Ok(())
}

/// `rts`: pops the return address into `PC`.
pub fn execute_rts(state: &CoreState, exec: &mut ExecuteState) -> Result<(), FaultCode> {
    let sp = state.arch.sp();
    validate_return_sp(sp)?;
    exec.next_pc = read_word(&state.memory, sp + 1)?;
    exec.sp = Some(sp + 1);
    Ok(())
}
