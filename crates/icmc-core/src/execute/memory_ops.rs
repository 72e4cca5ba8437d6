//! Stack push/pop and memory load/store execution.

use crate::execute::flags::FlagsUpdate;
use crate::execute::{operand_word, ExecuteState};
use crate::memory::{read_word, validate_data_address, validate_pop_sp, validate_push_sp};
use crate::state::FLAGS_ACTIVE_MASK;
use crate::{CoreState, DecodedInstruction, FaultCode};

/// `push Rs` / `push FR`: `memory[SP] = value; SP -= 1`.
pub fn execute_push(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let sp = state.arch.sp();
    validate_push_sp(sp)?;

    let value = if instr.mode_bit() {
        state.arch.flags()
    } else {
        state.arch.gpr(instr.rd())
    };
    exec.memory_write = Some((sp, value));
    exec.sp = Some(sp - 1);
    Ok(())
}

/// `pop Rd` / `pop FR`: `SP += 1; value = memory[SP]`.
pub fn execute_pop(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let sp = state.arch.sp();
    validate_pop_sp(sp)?;

    let value = read_word(&state.memory, sp + 1)?;
    if instr.mode_bit() {
        exec.flags_update = FlagsUpdate::Set(value & FLAGS_ACTIVE_MASK);
    } else {
        exec.dest = Some((instr.rd(), value));
    }
    exec.sp = Some(sp + 1);
    Ok(())
}

/// `loadn Rd, #imm`.
pub fn execute_loadn(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    exec.dest = Some((instr.rd(), operand_word(state)?));
    Ok(())
}

/// `load Rd, addr`.
pub fn execute_load(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let addr = operand_word(state)?;
    validate_data_address(addr)?;
    exec.dest = Some((instr.rd(), read_word(&state.memory, addr)?));
    Ok(())
}

/// `store addr, Rs` (source register at bit 7).
pub fn execute_store(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let addr = operand_word(state)?;
    validate_data_address(addr)?;
    exec.memory_write = Some((addr, state.arch.gpr(instr.rd())));
    Ok(())
}

/// `loadi Rd, Rs`: `Rd = memory[Rs]`.
pub fn execute_loadi(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let addr = state.arch.gpr(instr.rs1());
    validate_data_address(addr)?;
    exec.dest = Some((instr.rd(), read_word(&state.memory, addr)?));
    Ok(())
}

/// `storei Rd, Rs`: `memory[Rd] = Rs`.
pub fn execute_storei(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let addr = state.arch.gpr(instr.rd());
    validate_data_address(addr)?;
    exec.memory_write = Some((addr, state.arch.gpr(instr.rs1())));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::encoding::{opcode_word, Opcode};
    use crate::state::{FLAG_CARRY, FLAG_NEGATIVE};
    use crate::{
        step_one, CoreState, FaultCode, GeneralRegister, NullIo, StepOutcome,
        INITIAL_STACK_POINTER,
    };

    use GeneralRegister::{R0, R1, R3};

    fn run(program: &[u16], steps: usize, setup: impl FnOnce(&mut CoreState)) -> CoreState {
        let mut state = CoreState::with_program(program);
        setup(&mut state);
        for _ in 0..steps {
            assert_eq!(step_one(&mut state, &mut NullIo), StepOutcome::Continue);
        }
        state
    }

    #[test]
    fn push_pop_round_trips_a_register() {
        let push = opcode_word(Opcode::Push) | (1 << 7);
        let pop = opcode_word(Opcode::Pop) | (3 << 7);
        let state = run(&[push, pop], 2, |s| s.arch.set_gpr(R1, 0xBEEF));

        assert_eq!(state.arch.gpr(R3), 0xBEEF);
        assert_eq!(state.arch.sp(), INITIAL_STACK_POINTER);
        assert_eq!(state.memory[usize::from(INITIAL_STACK_POINTER)], 0xBEEF);
    }

    #[test]
    fn push_and_pop_flag_register() {
        let push_fr = opcode_word(Opcode::Push) | (1 << 6);
        let pop_fr = opcode_word(Opcode::Pop) | (1 << 6);
        let mut state = run(&[push_fr], 1, |s| s.arch.set_flags(FLAG_CARRY | FLAG_NEGATIVE));
        assert_eq!(
            state.memory[usize::from(INITIAL_STACK_POINTER)],
            FLAG_CARRY | FLAG_NEGATIVE
        );

        state.memory[usize::from(INITIAL_STACK_POINTER)] = 0xFFFF;
        state.memory[1] = pop_fr;
        assert_eq!(step_one(&mut state, &mut NullIo), StepOutcome::Continue);
        assert_eq!(state.arch.flags(), 0x7F);
    }

    #[test]
    fn pop_with_sp_at_reserved_word_faults() {
        let mut state = CoreState::with_program(&[opcode_word(Opcode::Pop)]);
        state.arch.set_sp(0x7FFF);
        assert_eq!(
            step_one(&mut state, &mut NullIo),
            StepOutcome::Fault(FaultCode::InvalidStackPointer)
        );
        assert_eq!(state.arch.gpr(R0), 0);
    }

    #[test]
    fn loadn_load_and_store_move_words() {
        let program = [
            opcode_word(Opcode::Loadn),
            0x00AB,
            opcode_word(Opcode::Store),
            0x0200,
            opcode_word(Opcode::Load) | (1 << 7),
            0x0200,
        ];
        let state = run(&program, 3, |_| {});
        assert_eq!(state.memory[0x200], 0x00AB);
        assert_eq!(state.arch.gpr(R1), 0x00AB);
        assert_eq!(state.arch.pc(), 6);
    }

    #[test]
    fn indirect_load_and_store_use_register_addresses() {
        // storei R0, R1 ; loadi R3, R0
        let storei = opcode_word(Opcode::Storei) | (1 << 4);
        let loadi = opcode_word(Opcode::Loadi) | (3 << 7);
        let state = run(&[storei, loadi], 2, |s| {
            s.arch.set_gpr(R0, 0x0300);
            s.arch.set_gpr(R1, 0x5555);
        });
        assert_eq!(state.memory[0x300], 0x5555);
        assert_eq!(state.arch.gpr(R3), 0x5555);
    }

    #[test]
    fn store_to_reserved_word_faults_without_writing() {
        let mut state = CoreState::with_program(&[opcode_word(Opcode::Store), 0x7FFF]);
        state.arch.set_gpr(R0, 1);
        assert_eq!(
            step_one(&mut state, &mut NullIo),
            StepOutcome::Fault(FaultCode::InvalidAddress)
        );
        assert_eq!(state.memory[0x7FFF], 0);
        assert_eq!(state.arch.pc(), 2);
    }

    #[test]
    fn loadi_past_reserved_word_faults() {
        let mut state = CoreState::with_program(&[opcode_word(Opcode::Loadi) | (1 << 4)]);
        state.arch.set_gpr(R1, 0x9000);
        assert_eq!(
            step_one(&mut state, &mut NullIo),
            StepOutcome::Fault(FaultCode::InvalidAddress)
        );
    }
}
