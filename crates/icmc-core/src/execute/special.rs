//! Halt, breakpoint, carry control, and character I/O.

use crate::execute::flags::FlagsUpdate;
use crate::execute::ExecuteState;
use crate::state::FLAG_CARRY;
use crate::{CoreState, DecodedInstruction, FaultCode, IoError, IoHooks, StopReason};

/// `halt`: requests a stop with `PC` left on the halt word.
pub fn execute_halt(pc: u16, exec: &mut ExecuteState) {
    exec.next_pc = pc;
    exec.stop = Some(StopReason::Halt);
}

/// `breakp`: requests a stop after advancing past itself.
pub fn execute_breakpoint(exec: &mut ExecuteState) {
    exec.stop = Some(StopReason::Breakpoint);
}

/// `setc` / `clearc`.
pub fn execute_carry_control(instr: DecodedInstruction, exec: &mut ExecuteState) {
    exec.flags_update = if instr.clears_carry() {
        FlagsUpdate::Modify {
            set: 0,
            clear: FLAG_CARRY,
        }
    } else {
        FlagsUpdate::Modify {
            set: FLAG_CARRY,
            clear: 0,
        }
    };
}

/// `inchar Rd`: polls the input hook.
pub fn execute_inchar(
    instr: DecodedInstruction,
    io: &mut dyn IoHooks,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let key = io.input().map_err(IoError::fault_code)?;
    exec.dest = Some((instr.rd(), u16::from(key)));
    Ok(())
}

/// `outchar Rc, Rp`: draws character `Rc` at position `Rp`.
pub fn execute_outchar(
    instr: DecodedInstruction,
    state: &CoreState,
    io: &mut dyn IoHooks,
) -> Result<(), FaultCode> {
    let character = state.arch.gpr(instr.rd());
    let position = state.arch.gpr(instr.rs1());
    io.output(character, position).map_err(IoError::fault_code)
}

#[cfg(test)]
mod tests {
    use crate::encoding::{opcode_word, Opcode};
    use crate::state::{FLAG_CARRY, FLAG_ZERO};
    use crate::{
        step_one, CoreState, FaultCode, GeneralRegister, HookFns, IoError, NullIo, StepOutcome,
        NO_KEY,
    };

    #[test]
    fn setc_and_clearc_follow_bit_nine() {
        let setc = opcode_word(Opcode::CarryControl);
        let clearc = setc | (1 << 9);
        let mut state = CoreState::with_program(&[setc, clearc]);
        state.arch.set_flags(FLAG_ZERO);

        step_one(&mut state, &mut NullIo);
        assert_eq!(state.arch.flags(), FLAG_ZERO | FLAG_CARRY);
        step_one(&mut state, &mut NullIo);
        assert_eq!(state.arch.flags(), FLAG_ZERO);
    }

    #[test]
    fn nop_changes_only_pc() {
        let mut state = CoreState::with_program(&[opcode_word(Opcode::Nop)]);
        let before = state.arch.clone();
        step_one(&mut state, &mut NullIo);
        let mut expected = before;
        expected.set_pc(1);
        assert_eq!(state.arch, expected);
    }

    #[test]
    fn inchar_stores_polled_key() {
        let mut state = CoreState::with_program(&[opcode_word(Opcode::Inchar) | (2 << 7)]);
        let mut io = HookFns::new(|| Ok(b'k'), |_, _| Ok(()));
        step_one(&mut state, &mut io);
        assert_eq!(state.arch.gpr(GeneralRegister::R2), u16::from(b'k'));

        state.reset_canonical();
        step_one(&mut state, &mut NullIo);
        assert_eq!(state.arch.gpr(GeneralRegister::R2), u16::from(NO_KEY));
    }

    #[test]
    fn outchar_passes_character_and_position() {
        let mut drawn = Vec::new();
        let mut state = CoreState::with_program(&[opcode_word(Opcode::Outchar) | (1 << 4)]);
        state.arch.set_gpr(GeneralRegister::R0, u16::from(b'A'));
        state.arch.set_gpr(GeneralRegister::R1, 40);
        {
            let mut io = HookFns::new(
                || Ok(NO_KEY),
                |character, position| {
                    drawn.push((character, position));
                    Ok(())
                },
            );
            assert_eq!(step_one(&mut state, &mut io), StepOutcome::Continue);
        }
        assert_eq!(drawn, vec![(u16::from(b'A'), 40)]);
    }

    #[test]
    fn hook_failures_become_faults_and_leave_registers_alone() {
        let mut state = CoreState::with_program(&[opcode_word(Opcode::Inchar)]);
        state.arch.set_gpr(GeneralRegister::R0, 7);
        let mut io = HookFns::new(|| Err(IoError::InputFailed), |_, _| Ok(()));
        assert_eq!(
            step_one(&mut state, &mut io),
            StepOutcome::Fault(FaultCode::InputHookFailed)
        );
        assert_eq!(state.arch.gpr(GeneralRegister::R0), 7);

        let mut out = CoreState::with_program(&[opcode_word(Opcode::Outchar)]);
        let mut refusing = HookFns::new(|| Ok(NO_KEY), |_, _| Err(IoError::Rejected));
        assert_eq!(
            step_one(&mut out, &mut refusing),
            StepOutcome::Fault(FaultCode::OutputHookFailed)
        );
    }
}
