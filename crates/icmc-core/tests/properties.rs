//! Property coverage for arithmetic, compare, stack, decode, and
//! disassembly invariants over arbitrary register values and words.

#![allow(clippy::pedantic, clippy::nursery)]

use icmc_core::{
    is_operand, opcode_word, step_one, CoreState, Decoder, FaultCode, GeneralRegister, NullIo,
    Opcode, StepOutcome, FLAG_CARRY, FLAG_EQUAL, FLAG_GREATER, FLAG_LESSER, FLAG_ZERO,
    INITIAL_STACK_POINTER, LAST_VALID_ADDRESS, OPCODE_TABLE,
};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use GeneralRegister::{R0, R1, R2};

fn execute_with(word: u16, a: u16, b: u16) -> CoreState {
    let mut state = CoreState::with_program(&[word]);
    state.arch.set_gpr(R1, a);
    state.arch.set_gpr(R2, b);
    assert_eq!(step_one(&mut state, &mut NullIo), StepOutcome::Continue);
    state
}

fn two_word_opcode() -> impl Strategy<Value = Opcode> {
    prop::sample::select(
        OPCODE_TABLE
            .iter()
            .copied()
            .filter(|op| op.word_size() == 2)
            .collect::<Vec<_>>(),
    )
}

fn one_word_opcode() -> impl Strategy<Value = Opcode> {
    prop::sample::select(
        OPCODE_TABLE
            .iter()
            .copied()
            .filter(|op| op.word_size() == 1)
            .collect::<Vec<_>>(),
    )
}

proptest! {
    #[test]
    fn property_add_wraps_and_reports_carry(a in any::<u16>(), b in any::<u16>()) {
        // add R0, R1, R2
        let word = opcode_word(Opcode::Add) | (1 << 4) | (2 << 1);
        let state = execute_with(word, a, b);
        let wide = u32::from(a) + u32::from(b);

        prop_assert_eq!(state.arch.gpr(R0), a.wrapping_add(b));
        prop_assert_eq!(state.arch.flag_is_set(FLAG_CARRY), wide >= 0x1_0000);
        prop_assert_eq!(state.arch.flag_is_set(FLAG_ZERO), a.wrapping_add(b) == 0);
    }

    #[test]
    fn property_compare_sets_exactly_one_ordering_flag(a in any::<u16>(), b in any::<u16>()) {
        // cmp R1, R2
        let word = opcode_word(Opcode::Cmp) | (1 << 7) | (2 << 4);
        let state = execute_with(word, a, b);
        let set = [FLAG_EQUAL, FLAG_GREATER, FLAG_LESSER]
            .iter()
            .filter(|flag| state.arch.flag_is_set(**flag))
            .count();

        prop_assert_eq!(set, 1);
        prop_assert_eq!(state.arch.flag_is_set(FLAG_EQUAL), a == b);
        prop_assert_eq!(state.arch.flag_is_set(FLAG_GREATER), a > b);
        prop_assert_eq!(state.arch.flag_is_set(FLAG_LESSER), a < b);
    }

    #[test]
    fn property_push_then_pop_restores_value_and_sp(
        value in any::<u16>(),
        sp in 0x100u16..0x7FFF,
    ) {
        // push R1 ; pop R2
        let program = [
            opcode_word(Opcode::Push) | (1 << 7),
            opcode_word(Opcode::Pop) | (2 << 7),
        ];
        let mut state = CoreState::with_program(&program);
        state.arch.set_gpr(R1, value);
        state.arch.set_sp(sp);

        prop_assert_eq!(step_one(&mut state, &mut NullIo), StepOutcome::Continue);
        prop_assert_eq!(step_one(&mut state, &mut NullIo), StepOutcome::Continue);
        prop_assert_eq!(state.arch.gpr(R2), value);
        prop_assert_eq!(state.arch.sp(), sp);
    }

    #[test]
    fn property_decode_accepts_exactly_the_table(word in any::<u16>()) {
        match Decoder::decode(word).instruction() {
            Some(instr) => prop_assert!(OPCODE_TABLE.contains(&instr.opcode)),
            None => prop_assert_eq!(
                Decoder::decode(word).fault(),
                Some(FaultCode::UnknownOpcode)
            ),
        }
    }

    #[test]
    fn property_steps_make_progress_and_keep_pc_and_sp_in_range(
        words in prop::collection::vec(any::<u16>(), 1..16),
    ) {
        let mut state = CoreState::with_program(&words);
        for _ in 0..64 {
            let pc = state.arch.pc();
            let count = state.instruction_count;
            let outcome = step_one(&mut state, &mut NullIo);
            prop_assert!(state.arch.pc() <= LAST_VALID_ADDRESS);
            prop_assert!(state.arch.sp() <= LAST_VALID_ADDRESS);
            match outcome {
                StepOutcome::Fault(FaultCode::PcOutOfRange) if state.instruction_count == count => {
                    prop_assert_eq!(state.arch.pc(), pc);
                    break;
                }
                StepOutcome::Fault(FaultCode::UnknownOpcode) => {
                    prop_assert_eq!(state.arch.pc(), pc.wrapping_add(1));
                    prop_assert_eq!(state.instruction_count, count);
                }
                _ => prop_assert_eq!(state.instruction_count, count + 1),
            }
        }
    }

    #[test]
    fn property_operand_follows_two_word_instruction(
        prefix in one_word_opcode(),
        op in two_word_opcode(),
        low_bits in 0u16..0x400,
        operand in any::<u16>(),
        at in 1usize..0x100,
    ) {
        let mut memory = vec![0u16; 0x200];
        memory[at - 1] = opcode_word(prefix);
        memory[at] = opcode_word(op) | low_bits;
        memory[at + 1] = operand;

        let at = u16::try_from(at).expect("small address");
        prop_assert!(!is_operand(&memory, at));
        prop_assert!(is_operand(&memory, at + 1));
    }

    #[test]
    fn property_reset_ignores_live_state(
        words in prop::collection::vec(any::<u16>(), 0..32),
        scribble in any::<u16>(),
    ) {
        let mut state = CoreState::with_program(&words);
        state.memory[0x100] = scribble;
        state.arch.set_gpr(R0, scribble);
        state.arch.set_sp(scribble);
        state.reset_canonical();

        prop_assert_eq!(&state.memory[..], state.baseline());
        prop_assert_eq!(state.arch.gpr(R0), 0);
        prop_assert_eq!(state.arch.sp(), INITIAL_STACK_POINTER);
    }
}
