#![no_main]

use icmc_core::memory::words_from_be_bytes;
use icmc_core::{
    disassemble_window, step_one, CoreState, Decoder, DisassemblyView, HookFns, IoError,
    StepOutcome, StopReason, ADDRESS_SPACE_WORDS,
};
use libfuzzer_sys::fuzz_target;

const STEP_LIMIT: usize = 10_000;

fuzz_target!(|data: &[u8]| {
    let even = data.len() & !1;
    let Ok(words) = words_from_be_bytes(&data[..even]) else {
        return;
    };

    for word in &words {
        let _ = Decoder::decode(*word);
    }

    let mut input = data.iter().copied().cycle();
    let mut io = HookFns::new(
        move || input.next().ok_or(IoError::InputFailed),
        |_, _| Ok(()),
    );
    let mut state = CoreState::with_program(&words);

    for _ in 0..STEP_LIMIT {
        let pc = state.arch.pc();
        match step_one(&mut state, &mut io) {
            StepOutcome::Continue | StepOutcome::Stop(StopReason::Breakpoint) => {}
            StepOutcome::Stop(StopReason::Halt) => break,
            StepOutcome::Fault(_) => {
                assert_eq!(state.memory.len(), ADDRESS_SPACE_WORDS);
                if state.arch.pc() == pc {
                    break;
                }
            }
        }
    }

    let _ = disassemble_window(&state.memory, state.arch.pc(), 8, 8, DisassemblyView::Decoded);
});
