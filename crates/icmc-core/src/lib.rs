//! Core emulator for the ICMC 16-bit processor.
//!
//! The machine has eight general-purpose registers, a program counter, a
//! stack pointer, a 7-bit flag register, and one unified 32768-word address
//! space holding code, data, and the downward-growing stack. Character I/O
//! goes through embedder-supplied [`IoHooks`].
//!
//! [`step_one`] executes a single instruction against an explicit
//! [`CoreState`]; [`run_until_halt`] loops it with clock pacing and
//! cooperative cancellation through a [`RunControl`]. [`Processor`] bundles
//! the state, the hooks, and the control for embedders that want a single
//! owner.

/// Memory model primitives, bounds policy, and image loading.
pub mod memory;
pub use memory::{
    decode_charmap_image, decode_code_image, new_address_space, ImageError,
    ADDRESS_SPACE_WORDS, CHARMAP_IMAGE_BYTES, CHARMAP_IMAGE_WORDS, CODE_IMAGE_BYTES,
    LAST_VALID_ADDRESS,
};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    CoreConfig, CoreState, HookFns, IoError, IoHooks, NullIo, NullTrace, RunOutcome,
    StepOutcome, StopReason, TraceEvent, TraceSink, NO_KEY,
};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{
    ArchitecturalState, GeneralRegister, RunState, FLAGS_ACTIVE_MASK, FLAG_CARRY, FLAG_DIV_ZERO,
    FLAG_EQUAL, FLAG_GREATER, FLAG_LESSER, FLAG_NEGATIVE, FLAG_ZERO, GENERAL_REGISTER_COUNT,
    INITIAL_STACK_POINTER,
};

/// Opcode table and word-size classification.
pub mod encoding;
pub use encoding::{opcode_word, Opcode, OpcodeClass, OPCODE_TABLE};

/// Instruction decode with typed field views.
pub mod decoder;
pub use decoder::{DecodedInstruction, DecodedOrFault, Decoder, MovForm, ShiftMode};

/// Fault taxonomy.
pub mod fault;
pub use fault::{FaultClass, FaultCode};

/// Clock pacing for continuous runs.
pub mod timing;
pub use timing::{period_from_hz, Pacer, PACING_BATCH};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    commit_execution, execute_instruction, step_one, step_one_traced, Condition, ExecuteState,
    FlagsUpdate,
};

/// Continuous execution and the processor facade.
pub mod engine;
pub use engine::{run_until_halt, Processor, RunControl};

/// Disassembly of memory words and listing windows.
pub mod disasm;
pub use disasm::{
    disassemble_window, is_operand, mnemonic, mnemonic_at, DisassemblyRow, DisassemblyView,
};

#[cfg(test)]
use proptest as _;
