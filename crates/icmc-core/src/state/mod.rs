//! Architectural CPU state model primitives.

/// Architectural register file types and storage model.
pub mod registers;
/// Host-observable execution state machine.
pub mod run_state;

pub use registers::{
    ArchitecturalState, GeneralRegister, FLAGS_ACTIVE_MASK, FLAG_CARRY, FLAG_DIV_ZERO, FLAG_EQUAL,
    FLAG_GREATER, FLAG_LESSER, FLAG_NEGATIVE, FLAG_ZERO, GENERAL_REGISTER_COUNT,
    INITIAL_STACK_POINTER,
};
pub use run_state::RunState;
