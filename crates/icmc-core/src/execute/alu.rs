//! ALU instruction execution: arithmetic, logic, shift, move, compare.
//!
//! Binary operations run on operands widened to 32 bits so that overflow is
//! visible to the flag update before the result is truncated into `Rd`.

use std::cmp::Ordering;

use crate::decoder::{MovForm, ShiftMode};
use crate::execute::flags::{FlagsUpdate, DIVIDE_BY_ZERO};
use crate::execute::ExecuteState;
use crate::state::{FLAG_CARRY, FLAG_DIV_ZERO};
use crate::{CoreState, DecodedInstruction};

#[allow(clippy::cast_possible_truncation)]
const fn truncate(result: u32) -> u16 {
    result as u16
}

/// Adds the carry-in for carry variants when FR carry is set.
fn with_carry_in(instr: DecodedInstruction, state: &CoreState, result: u32) -> u32 {
    if instr.uses_carry() && state.arch.flag_is_set(FLAG_CARRY) {
        result.wrapping_add(1)
    } else {
        result
    }
}

/// `Rd = op(Rs1, Rs2)` with zero/carry/negative from the widened result.
pub fn execute_binary(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
    op: impl Fn(u32, u32) -> u32,
) {
    let a = u32::from(state.arch.gpr(instr.rs1()));
    let b = u32::from(state.arch.gpr(instr.rs2()));
    let result = with_carry_in(instr, state, op(a, b));

    exec.dest = Some((instr.rd(), truncate(result)));
    exec.flags_update = FlagsUpdate::arithmetic(result);
}

/// `div`/`mod`: a zero divisor records `div_zero` and leaves `Rd` alone.
pub fn execute_division(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
    op: impl Fn(u32, u32) -> u32,
) {
    let a = u32::from(state.arch.gpr(instr.rs1()));
    let b = u32::from(state.arch.gpr(instr.rs2()));
    if b == 0 {
        exec.flags_update = DIVIDE_BY_ZERO;
        return;
    }

    let result = with_carry_in(instr, state, op(a, b));
    exec.dest = Some((instr.rd(), truncate(result)));
    exec.flags_update = FlagsUpdate::arithmetic(result).clearing(FLAG_DIV_ZERO);
}

/// `Rd = !Rs1`; flags untouched.
pub fn execute_not(instr: DecodedInstruction, state: &CoreState, exec: &mut ExecuteState) {
    exec.dest = Some((instr.rd(), !state.arch.gpr(instr.rs1())));
}

/// `inc Rd` / `dec Rd` (bit 6 selects decrement).
pub fn execute_inc_dec(instr: DecodedInstruction, state: &CoreState, exec: &mut ExecuteState) {
    let value = u32::from(state.arch.gpr(instr.rd()));
    let result = if instr.mode_bit() {
        value.wrapping_sub(1)
    } else {
        value + 1
    };

    exec.dest = Some((instr.rd(), truncate(result)));
    exec.flags_update = FlagsUpdate::arithmetic(result);
}

/// Applies a rotate/shift mode to a value; `amount` is at most 15.
#[must_use]
pub const fn rotate_shift(value: u16, mode: ShiftMode, amount: u32) -> u16 {
    match mode {
        ShiftMode::ShiftLeftZero => value << amount,
        ShiftMode::ShiftLeftOne => !((!value) << amount),
        ShiftMode::ShiftRightZero => value >> amount,
        ShiftMode::ShiftRightOne => !((!value) >> amount),
        ShiftMode::RotateLeft => value.rotate_left(amount),
        ShiftMode::RotateRight => value.rotate_right(amount),
    }
}

/// Rotate/shift `Rd` in place; flags untouched.
pub fn execute_rotate_shift(
    instr: DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) {
    let value = state.arch.gpr(instr.rd());
    let shifted = rotate_shift(value, instr.shift_mode(), instr.shift_amount());
    exec.dest = Some((instr.rd(), shifted));
}

/// The three `mov` forms; flags untouched.
pub fn execute_mov(instr: DecodedInstruction, state: &CoreState, exec: &mut ExecuteState) {
    match instr.mov_form() {
        MovForm::RegisterToRegister => {
            exec.dest = Some((instr.rd(), state.arch.gpr(instr.rs1())));
        }
        MovForm::StackPointerToRegister => {
            exec.dest = Some((instr.rd(), state.arch.sp()));
        }
        MovForm::RegisterToStackPointer => {
            exec.sp = Some(state.arch.gpr(instr.rd()));
        }
    }
}

/// Unsigned compare of the registers at bits 7 and 4.
pub fn execute_cmp(instr: DecodedInstruction, state: &CoreState, exec: &mut ExecuteState) {
    let left = state.arch.gpr(instr.rd());
    let right = state.arch.gpr(instr.rs1());
    let ordering: Ordering = left.cmp(&right);
    exec.flags_update = FlagsUpdate::compare(ordering);
}
