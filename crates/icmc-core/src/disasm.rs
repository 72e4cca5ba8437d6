//! Instruction disassembly for the ICMC ISA.
//!
//! Every address is rendered on its own row. Because two-word instructions
//! place their immediate or address in the following word, a word can only
//! be interpreted once it is known whether the word before it was an opcode
//! with an operand. [`is_operand`] resolves that by counting the run of
//! two-word opcodes ending just before the address.

use crate::decoder::{DecodedInstruction, MovForm};
use crate::encoding::{opcode_field, Opcode};
use crate::execute::Condition;
use crate::Decoder;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How memory words are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DisassemblyView {
    /// Opcode words as assembly, operand words as `#value`.
    #[default]
    Decoded,
    /// Every word as `#value`, for memory holding data.
    Raw,
}

/// A single row of a disassembly listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Word address.
    pub address: u16,
    /// Raw memory word.
    pub raw_word: u16,
    /// Rendered text.
    pub text: String,
    /// Whether the word is the operand of the preceding instruction.
    pub is_operand: bool,
}

fn is_two_word_opcode(word: u16) -> bool {
    Opcode::of_word(word).is_some_and(Opcode::has_operand_word)
}

/// Returns `true` when the word at `loc` is the trailing operand of a
/// two-word instruction.
///
/// With `k` consecutive words before `loc` that decode as two-word opcodes
/// (stopping at the first word that does not, or at address 0), the word at
/// `loc` is an operand exactly when `k` is odd. Addresses outside `memory`
/// are never operands.
#[must_use]
pub fn is_operand(memory: &[u16], loc: u16) -> bool {
    let loc = usize::from(loc);
    if loc >= memory.len() {
        return false;
    }

    let run = memory[..loc]
        .iter()
        .rev()
        .take_while(|word| is_two_word_opcode(**word))
        .count();
    run % 2 == 1
}

fn registers(instr: DecodedInstruction, count: usize) -> String {
    [instr.rd(), instr.rs1(), instr.rs2()]
        .iter()
        .take(count)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn with_registers(name: &str, instr: DecodedInstruction, count: usize) -> String {
    format!("{name} {}", registers(instr, count))
}

fn alu_name(opcode: Opcode) -> &'static str {
    match opcode {
        Opcode::Add => "add",
        Opcode::Sub => "sub",
        Opcode::Mult => "mult",
        Opcode::Div => "div",
        Opcode::Mod => "mod",
        Opcode::And => "and",
        Opcode::Or => "or",
        _ => "xor",
    }
}

fn branch(prefix: &str, always: &str, instr: DecodedInstruction) -> String {
    let code = instr.condition_code();
    match Condition::from_u4(code) {
        Some(Condition::Always) => always.to_owned(),
        Some(condition) => format!("{prefix}{}", condition.suffix()),
        None => format!("<invalid condition {code}>"),
    }
}

/// Renders a decoded instruction as assembly text.
///
/// Operand words of two-word instructions are not included; they appear on
/// their own row.
#[must_use]
pub fn mnemonic(instr: DecodedInstruction) -> String {
    match instr.opcode {
        Opcode::Add | Opcode::Sub | Opcode::Mult | Opcode::Div => {
            let carry = if instr.uses_carry() { "c" } else { "" };
            format!("{}{carry} {}", alu_name(instr.opcode), registers(instr, 3))
        }
        Opcode::Mod | Opcode::And | Opcode::Or | Opcode::Xor => {
            with_registers(alu_name(instr.opcode), instr, 3)
        }
        Opcode::IncDec => {
            let name = if instr.mode_bit() { "dec" } else { "inc" };
            with_registers(name, instr, 1)
        }
        Opcode::RotateShift => format!(
            "{} {}, {}",
            instr.shift_mode().mnemonic(),
            instr.rd(),
            instr.shift_amount()
        ),
        Opcode::Mov => match instr.mov_form() {
            MovForm::RegisterToRegister => with_registers("mov", instr, 2),
            MovForm::StackPointerToRegister => format!("mov {}, SP", instr.rd()),
            MovForm::RegisterToStackPointer => format!("mov SP, {}", instr.rd()),
        },
        Opcode::Not => with_registers("not", instr, 2),
        Opcode::Cmp => with_registers("cmp", instr, 2),
        Opcode::Loadi => with_registers("loadi", instr, 2),
        Opcode::Storei => with_registers("storei", instr, 2),
        Opcode::Outchar => with_registers("outchar", instr, 2),
        Opcode::Inchar => with_registers("inchar", instr, 1),
        Opcode::Loadn => with_registers("loadn", instr, 1),
        Opcode::Load => with_registers("load", instr, 1),
        Opcode::Store => with_registers("store", instr, 1),
        Opcode::Push if instr.mode_bit() => "push FR".to_owned(),
        Opcode::Push => with_registers("push", instr, 1),
        Opcode::Pop if instr.mode_bit() => "pop FR".to_owned(),
        Opcode::Pop => with_registers("pop", instr, 1),
        Opcode::Jmp => branch("j", "jmp", instr),
        Opcode::Call => branch("c", "call", instr),
        Opcode::Rts => "rts".to_owned(),
        Opcode::Nop => "nop".to_owned(),
        Opcode::Halt => "halt".to_owned(),
        Opcode::Breakpoint => "breakp".to_owned(),
        Opcode::CarryControl => {
            if instr.clears_carry() {
                "clearc".to_owned()
            } else {
                "setc".to_owned()
            }
        }
    }
}

fn literal(word: u16) -> String {
    format!("#{word}")
}

/// Renders a single memory word as a literal, unknown opcode, or assembly.
#[must_use]
pub fn render_word(word: u16, operand: bool, view: DisassemblyView) -> String {
    if view == DisassemblyView::Raw || operand {
        return literal(word);
    }
    match Decoder::decode(word).instruction() {
        Some(instr) => mnemonic(instr),
        None => format!("<invalid opcode {}>", opcode_field(word)),
    }
}

/// Text for the word at `loc`, or `None` when `loc` is outside memory.
#[must_use]
pub fn mnemonic_at(memory: &[u16], loc: u16, view: DisassemblyView) -> Option<String> {
    let word = *memory.get(usize::from(loc))?;
    let operand = view == DisassemblyView::Decoded && is_operand(memory, loc);
    Some(render_word(word, operand, view))
}

/// Produces one row per address from `center - before` to `center + after`,
/// clamped to the bounds of `memory`.
#[must_use]
pub fn disassemble_window(
    memory: &[u16],
    center: u16,
    before: u16,
    after: u16,
    view: DisassemblyView,
) -> Vec<DisassemblyRow> {
    let Some(last) = memory.len().checked_sub(1) else {
        return Vec::new();
    };
    let first = usize::from(center.saturating_sub(before));
    let end = (usize::from(center) + usize::from(after)).min(last);
    if first > end {
        return Vec::new();
    }

    // Seed the operand parity at `first`, then carry it forward.
    let mut operand = view == DisassemblyView::Decoded
        && u16::try_from(first).is_ok_and(|loc| is_operand(memory, loc));

    let mut rows = Vec::with_capacity(end - first + 1);
    for (address, &raw_word) in (first..=end).zip(&memory[first..=end]) {
        let Ok(address) = u16::try_from(address) else {
            break;
        };
        rows.push(DisassemblyRow {
            address,
            raw_word,
            text: render_word(raw_word, operand, view),
            is_operand: operand,
        });
        operand = view == DisassemblyView::Decoded && !operand && is_two_word_opcode(raw_word);
    }
    rows
}
