//! Instruction decoder for the ICMC ISA.
//!
//! Decoding resolves the opcode against the table and exposes typed views of
//! the remaining 10 bits. Field positions are opcode-specific; the accessors
//! below name each layout the instruction set uses.

use crate::encoding::Opcode;
use crate::fault::FaultCode;
use crate::state::GeneralRegister;

/// Bit position of the destination (or first) register selector.
pub const RD_BIT: u32 = 7;
/// Bit position of the first source (or second) register selector.
pub const RS1_BIT: u32 = 4;
/// Bit position of the second source register selector.
pub const RS2_BIT: u32 = 1;

/// Eight-way rotate/shift mode field (bits 6..4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftMode {
    /// Logical shift left, vacated bits filled with 0.
    ShiftLeftZero,
    /// Shift left, vacated bits filled with 1.
    ShiftLeftOne,
    /// Logical shift right, vacated bits filled with 0.
    ShiftRightZero,
    /// Shift right, vacated bits filled with 1.
    ShiftRightOne,
    /// Rotate left (modes 4 and 5).
    RotateLeft,
    /// Rotate right (modes 6 and 7).
    RotateRight,
}

impl ShiftMode {
    /// Converts the 3-bit mode field into a shift mode.
    #[must_use]
    pub const fn from_u3(value: u8) -> Self {
        match value & 0b111 {
            0 => Self::ShiftLeftZero,
            1 => Self::ShiftLeftOne,
            2 => Self::ShiftRightZero,
            3 => Self::ShiftRightOne,
            4 | 5 => Self::RotateLeft,
            _ => Self::RotateRight,
        }
    }

    /// Assembly mnemonic for this mode.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::ShiftLeftZero => "shiftl0",
            Self::ShiftLeftOne => "shiftl1",
            Self::ShiftRightZero => "shiftr0",
            Self::ShiftRightOne => "shiftr1",
            Self::RotateLeft => "rotl",
            Self::RotateRight => "rotr",
        }
    }
}

/// The three `mov` encodings, selected by the two low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovForm {
    /// `mov Rd, Rs`.
    RegisterToRegister,
    /// `mov Rd, SP` (low bits `01`).
    StackPointerToRegister,
    /// `mov SP, Rs` (low bits `11`).
    RegisterToStackPointer,
}

/// Decoded instruction: the resolved opcode plus the raw word its fields
/// are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedInstruction {
    /// Resolved table entry.
    pub opcode: Opcode,
    /// Raw 16-bit instruction word.
    pub word: u16,
}

impl DecodedInstruction {
    /// Register selector at bit 7.
    #[must_use]
    pub const fn rd(self) -> GeneralRegister {
        GeneralRegister::at_bit(self.word, RD_BIT)
    }

    /// Register selector at bit 4.
    #[must_use]
    pub const fn rs1(self) -> GeneralRegister {
        GeneralRegister::at_bit(self.word, RS1_BIT)
    }

    /// Register selector at bit 1.
    #[must_use]
    pub const fn rs2(self) -> GeneralRegister {
        GeneralRegister::at_bit(self.word, RS2_BIT)
    }

    /// Number of words this instruction occupies.
    #[must_use]
    pub const fn word_size(self) -> u16 {
        self.opcode.word_size()
    }

    /// Carry-variant bit (bit 0) of carry-aware ALU instructions.
    #[must_use]
    pub const fn uses_carry(self) -> bool {
        self.opcode.is_carry_aware() && (self.word & 1) != 0
    }

    /// Raw 4-bit condition code (bits 9..6) of `jmp`/`call`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn condition_code(self) -> u8 {
        ((self.word >> 6) & 0b1111) as u8
    }

    /// Mode bit 6: decrement for `inc/dec`, flag register for `push`/`pop`.
    #[must_use]
    pub const fn mode_bit(self) -> bool {
        (self.word & (1 << 6)) != 0
    }

    /// Rotate/shift mode field (bits 6..4).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn shift_mode(self) -> ShiftMode {
        ShiftMode::from_u3(((self.word >> 4) & 0b111) as u8)
    }

    /// Rotate/shift amount field (bits 3..0).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn shift_amount(self) -> u32 {
        (self.word & 0b1111) as u32
    }

    /// `mov` encoding selected by the two low bits.
    #[must_use]
    pub const fn mov_form(self) -> MovForm {
        if self.word & 0b11 == 0b11 {
            MovForm::RegisterToStackPointer
        } else if self.word & 1 == 1 {
            MovForm::StackPointerToRegister
        } else {
            MovForm::RegisterToRegister
        }
    }

    /// Carry-control bit 9: set for `clearc`, clear for `setc`.
    #[must_use]
    pub const fn clears_carry(self) -> bool {
        (self.word & (1 << 9)) != 0
    }
}

/// Result of decoding an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedOrFault {
    /// Successfully decoded instruction.
    Instruction(DecodedInstruction),
    /// Decoding failed with a fault.
    Fault(FaultCode),
}

impl DecodedOrFault {
    /// Returns the decoded instruction if present.
    #[must_use]
    pub const fn instruction(self) -> Option<DecodedInstruction> {
        match self {
            Self::Instruction(i) => Some(i),
            Self::Fault(_) => None,
        }
    }

    /// Returns the fault if decoding failed.
    #[must_use]
    pub const fn fault(self) -> Option<FaultCode> {
        match self {
            Self::Instruction(_) => None,
            Self::Fault(f) => Some(f),
        }
    }
}

impl From<DecodedOrFault> for Result<DecodedInstruction, FaultCode> {
    fn from(value: DecodedOrFault) -> Self {
        match value {
            DecodedOrFault::Instruction(i) => Ok(i),
            DecodedOrFault::Fault(f) => Err(f),
        }
    }
}

/// Instruction decoder for the ICMC ISA.
pub struct Decoder;

impl Decoder {
    /// Decodes a 16-bit instruction word.
    ///
    /// Only the opcode is validated; every 10-bit operand pattern of a known
    /// opcode decodes. Unassigned condition codes are rejected at execution
    /// time so that disassembly can still show the word.
    #[must_use]
    pub const fn decode(word: u16) -> DecodedOrFault {
        match Opcode::of_word(word) {
            Some(opcode) => DecodedOrFault::Instruction(DecodedInstruction { opcode, word }),
            None => DecodedOrFault::Fault(FaultCode::UnknownOpcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{opcode_field, opcode_word, OPCODE_TABLE};

    fn decode(word: u16) -> DecodedInstruction {
        Decoder::decode(word).instruction().expect("should decode")
    }

    #[test]
    fn decode_alu_register_fields() {
        // add R1, R2, R3
        let word = opcode_word(Opcode::Add) | (1 << 7) | (2 << 4) | (3 << 1);
        let instr = decode(word);
        assert_eq!(instr.opcode, Opcode::Add);
        assert_eq!(instr.rd(), GeneralRegister::R1);
        assert_eq!(instr.rs1(), GeneralRegister::R2);
        assert_eq!(instr.rs2(), GeneralRegister::R3);
        assert!(!instr.uses_carry());
        assert!(decode(word | 1).uses_carry());
    }

    #[test]
    fn carry_bit_is_ignored_for_non_carry_aware_opcodes() {
        assert!(!decode(opcode_word(Opcode::And) | 1).uses_carry());
        assert!(!decode(opcode_word(Opcode::Mod) | 1).uses_carry());
    }

    #[test]
    fn condition_code_is_bits_nine_to_six() {
        let word = opcode_word(Opcode::Jmp) | (0b1011 << 6);
        assert_eq!(decode(word).condition_code(), 11);
    }

    #[test]
    fn mov_forms_follow_low_bits() {
        let base = opcode_word(Opcode::Mov);
        assert_eq!(decode(base).mov_form(), MovForm::RegisterToRegister);
        assert_eq!(decode(base | 0b01).mov_form(), MovForm::StackPointerToRegister);
        assert_eq!(decode(base | 0b11).mov_form(), MovForm::RegisterToStackPointer);
        assert_eq!(decode(base | 0b10).mov_form(), MovForm::RegisterToRegister);
    }

    #[test]
    fn shift_fields_split_mode_and_amount() {
        let word = opcode_word(Opcode::RotateShift) | (0b110 << 4) | 0b1010;
        let instr = decode(word);
        assert_eq!(instr.shift_mode(), ShiftMode::RotateRight);
        assert_eq!(instr.shift_amount(), 10);
        assert_eq!(ShiftMode::from_u3(5), ShiftMode::RotateLeft);
    }

    #[test]
    fn unknown_opcode_faults() {
        let word = 0b00_0001 << 10;
        assert_eq!(Decoder::decode(word).fault(), Some(FaultCode::UnknownOpcode));
    }

    #[test]
    fn exhaustive_decode_classification() {
        for word in 0u16..=u16::MAX {
            let op = opcode_field(word);
            match Decoder::decode(word) {
                DecodedOrFault::Instruction(instr) => {
                    assert!(OPCODE_TABLE.contains(&instr.opcode));
                    assert_eq!(instr.opcode.as_u6(), op);
                    assert_eq!(instr.word, word);
                }
                DecodedOrFault::Fault(cause) => {
                    assert!(Opcode::from_u6(op).is_none(), "{word:#06X} faulted");
                    assert_eq!(cause, FaultCode::UnknownOpcode);
                }
            }
        }
    }
}
