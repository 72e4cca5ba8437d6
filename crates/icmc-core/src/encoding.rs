//! Opcode table for the ICMC instruction set.
//!
//! The opcode is the 6 most-significant bits of an instruction word. The
//! table is the single source of truth for which opcodes exist and how many
//! words each one occupies; anything absent from it is an unknown
//! instruction.

/// Functional unit an opcode is executed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeClass {
    /// Arithmetic, logic, shift, move, and compare.
    Alu,
    /// Conditional jump/call and return.
    ControlFlow,
    /// Stack push/pop and memory load/store.
    Memory,
    /// Halt, breakpoint, no-op, carry control, and character I/O.
    Special,
}

/// Every assigned 6-bit opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Nop = 0b00_0000,
    Jmp = 0b00_0010,
    Call = 0b00_0011,
    Rts = 0b00_0100,
    Push = 0b00_0101,
    Pop = 0b00_0110,
    CarryControl = 0b00_1000,
    Breakpoint = 0b00_1110,
    Halt = 0b00_1111,
    RotateShift = 0b01_0000,
    And = 0b01_0010,
    Or = 0b01_0011,
    Xor = 0b01_0100,
    Not = 0b01_0101,
    Cmp = 0b01_0110,
    Add = 0b10_0000,
    Sub = 0b10_0001,
    Mult = 0b10_0010,
    Div = 0b10_0011,
    IncDec = 0b10_0100,
    Mod = 0b10_0101,
    Load = 0b11_0000,
    Store = 0b11_0001,
    Outchar = 0b11_0010,
    Mov = 0b11_0011,
    Inchar = 0b11_0101,
    Loadn = 0b11_1000,
    Loadi = 0b11_1100,
    Storei = 0b11_1101,
}

/// Assigned opcode table in opcode-value order.
pub const OPCODE_TABLE: &[Opcode] = &[
    Opcode::Nop,
    Opcode::Jmp,
    Opcode::Call,
    Opcode::Rts,
    Opcode::Push,
    Opcode::Pop,
    Opcode::CarryControl,
    Opcode::Breakpoint,
    Opcode::Halt,
    Opcode::RotateShift,
    Opcode::And,
    Opcode::Or,
    Opcode::Xor,
    Opcode::Not,
    Opcode::Cmp,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mult,
    Opcode::Div,
    Opcode::IncDec,
    Opcode::Mod,
    Opcode::Load,
    Opcode::Store,
    Opcode::Outchar,
    Opcode::Mov,
    Opcode::Inchar,
    Opcode::Loadn,
    Opcode::Loadi,
    Opcode::Storei,
];

/// Extracts the 6-bit opcode field (bits 15..10) from an instruction word.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn opcode_field(word: u16) -> u8 {
    (word >> 10) as u8
}

impl Opcode {
    /// Resolves a 6-bit opcode value against the table.
    #[must_use]
    pub const fn from_u6(op: u8) -> Option<Self> {
        match op {
            0b00_0000 => Some(Self::Nop),
            0b00_0010 => Some(Self::Jmp),
            0b00_0011 => Some(Self::Call),
            0b00_0100 => Some(Self::Rts),
            0b00_0101 => Some(Self::Push),
            0b00_0110 => Some(Self::Pop),
            0b00_1000 => Some(Self::CarryControl),
            0b00_1110 => Some(Self::Breakpoint),
            0b00_1111 => Some(Self::Halt),
            0b01_0000 => Some(Self::RotateShift),
            0b01_0010 => Some(Self::And),
            0b01_0011 => Some(Self::Or),
            0b01_0100 => Some(Self::Xor),
            0b01_0101 => Some(Self::Not),
            0b01_0110 => Some(Self::Cmp),
            0b10_0000 => Some(Self::Add),
            0b10_0001 => Some(Self::Sub),
            0b10_0010 => Some(Self::Mult),
            0b10_0011 => Some(Self::Div),
            0b10_0100 => Some(Self::IncDec),
            0b10_0101 => Some(Self::Mod),
            0b11_0000 => Some(Self::Load),
            0b11_0001 => Some(Self::Store),
            0b11_0010 => Some(Self::Outchar),
            0b11_0011 => Some(Self::Mov),
            0b11_0101 => Some(Self::Inchar),
            0b11_1000 => Some(Self::Loadn),
            0b11_1100 => Some(Self::Loadi),
            0b11_1101 => Some(Self::Storei),
            _ => None,
        }
    }

    /// Resolves the opcode of a full instruction word.
    #[must_use]
    pub const fn of_word(word: u16) -> Option<Self> {
        Self::from_u6(opcode_field(word))
    }

    /// Returns the 6-bit opcode value.
    #[must_use]
    pub const fn as_u6(self) -> u8 {
        self as u8
    }

    /// Number of 16-bit words the instruction occupies (1 or 2).
    ///
    /// Two-word instructions carry an immediate or address in the word at
    /// `PC + 1`.
    #[must_use]
    pub const fn word_size(self) -> u16 {
        match self {
            Self::Jmp | Self::Call | Self::Loadn | Self::Load | Self::Store => 2,
            _ => 1,
        }
    }

    /// Returns `true` for instructions followed by an operand word.
    #[must_use]
    pub const fn has_operand_word(self) -> bool {
        self.word_size() == 2
    }

    /// Carry-aware instructions add the carry flag when bit 0 of the word is set.
    #[must_use]
    pub const fn is_carry_aware(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mult | Self::Div)
    }

    /// Functional unit this opcode executes in.
    #[must_use]
    pub const fn class(self) -> OpcodeClass {
        match self {
            Self::Add
            | Self::Sub
            | Self::Mult
            | Self::Div
            | Self::Mod
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Not
            | Self::IncDec
            | Self::Cmp
            | Self::RotateShift
            | Self::Mov => OpcodeClass::Alu,
            Self::Jmp | Self::Call | Self::Rts => OpcodeClass::ControlFlow,
            Self::Push
            | Self::Pop
            | Self::Loadn
            | Self::Load
            | Self::Store
            | Self::Loadi
            | Self::Storei => OpcodeClass::Memory,
            Self::Nop
            | Self::Halt
            | Self::Breakpoint
            | Self::CarryControl
            | Self::Inchar
            | Self::Outchar => OpcodeClass::Special,
        }
    }
}

/// Places a 6-bit opcode into the top bits of an instruction word.
#[must_use]
pub const fn opcode_word(op: Opcode) -> u16 {
    (op as u16) << 10
}
