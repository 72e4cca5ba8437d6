/// Number of architecturally visible general-purpose registers (`R0..R7`).
pub const GENERAL_REGISTER_COUNT: usize = 8;
/// Stack pointer value after reset: the top of the stack region, just below
/// the reserved last word of the address space.
pub const INITIAL_STACK_POINTER: u16 = 0x7FFE;

/// `FR` bit set when the last compare found equal operands.
pub const FLAG_EQUAL: u16 = 1 << 0;
/// `FR` bit set when the last ALU result was zero in its low 16 bits.
pub const FLAG_ZERO: u16 = 1 << 1;
/// `FR` bit set when the last ALU result did not fit in 16 bits (also "overflow").
pub const FLAG_CARRY: u16 = 1 << 2;
/// `FR` bit set when the last compare found the first operand greater.
pub const FLAG_GREATER: u16 = 1 << 3;
/// `FR` bit set when the last compare found the first operand lesser.
pub const FLAG_LESSER: u16 = 1 << 4;
/// `FR` bit set when bit 15 of the last ALU result was set.
pub const FLAG_NEGATIVE: u16 = 1 << 5;
/// `FR` bit set when the last division had a zero divisor.
pub const FLAG_DIV_ZERO: u16 = 1 << 6;
/// Mask of every defined `FR` bit.
pub const FLAGS_ACTIVE_MASK: u16 = FLAG_EQUAL
    | FLAG_ZERO
    | FLAG_CARRY
    | FLAG_GREATER
    | FLAG_LESSER
    | FLAG_NEGATIVE
    | FLAG_DIV_ZERO;

/// Architecturally visible general-purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum GeneralRegister {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl GeneralRegister {
    /// Returns the array index for this register (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Extracts the register whose 3-bit selector starts at `bit` in `word`.
    #[must_use]
    pub const fn at_bit(word: u16, bit: u32) -> Self {
        match (word >> bit) & 0b111 {
            0 => Self::R0,
            1 => Self::R1,
            2 => Self::R2,
            3 => Self::R3,
            4 => Self::R4,
            5 => Self::R5,
            6 => Self::R6,
            _ => Self::R7,
        }
    }
}

impl std::fmt::Display for GeneralRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.index())
    }
}

/// Full architectural register state: `R0..R7`, `PC`, `SP`, and `FR`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    gpr: [u16; GENERAL_REGISTER_COUNT],
    pc: u16,
    sp: u16,
    flags: u16,
}

impl Default for ArchitecturalState {
    fn default() -> Self {
        Self {
            gpr: [0; GENERAL_REGISTER_COUNT],
            pc: 0,
            sp: INITIAL_STACK_POINTER,
            flags: 0,
        }
    }
}

impl ArchitecturalState {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: GeneralRegister) -> u16 {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register.
    pub const fn set_gpr(&mut self, reg: GeneralRegister, value: u16) {
        self.gpr[reg.index()] = value;
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the `PC` register.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Reads the `SP` register.
    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.sp
    }

    /// Writes the `SP` register.
    pub const fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }

    /// Reads the `FR` register.
    #[must_use]
    pub const fn flags(&self) -> u16 {
        self.flags
    }

    /// Writes the `FR` register; undefined bits are dropped.
    pub const fn set_flags(&mut self, value: u16) {
        self.flags = value & FLAGS_ACTIVE_MASK;
    }

    /// Returns `true` when a specific `FR` bit is set.
    #[must_use]
    pub const fn flag_is_set(&self, flag: u16) -> bool {
        (self.flags & flag) != 0
    }
}
