//! Condition-code truth table for conditional jumps and calls.

use crate::state::{
    FLAG_CARRY, FLAG_DIV_ZERO, FLAG_EQUAL, FLAG_GREATER, FLAG_LESSER, FLAG_NEGATIVE, FLAG_ZERO,
};

/// The 15 assigned condition codes (bits 9..6 of `jmp`/`call`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Condition {
    /// Unconditional.
    Always = 0,
    /// Equal after compare.
    Equal = 1,
    /// Not equal after compare.
    NotEqual = 2,
    /// Zero result.
    Zero = 3,
    /// Non-zero result.
    NotZero = 4,
    /// Carry set.
    Carry = 5,
    /// Carry clear.
    NotCarry = 6,
    /// Greater after compare.
    Greater = 7,
    /// Lesser after compare.
    Lesser = 8,
    /// Greater or equal after compare.
    GreaterOrEqual = 9,
    /// Lesser or equal after compare.
    LesserOrEqual = 10,
    /// Overflow; alias of carry.
    Overflow = 11,
    /// No overflow; alias of no carry.
    NotOverflow = 12,
    /// Negative result.
    Negative = 13,
    /// Division by zero recorded.
    DivByZero = 14,
}

impl Condition {
    /// Resolves a 4-bit condition field; code 15 is unassigned.
    #[must_use]
    pub const fn from_u4(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Always),
            1 => Some(Self::Equal),
            2 => Some(Self::NotEqual),
            3 => Some(Self::Zero),
            4 => Some(Self::NotZero),
            5 => Some(Self::Carry),
            6 => Some(Self::NotCarry),
            7 => Some(Self::Greater),
            8 => Some(Self::Lesser),
            9 => Some(Self::GreaterOrEqual),
            10 => Some(Self::LesserOrEqual),
            11 => Some(Self::Overflow),
            12 => Some(Self::NotOverflow),
            13 => Some(Self::Negative),
            14 => Some(Self::DivByZero),
            _ => None,
        }
    }

    /// Evaluates the condition against an FR value.
    #[must_use]
    pub fn holds(self, flags: u16) -> bool {
        let set = |bit: u16| flags & bit != 0;
        match self {
            Self::Always => true,
            Self::Equal => set(FLAG_EQUAL),
            Self::NotEqual => !set(FLAG_EQUAL),
            Self::Zero => set(FLAG_ZERO),
            Self::NotZero => !set(FLAG_ZERO),
            Self::Carry | Self::Overflow => set(FLAG_CARRY),
            Self::NotCarry | Self::NotOverflow => !set(FLAG_CARRY),
            Self::Greater => set(FLAG_GREATER),
            Self::Lesser => set(FLAG_LESSER),
            Self::GreaterOrEqual => set(FLAG_GREATER | FLAG_EQUAL),
            Self::LesserOrEqual => set(FLAG_LESSER | FLAG_EQUAL),
            Self::Negative => set(FLAG_NEGATIVE),
            Self::DivByZero => set(FLAG_DIV_ZERO),
        }
    }

    /// Mnemonic suffix appended to `j`/`c`; empty for [`Condition::Always`].
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Always => "",
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::Zero => "z",
            Self::NotZero => "nz",
            Self::Carry => "c",
            Self::NotCarry => "nc",
            Self::Greater => "gr",
            Self::Lesser => "le",
            Self::GreaterOrEqual => "eg",
            Self::LesserOrEqual => "el",
            Self::Overflow => "ov",
            Self::NotOverflow => "nov",
            Self::Negative => "n",
            Self::DivByZero => "dz",
        }
    }
}
