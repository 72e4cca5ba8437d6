//! FR update behaviors for different instruction classes.

use std::cmp::Ordering;

use crate::state::{
    FLAG_CARRY, FLAG_DIV_ZERO, FLAG_EQUAL, FLAG_GREATER, FLAG_LESSER, FLAG_NEGATIVE, FLAG_ZERO,
};

/// Describes how FR should be updated after an instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// No change to FR.
    #[default]
    None,
    /// Replace FR with a value (masked to the defined bits on commit).
    Set(u16),
    /// Set the bits in `set`, clear the bits in `clear`, keep the rest.
    Modify {
        /// Bits to set.
        set: u16,
        /// Bits to clear.
        clear: u16,
    },
}

impl FlagsUpdate {
    /// Zero/carry/negative derived from a 32-bit widened ALU result.
    ///
    /// `zero` looks at the low 16 bits, `carry` at whether truncation to 16
    /// bits loses information, `negative` at bit 15.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn arithmetic(result: u32) -> Self {
        let mut set = 0;
        if result as u16 == 0 {
            set |= FLAG_ZERO;
        }
        if result > u16::MAX as u32 {
            set |= FLAG_CARRY;
        }
        if result & (1 << 15) != 0 {
            set |= FLAG_NEGATIVE;
        }
        Self::Modify {
            set,
            clear: (FLAG_ZERO | FLAG_CARRY | FLAG_NEGATIVE) & !set,
        }
    }

    /// Exactly one of equal/greater/lesser for an unsigned comparison.
    #[must_use]
    pub const fn compare(ordering: Ordering) -> Self {
        let set = match ordering {
            Ordering::Less => FLAG_LESSER,
            Ordering::Equal => FLAG_EQUAL,
            Ordering::Greater => FLAG_GREATER,
        };
        Self::Modify {
            set,
            clear: (FLAG_EQUAL | FLAG_GREATER | FLAG_LESSER) & !set,
        }
    }

    /// Additionally clears `bits` (only meaningful on `Modify`).
    #[must_use]
    pub const fn clearing(self, bits: u16) -> Self {
        match self {
            Self::Modify { set, clear } => Self::Modify {
                set: set & !bits,
                clear: clear | bits,
            },
            other => other,
        }
    }

    /// Applies this update to an FR value.
    #[must_use]
    pub const fn apply(self, flags: u16) -> u16 {
        match self {
            Self::None => flags,
            Self::Set(value) => value,
            Self::Modify { set, clear } => (flags & !clear) | set,
        }
    }
}

/// Update recorded by a division whose divisor is zero.
pub const DIVIDE_BY_ZERO: FlagsUpdate = FlagsUpdate::Modify {
    set: FLAG_DIV_ZERO,
    clear: 0,
};
