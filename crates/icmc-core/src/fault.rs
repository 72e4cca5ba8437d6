use thiserror::Error;

/// Fault classes used for diagnostics aggregation and host policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Decoder rejected an instruction word or one of its fields.
    Decode,
    /// Program counter left the executable address range.
    Fetch,
    /// Stack pointer was outside the legal range for a stack operation.
    Stack,
    /// Data access targeted an address outside the legal range.
    Memory,
    /// An embedder-supplied I/O hook reported a failure.
    Io,
}

/// Stable fault taxonomy for conditions that stop the current step.
///
/// Division by zero is not a fault: it is recorded in the flag
/// register and execution continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// The 6-bit opcode field has no entry in the opcode table.
    #[error("instruction does not exist")]
    UnknownOpcode = 0x01,
    /// A jump or call used the unassigned condition code 15.
    #[error("invalid branch condition")]
    InvalidCondition = 0x02,
    /// Fetch or operand read at or past the end of the address space.
    #[error("program counter at the end of the address space")]
    PcOutOfRange = 0x03,
    /// Push, pop, call, or return saw a stack pointer outside its legal range.
    #[error("invalid stack pointer value")]
    InvalidStackPointer = 0x04,
    /// Load or store targeted an address at or beyond the last valid word.
    #[error("invalid memory address")]
    InvalidAddress = 0x05,
    /// The input hook failed.
    #[error("input hook failed")]
    InputHookFailed = 0x06,
    /// The output hook failed or rejected the character/position.
    #[error("output hook failed")]
    OutputHookFailed = 0x07,
}

impl FaultCode {
    /// Converts a fault code to its stable one-byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable one-byte value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::UnknownOpcode),
            0x02 => Some(Self::InvalidCondition),
            0x03 => Some(Self::PcOutOfRange),
            0x04 => Some(Self::InvalidStackPointer),
            0x05 => Some(Self::InvalidAddress),
            0x06 => Some(Self::InputHookFailed),
            0x07 => Some(Self::OutputHookFailed),
            _ => None,
        }
    }

    /// Returns the diagnostics fault class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::UnknownOpcode | Self::InvalidCondition => FaultClass::Decode,
            Self::PcOutOfRange => FaultClass::Fetch,
            Self::InvalidStackPointer => FaultClass::Stack,
            Self::InvalidAddress => FaultClass::Memory,
            Self::InputHookFailed | Self::OutputHookFailed => FaultClass::Io,
        }
    }
}
