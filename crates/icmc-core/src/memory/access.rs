//! Bounds policy helpers for the unified word-addressed memory.
//!
//! Every check here runs before the access it guards, so a failing check
//! leaves memory and registers untouched.

use crate::memory::LAST_VALID_ADDRESS;
use crate::FaultCode;

/// Validates that `pc` may be fetched from.
///
/// # Errors
///
/// Returns [`FaultCode::PcOutOfRange`] when `pc` is at or past the reserved
/// last word.
pub const fn validate_fetch_address(pc: u16) -> Result<(), FaultCode> {
    if pc >= LAST_VALID_ADDRESS {
        Err(FaultCode::PcOutOfRange)
    } else {
        Ok(())
    }
}

/// Validates a load/store target address.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidAddress`] when `addr` is at or past the
/// reserved last word.
pub const fn validate_data_address(addr: u16) -> Result<(), FaultCode> {
    if addr >= LAST_VALID_ADDRESS {
        Err(FaultCode::InvalidAddress)
    } else {
        Ok(())
    }
}

/// Validates the stack pointer before a push or call writes `memory[SP]`.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidStackPointer`] unless `0 < sp < 0x8000`.
pub const fn validate_push_sp(sp: u16) -> Result<(), FaultCode> {
    if sp == 0 || sp > LAST_VALID_ADDRESS {
        Err(FaultCode::InvalidStackPointer)
    } else {
        Ok(())
    }
}

/// Validates the stack pointer before a pop reads `memory[SP + 1]`.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidStackPointer`] unless `sp < 0x7FFF`.
pub const fn validate_pop_sp(sp: u16) -> Result<(), FaultCode> {
    if sp >= LAST_VALID_ADDRESS {
        Err(FaultCode::InvalidStackPointer)
    } else {
        Ok(())
    }
}

/// Validates the stack pointer before `rts` reads its return address.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidStackPointer`] unless `sp < 0x7FFE`, i.e.
/// unless at least one word has been pushed onto an initialized stack.
pub const fn validate_return_sp(sp: u16) -> Result<(), FaultCode> {
    if sp >= LAST_VALID_ADDRESS - 1 {
        Err(FaultCode::InvalidStackPointer)
    } else {
        Ok(())
    }
}

/// Validates a `PC` value an instruction is about to commit.
///
/// `0x7FFF` is accepted as a register value; the next fetch from it faults.
///
/// # Errors
///
/// Returns [`FaultCode::PcOutOfRange`] when `pc` is past the address space.
pub const fn validate_pc_register(pc: u16) -> Result<(), FaultCode> {
    if pc > LAST_VALID_ADDRESS {
        Err(FaultCode::PcOutOfRange)
    } else {
        Ok(())
    }
}

/// Validates an `SP` value an instruction is about to commit.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidStackPointer`] when `sp` is past the address
/// space.
pub const fn validate_sp_register(sp: u16) -> Result<(), FaultCode> {
    if sp > LAST_VALID_ADDRESS {
        Err(FaultCode::InvalidStackPointer)
    } else {
        Ok(())
    }
}

/// Reads a word from a backing store.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidAddress`] when `addr` is outside `memory`.
pub fn read_word(memory: &[u16], addr: u16) -> Result<u16, FaultCode> {
    memory
        .get(usize::from(addr))
        .copied()
        .ok_or(FaultCode::InvalidAddress)
}

/// Writes a word into a backing store.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidAddress`] when `addr` is outside `memory`.
pub fn write_word(memory: &mut [u16], addr: u16, value: u16) -> Result<(), FaultCode> {
    let slot = memory
        .get_mut(usize::from(addr))
        .ok_or(FaultCode::InvalidAddress)?;
    *slot = value;
    Ok(())
}
