//! LS-8 CPU registers.
//!
//! The LS-8 has:
//! - R0-R7: eight general-purpose byte registers
//! - PC: program counter
//! - FL: flags storage (present but not read by any instruction)

use crate::cpu::memory::Access;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// Number of flag cells.
pub const FLAG_COUNT: usize = 8;

/// The LS-8 register file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registers {
    /// R0-R7
    gpr: [u8; REGISTER_COUNT],

    /// Program counter.
    ///
    /// Wider than a byte on purpose: running off the end of memory must
    /// surface as an out-of-range fetch, not wrap back to address 0.
    pub pc: usize,

    /// FL: flags storage.
    pub fl: [u8; FLAG_COUNT],
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self {
            gpr: [0; REGISTER_COUNT],
            pc: 0,
            fl: [0; FLAG_COUNT],
        }
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a general-purpose register (0-7).
    #[inline]
    pub fn read(&self, index: usize) -> Result<u8, RegisterError> {
        self.gpr
            .get(index)
            .copied()
            .ok_or(RegisterError::OutOfRange { index, access: Access::Read })
    }

    /// Write a general-purpose register (0-7).
    #[inline]
    pub fn write(&mut self, index: usize, value: u8) -> Result<(), RegisterError> {
        let reg = self.gpr
            .get_mut(index)
            .ok_or(RegisterError::OutOfRange { index, access: Access::Write })?;
        *reg = value;
        Ok(())
    }

    /// All general-purpose register values, R0 first.
    pub fn values(&self) -> &[u8; REGISTER_COUNT] {
        &self.gpr
    }

    /// Advance the program counter by `width` bytes.
    /// Returns the old value.
    pub fn advance_pc(&mut self, width: usize) -> usize {
        let old = self.pc;
        self.pc += width;
        old
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when touching the register file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("register {access} at index {index} out of range (0-7)")]
    OutOfRange { index: usize, access: Access },
}
