//! Arithmetic-logic unit.
//!
//! Every operation reads two registers and writes the result back into
//! the first one. Results are 8-bit, so everything wraps modulo 256.

use crate::cpu::registers::{Registers, RegisterError};
use serde::{Serialize, Deserialize};
use std::str::FromStr;
use thiserror::Error;

/// Operations the ALU knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AluOp {
    /// reg_a := reg_a + reg_b
    Add,
    /// reg_a := reg_a * reg_b
    Mul,
}

impl AluOp {
    pub fn name(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Mul => "MUL",
        }
    }

    fn compute(self, a: u8, b: u8) -> u8 {
        match self {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Mul => a.wrapping_mul(b),
        }
    }
}

impl FromStr for AluOp {
    type Err = AluError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(AluOp::Add),
            "MUL" => Ok(AluOp::Mul),
            other => Err(AluError::UnsupportedOperation(other.to_string())),
        }
    }
}

impl std::fmt::Display for AluOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply `op` to registers `reg_a` and `reg_b`, storing into `reg_a`.
///
/// Returns the stored result.
pub fn apply(regs: &mut Registers, op: AluOp, reg_a: usize, reg_b: usize) -> Result<u8, AluError> {
    let a = regs.read(reg_a)?;
    let b = regs.read(reg_b)?;
    let result = op.compute(a, b);
    regs.write(reg_a, result)?;
    Ok(result)
}

/// Errors raised by the ALU.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AluError {
    /// The control unit asked for an operation the ALU does not implement.
    #[error("unsupported ALU operation: {0}")]
    UnsupportedOperation(String),

    #[error(transparent)]
    RegisterError(#[from] RegisterError),
}
