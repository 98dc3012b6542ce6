//! CPU emulation for the LS-8.
//!
//! This module implements the complete LS-8 core:
//! - 256 byte-wide memory cells
//! - 8 general-purpose byte registers, plus PC and flags
//! - 5-instruction set with a table-driven decoder
//! - ALU for register-to-register arithmetic

pub mod memory;
pub mod registers;
pub mod decode;
pub mod alu;
pub mod execute;

pub use memory::{Memory, MemoryError, Access};
pub use registers::{Registers, RegisterError};
pub use decode::{Instruction, Opcode, DecodeError};
pub use alu::{AluOp, AluError};
pub use execute::{Cpu, CpuError, CpuState};
