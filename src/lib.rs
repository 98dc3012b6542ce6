//! # LS-8 Emulator
//!
//! An emulator for the LS-8, a minimal 8-bit virtual CPU with 256 bytes
//! of memory and eight byte registers.
//!
//! Programs are flat byte images loaded at address 0. The crate also
//! ships a loader for the textual `.ls8` format, a tiny assembler and a
//! disassembler.

pub mod cpu;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{Cpu, CpuState, CpuError, Memory, Registers, Instruction, Opcode};
pub use asm::{assemble, disassemble, AssemblerError, ProgramImage, ImageError, load_image, parse_image, save_image};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
