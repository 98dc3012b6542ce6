//! Program tooling for the LS-8.
//!
//! This module provides:
//! - The `.ls8` program image format (text -> bytes and back)
//! - A small assembler (mnemonics -> bytes)
//! - A disassembler (bytes -> readable text)

pub mod assembler;
pub mod disasm;
pub mod image;

pub use assembler::{assemble, AssemblerError};
pub use disasm::disassemble;
pub use image::{ProgramImage, ImageError, load_image, parse_image, save_image};
