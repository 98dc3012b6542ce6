//! Disassembler for LS-8 programs.
//!
//! Converts raw program bytes back to readable assembly.

use crate::cpu::decode::{decode, Instruction};

/// Disassemble the instruction starting at `addr`.
///
/// Returns the text and the number of bytes it spans. Missing operand
/// bytes past the end of `bytes` read as zero, like unloaded memory.
pub fn disassemble_at(bytes: &[u8], addr: usize) -> (String, usize) {
    let byte_at = |i: usize| bytes.get(i).copied().unwrap_or(0);
    let opcode = byte_at(addr);

    match decode(opcode, byte_at(addr + 1), byte_at(addr + 2)) {
        Ok(instr) => (format_instruction(&instr), instr.width()),
        Err(_) => (format!("DB {:#04x}", opcode), 1),
    }
}

/// Disassemble a whole program image.
pub fn disassemble(bytes: &[u8]) -> String {
    let mut output = String::new();
    output.push_str("; LS-8 Disassembly\n");
    output.push_str("; -----------------\n\n");

    let mut addr = 0;
    while addr < bytes.len() {
        let (text, width) = disassemble_at(bytes, addr);
        let end = (addr + width).min(bytes.len());
        let raw: Vec<String> = bytes[addr..end].iter().map(|b| format!("{:02X}", b)).collect();
        output.push_str(&format!("{:02X}: {:<12}  ; {}\n", addr, text, raw.join(" ")));
        addr += width;
    }

    output
}

/// Format a decoded instruction as assembly text.
pub fn format_instruction(instr: &Instruction) -> String {
    match instr {
        Instruction::Hlt => "HLT".to_string(),
        Instruction::Ldi { reg, value } => format!("LDI R{},{}", reg, value),
        Instruction::Prn { reg } => format!("PRN R{}", reg),
        Instruction::Add { reg_a, reg_b } => format!("ADD R{},R{}", reg_a, reg_b),
        Instruction::Mul { reg_a, reg_b } => format!("MUL R{},R{}", reg_a, reg_b),
    }
}
