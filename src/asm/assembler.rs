//! Simple assembler for LS-8 programs.
//!
//! Syntax:
//! ```text
//! ; Comment (`#` works too)
//!     LDI R0,8     ; Load 8 into R0
//!     LDI R1,0x0A  ; Immediates may be decimal, 0x.. or 0b..
//!     MUL R0,R1    ; R0 := R0 * R1
//!     PRN R0       ; Print R0
//!     HLT          ; Halt
//!     DB 42        ; Raw data byte
//! ```

use crate::cpu::decode::{encode, Instruction, Opcode};
use crate::cpu::memory::MEMORY_SIZE;
use crate::cpu::registers::REGISTER_COUNT;
use thiserror::Error;

/// Assemble source code to a program image.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// The assembler state.
struct Assembler {
    /// Output bytes.
    output: Vec<u8>,
}

impl Assembler {
    fn new() -> Self {
        Self { output: Vec::new() }
    }

    fn assemble(&mut self, source: &str) -> Result<Vec<u8>, AssemblerError> {
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        if self.output.len() > MEMORY_SIZE {
            return Err(AssemblerError::ProgramTooLarge { size: self.output.len() });
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        // Remove comments
        let line = line.split([';', '#']).next().unwrap_or("").trim();

        if line.is_empty() {
            return Ok(());
        }

        let (mnemonic, rest) = match line.split_once(char::is_whitespace) {
            Some((m, rest)) => (m.to_uppercase(), rest.trim()),
            None => (line.to_uppercase(), ""),
        };

        let operands: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(str::trim).collect()
        };

        if mnemonic == "DB" {
            let [value] = operands.as_slice() else {
                return Err(AssemblerError::OperandCount {
                    line: line_num,
                    mnemonic,
                    expected: 1,
                    found: operands.len(),
                });
            };
            let byte = parse_immediate(value, line_num)?;
            self.output.push(byte);
            return Ok(());
        }

        let instr = parse_instruction(&mnemonic, &operands, line_num)?;
        self.output.extend(encode(&instr));
        Ok(())
    }
}

fn parse_instruction(mnemonic: &str, operands: &[&str], line_num: usize)
    -> Result<Instruction, AssemblerError>
{
    let op = Opcode::from_mnemonic(mnemonic).ok_or_else(|| AssemblerError::UnknownMnemonic {
        line: line_num,
        mnemonic: mnemonic.to_string(),
    })?;

    if operands.len() != op.operand_count() {
        return Err(AssemblerError::OperandCount {
            line: line_num,
            mnemonic: mnemonic.to_string(),
            expected: op.operand_count(),
            found: operands.len(),
        });
    }

    let instr = match op {
        Opcode::Hlt => Instruction::Hlt,
        Opcode::Ldi => Instruction::Ldi {
            reg: parse_register(operands[0], line_num)?,
            value: parse_immediate(operands[1], line_num)?,
        },
        Opcode::Prn => Instruction::Prn {
            reg: parse_register(operands[0], line_num)?,
        },
        Opcode::Add => Instruction::Add {
            reg_a: parse_register(operands[0], line_num)?,
            reg_b: parse_register(operands[1], line_num)?,
        },
        Opcode::Mul => Instruction::Mul {
            reg_a: parse_register(operands[0], line_num)?,
            reg_b: parse_register(operands[1], line_num)?,
        },
    };

    Ok(instr)
}

/// Parse `R0`..`R7`.
fn parse_register(operand: &str, line_num: usize) -> Result<u8, AssemblerError> {
    let invalid = || AssemblerError::InvalidRegister {
        line: line_num,
        operand: operand.to_string(),
    };

    let index = operand
        .strip_prefix(['R', 'r'])
        .ok_or_else(invalid)?
        .parse::<u8>()
        .map_err(|_| invalid())?;

    if index as usize >= REGISTER_COUNT {
        return Err(invalid());
    }

    Ok(index)
}

/// Parse a byte literal: decimal, `0x` hex or `0b` binary.
fn parse_immediate(operand: &str, line_num: usize) -> Result<u8, AssemblerError> {
    let syntax = |message: &str| AssemblerError::SyntaxError {
        line: line_num,
        message: format!("{}: `{}`", message, operand),
    };

    let value = if let Some(hex) = operand.strip_prefix("0x").or_else(|| operand.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).map_err(|_| syntax("invalid hex literal"))?
    } else if let Some(bin) = operand.strip_prefix("0b").or_else(|| operand.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).map_err(|_| syntax("invalid binary literal"))?
    } else {
        operand.parse::<i64>().map_err(|_| syntax("invalid number"))?
    };

    u8::try_from(value).map_err(|_| AssemblerError::ValueOutOfRange { line: line_num, value })
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("line {line}: {mnemonic} takes {expected} operand(s), found {found}")]
    OperandCount { line: usize, mnemonic: String, expected: usize, found: usize },

    #[error("invalid register on line {line}: {operand} (expected R0-R7)")]
    InvalidRegister { line: usize, operand: String },

    #[error("value out of range on line {line}: {value} (expected 0-255)")]
    ValueOutOfRange { line: usize, value: i64 },

    #[error("program is {size} bytes, memory holds 256")]
    ProgramTooLarge { size: usize },
}
