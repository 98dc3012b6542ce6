//! Instruction decoder for the LS-8.
//!
//! Instructions are one opcode byte followed by zero, one or two operand
//! bytes. The opcode alone determines the width, via a 256-entry table
//! built at compile time.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The LS-8 opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    Hlt = 0b0000_0001,
    Ldi = 0b1000_0010,
    Prn = 0b0100_0111,
    Add = 0b1010_0000,
    Mul = 0b1010_0010,
}

impl Opcode {
    pub const ALL: [Opcode; 5] = [Opcode::Hlt, Opcode::Ldi, Opcode::Prn, Opcode::Add, Opcode::Mul];

    /// Look up an opcode byte.
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        OPCODE_TABLE[byte as usize]
    }

    /// Look up a mnemonic (case-insensitive).
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Hlt => "HLT",
            Opcode::Ldi => "LDI",
            Opcode::Prn => "PRN",
            Opcode::Add => "ADD",
            Opcode::Mul => "MUL",
        }
    }

    /// Number of operand bytes following the opcode.
    pub const fn operand_count(self) -> usize {
        match self {
            Opcode::Hlt => 0,
            Opcode::Prn => 1,
            Opcode::Ldi | Opcode::Add | Opcode::Mul => 2,
        }
    }

    /// Total instruction width in bytes, opcode included.
    pub const fn width(self) -> usize {
        1 + self.operand_count()
    }
}

const OPCODE_TABLE: [Option<Opcode>; 256] = build_opcode_table();

const fn build_opcode_table() -> [Option<Opcode>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < Opcode::ALL.len() {
        let op = Opcode::ALL[i];
        table[op as usize] = Some(op);
        i += 1;
    }
    table
}

/// Decoded LS-8 instruction.
///
/// Register operands are kept as raw bytes; range checking happens when
/// the register file is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Halt execution
    Hlt,

    /// Load immediate: R[reg] := value
    Ldi { reg: u8, value: u8 },

    /// Print R[reg] as a decimal line
    Prn { reg: u8 },

    /// R[reg_a] := R[reg_a] + R[reg_b]
    Add { reg_a: u8, reg_b: u8 },

    /// R[reg_a] := R[reg_a] * R[reg_b]
    Mul { reg_a: u8, reg_b: u8 },
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Hlt => Opcode::Hlt,
            Instruction::Ldi { .. } => Opcode::Ldi,
            Instruction::Prn { .. } => Opcode::Prn,
            Instruction::Add { .. } => Opcode::Add,
            Instruction::Mul { .. } => Opcode::Mul,
        }
    }

    pub fn width(&self) -> usize {
        self.opcode().width()
    }
}

/// Decode an opcode byte and its two candidate operand bytes.
///
/// Operand bytes the instruction does not use are ignored.
pub fn decode(opcode: u8, operand_a: u8, operand_b: u8) -> Result<Instruction, DecodeError> {
    let op = Opcode::from_byte(opcode).ok_or(DecodeError::UnknownOpcode(opcode))?;

    let instruction = match op {
        Opcode::Hlt => Instruction::Hlt,
        Opcode::Ldi => Instruction::Ldi { reg: operand_a, value: operand_b },
        Opcode::Prn => Instruction::Prn { reg: operand_a },
        Opcode::Add => Instruction::Add { reg_a: operand_a, reg_b: operand_b },
        Opcode::Mul => Instruction::Mul { reg_a: operand_a, reg_b: operand_b },
    };

    Ok(instruction)
}

/// Encode an instruction to its byte form.
pub fn encode(instr: &Instruction) -> Vec<u8> {
    let op = instr.opcode().byte();
    match *instr {
        Instruction::Hlt => vec![op],
        Instruction::Prn { reg } => vec![op, reg],
        Instruction::Ldi { reg, value } => vec![op, reg, value],
        Instruction::Add { reg_a, reg_b } | Instruction::Mul { reg_a, reg_b } => {
            vec![op, reg_a, reg_b]
        }
    }
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode: {0:#010b}")]
    UnknownOpcode(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_opcodes() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_byte(op.byte()), Some(op));
        }
        let known = (0..=255u8).filter(|&b| Opcode::from_byte(b).is_some()).count();
        assert_eq!(known, Opcode::ALL.len());
    }

    #[test]
    fn test_widths() {
        assert_eq!(Opcode::Hlt.width(), 1);
        assert_eq!(Opcode::Prn.width(), 2);
        assert_eq!(Opcode::Ldi.width(), 3);
        assert_eq!(Opcode::Add.width(), 3);
        assert_eq!(Opcode::Mul.width(), 3);
    }

    #[test]
    fn test_operand_count_matches_high_bits() {
        // The top two bits of every LS-8 opcode carry its operand count.
        for op in Opcode::ALL {
            assert_eq!(op.operand_count(), (op.byte() >> 6) as usize, "{:?}", op);
        }
    }

    #[test]
    fn test_decode_hlt_ignores_operands() {
        assert_eq!(decode(0b0000_0001, 0xFF, 0xFF).unwrap(), Instruction::Hlt);
    }

    #[test]
    fn test_decode_ldi() {
        let instr = decode(0b1000_0010, 0, 8).unwrap();
        assert_eq!(instr, Instruction::Ldi { reg: 0, value: 8 });
        assert_eq!(instr.width(), 3);
    }

    #[test]
    fn test_decode_prn() {
        assert_eq!(decode(0b0100_0111, 2, 0x55).unwrap(), Instruction::Prn { reg: 2 });
    }

    #[test]
    fn test_decode_alu_ops() {
        assert_eq!(
            decode(0b1010_0000, 0, 1).unwrap(),
            Instruction::Add { reg_a: 0, reg_b: 1 }
        );
        assert_eq!(
            decode(0b1010_0010, 3, 4).unwrap(),
            Instruction::Mul { reg_a: 3, reg_b: 4 }
        );
    }

    #[test]
    fn test_decode_unknown() {
        assert_eq!(decode(0, 0, 0), Err(DecodeError::UnknownOpcode(0)));
        assert_eq!(decode(0xFF, 0, 0), Err(DecodeError::UnknownOpcode(0xFF)));
    }

    #[test]
    fn test_encode_widths() {
        assert_eq!(encode(&Instruction::Hlt), vec![0b0000_0001]);
        assert_eq!(encode(&Instruction::Prn { reg: 0 }), vec![0b0100_0111, 0]);
        assert_eq!(
            encode(&Instruction::Ldi { reg: 0, value: 8 }),
            vec![0b1000_0010, 0, 8]
        );
    }

    #[test]
    fn test_mnemonic_lookup() {
        assert_eq!(Opcode::from_mnemonic("ldi"), Some(Opcode::Ldi));
        assert_eq!(Opcode::from_mnemonic("MUL"), Some(Opcode::Mul));
        assert_eq!(Opcode::from_mnemonic("SUB"), None);
    }
}
