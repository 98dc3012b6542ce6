//! CPU execution engine for the LS-8.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::{Memory, Registers};
use crate::cpu::alu::{self, AluError, AluOp};
use crate::cpu::decode::{self, Instruction, DecodeError};
use crate::cpu::memory::MemoryError;
use crate::cpu::registers::RegisterError;
use serde::{Serialize, Deserialize};
use std::fmt::Write as _;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, trace};

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has halted (executed HLT instruction).
    Halted,
}

/// The LS-8 CPU.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers, PC and flags.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Cycle count, skipped bytes included.
    pub cycles: u64,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU with zeroed state.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: CpuState::Running,
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset the CPU to initial state.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = CpuState::Running;
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Load a program image into memory at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.mem.load_program(0, program)?;
        debug!(bytes = program.len(), "program loaded");
        Ok(())
    }

    /// Execute a single cycle, writing any PRN output to `out`.
    ///
    /// Returns the instruction that was executed, or `None` when the byte
    /// at PC was not a known opcode and was skipped.
    pub fn step<W: Write>(&mut self, out: &mut W) -> Result<Option<Instruction>, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        // Fetch, with both operand candidates read up front
        let pc = self.regs.pc;
        let opcode = self.mem.read(pc)?;
        let operand_a = self.mem.read(pc + 1)?;
        let operand_b = self.mem.read(pc + 2)?;

        // Decode
        let instr = match decode::decode(opcode, operand_a, operand_b) {
            Ok(instr) => instr,
            Err(DecodeError::UnknownOpcode(byte)) => {
                // Unknown bytes are consumed one at a time and execution goes on.
                debug!(pc, opcode = byte, "unrecognized opcode, skipping");
                self.regs.advance_pc(1);
                self.cycles += 1;
                return Ok(None);
            }
        };
        trace!(pc, ?instr, "execute");

        // Execute
        self.execute(instr, out)?;

        if self.state == CpuState::Running {
            self.regs.advance_pc(instr.width());
        }

        self.cycles += 1;
        self.last_instr = Some(instr);

        Ok(Some(instr))
    }

    /// Run until halt or error.
    ///
    /// There is no cycle budget: a program that never reaches HLT runs
    /// until it faults.
    ///
    /// Returns the number of cycles executed.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step(out)?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` cycles.
    pub fn run_limited<W: Write>(&mut self, out: &mut W, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == CpuState::Running && self.cycles < limit {
            self.step(out)?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Execute a decoded instruction.
    fn execute<W: Write>(&mut self, instr: Instruction, out: &mut W) -> Result<(), CpuError> {
        match instr {
            Instruction::Hlt => {
                self.state = CpuState::Halted;
                debug!(pc = self.regs.pc, cycles = self.cycles + 1, "halted");
            }

            Instruction::Ldi { reg, value } => {
                self.regs.write(reg as usize, value)?;
            }

            Instruction::Prn { reg } => {
                let value = self.regs.read(reg as usize)?;
                writeln!(out, "{}", value).map_err(|e| CpuError::Output(e.to_string()))?;
            }

            Instruction::Add { reg_a, reg_b } => {
                alu::apply(&mut self.regs, AluOp::Add, reg_a as usize, reg_b as usize)?;
            }

            Instruction::Mul { reg_a, reg_b } => {
                alu::apply(&mut self.regs, AluOp::Mul, reg_a as usize, reg_b as usize)?;
            }
        }

        Ok(())
    }

    /// Run an ALU operation by name, as in `cpu.alu("ADD", 0, 1)`.
    pub fn alu(&mut self, op: &str, reg_a: usize, reg_b: usize) -> Result<u8, CpuError> {
        let op: AluOp = op.parse()?;
        Ok(alu::apply(&mut self.regs, op, reg_a, reg_b)?)
    }

    /// Render the diagnostic trace line for the current cycle:
    /// `TRACE: PC | op a b | R0 .. R7`, all in two-digit hex.
    pub fn trace(&self) -> Result<String, CpuError> {
        let pc = self.regs.pc;
        let mut line = format!(
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            pc,
            self.mem.read(pc)?,
            self.mem.read(pc + 1)?,
            self.mem.read(pc + 2)?,
        );

        for value in self.regs.values() {
            let _ = write!(line, " {:02X}", value);
        }

        Ok(line)
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("memory error: {0}")]
    MemoryError(#[from] MemoryError),

    #[error("register error: {0}")]
    RegisterError(#[from] RegisterError),

    #[error("ALU error: {0}")]
    AluError(#[from] AluError),

    #[error("output error: {0}")]
    Output(String),
}
