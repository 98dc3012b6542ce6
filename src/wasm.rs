//! WebAssembly bindings for the LS-8 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use wasm_bindgen::prelude::*;
use crate::Cpu;
use crate::cpu::memory::MemoryError;
use crate::asm::{assemble, parse_image};
use crate::asm::disasm::disassemble_at;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
    program: Vec<u8>,
    output: Vec<u8>,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            program: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Load a program from `.ls8` image text.
    #[wasm_bindgen]
    pub fn load_image(&mut self, text: &str) -> Result<usize, JsError> {
        let image = parse_image(text)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.load_bytes(image.bytes)
    }

    /// Load a program from assembly source code.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let bytes = assemble(source)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.load_bytes(bytes)
    }

    fn load_bytes(&mut self, bytes: Vec<u8>) -> Result<usize, JsError> {
        let len = bytes.len();
        self.program = bytes;
        self.reload()
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(len)
    }

    /// Fresh CPU with the stored program written from address 0.
    fn reload(&mut self) -> Result<(), MemoryError> {
        self.cpu = Cpu::new();
        self.output.clear();
        self.cpu.load_program(&self.program)
    }

    /// Step one cycle. Returns the disassembled instruction that ran.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        if !self.cpu.is_running() {
            return Err(JsError::new("CPU is halted"));
        }

        let pc = self.cpu.regs.pc;
        let (text, _) = disassemble_at(self.cpu.mem.as_slice(), pc);
        self.cpu.step(&mut self.output)
            .map_err(|e| JsError::new(&e.to_string()))?;

        Ok(text)
    }

    /// Run until halt or max cycles. Returns the total cycle count.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> Result<u64, JsError> {
        self.cpu.run_limited(&mut self.output, max_cycles as u64)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(self.cpu.cycles)
    }

    /// Reset CPU to initial state with loaded program.
    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<(), JsError> {
        self.reload()
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Check if CPU is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    /// Check if CPU is halted.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Get cycle count.
    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> usize {
        self.cpu.regs.pc
    }

    /// Get a general-purpose register (0-7).
    #[wasm_bindgen]
    pub fn register(&self, index: usize) -> Result<u8, JsError> {
        self.cpu.regs.read(index)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Get all registers, R0 first.
    #[wasm_bindgen]
    pub fn registers(&self) -> Vec<u8> {
        self.cpu.regs.values().to_vec()
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.cpu.state)
    }

    /// Get memory cell value at address (0-255).
    #[wasm_bindgen]
    pub fn memory_at(&self, addr: usize) -> u8 {
        self.cpu.mem.read(addr).unwrap_or(0)
    }

    /// Get all memory.
    #[wasm_bindgen]
    pub fn memory_all(&self) -> Vec<u8> {
        self.cpu.mem.as_slice().to_vec()
    }

    /// Lines printed by PRN so far.
    #[wasm_bindgen]
    pub fn output_lines(&self) -> js_sys::Array {
        String::from_utf8_lossy(&self.output)
            .lines()
            .map(JsValue::from_str)
            .collect()
    }

    /// Get the whole machine state as JSON.
    #[wasm_bindgen]
    pub fn state_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.cpu)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Current trace line for the cycle about to run.
    #[wasm_bindgen]
    pub fn trace(&self) -> Result<String, JsError> {
        self.cpu.trace()
            .map_err(|e| JsError::new(&e.to_string()))
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code and return the program bytes.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<Vec<u8>, JsError> {
    assemble(source)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Disassemble the instruction at `addr` in `bytes`.
#[wasm_bindgen]
pub fn wasm_disassemble(bytes: &[u8], addr: usize) -> String {
    disassemble_at(bytes, addr).0
}
