//! LS-8 memory subsystem.
//!
//! 256 byte-wide cells, addressed 0-255. Programs are loaded at address 0
//! and share the same space as any data they touch.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of memory cells in the LS-8.
pub const MEMORY_SIZE: usize = 256;

/// Kind of access that triggered a bounds failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Read,
    Write,
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

/// LS-8 memory: 256 byte cells.
///
/// Snapshots that do not hold exactly [`MEMORY_SIZE`] cells are rejected
/// on deserialization.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "MemorySnapshot")]
pub struct Memory {
    cells: Vec<u8>,
}

/// Wire form of [`Memory`], checked before it becomes one.
#[derive(Deserialize)]
struct MemorySnapshot {
    cells: Vec<u8>,
}

impl TryFrom<MemorySnapshot> for Memory {
    type Error = MemoryError;

    fn try_from(snapshot: MemorySnapshot) -> Result<Self, Self::Error> {
        if snapshot.cells.len() != MEMORY_SIZE {
            return Err(MemoryError::InvalidSize { size: snapshot.cells.len() });
        }
        Ok(Self { cells: snapshot.cells })
    }
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read a cell by address (0-255).
    #[inline]
    pub fn read(&self, addr: usize) -> Result<u8, MemoryError> {
        self.cells
            .get(addr)
            .copied()
            .ok_or(MemoryError::OutOfRange { addr, access: Access::Read })
    }

    /// Write a cell by address (0-255).
    #[inline]
    pub fn write(&mut self, addr: usize, value: u8) -> Result<(), MemoryError> {
        let cell = self.cells
            .get_mut(addr)
            .ok_or(MemoryError::OutOfRange { addr, access: Access::Write })?;
        *cell = value;
        Ok(())
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Load a program into memory starting at the given address.
    pub fn load_program(&mut self, start_addr: usize, program: &[u8]) -> Result<(), MemoryError> {
        let available = self.cells.len().saturating_sub(start_addr);
        if program.len() > available {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available,
            });
        }

        self.cells[start_addr..start_addr + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Dump memory contents (for debugging).
    pub fn dump(&self, start: usize, count: usize) -> Vec<(usize, u8)> {
        let end = start.saturating_add(count).min(self.cells.len());
        (start.min(end)..end)
            .map(|i| (i, self.cells[i]))
            .collect()
    }

    /// The whole address space as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only count non-zero cells
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &self.cells.len())
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory {access} at address {addr} out of range (0-255)")]
    OutOfRange { addr: usize, access: Access },

    #[error("program size {size} exceeds available space {available}")]
    ProgramTooLarge { size: usize, available: usize },

    #[error("memory snapshot holds {size} cells, expected 256")]
    InvalidSize { size: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();

        mem.write(10, 42).unwrap();
        assert_eq!(mem.read(10).unwrap(), 42);
    }

    #[test]
    fn test_memory_starts_zeroed() {
        let mem = Memory::new();
        assert!(mem.as_slice().iter().all(|&b| b == 0));
        assert_eq!(mem.as_slice().len(), MEMORY_SIZE);
    }

    #[test]
    fn test_memory_bounds() {
        let mut mem = Memory::new();

        assert!(mem.read(0).is_ok());
        assert!(mem.read(255).is_ok());

        assert_eq!(
            mem.read(256),
            Err(MemoryError::OutOfRange { addr: 256, access: Access::Read })
        );
        assert_eq!(
            mem.write(300, 1),
            Err(MemoryError::OutOfRange { addr: 300, access: Access::Write })
        );
    }

    #[test]
    fn test_out_of_range_message() {
        let err = Memory::new().read(256).unwrap_err();
        assert_eq!(err.to_string(), "memory read at address 256 out of range (0-255)");
    }

    #[test]
    fn test_load_program() {
        let mut mem = Memory::new();
        mem.load_program(0, &[1, 2, 3]).unwrap();

        assert_eq!(mem.read(0).unwrap(), 1);
        assert_eq!(mem.read(1).unwrap(), 2);
        assert_eq!(mem.read(2).unwrap(), 3);
        assert_eq!(mem.read(3).unwrap(), 0);
    }

    #[test]
    fn test_load_program_too_large() {
        let mut mem = Memory::new();
        let program = vec![0xAA; 10];

        assert_eq!(
            mem.load_program(250, &program),
            Err(MemoryError::ProgramTooLarge { size: 10, available: 6 })
        );
        assert!(mem.load_program(0, &vec![0; MEMORY_SIZE]).is_ok());
    }

    #[test]
    fn test_dump_clamps_to_memory() {
        let mut mem = Memory::new();
        mem.write(255, 7).unwrap();

        let dump = mem.dump(254, 10);
        assert_eq!(dump, vec![(254, 0), (255, 7)]);
        assert!(mem.dump(300, 4).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut mem = Memory::new();
        mem.load_program(0, &[9, 9, 9]).unwrap();
        mem.clear();
        assert_eq!(mem.read(1).unwrap(), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut mem = Memory::new();
        mem.write(3, 0xAB).unwrap();

        let json = serde_json::to_string(&mem).unwrap();
        let restored: Memory = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.read(3).unwrap(), 0xAB);
        assert_eq!(restored.as_slice().len(), MEMORY_SIZE);
    }

    #[test]
    fn test_snapshot_wrong_size_rejected() {
        let oversized = serde_json::json!({ "cells": vec![7u8; 300] });
        let err = serde_json::from_value::<Memory>(oversized).unwrap_err();
        assert!(err.to_string().contains("300 cells"));

        let undersized = serde_json::json!({ "cells": vec![0u8; 16] });
        assert!(serde_json::from_value::<Memory>(undersized).is_err());
    }

    proptest! {
        #[test]
        fn prop_write_then_read(addr in 0usize..MEMORY_SIZE, value: u8) {
            let mut mem = Memory::new();
            mem.write(addr, value).unwrap();
            prop_assert_eq!(mem.read(addr).unwrap(), value);
        }

        #[test]
        fn prop_out_of_range_rejected(addr in MEMORY_SIZE..usize::MAX) {
            let mut mem = Memory::new();
            prop_assert!(mem.read(addr).is_err());
            prop_assert!(mem.write(addr, 1).is_err());
        }
    }
}
