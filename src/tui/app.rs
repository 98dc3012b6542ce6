//! Debugger application state and logic.

use crate::Cpu;
use crate::asm::disasm::disassemble_at;
use crate::cpu::memory::MEMORY_SIZE;
use std::collections::HashSet;

/// Number of memory rows (16 bytes each).
pub const MEMORY_ROWS: usize = MEMORY_SIZE / 16;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Loaded program, kept for reset.
    pub program: Vec<u8>,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<usize>,
    /// Lines printed by PRN so far.
    pub output: Vec<String>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory view scroll offset, in rows.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(program: Vec<u8>) -> Self {
        let mut app = Self {
            cpu: Cpu::new(),
            program,
            breakpoints: HashSet::new(),
            output: Vec::new(),
            running: false,
            should_quit: false,
            status: String::new(),
            mem_scroll: 0,
        };
        app.reset();
        app.status = "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into();
        app
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.cpu.is_running() {
            self.status = format!("CPU halted: {:?}", self.cpu.state);
            self.running = false;
            return;
        }

        let pc = self.cpu.regs.pc;
        let mut printed = Vec::new();
        let result = self.cpu.step(&mut printed);

        self.output.extend(
            String::from_utf8_lossy(&printed).lines().map(str::to_string),
        );

        match result {
            Ok(Some(_)) => {
                let (disasm, _) = disassemble_at(self.cpu.mem.as_slice(), pc);
                self.status = format!("PC={:02X}: {}", pc, disasm);
            }
            Ok(None) => {
                self.status = format!("PC={:02X}: skipped unknown opcode", pc);
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    /// Run until halt, breakpoint, or error.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.cpu.is_running() {
            self.running = false;
            self.status = format!("Halted after {} cycles", self.cpu.cycles);
            return;
        }

        // Check for breakpoint
        let pc = self.cpu.regs.pc;
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={:02X}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.regs.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={:02X}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={:02X}", pc);
        }
    }

    /// Reset CPU to initial state.
    pub fn reset(&mut self) {
        self.cpu = Cpu::new();
        if let Err(e) = self.cpu.load_program(&self.program) {
            self.status = format!("Failed to load program: {}", e);
        } else {
            self.status = "Reset. Ready.".into();
        }
        self.output.clear();
        self.running = false;
    }

    /// Scroll the memory view, keeping at least one row visible.
    pub fn scroll_memory(&mut self, delta: isize) {
        let max = MEMORY_ROWS - 1;
        self.mem_scroll = self.mem_scroll.saturating_add_signed(delta).min(max);
    }

    /// Get disassembly starting at the current PC.
    ///
    /// Returns `(address, text, is_current)` for up to `lines` instructions.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(usize, String, bool)> {
        let pc = self.cpu.regs.pc;
        let mem = self.cpu.mem.as_slice();

        let mut addr = pc;
        let mut result = Vec::with_capacity(lines);
        while result.len() < lines && addr < MEMORY_SIZE {
            let (text, width) = disassemble_at(mem, addr);
            result.push((addr, text, addr == pc));
            addr += width;
        }
        result
    }
}

/// Run the debugger with a program.
pub fn run_debugger(program: Vec<u8>) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(program);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll_memory(-1),
                        KeyCode::Down => app.scroll_memory(1),
                        _ => {}
                    }
                }
            }
        }

        // Tick for continuous running
        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assemble;

    fn app_for(source: &str) -> DebuggerApp {
        DebuggerApp::new(assemble(source).unwrap())
    }

    #[test]
    fn test_step_collects_output() {
        let mut app = app_for("LDI R0,8\nPRN R0\nHLT");

        app.step();
        assert!(app.status.contains("LDI R0,8"));
        app.step();
        assert_eq!(app.output, vec!["8".to_string()]);
        app.step();
        assert!(app.cpu.is_halted());

        app.step();
        assert!(app.status.starts_with("CPU halted"));
    }

    #[test]
    fn test_breakpoint_stops_run() {
        let mut app = app_for("LDI R0,1\nLDI R1,2\nADD R0,R1\nHLT");

        app.step();
        app.toggle_breakpoint();
        assert!(app.breakpoints.contains(&3));
        app.reset();

        app.run();
        for _ in 0..10 {
            app.tick();
        }

        assert!(!app.running);
        assert_eq!(app.cpu.regs.pc, 3);
        assert!(app.status.contains("Breakpoint"));
    }

    #[test]
    fn test_run_to_halt() {
        let mut app = app_for("LDI R0,9\nLDI R1,10\nMUL R0,R1\nPRN R0\nHLT");

        app.run();
        for _ in 0..10 {
            app.tick();
        }

        assert!(app.cpu.is_halted());
        assert_eq!(app.output, vec!["90".to_string()]);
        assert!(app.status.starts_with("Halted"));
    }

    #[test]
    fn test_reset_clears_output() {
        let mut app = app_for("LDI R0,8\nPRN R0\nHLT");
        app.step();
        app.step();
        app.reset();

        assert!(app.output.is_empty());
        assert_eq!(app.cpu.regs.pc, 0);
        assert_eq!(app.cpu.mem.read(0).unwrap(), 0b1000_0010);
    }

    #[test]
    fn test_disassembly_from_pc() {
        let app = app_for("LDI R0,8\nPRN R0\nHLT");
        let listing = app.get_disassembly(3);

        assert_eq!(listing[0], (0, "LDI R0,8".to_string(), true));
        assert_eq!(listing[1], (3, "PRN R0".to_string(), false));
        assert_eq!(listing[2], (5, "HLT".to_string(), false));
    }

    #[test]
    fn test_memory_scroll_clamped() {
        let mut app = app_for("HLT");
        app.scroll_memory(-1);
        assert_eq!(app.mem_scroll, 0);
        app.scroll_memory(100);
        assert_eq!(app.mem_scroll, MEMORY_ROWS - 1);
    }
}
