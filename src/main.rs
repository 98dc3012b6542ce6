//! LS-8 Emulator - CLI Entry Point
//!
//! Commands:
//! - `ls8-emu run <program>` - Run an `.ls8` image or `.asm` source
//! - `ls8-emu debug <program>` - Interactive debugger
//! - `ls8-emu asm <source>` - Assemble to an `.ls8` image
//! - `ls8-emu disasm <program>` - Disassemble an image
//!
//! Program output (PRN, and TRACE lines with `--trace`) goes to stdout.
//! Diagnostics go to stderr; set `RUST_LOG` to see more of them.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ls8-emu")]
#[command(version)]
#[command(about = "An emulator for the LS-8 8-bit virtual CPU")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the .ls8 image or .asm source to execute
        program: String,
        /// Print a TRACE line before every cycle
        #[arg(short, long)]
        trace: bool,
        /// Write the final machine state as JSON to this file
        #[arg(long)]
        dump_state: Option<String>,
    },
    /// Interactive debugger
    #[cfg(feature = "tui")]
    Debug {
        /// Path to the .ls8 image or .asm source to debug
        program: String,
    },
    /// Assemble source to an .ls8 image
    Asm {
        /// Path to the source file
        source: String,
        /// Output image file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble an .ls8 image to readable text
    Disasm {
        /// Path to the image file
        program: String,
    },
}

/// Initialize logging on stderr.
///
/// `RUST_LOG` overrides the default filter, which only shows warnings.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { program, trace, dump_state } => {
            run_program(&program, trace, dump_state.as_deref())
        }
        #[cfg(feature = "tui")]
        Commands::Debug { program } => debug_program(&program),
        Commands::Asm { source, output } => assemble_file(&source, output),
        Commands::Disasm { program } => disassemble_file(&program),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}

/// Load program bytes, assembling first if the path ends in `.asm`.
fn load_bytes(path: &str) -> Result<Vec<u8>, String> {
    use ls8::{assemble, load_image};

    if path.ends_with(".asm") {
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path, e))?;
        let bytes = assemble(&source).map_err(|e| format!("assembly error: {}", e))?;
        info!(bytes = bytes.len(), path, "assembled");
        Ok(bytes)
    } else {
        let image = load_image(path).map_err(|e| format!("failed to load {}: {}", path, e))?;
        info!(bytes = image.len(), path, "loaded image");
        Ok(image.bytes)
    }
}

fn run_program(path: &str, trace: bool, dump_state: Option<&str>) -> Result<(), String> {
    use ls8::Cpu;

    let program = load_bytes(path)?;

    let mut cpu = Cpu::new();
    cpu.load_program(&program)
        .map_err(|e| format!("failed to load program: {}", e))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = if trace {
        run_traced(&mut cpu, &mut out)
    } else {
        cpu.run(&mut out)
    };
    let flushed = out.flush();
    let dumped = match dump_state {
        Some(state_path) => write_state(&cpu, state_path),
        None => Ok(()),
    };

    // The execution error takes precedence over output and dump failures.
    let cycles = result.map_err(|e| format!("CPU error at PC={:02X}: {}", cpu.regs.pc, e))?;
    flushed.map_err(|e| format!("failed to flush output: {}", e))?;
    dumped?;

    info!(cycles, "halted");
    Ok(())
}

/// Write the machine state as pretty JSON.
fn write_state(cpu: &ls8::Cpu, path: &str) -> Result<(), String> {
    let json = serde_json::to_string_pretty(cpu)
        .map_err(|e| format!("failed to serialize state: {}", e))?;
    std::fs::write(path, json).map_err(|e| format!("failed to write {}: {}", path, e))
}

/// `Cpu::run` with a TRACE line printed ahead of each cycle.
fn run_traced<W: Write>(cpu: &mut ls8::Cpu, out: &mut W) -> Result<u64, ls8::CpuError> {
    let start_cycles = cpu.cycles;

    while cpu.is_running() {
        let line = cpu.trace()?;
        writeln!(out, "{}", line).map_err(|e| ls8::CpuError::Output(e.to_string()))?;
        cpu.step(out)?;
    }

    Ok(cpu.cycles - start_cycles)
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) -> Result<(), String> {
    use ls8::tui::run_debugger;

    let program = load_bytes(path)?;
    run_debugger(program).map_err(|e| format!("debugger error: {}", e))
}

fn assemble_file(source_path: &str, output: Option<String>) -> Result<(), String> {
    use ls8::{assemble, save_image, ProgramImage};

    let out_path = output.unwrap_or_else(|| {
        match source_path.strip_suffix(".asm") {
            Some(stem) => format!("{}.ls8", stem),
            None => format!("{}.ls8", source_path),
        }
    });

    let source = std::fs::read_to_string(source_path)
        .map_err(|e| format!("failed to read {}: {}", source_path, e))?;
    let bytes = assemble(&source).map_err(|e| format!("assembly error: {}", e))?;

    let image = ProgramImage::from_bytes(&bytes);
    save_image(&out_path, &image)
        .map_err(|e| format!("failed to save {}: {}", out_path, e))?;

    info!(bytes = bytes.len(), path = out_path.as_str(), "image written");
    Ok(())
}

fn disassemble_file(path: &str) -> Result<(), String> {
    use ls8::{disassemble, load_image};

    let image = load_image(path).map_err(|e| format!("failed to load {}: {}", path, e))?;
    print!("{}", disassemble(&image.bytes));
    Ok(())
}
