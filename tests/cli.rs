//! End-to-end tests of the `ls8-emu` binary: output streams and exit status.

use std::path::PathBuf;
use std::process::{Command, Output};

fn program(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("programs").join(name)
}

/// Write `contents` to a fresh file under the system temp dir.
fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ls8-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn ls8(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ls8-emu"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_run_print8() {
    let path = program("print8.ls8");
    let output = ls8(&["run", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "8\n");
    assert_eq!(stderr_of(&output), "");
}

#[test]
fn test_run_mult() {
    let path = program("mult.ls8");
    let output = ls8(&["run", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "90\n");
}

#[test]
fn test_run_assembly_source() {
    let path = program("add.asm");
    let output = ls8(&["run", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "44\n");
}

#[test]
fn test_run_all_zero_image_faults() {
    let path = scratch_file("zero.ls8", "00000000\n");
    let output = ls8(&["run", path.to_str().unwrap()]);
    let stderr = stderr_of(&output);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_of(&output), "");
    assert!(stderr.starts_with("error: "), "stderr: {stderr}");
    assert!(stderr.contains("out of range"), "stderr: {stderr}");
    // Skipped bytes are not reported at the default log level.
    assert!(!stderr.contains("unrecognized opcode"), "stderr: {stderr}");
    assert_eq!(stderr.lines().count(), 1);
}

#[test]
fn test_run_malformed_image() {
    let path = scratch_file("bad.ls8", "10000010\n2\n");
    let output = ls8(&["run", path.to_str().unwrap()]);
    let stderr = stderr_of(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.starts_with("error: failed to load"), "stderr: {stderr}");
    assert!(stderr.contains("line 2"), "stderr: {stderr}");
}

#[test]
fn test_run_missing_file() {
    let output = ls8(&["run", "/nonexistent/program.ls8"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).starts_with("error: failed to load"));
}

#[test]
fn test_run_assembly_error() {
    let path = scratch_file("bad.asm", "LDI R0,8\nJMP R0\n");
    let output = ls8(&["run", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).starts_with("error: assembly error"));
}

#[test]
fn test_run_trace() {
    let path = program("mult.ls8");
    let output = ls8(&["run", "--trace", path.to_str().unwrap()]);
    let stdout = stdout_of(&output);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        lines,
        vec![
            "TRACE: 00 | 82 00 09 | 00 00 00 00 00 00 00 00",
            "TRACE: 03 | 82 01 0A | 09 00 00 00 00 00 00 00",
            "TRACE: 06 | A2 00 01 | 09 0A 00 00 00 00 00 00",
            "TRACE: 09 | 47 00 01 | 5A 0A 00 00 00 00 00 00",
            "90",
            "TRACE: 0B | 01 00 00 | 5A 0A 00 00 00 00 00 00",
        ]
    );
}

#[test]
fn test_run_dump_state() {
    let program_path = program("print8.ls8");
    let state_path = scratch_file("state.json", "");
    let output = ls8(&[
        "run",
        "--dump-state",
        state_path.to_str().unwrap(),
        program_path.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(0));

    let json = std::fs::read_to_string(&state_path).unwrap();
    let cpu: ls8::Cpu = serde_json::from_str(&json).unwrap();
    assert!(cpu.is_halted());
    assert_eq!(cpu.regs.read(0).unwrap(), 8);
    assert_eq!(cpu.regs.pc, 5);
}

#[test]
fn test_run_error_reported_before_dump_failure() {
    let path = scratch_file("zero-dump.ls8", "00000000\n");
    let output = ls8(&[
        "run",
        "--dump-state",
        "/nonexistent/dir/state.json",
        path.to_str().unwrap(),
    ]);
    let stderr = stderr_of(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("out of range"), "stderr: {stderr}");
}

#[test]
fn test_run_dump_failure_after_halt() {
    let path = program("print8.ls8");
    let output = ls8(&[
        "run",
        "--dump-state",
        "/nonexistent/dir/state.json",
        path.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_of(&output), "8\n");
    assert!(stderr_of(&output).starts_with("error: failed to write"));
}

#[test]
fn test_asm_then_disasm() {
    let source = scratch_file("roundtrip.asm", "LDI R2,7\nPRN R2\nHLT\n");
    let image = source.with_extension("ls8");

    let output = ls8(&["asm", source.to_str().unwrap(), "-o", image.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));

    let output = ls8(&["run", image.to_str().unwrap()]);
    assert_eq!(stdout_of(&output), "7\n");

    let output = ls8(&["disasm", image.to_str().unwrap()]);
    let listing = stdout_of(&output);
    assert_eq!(output.status.code(), Some(0));
    assert!(listing.contains("LDI R2,7"), "{listing}");
    assert!(listing.contains("HLT"));
}
