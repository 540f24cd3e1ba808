//! Minimal demo harness for the zcpu core.
//!
//! Takes zero or one CLI argument: a path to a raw program image (a flat
//! sequence of 32-bit little-endian words, no header). With no argument, a
//! tiny built-in demo program runs instead. This binary is the one place
//! in the crate that installs a logger; library code never does.

use std::env;
use std::fs;
use std::process::ExitCode;

use zcpu_sim::Computer;

/// Parse a raw program image: a flat sequence of 32-bit little-endian
/// words, no header or metadata, per the core's external interface.
fn parse_program_image(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
        .collect()
}

/// `NOT R0,R0` three times, matching the triple-NOT scenario from the
/// testable properties: toggles R0 between all-ones and all-zeros.
fn demo_program() -> Vec<u32> {
    let not_r0_r0 = 0x02u32 << 26;
    vec![not_r0_r0; 3]
}

fn main() -> ExitCode {
    env_logger::init();

    let path = env::args().nth(1);
    let program = match path {
        Some(path) => match fs::read(&path) {
            Ok(bytes) => parse_program_image(&bytes),
            Err(err) => {
                eprintln!("failed to read program image {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => demo_program(),
    };

    let mut computer = Computer::build();
    if let Err(err) = computer.load_program(&program, 0) {
        eprintln!("failed to load program: {err}");
        return ExitCode::FAILURE;
    }

    let instruction_count = program.len().max(1);
    for _ in 0..instruction_count {
        computer.single_step();
        let state = computer.cpu_state();
        println!(
            "pc={:#010x} ccr={:#05b} r0={:#010x} cycles={}",
            state.pc,
            state.ccr,
            state.registers[0],
            computer.elapsed_cycles()
        );
    }

    ExitCode::SUCCESS
}
