/*!
The one fallible seam the core exposes to its embedder: loading a program
image into memory. Everything else in the core is either infallible by
construction or an architectural panic (see the error taxonomy in the
design documentation) rather than a recoverable `Result`.
*/

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    #[error(
        "program of {program_len} word(s) starting at {start_address} overruns memory of {memory_len} word(s)"
    )]
    ProgramTooLarge {
        program_len: usize,
        start_address: u32,
        memory_len: usize,
    },
}
