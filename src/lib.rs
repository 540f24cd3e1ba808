#![doc = r#"
zcpu-sim: a cycle-accurate simulator for the zcpu 32-bit RISC-style machine.

Models, at bus-cycle granularity, the interaction of a CPU pipeline, a
shared address/data bus, memory-mapped devices (RAM, framebuffer,
keyboard), a programmable timer, and a vectored interrupt controller.
Every component is clocked in lockstep by a single global tick owned by
`Computer`.

Modules:
- bus: shared address/data bus, address-map decode, device-ready handshake
- computer: the tick orchestrator and embedder-facing API
- cpu: the seven-stage pipeline FSM, decoder, and opcode semantics
- error: the one fallible seam (`load_program`)
- interrupt: vectored interrupt controller (pending-IRQ FIFO)
- keyboard: memory-mapped keyboard register device
- memory: word-addressed RAM device
- queue: bounded ring buffer primitive underneath the interrupt controller
- timer: programmable prescaled timer with sticky overflow
- video: memory-mapped RGBA8888 framebuffer device

In tests, shared instruction-encoding helpers are available under
`crate::test_utils`.
"#]

pub mod bus;
pub mod computer;
pub mod cpu;
pub mod error;
pub mod interrupt;
pub mod keyboard;
pub mod memory;
pub mod queue;
pub mod timer;
pub mod video;

pub use computer::{Computer, ComputerConfig};
pub use cpu::Cpu;
pub use error::LoadError;

#[cfg(test)]
pub mod test_utils;
