/*!
Pipeline FSM: the seven-stage state machine that drives one instruction's
worth of architectural effects per "instruction completion," across a
variable number of global ticks.

    state.rs   - Architectural + pipeline-scratch state (registers, CCR,
                 PC, IR/MDR/MAR, saved interrupt context).
    decode.rs  - Instruction-word field extraction and sign extension.
    opcode.rs  - The opcode tagged sum and its classification helpers.
    execute.rs - EXECUTE-stage semantics for every opcode.

`Cpu::tick` advances exactly one pipeline stage and returns whether that
tick completed an instruction (EXECUTE, or MEMORY2 for stores). The tick
orchestrator (`crate::computer`) calls this once per global tick, followed
by the bus and every device's own tick.
*/

pub mod decode;
pub mod execute;
pub mod opcode;
pub mod state;

use crate::bus::Bus;
use crate::interrupt::InterruptController;

pub use decode::{decode as decode_instruction, sign_extend};
pub use opcode::Opcode;
pub use state::{CpuState, PipelineStage};

#[derive(Clone, Debug, Default)]
pub struct Cpu {
    pub state: CpuState,
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            state: CpuState::new(),
        }
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn pc(&self) -> u32 {
        self.state.pc
    }

    /// Advance the pipeline by exactly one stage. Returns `true` if this
    /// tick completed an instruction.
    pub fn tick(&mut self, bus: &mut Bus, ic: &mut InterruptController) -> bool {
        log::trace!("cpu stage={:?} pc={:#010x}", self.state.pipeline_stage, self.state.pc);
        match self.state.pipeline_stage {
            PipelineStage::Interrupt => {
                self.interrupt_stage(ic);
                false
            }
            PipelineStage::Fetch1 => {
                self.fetch1_stage(bus);
                false
            }
            PipelineStage::Fetch2 => {
                self.fetch2_stage(bus);
                false
            }
            PipelineStage::Decode => {
                self.decode_stage();
                false
            }
            PipelineStage::Memory1 => {
                self.memory1_stage(bus);
                false
            }
            PipelineStage::Memory2 => self.memory2_stage(bus),
            PipelineStage::Execute => {
                execute::execute(&mut self.state, ic);
                self.state.pipeline_stage = PipelineStage::Interrupt;
                true
            }
        }
    }

    fn interrupt_stage(&mut self, ic: &mut InterruptController) {
        if ic.is_pending() && !self.state.interrupt_in_progress() {
            let irq = ic.take_source().expect("is_pending implies take_source succeeds");
            if execute::should_save_context(irq) {
                self.state.saved_context = Some(self.state.snapshot_context());
            } else {
                self.state.saved_context = None;
            }
            self.state.set_interrupt_in_progress(true);
            self.state.pc = ic.vector_address(irq);
            log::debug!("servicing irq {irq}, vector={:#010x}", self.state.pc);
        }
        self.state.pipeline_stage = PipelineStage::Fetch1;
    }

    fn fetch1_stage(&mut self, bus: &mut Bus) {
        self.state.mar = self.state.pc;
        self.state.pc = self.state.pc.wrapping_add(1);
        bus.begin_read(self.state.mar);
        self.state.pipeline_stage = PipelineStage::Fetch2;
    }

    fn fetch2_stage(&mut self, bus: &mut Bus) {
        if bus.is_device_ready() {
            self.state.mdr = bus.data_lines();
            self.state.ir = self.state.mdr;
            bus.clear_device_ready();
            bus.disable();
            self.state.pipeline_stage = PipelineStage::Decode;
        }
    }

    fn decode_stage(&mut self) {
        let decoded = decode::decode(self.state.ir);
        self.state.decoded = decoded;

        self.state.pipeline_stage = if decoded.opcode().is_load_effective_address() {
            PipelineStage::Execute
        } else if decoded.opcode().is_memory_op() {
            PipelineStage::Memory1
        } else {
            PipelineStage::Execute
        };
    }

    fn memory1_stage(&mut self, bus: &mut Bus) {
        let decoded = self.state.decoded;
        let opcode = decoded.opcode();

        let address = if opcode.is_pc_relative_memory() {
            self.state.pc.wrapping_add(decoded.offset_pc21)
        } else {
            self.state.registers[decoded.base as usize].wrapping_add(decoded.offset_base)
        };
        self.state.mar = address;

        if opcode.is_store() {
            let value = self.state.registers[decoded.store_source as usize];
            bus.begin_write(address, value);
        } else {
            bus.begin_read(address);
        }
        self.state.pipeline_stage = PipelineStage::Memory2;
    }

    /// Returns `true` if this tick completed the instruction (store path).
    fn memory2_stage(&mut self, bus: &mut Bus) -> bool {
        if !bus.is_device_ready() {
            return false;
        }

        // Read the data lines before clearing device_ready/disabling the
        // bus, fixing the historical source's read-after-clear race.
        let data = bus.data_lines();
        bus.clear_device_ready();
        bus.disable();

        if self.state.decoded.opcode().is_store() {
            self.state.pipeline_stage = PipelineStage::Interrupt;
            true
        } else {
            self.state.mdr = data;
            self.state.pipeline_stage = PipelineStage::Execute;
            false
        }
    }
}
