/*!
Architectural and pipeline-scratch state owned by the CPU.

Decoded-instruction scratch fields are cached by register *index*
(`0..=31`), never by pointer or reference into the register file — this
sidesteps aliasing concerns when a single instruction both reads and
writes the same register, unlike the raw-pointer caching of the
historical source.
*/

use super::decode::Decoded;

pub const NUM_REGISTERS: usize = 32;
pub const LINK_REGISTER: usize = 30;

pub const CCR_POSITIVE: u8 = 0b001;
pub const CCR_ZERO: u8 = 0b010;
pub const CCR_NEGATIVE: u8 = 0b100;

pub const PROCESS_STATUS_INTERRUPT_IN_PROGRESS: u8 = 0b001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Interrupt,
    Fetch1,
    Fetch2,
    Decode,
    Memory1,
    Memory2,
    Execute,
}

/// A snapshot of architectural state taken on interrupt entry. Pipeline
/// scratch (decoded fields, IR/MDR/MAR) is deliberately excluded: it is
/// regenerated on the next decode after RFI, so saving it would be waste.
#[derive(Clone, Copy, Debug)]
pub struct SavedContext {
    pub registers: [u32; NUM_REGISTERS],
    pub pc: u32,
    pub ccr: u8,
    pub process_status: u8,
}

#[derive(Clone, Debug)]
pub struct CpuState {
    pub registers: [u32; NUM_REGISTERS],
    pub pc: u32,
    pub ccr: u8,
    pub ir: u32,
    pub mdr: u32,
    pub mar: u32,
    pub process_status: u8,
    pub pipeline_stage: PipelineStage,
    pub decoded: Decoded,
    pub saved_context: Option<SavedContext>,
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuState {
    pub fn new() -> Self {
        Self {
            registers: [0; NUM_REGISTERS],
            pc: 0,
            ccr: CCR_ZERO,
            ir: 0,
            mdr: 0,
            mar: 0,
            process_status: 0,
            pipeline_stage: PipelineStage::Interrupt,
            decoded: Decoded::default(),
            saved_context: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn interrupt_in_progress(&self) -> bool {
        self.process_status & PROCESS_STATUS_INTERRUPT_IN_PROGRESS != 0
    }

    pub fn set_interrupt_in_progress(&mut self, value: bool) {
        if value {
            self.process_status |= PROCESS_STATUS_INTERRUPT_IN_PROGRESS;
        } else {
            self.process_status &= !PROCESS_STATUS_INTERRUPT_IN_PROGRESS;
        }
    }

    /// Set CCR so that exactly one of {P, Z, N} reflects `result`.
    pub fn update_ccr(&mut self, result: u32) {
        self.ccr = if result == 0 {
            CCR_ZERO
        } else if result & 0x8000_0000 != 0 {
            CCR_NEGATIVE
        } else {
            CCR_POSITIVE
        };
    }

    pub fn snapshot_context(&self) -> SavedContext {
        SavedContext {
            registers: self.registers,
            pc: self.pc,
            ccr: self.ccr,
            process_status: self.process_status,
        }
    }

    pub fn restore_context(&mut self, ctx: SavedContext) {
        self.registers = ctx.registers;
        self.pc = ctx.pc;
        self.ccr = ctx.ccr;
        self.process_status = ctx.process_status;
    }
}
