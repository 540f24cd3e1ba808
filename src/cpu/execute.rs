/*!
EXECUTE-stage opcode semantics.

Each handler consumes the decoded scratch fields latched during DECODE
and the (possibly MEMORY2-filled) `MDR`, and may write registers, update
the CCR, change `PC`, request a software interrupt, or trigger
return-from-interrupt. Reserved opcodes (`MUL`/`DIV`/`COMPARE`) and NOP
are no-ops, matching "implementation not required by the in-tree tests."
*/

use crate::interrupt::{InterruptController, is_scheduler_irq};

use super::decode::Decoded;
use super::opcode::Opcode;
use super::state::{CpuState, LINK_REGISTER};

/// Execute the opcode latched in `cpu.decoded`. Returns `true` if this
/// invocation serviced a RETURNI (the pipeline still proceeds to
/// INTERRUPT either way, per the state machine).
pub fn execute(cpu: &mut CpuState, ic: &mut InterruptController) {
    let decoded: Decoded = cpu.decoded;
    let opcode = decoded.opcode();

    log::debug!("execute opcode={opcode:?} pc={:#010x}", cpu.pc);

    match opcode {
        Opcode::And => alu_binary(cpu, &decoded, |a, b| a & b),
        Opcode::Or => alu_binary(cpu, &decoded, |a, b| a | b),
        Opcode::Xor => alu_binary(cpu, &decoded, |a, b| a ^ b),
        Opcode::Add => alu_binary(cpu, &decoded, |a, b| a.wrapping_add(b)),
        Opcode::Sub => alu_binary(cpu, &decoded, |a, b| a.wrapping_sub(b)),
        Opcode::Not => {
            let result = !reg(cpu, decoded.src1);
            set_reg(cpu, decoded.dst, result);
            cpu.update_ccr(result);
        }
        Opcode::Mul | Opcode::Div | Opcode::Compare => {
            // Reserved; not required by the testable properties.
        }
        Opcode::Shiftl => {
            let shift = reg(cpu, decoded.src2) & 0x1F;
            let result = reg(cpu, decoded.src1).wrapping_shl(shift);
            set_reg(cpu, decoded.dst, result);
            cpu.update_ccr(result);
        }
        Opcode::Ashiftr => {
            let shift = reg(cpu, decoded.src2) & 0x1F;
            let result = ((reg(cpu, decoded.src1) as i32) >> shift) as u32;
            set_reg(cpu, decoded.dst, result);
            cpu.update_ccr(result);
        }
        Opcode::Load | Opcode::Loadr => {
            set_reg(cpu, decoded.dst, cpu.mdr);
        }
        Opcode::Loada => {
            let addr = cpu.pc.wrapping_add(decoded.offset_pc21);
            set_reg(cpu, decoded.dst, addr);
        }
        Opcode::Store | Opcode::Storer => {
            // Architectural effect already committed by the bus write in
            // MEMORY2; the pipeline skips EXECUTE for stores entirely.
        }
        Opcode::Jump => {
            cpu.pc = cpu.pc.wrapping_add(decoded.offset_jump26);
        }
        Opcode::Branch => {
            if cpu.ccr & decoded.branch_condition_mask != 0 {
                cpu.pc = cpu.pc.wrapping_add(decoded.offset_branch23);
            }
        }
        Opcode::Call => {
            set_reg(cpu, LINK_REGISTER as u8, cpu.pc);
            cpu.pc = cpu.pc.wrapping_add(decoded.offset_jump26);
        }
        Opcode::Callr => {
            set_reg(cpu, LINK_REGISTER as u8, cpu.pc);
            cpu.pc = reg(cpu, decoded.base).wrapping_add(decoded.offset_base);
        }
        Opcode::Jumpr => {
            cpu.pc = reg(cpu, decoded.base).wrapping_add(decoded.offset_base);
        }
        Opcode::Trap => {
            let irq = ((reg(cpu, decoded.trap_vector_reg) & 0x7F) + 128) as u8;
            log::trace!("software trap requesting irq {irq}");
            ic.request_interrupt(irq);
        }
        Opcode::Returni => return_from_interrupt(cpu),
        Opcode::Nop => {}
    }
}

fn alu_binary(cpu: &mut CpuState, decoded: &Decoded, f: impl Fn(u32, u32) -> u32) {
    let lhs = reg(cpu, decoded.src1);
    let rhs = if decoded.immediate_mode {
        decoded.imm_alu
    } else {
        reg(cpu, decoded.src2)
    };
    let result = f(lhs, rhs);
    set_reg(cpu, decoded.dst, result);
    cpu.update_ccr(result);
}

fn reg(cpu: &CpuState, index: u8) -> u32 {
    cpu.registers[index as usize]
}

fn set_reg(cpu: &mut CpuState, index: u8, value: u32) {
    cpu.registers[index as usize] = value;
}

/// Restore the saved context unless the interrupt in progress was a
/// scheduler IRQ, in which case there is nothing to restore. Either way,
/// clear `interrupt_in_progress`.
fn return_from_interrupt(cpu: &mut CpuState) {
    if let Some(ctx) = cpu.saved_context.take() {
        cpu.restore_context(ctx);
    }
    cpu.set_interrupt_in_progress(false);
}

/// Whether entering this IRQ should snapshot/restore context automatically.
pub fn should_save_context(irq: u8) -> bool {
    !is_scheduler_irq(irq)
}
