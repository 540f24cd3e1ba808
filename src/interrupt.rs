/*!
Vectored interrupt controller.

Holds a strict FIFO of pending IRQ numbers (capacity 256, one slot per
possible `u8` IRQ number) plus the immutable base address of the interrupt
vector table. Priority between simultaneously-pending sources is whatever
order they were requested in; this component does not reorder by IRQ
number.

IRQ numbers 0..127 are conventionally hardware sources; 128..255 are
software-raised via `TRAP`. IRQ 0 and IRQ 128 are "scheduler" interrupts:
the CPU pipeline (not this controller) treats them specially by skipping
automatic context save/restore.
*/

use crate::queue::Queue;

/// Maximum number of distinct IRQ numbers (one FIFO slot per possible `u8` value).
pub const MAX_PENDING_IRQS: usize = 256;

/// An IRQ number designated to bypass automatic context save/restore.
pub fn is_scheduler_irq(irq: u8) -> bool {
    irq == 0 || irq == 128
}

#[derive(Clone, Debug)]
pub struct InterruptController {
    pending: Queue<MAX_PENDING_IRQS>,
    ivt_base: u32,
}

impl InterruptController {
    /// Construct a controller whose vector table begins at `ivt_base`.
    /// `ivt_base` is immutable for the lifetime of the controller.
    pub fn new(ivt_base: u32) -> Self {
        Self {
            pending: Queue::new(),
            ivt_base,
        }
    }

    pub fn ivt_base(&self) -> u32 {
        self.ivt_base
    }

    /// Enqueue an IRQ request. Silently dropped if the queue is already full.
    pub fn request_interrupt(&mut self, irq: u8) {
        if !self.pending.push(irq) {
            log::debug!("interrupt queue full, dropping IRQ {irq}");
        } else {
            log::trace!("interrupt {irq} queued");
        }
    }

    /// Whether at least one interrupt is pending.
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Dequeue and return the oldest pending IRQ number, if any.
    pub fn take_source(&mut self) -> Option<u8> {
        self.pending.pop()
    }

    /// The ISR vector address for IRQ `n`: `ivt_base + n`.
    pub fn vector_address(&self, irq: u8) -> u32 {
        self.ivt_base.wrapping_add(irq as u32)
    }

    /// Whether the pending queue is at capacity. Exposed so embedders can
    /// detect sustained interrupt storms.
    pub fn is_full(&self) -> bool {
        self.pending.is_full()
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }
}
