/*!
Programmable timer with an optional prescaler and a sticky overflow flag.

Each tick, a running timer either advances its counter directly (prescale
divisor below [`MIN_PRESCALE_VALUE`]) or advances a prescale counter and
only taps the main counter once the prescale counter has already reached
the divisor *before* this tick. The prescale counter resets to 1 (not 0)
on the tap, matching the historical source's `prescale_tick`: it compares
the counter to the divisor first and only increments when it's still
below, so a divisor of N taps once every N ticks rather than N-1.

On 32-bit wraparound the overflow flag latches `true` and, if interrupts
are enabled, the timer's configured IRQ is requested. The flag is sticky:
nothing in this module ever clears it again. Only an explicit
[`Timer::acknowledge_overflow`] call (driven by the embedder/ISR) clears it.
*/

use crate::interrupt::InterruptController;

/// Minimum prescaler divisor that actually engages prescaling; anything
/// smaller ticks the counter every cycle.
pub const MIN_PRESCALE_VALUE: u32 = 2;

#[derive(Clone, Copy, Debug)]
pub struct Timer {
    enabled: bool,
    interrupt_enabled: bool,
    overflow: bool,
    value: u32,
    prescale_divisor: u32,
    prescale_counter: u32,
    irq_number: u8,
}

impl Timer {
    /// Construct a disabled timer that will request `irq_number` on overflow
    /// once enabled and armed.
    pub fn new(irq_number: u8) -> Self {
        Self {
            enabled: false,
            interrupt_enabled: false,
            overflow: false,
            value: 0,
            prescale_divisor: 1,
            prescale_counter: 1,
            irq_number,
        }
    }

    pub fn irq_number(&self) -> u8 {
        self.irq_number
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }

    pub fn set_interrupt_enabled(&mut self, enabled: bool) {
        self.interrupt_enabled = enabled;
    }

    pub fn overflow(&self) -> bool {
        self.overflow
    }

    /// Clear the sticky overflow flag. Nothing else in this module does this.
    pub fn acknowledge_overflow(&mut self) {
        self.overflow = false;
    }

    pub fn prescale_divisor(&self) -> u32 {
        self.prescale_divisor
    }

    pub fn set_prescale_divisor(&mut self, divisor: u32) {
        self.prescale_divisor = divisor;
        self.prescale_counter = 1;
    }

    pub fn set_value(&mut self, value: u32) {
        self.value = value;
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.irq_number);
    }

    /// Advance the timer by one tick, requesting `irq_number` through
    /// `ic` on overflow if interrupts are enabled.
    pub fn tick(&mut self, ic: &mut InterruptController) {
        if !self.enabled {
            return;
        }

        let should_tap = if self.prescale_divisor >= MIN_PRESCALE_VALUE {
            if self.prescale_counter < self.prescale_divisor {
                self.prescale_counter += 1;
                false
            } else {
                self.prescale_counter = 1;
                true
            }
        } else {
            true
        };

        if !should_tap {
            return;
        }

        let previous = self.value;
        self.value = self.value.wrapping_add(1);

        if self.value < previous {
            self.overflow = true;
            log::debug!("timer {} overflowed", self.irq_number);
            if self.interrupt_enabled {
                ic.request_interrupt(self.irq_number);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_timer_never_advances() {
        let mut t = Timer::new(4);
        let mut ic = InterruptController::new(0);
        for _ in 0..100 {
            t.tick(&mut ic);
        }
        assert_eq!(t.value(), 0);
        assert!(!t.overflow());
    }

    #[test]
    fn unprescaled_timer_advances_every_tick() {
        let mut t = Timer::new(4);
        t.set_enabled(true);
        let mut ic = InterruptController::new(0);
        for expected in 1..=5u32 {
            t.tick(&mut ic);
            assert_eq!(t.value(), expected);
        }
    }

    #[test]
    fn prescaled_timer_advances_once_per_divisor_ticks() {
        let mut t = Timer::new(4);
        t.set_enabled(true);
        t.set_prescale_divisor(4);
        let mut ic = InterruptController::new(0);
        for _ in 0..3 {
            t.tick(&mut ic);
            assert_eq!(t.value(), 0);
        }
        t.tick(&mut ic);
        assert_eq!(t.value(), 1);
    }

    #[test]
    fn overflow_sets_sticky_flag_and_requests_irq_when_enabled() {
        let mut t = Timer::new(9);
        t.set_enabled(true);
        t.set_interrupt_enabled(true);
        t.set_value(u32::MAX);
        let mut ic = InterruptController::new(0);
        t.tick(&mut ic);
        assert_eq!(t.value(), 0);
        assert!(t.overflow());
        assert_eq!(ic.take_source(), Some(9));

        // Flag stays set across further ticks until explicitly acknowledged.
        t.tick(&mut ic);
        assert!(t.overflow());
        t.acknowledge_overflow();
        assert!(!t.overflow());
    }

    #[test]
    fn overflow_without_interrupt_enabled_does_not_request_irq() {
        let mut t = Timer::new(9);
        t.set_enabled(true);
        t.set_value(u32::MAX);
        let mut ic = InterruptController::new(0);
        t.tick(&mut ic);
        assert!(t.overflow());
        assert_eq!(ic.take_source(), None);
    }
}
