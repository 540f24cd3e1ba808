/*!
Keyboard device.

A read-only, single-register latch: the host drives [`Keyboard::latch_keycode`]
when a key event arrives and, optionally, [`Keyboard::raise_key_irq`] to
notify the CPU through the interrupt controller. The CPU side only ever
reads the latched keycode off the bus; there is no "has been read" state,
so repeated reads before the next `latch_keycode` call all return the same
value (matching the historical source's single-register design, which
never modeled a status/already-read bit).
*/

use crate::bus::{Bus, KEYBOARD_START, SelectedDevice};
use crate::interrupt::InterruptController;

#[derive(Clone, Copy, Debug, Default)]
pub struct Keyboard {
    keycode: u16,
    irq_number: u8,
}

impl Keyboard {
    pub fn new(irq_number: u8) -> Self {
        Self {
            keycode: 0,
            irq_number,
        }
    }

    pub fn reset(&mut self) {
        self.keycode = 0;
    }

    /// Host-driven: record the most recent key event.
    pub fn latch_keycode(&mut self, scan_code: u16) {
        self.keycode = scan_code;
    }

    pub fn keycode(&self) -> u16 {
        self.keycode
    }

    /// Host-driven: notify the CPU a key event occurred.
    pub fn raise_key_irq(&self, ic: &mut InterruptController) {
        ic.request_interrupt(self.irq_number);
    }

    pub fn on_bus_cycle(&mut self, bus: &mut Bus) {
        if bus.selected_device() != SelectedDevice::Keyboard || !bus.is_enabled() {
            return;
        }

        if bus.is_read() {
            let offset = bus.address_lines() - KEYBOARD_START;
            if offset == 0 {
                bus.set_data_lines(self.keycode as u32);
            }
        }
        // Writing to the keyboard makes no sense; still ack so the bus
        // handshake does not stall a misbehaving program.
        bus.set_device_ready();
    }
}
