/*!
Word-addressed RAM device.

Backs the boot ROM, interrupt vector table, and general-purpose RAM
regions of the address map (everything the bus decode resolves to
[`crate::bus::SelectedDevice::Memory`]). Reading or writing past the end
of the allocated backing store is a panic: the design treats this as a
programmer error in the loaded program, not a recoverable runtime
condition (see the error taxonomy).

Memory observes the bus like any other device: it only acts when
`selected_device` is `Memory` and the bus is enabled, then services the
request and asserts `device_ready` once its configured latency has
elapsed. A latency of 0 (the default) acks on the same tick it is
addressed; any higher latency holds `device_ready` low for that many
additional ticks while the transaction stays selected.
*/

use crate::bus::{Bus, SelectedDevice};

#[derive(Clone, Debug)]
pub struct Memory {
    words: Vec<u32>,
    latency: u32,
    pending_ticks: u32,
}

impl Memory {
    /// Allocate `len` words of zeroed RAM with zero latency (acks same-tick).
    pub fn new(len: usize) -> Self {
        Self::with_latency(len, 0)
    }

    /// Allocate `len` words of zeroed RAM that holds `device_ready` low for
    /// `latency` ticks after a transaction is selected before servicing it.
    pub fn with_latency(len: usize, latency: u32) -> Self {
        Self {
            words: vec![0; len],
            latency,
            pending_ticks: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn latency(&self) -> u32 {
        self.latency
    }

    pub fn reset(&mut self) {
        self.words.fill(0);
        self.pending_ticks = 0;
    }

    /// Read the word at `address`. Panics if `address` is beyond the
    /// allocated backing store.
    pub fn read(&self, address: u32) -> u32 {
        self.words[address as usize]
    }

    /// Write `value` at `address`. Panics if `address` is beyond the
    /// allocated backing store.
    pub fn write(&mut self, address: u32, value: u32) {
        self.words[address as usize] = value;
    }

    /// Borrow a contiguous range `[lo, hi)` for introspection.
    pub fn slice(&self, lo: usize, hi: usize) -> &[u32] {
        &self.words[lo..hi]
    }

    /// Load `program` starting at `start_address`, without bounds checking.
    /// Callers (the `Computer`) are expected to validate bounds first.
    pub fn load(&mut self, program: &[u32], start_address: u32) {
        let start = start_address as usize;
        self.words[start..start + program.len()].copy_from_slice(program);
    }

    /// Observe the bus and service a transaction if selected, holding
    /// `device_ready` low for `latency` ticks first.
    pub fn on_bus_cycle(&mut self, bus: &mut Bus) {
        if bus.selected_device() != SelectedDevice::Memory || !bus.is_enabled() {
            self.pending_ticks = 0;
            return;
        }

        if bus.is_device_ready() {
            // Already serviced this transaction; wait for the CPU to move on.
            return;
        }

        if self.pending_ticks < self.latency {
            self.pending_ticks += 1;
            return;
        }

        if bus.is_write() {
            self.write(bus.address_lines(), bus.data_lines());
        } else {
            let value = self.read(bus.address_lines());
            bus.set_data_lines(value);
        }
        bus.set_device_ready();
        self.pending_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;

    #[test]
    fn read_after_write_round_trips() {
        let mut mem = Memory::new(16);
        mem.write(4, 0xCAFEBABE);
        assert_eq!(mem.read(4), 0xCAFEBABE);
    }

    #[test]
    #[should_panic]
    fn read_past_end_panics() {
        let mem = Memory::new(4);
        mem.read(4);
    }

    #[test]
    fn bus_cycle_services_memory_reads_and_writes() {
        let mut mem = Memory::new(16);
        let mut bus = Bus::new();

        bus.begin_write(2, 123);
        mem.on_bus_cycle(&mut bus);
        assert!(bus.is_device_ready());
        bus.clear_device_ready();
        bus.disable();
        assert_eq!(mem.read(2), 123);

        bus.begin_read(2);
        mem.on_bus_cycle(&mut bus);
        assert!(bus.is_device_ready());
        assert_eq!(bus.data_lines(), 123);
    }

    #[test]
    fn ignores_transactions_for_other_devices() {
        let mut mem = Memory::new(16);
        let mut bus = Bus::new();
        bus.begin_read(crate::bus::GRAPHICS_START);
        mem.on_bus_cycle(&mut bus);
        assert!(!bus.is_device_ready());
    }

    #[test]
    fn load_places_words_starting_at_address() {
        let mut mem = Memory::new(8);
        mem.load(&[1, 2, 3], 2);
        assert_eq!(mem.slice(0, 8), &[0, 0, 1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn latency_holds_device_ready_low_until_elapsed() {
        let mut mem = Memory::with_latency(16, 3);
        let mut bus = Bus::new();

        bus.begin_read(5);
        mem.on_bus_cycle(&mut bus);
        assert!(!bus.is_device_ready());
        mem.on_bus_cycle(&mut bus);
        assert!(!bus.is_device_ready());
        mem.on_bus_cycle(&mut bus);
        assert!(!bus.is_device_ready());
        mem.on_bus_cycle(&mut bus);
        assert!(bus.is_device_ready());
    }

    #[test]
    fn latency_transaction_resets_if_deselected_early() {
        let mut mem = Memory::with_latency(16, 3);
        let mut bus = Bus::new();

        bus.begin_read(5);
        mem.on_bus_cycle(&mut bus);
        bus.disable();
        mem.on_bus_cycle(&mut bus); // not selected; pending ticks reset

        bus.begin_read(5);
        for _ in 0..3 {
            mem.on_bus_cycle(&mut bus);
            assert!(!bus.is_device_ready());
        }
        mem.on_bus_cycle(&mut bus);
        assert!(bus.is_device_ready());
    }
}
