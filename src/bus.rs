/*!
Shared address/data bus.

Models a single in-flight transaction at a time: `address_lines`,
`data_lines`, a read/write `mode`, an `enabled` flag, and a `device_ready`
handshake flag asserted by whichever device the address selects.

Devices are pure observers of the bus. They never drive a transaction;
they only inspect `(enabled, selected_device, mode)` on their own `tick`
and, if selected, read or write `data_lines` and assert `device_ready`.
The CPU is the sole initiator: it enables the bus, waits for
`device_ready`, reads whatever it needs from `data_lines`, then clears
`device_ready` and disables the bus before issuing the next transaction.

Address decode happens once per bus tick while `enabled`, against the
address map in the crate documentation. Decode always resolves to some
device — unmapped ranges default to [`SelectedDevice::Memory`] rather than
signaling a fault, matching the "bus errors are not signaled" policy.
*/

/// Boundaries of the simulated address map, in words.
pub const BOOT_ROM_START: u32 = 0x0000_0000;
pub const BOOT_ROM_SIZE: u32 = 0x1000;
pub const IVT_START: u32 = BOOT_ROM_START + BOOT_ROM_SIZE;
pub const IVT_SIZE: u32 = 256;
pub const GRAPHICS_START: u32 = IVT_START + IVT_SIZE;
pub const GRAPHICS_WIDTH: u32 = 640;
pub const GRAPHICS_HEIGHT: u32 = 480;
pub const GRAPHICS_SIZE: u32 = GRAPHICS_WIDTH * GRAPHICS_HEIGHT;
pub const GRAPHICS_END: u32 = GRAPHICS_START + GRAPHICS_SIZE - 1;
pub const KEYBOARD_START: u32 = GRAPHICS_END + 1;
pub const KEYBOARD_SIZE: u32 = 2;
pub const KEYBOARD_END: u32 = KEYBOARD_START + KEYBOARD_SIZE - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusMode {
    Read,
    Write,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectedDevice {
    None,
    Memory,
    Graphics,
    Keyboard,
}

/// Decide which device owns `address`, per the address map. Always
/// resolves to a device; out-of-range addresses fall back to `Memory`.
pub fn decode_address(address: u32) -> SelectedDevice {
    if (GRAPHICS_START..=GRAPHICS_END).contains(&address) {
        SelectedDevice::Graphics
    } else if (KEYBOARD_START..=KEYBOARD_END).contains(&address) {
        SelectedDevice::Keyboard
    } else {
        SelectedDevice::Memory
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Bus {
    address_lines: u32,
    data_lines: u32,
    mode: BusMode,
    enabled: bool,
    device_ready: bool,
    selected_device: SelectedDevice,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            address_lines: 0,
            data_lines: 0,
            mode: BusMode::Read,
            enabled: false,
            device_ready: false,
            selected_device: SelectedDevice::None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn address_lines(&self) -> u32 {
        self.address_lines
    }

    pub fn data_lines(&self) -> u32 {
        self.data_lines
    }

    pub fn set_data_lines(&mut self, value: u32) {
        self.data_lines = value;
    }

    pub fn mode(&self) -> BusMode {
        self.mode
    }

    pub fn is_read(&self) -> bool {
        self.mode == BusMode::Read
    }

    pub fn is_write(&self) -> bool {
        self.mode == BusMode::Write
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn selected_device(&self) -> SelectedDevice {
        self.selected_device
    }

    pub fn is_device_ready(&self) -> bool {
        self.device_ready
    }

    pub fn set_device_ready(&mut self) {
        self.device_ready = true;
    }

    pub fn clear_device_ready(&mut self) {
        self.device_ready = false;
    }

    /// Begin a read transaction at `address`. Enables the bus and decodes
    /// `selected_device` immediately, matching "each bus tick while enabled
    /// recomputes the selected device."
    pub fn begin_read(&mut self, address: u32) {
        self.address_lines = address;
        self.mode = BusMode::Read;
        self.enabled = true;
        self.selected_device = decode_address(address);
        log::trace!("bus read begin addr={address:#010x} device={:?}", self.selected_device);
    }

    /// Begin a write transaction at `address` with `value` already staged
    /// on the data lines.
    pub fn begin_write(&mut self, address: u32, value: u32) {
        self.address_lines = address;
        self.data_lines = value;
        self.mode = BusMode::Write;
        self.enabled = true;
        self.selected_device = decode_address(address);
        log::trace!("bus write begin addr={address:#010x} device={:?}", self.selected_device);
    }

    /// Disable the bus. Called by the initiating master after it has
    /// consumed `device_ready`.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.selected_device = SelectedDevice::None;
        log::trace!("bus disabled");
    }

    /// Re-derive `selected_device` from the currently-asserted address
    /// lines. Devices call this implicitly through `Bus::selected_device`;
    /// exposed directly for tests and for devices that tick independently
    /// of a CPU-driven transition.
    pub fn redecode(&mut self) {
        if self.enabled {
            self.selected_device = decode_address(self.address_lines);
        }
    }
}
