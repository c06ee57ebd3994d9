//! TEC-1 memory map.
//!
//! ```text
//! 0x0000-0x07FF  2 KiB monitor ROM
//! 0x0800-0x0FFF  2 KiB RAM
//! 0x1000-0xFFFF  unpopulated
//! ```

use std::path::Path;

use emu_core::{AddressMap, Bus, DeviceId, LoadError, Memory};

/// ROM and RAM bound into the 2 KiB slot table.
pub struct Tec1Memory {
    map: AddressMap,
    rom: DeviceId,
}

impl Tec1Memory {
    #[must_use]
    pub fn new() -> Self {
        let mut map = AddressMap::new();
        let rom = map.attach(Memory::rom(11));
        let ram = map.attach(Memory::ram(11));
        map.assign(rom, 0x0000, 1);
        map.assign(ram, 0x0800, 1);
        Self { map, rom }
    }

    /// Load a monitor ROM image at offset 0.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), LoadError> {
        self.map.device_mut(self.rom).load(0, image)
    }

    /// Load the monitor ROM from a raw binary file.
    pub fn load_rom_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, LoadError> {
        self.map.device_mut(self.rom).load_file(0, path)
    }
}

impl Default for Tec1Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for Tec1Memory {
    fn read(&mut self, addr: u16) -> u8 {
        self.map.read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.map.write(addr, value);
    }

    fn peek(&self, addr: u16) -> u8 {
        self.map.peek(addr)
    }
}
