//! The assembled machine.

use std::path::Path;

use emu_core::{IoBus, LoadError};
use zilog_z80::{Error, Z80};

use crate::display::Display;
use crate::memory::Tec1Memory;

/// TEC-1 I/O decode: port 1 is the digit-select latch, port 2 the segment
/// latch. Reads float high (the keypad scan is not modelled).
pub struct Tec1Io {
    display: Display,
}

impl Tec1Io {
    #[must_use]
    pub fn new() -> Self {
        Self {
            display: Display::new(),
        }
    }
}

impl Default for Tec1Io {
    fn default() -> Self {
        Self::new()
    }
}

impl IoBus for Tec1Io {
    fn read(&mut self, _port: u16) -> u8 {
        0xFF
    }

    fn write(&mut self, port: u16, value: u8) {
        match port & 0xFF {
            0x01 => self.display.select(value),
            0x02 => self.display.segments(value),
            _ => {}
        }
    }
}

/// A TEC-1: CPU, memory map and display latches.
pub struct Tec1 {
    cpu: Z80<Tec1Memory, Tec1Io>,
}

impl Tec1 {
    /// Build the machine around a monitor ROM image.
    pub fn new(rom: &[u8]) -> Result<Self, LoadError> {
        let mut mem = Tec1Memory::new();
        mem.load_rom(rom)?;
        Ok(Self {
            cpu: Z80::new(mem, Tec1Io::new()),
        })
    }

    /// Build the machine from a raw ROM file.
    pub fn from_rom_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let mut mem = Tec1Memory::new();
        mem.load_rom_file(path)?;
        Ok(Self {
            cpu: Z80::new(mem, Tec1Io::new()),
        })
    }

    pub fn cpu(&self) -> &Z80<Tec1Memory, Tec1Io> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Z80<Tec1Memory, Tec1Io> {
        &mut self.cpu
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> Result<u32, Error> {
        self.cpu.execute()
    }

    /// Deliver an interrupt with `vector` on the bus (the TEC-1 keypad
    /// strobes the INT line).
    pub fn interrupt(&mut self, vector: u8) -> u32 {
        self.cpu.interrupt(vector)
    }

    /// The latched display state.
    pub fn display(&self) -> &Display {
        &self.cpu.io().display
    }
}
