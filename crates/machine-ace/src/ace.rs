//! The assembled machine.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use emu_core::{IoBus, LoadError};
use zilog_z80::{Error, Z80};

use crate::keyboard::{Key, Keyboard};
use crate::memory::AceMemory;
use crate::video::VideoCache;

/// ACE I/O decode: every port read scans the keyboard half-rows selected by
/// the address high byte; writes go nowhere.
pub struct AceIo {
    keyboard: Rc<RefCell<Keyboard>>,
}

impl IoBus for AceIo {
    fn read(&mut self, port: u16) -> u8 {
        self.keyboard.borrow().read((port >> 8) as u8)
    }

    fn write(&mut self, _port: u16, _value: u8) {}
}

/// A Jupiter ACE: CPU, memory map, video observer and keyboard.
pub struct Ace {
    cpu: Z80<AceMemory, AceIo>,
    video: Rc<RefCell<VideoCache>>,
    keyboard: Rc<RefCell<Keyboard>>,
}

impl Ace {
    /// T-states between keyboard interrupts when free-running.
    pub const IRQ_PERIOD: u32 = 5000;

    /// Build the machine around a ROM image.
    pub fn new(rom: &[u8]) -> Result<Self, LoadError> {
        let video = Rc::new(RefCell::new(VideoCache::new()));
        let keyboard = Rc::new(RefCell::new(Keyboard::new()));
        let mut mem = AceMemory::new(&video);
        mem.load_rom(rom)?;
        let io = AceIo {
            keyboard: Rc::clone(&keyboard),
        };
        Ok(Self {
            cpu: Z80::new(mem, io),
            video,
            keyboard,
        })
    }

    /// Build the machine from a raw ROM file.
    pub fn from_rom_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let video = Rc::new(RefCell::new(VideoCache::new()));
        let keyboard = Rc::new(RefCell::new(Keyboard::new()));
        let mut mem = AceMemory::new(&video);
        mem.load_rom_file(path)?;
        let io = AceIo {
            keyboard: Rc::clone(&keyboard),
        };
        Ok(Self {
            cpu: Z80::new(mem, io),
            video,
            keyboard,
        })
    }

    /// The CPU (registers, memory, disassembly).
    pub fn cpu(&self) -> &Z80<AceMemory, AceIo> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Z80<AceMemory, AceIo> {
        &mut self.cpu
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> Result<u32, Error> {
        self.cpu.execute()
    }

    /// Deliver the keyboard interrupt.
    pub fn interrupt(&mut self) -> u32 {
        self.cpu.interrupt(0)
    }

    pub fn key_down(&mut self, key: Key) {
        self.keyboard.borrow_mut().key_down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.keyboard.borrow_mut().key_up(key);
    }

    /// Whether any key is held.
    #[must_use]
    pub fn any_key(&self) -> bool {
        self.keyboard.borrow().any_key()
    }

    /// Drain the video addresses written since the last call.
    pub fn take_dirty(&mut self) -> Vec<u16> {
        self.video.borrow_mut().take_dirty()
    }

    /// The video observer cache (glyph validity bookkeeping).
    pub fn video_cache(&self) -> &Rc<RefCell<VideoCache>> {
        &self.video
    }

    /// Shape rows for a character code, via the WOM back door.
    #[must_use]
    pub fn glyph(&self, code: u8) -> [u8; 8] {
        crate::video::glyph(self.cpu.mem().charset(), code)
    }

    /// `addr  op  operands` for the instruction at `PC`, monitor style.
    #[must_use]
    pub fn current_instruction(&self) -> String {
        let pc = self.cpu.pc();
        let d = self.cpu.disassemble(pc);
        format!("{pc:04x} {:<5} {}", d.op, d.operands)
    }
}
