//! ACE memory map.
//!
//! ```text
//! 0x0000-0x1FFF  8 KiB ROM (four slots)
//! 0x2000-0x27FF  1 KiB video RAM, mirrored twice
//! 0x2800-0x2FFF  1 KiB character WOM, mirrored twice
//! 0x3000-0x3FFF  1 KiB RAM, mirrored four times
//! 0x4000-0xFFFF  unpopulated
//! ```

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use emu_core::{AddressMap, Bus, DeviceId, LoadError, Memory};

use crate::video::VideoCache;

/// The ACE's devices bound into an address map, with video hooks attached.
pub struct AceMemory {
    map: AddressMap,
    rom: DeviceId,
    video: DeviceId,
    charset: DeviceId,
    ram: DeviceId,
}

impl AceMemory {
    /// Build the map and wire the video/character write hooks into `cache`.
    #[must_use]
    pub fn new(cache: &Rc<RefCell<VideoCache>>) -> Self {
        let mut map = AddressMap::new();

        let rom = map.attach(Memory::rom(13));

        let mut video_dev = Memory::ram(10);
        let observer = Rc::clone(cache);
        video_dev.set_write_notify(Box::new(move |addr| {
            observer.borrow_mut().video_write(addr);
        }));
        let video = map.attach(video_dev);

        let mut char_dev = Memory::wom(10);
        let observer = Rc::clone(cache);
        char_dev.set_write_notify(Box::new(move |addr| {
            observer.borrow_mut().char_write(addr);
        }));
        let charset = map.attach(char_dev);

        let ram = map.attach(Memory::ram(10));

        map.assign(rom, 0x0000, 4);
        map.assign(video, 0x2000, 1);
        map.assign(charset, 0x2800, 1);
        map.assign(ram, 0x3000, 2);

        Self {
            map,
            rom,
            video,
            charset,
            ram,
        }
    }

    /// Load a ROM image at offset 0.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), LoadError> {
        self.map.device_mut(self.rom).load(0, image)
    }

    /// Load the ROM from a raw binary file.
    pub fn load_rom_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, LoadError> {
        self.map.device_mut(self.rom).load_file(0, path)
    }

    /// The character-shape device, for back-door glyph reads.
    #[must_use]
    pub fn charset(&self) -> &Memory {
        self.map.device(self.charset)
    }

    /// The video RAM device.
    #[must_use]
    pub fn video(&self) -> &Memory {
        self.map.device(self.video)
    }

    /// The user RAM device.
    #[must_use]
    pub fn ram(&self) -> &Memory {
        self.map.device(self.ram)
    }
}

impl Bus for AceMemory {
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
