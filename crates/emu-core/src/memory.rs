//! Typed memory devices.
//!
//! Every device is a power-of-two sized byte store with a mask, so a device
//! smaller than the region it is mapped into mirrors through that region.
//! Four variants cover the hardware found on the supported machines:
//!
//! - ROM: reads return the stored byte, writes are silently ignored
//! - RAM: reads and writes both apply
//! - WOM: write-only (character-shape memory); bus reads float high, a
//!   back-door read returns the true byte
//! - Null: unpopulated address space

use std::fmt;
use std::fs;
use std::path::Path;

/// Value returned by reads of unpopulated or write-only space.
const EMPTY: u8 = 0xFF;

/// Notification hook, called with the full 16-bit bus address.
pub type Notify = Box<dyn FnMut(u16)>;

enum Kind {
    Rom,
    Ram,
    Wom,
    Null,
}

/// Failure to bulk-load a device from a file.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    Io(std::io::Error),
    /// The file exists but contains no bytes.
    Empty,
    /// The image does not fit in the device at the given offset.
    TooLarge { image: usize, capacity: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "image read failed: {err}"),
            Self::Empty => write!(f, "image file is empty"),
            Self::TooLarge { image, capacity } => {
                write!(f, "image of {image} bytes exceeds device capacity {capacity}")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// A memory device of `1 << bits` bytes.
pub struct Memory {
    kind: Kind,
    mask: u16,
    data: Vec<u8>,
    wr_notify: Option<Notify>,
    rd_notify: Option<Notify>,
}

impl Memory {
    fn with_kind(kind: Kind, bits: u32) -> Self {
        let size = 1usize << bits;
        Self {
            kind,
            mask: (size - 1) as u16,
            data: vec![0; size],
            wr_notify: None,
            rd_notify: None,
        }
    }

    /// Read-only memory of `1 << bits` bytes.
    #[must_use]
    pub fn rom(bits: u32) -> Self {
        Self::with_kind(Kind::Rom, bits)
    }

    /// Read/write memory of `1 << bits` bytes.
    #[must_use]
    pub fn ram(bits: u32) -> Self {
        Self::with_kind(Kind::Ram, bits)
    }

    /// Write-only memory of `1 << bits` bytes.
    #[must_use]
    pub fn wom(bits: u32) -> Self {
        Self::with_kind(Kind::Wom, bits)
    }

    /// Unpopulated address space.
    #[must_use]
    pub fn null() -> Self {
        Self::with_kind(Kind::Null, 0)
    }

    /// Device size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Register the write-notification hook.
    ///
    /// The hook receives the full bus address, strictly after the byte has
    /// been stored, and only when the stored value changed. It must not call
    /// back into the device; it exists to maintain observer state such as a
    /// display dirty list.
    pub fn set_write_notify(&mut self, hook: Notify) {
        self.wr_notify = Some(hook);
    }

    /// Register the read-notification hook (diagnostic instrumentation).
    pub fn set_read_notify(&mut self, hook: Notify) {
        self.rd_notify = Some(hook);
    }

    /// Bus read at `addr` (masked into the device).
    pub fn read(&mut self, addr: u16) -> u8 {
        match self.kind {
            Kind::Rom | Kind::Ram => {
                if let Some(hook) = self.rd_notify.as_mut() {
                    hook(addr);
                }
                self.data[(addr & self.mask) as usize]
            }
            Kind::Wom | Kind::Null => EMPTY,
        }
    }

    /// Side-effect-free bus read at `addr`.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match self.kind {
            Kind::Rom | Kind::Ram => self.data[(addr & self.mask) as usize],
            Kind::Wom | Kind::Null => EMPTY,
        }
    }

    /// Bus write of `value` at `addr` (masked into the device).
    pub fn write(&mut self, addr: u16, value: u8) {
        match self.kind {
            Kind::Ram | Kind::Wom => {
                let slot = (addr & self.mask) as usize;
                let changed = self.data[slot] != value;
                self.data[slot] = value;
                if changed && let Some(hook) = self.wr_notify.as_mut() {
                    hook(addr);
                }
            }
            Kind::Rom | Kind::Null => {}
        }
    }

    /// Read the stored byte regardless of variant.
    ///
    /// This is the back-door path that lets a display subsystem see
    /// write-only character memory the CPU cannot read over the bus.
    #[must_use]
    pub fn back_door_read(&self, addr: u16) -> u8 {
        self.data[(addr & self.mask) as usize]
    }

    /// Load bytes into the device starting at `offset`.
    ///
    /// This is initial state, not an emulated write: no hooks fire and the
    /// variant's write policy does not apply (ROMs load too).
    pub fn load(&mut self, offset: usize, bytes: &[u8]) -> Result<(), LoadError> {
        let end = offset + bytes.len();
        if end > self.data.len() {
            return Err(LoadError::TooLarge {
                image: bytes.len(),
                capacity: self.data.len().saturating_sub(offset),
            });
        }
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Load a raw binary file into the device starting at `offset`.
    ///
    /// Fails if the file is missing, unreadable or empty. Returns the number
    /// of bytes loaded.
    pub fn load_file<P: AsRef<Path>>(&mut self, offset: usize, path: P) -> Result<usize, LoadError> {
        let bytes = fs::read(path)?;
        if bytes.is_empty() {
            return Err(LoadError::Empty);
        }
        self.load(offset, &bytes)?;
        Ok(bytes.len())
    }
}
