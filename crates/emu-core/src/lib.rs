//! Core building blocks for 8-bit machine emulation.
//!
//! A machine is wired together from typed memory devices bound into a
//! 64 KiB [`AddressMap`], plus an [`IoBus`] for the port address space.
//! The CPU talks to both through the traits in this crate and nothing else.

mod bus;
mod map;
mod memory;

pub use bus::{Bus, IoBus, NullIo, SimpleBus};
pub use map::{AddressMap, DeviceId, SLOT_COUNT, SLOT_SIZE};
pub use memory::{LoadError, Memory, Notify};
