//! Talking Electronics TEC-1 emulation: the Z80 core wired to the TEC-1's
//! 2 KiB ROM / 2 KiB RAM map and its six-digit 7-segment display latches.

mod display;
mod memory;
mod tec1;

pub use display::Display;
pub use memory::Tec1Memory;
pub use tec1::{Tec1, Tec1Io};
