//! CPU execution errors.

use std::fmt;

/// Raised by [`crate::Z80::execute`] for the enumerated set of opcodes that
/// are intentionally not implemented (the block-I/O group).
///
/// The program counter has advanced past the offending bytes when this is
/// returned; `pc` is the address the instruction started at, so a driver can
/// restore it and resume after patching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An opcode with no implementation was fetched.
    InvalidOpcode {
        /// Address of the first byte of the instruction.
        pc: u16,
        /// The prefix and opcode bytes as fetched.
        code: [u8; 2],
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOpcode { pc, code } => write!(
                f,
                "unimplemented instruction {:02x} {:02x} at {pc:04x}",
                code[0], code[1]
            ),
        }
    }
}

impl std::error::Error for Error {}
