//! Decode tables shared by the interpreter and the disassembler.
//!
//! Opcodes are split into the fields `x = [7:6]`, `y = [5:3]`, `z = [2:0]`,
//! `p = y >> 1`, `q = y & 1`; these tables are indexed by those fields and
//! are the single source of truth for what each field value means.

/// Register file indexed by `y`/`z`.
pub(crate) const R: [&str; 8] = ["b", "c", "d", "e", "h", "l", "(hl)", "a"];

/// Register pairs indexed by `p` (SP variant).
pub(crate) const RP: [&str; 4] = ["bc", "de", "hl", "sp"];

/// Register pairs indexed by `p` (AF variant, push/pop).
pub(crate) const RP2: [&str; 4] = ["bc", "de", "hl", "af"];

/// Condition codes indexed by `y`.
pub(crate) const CC: [&str; 8] = ["nz", "z", "nc", "c", "po", "pe", "p", "m"];

/// Accumulator ALU operations indexed by `y`.
pub(crate) const ALU: [&str; 8] = ["add", "adc", "sub", "sbc", "and", "xor", "or", "cp"];

/// Operand prefix for each ALU operation ("a," where the mnemonic names A).
pub(crate) const ALUX: [&str; 8] = ["a,", "a,", "", "a,", "", "", "", ""];

/// CB-prefix rotate/shift operations indexed by `y`.
pub(crate) const ROT: [&str; 8] = ["rlc", "rrc", "rl", "rr", "sla", "sra", "sll", "srl"];

/// Accumulator rotate / general group indexed by `y` (`x = 0`, `z = 7`).
pub(crate) const ROTA: [&str; 8] = ["rlca", "rrca", "rla", "rra", "daa", "cpl", "scf", "ccf"];

/// Interrupt mode selected by `y` in `ED` `IM` encodings.
pub(crate) const IM_MODES: [u8; 8] = [0, 0, 1, 2, 0, 0, 1, 2];

/// Block instructions indexed by `[z][y - 4]` in the `ED` `x = 2` quadrant.
pub(crate) const BLI: [[&str; 4]; 4] = [
    ["ldi", "ldd", "ldir", "lddr"],
    ["cpi", "cpd", "cpir", "cpdr"],
    ["ini", "ind", "inir", "indr"],
    ["outi", "outd", "otir", "otdr"],
];
