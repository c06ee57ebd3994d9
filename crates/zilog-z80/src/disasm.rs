//! Z80 disassembler.
//!
//! [`disassemble`] is a pure function over a memory view: it reads one to
//! four bytes at `pc` through [`Bus::peek`] and returns the mnemonic, the
//! operand string and the encoding length. It walks the same `x`/`y`/`z`
//! field tables the interpreter dispatches on.

use std::fmt;

use emu_core::Bus;

use crate::tables::{ALU, ALUX, BLI, CC, IM_MODES, R, ROT, ROTA, RP, RP2};

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembly {
    /// Mnemonic, e.g. `"ld"`.
    pub op: &'static str,
    /// Operand string, e.g. `"a,(hl)"`; empty when the mnemonic stands alone.
    pub operands: String,
    /// Encoding length in bytes (1-4).
    pub len: u16,
}

impl Disassembly {
    fn new(op: &'static str, operands: impl Into<String>, len: u16) -> Self {
        Self {
            op,
            operands: operands.into(),
            len,
        }
    }
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            write!(f, "{}", self.op)
        } else {
            write!(f, "{} {}", self.op, self.operands)
        }
    }
}

/// Decode the instruction at `mem[pc]`.
pub fn disassemble<B: Bus>(mem: &B, pc: u16) -> Disassembly {
    match mem.peek(pc) {
        0xCB => da_cb(mem, pc.wrapping_add(1)),
        0xDD => da_dd_fd(mem, pc.wrapping_add(1), "ix"),
        0xED => da_ed(mem, pc.wrapping_add(1)),
        0xFD => da_dd_fd(mem, pc.wrapping_add(1), "iy"),
        _ => da_normal(mem, pc),
    }
}

/// `(ix+05)` / `(iy-7e)` operand text.
fn indexed(ir: &str, d: i8) -> String {
    if d >= 0 {
        format!("({ir}+{d:02x})")
    } else {
        format!("({ir}-{:02x})", -i16::from(d))
    }
}

/// Decode with no prefix in effect.
fn da_normal<B: Bus>(mem: &B, pc: u16) -> Disassembly {
    let m0 = mem.peek(pc);
    let m1 = mem.peek(pc.wrapping_add(1));
    let m2 = mem.peek(pc.wrapping_add(2));
    let x = m0 >> 6;
    let y = (m0 >> 3) & 7;
    let z = m0 & 7;
    let p = (m0 >> 4) & 3;
    let q = y & 1;
    let n = m1;
    let nn = (u16::from(m2) << 8) | u16::from(m1);
    // relative-jump target resolved against the opcode address
    let dj = pc.wrapping_add(2).wrapping_add(m1 as i8 as u16);

    let yu = y as usize;
    let pu = p as usize;
    let zu = z as usize;

    match x {
        0 => match z {
            0 => match y {
                0 => Disassembly::new("nop", "", 1),
                1 => Disassembly::new("ex", "af,af'", 1),
                2 => Disassembly::new("djnz", format!("{dj:04x}"), 2),
                3 => Disassembly::new("jr", format!("{dj:04x}"), 2),
                _ => Disassembly::new("jr", format!("{},{dj:04x}", CC[yu - 4]), 2),
            },
            1 => {
                if q == 0 {
                    Disassembly::new("ld", format!("{},{nn:04x}", RP[pu]), 3)
                } else {
                    Disassembly::new("add", format!("hl,{}", RP[pu]), 1)
                }
            }
            2 => match (q, p) {
                (0, 0) => Disassembly::new("ld", "(bc),a", 1),
                (0, 1) => Disassembly::new("ld", "(de),a", 1),
                (0, 2) => Disassembly::new("ld", format!("({nn:04x}),hl"), 3),
                (0, _) => Disassembly::new("ld", format!("({nn:04x}),a"), 3),
                (_, 0) => Disassembly::new("ld", "a,(bc)", 1),
                (_, 1) => Disassembly::new("ld", "a,(de)", 1),
                (_, 2) => Disassembly::new("ld", format!("hl,({nn:04x})"), 3),
                (_, _) => Disassembly::new("ld", format!("a,({nn:04x})"), 3),
            },
            3 => {
                if q == 0 {
                    Disassembly::new("inc", RP[pu], 1)
                } else {
                    Disassembly::new("dec", RP[pu], 1)
                }
            }
            4 => Disassembly::new("inc", R[yu], 1),
            5 => Disassembly::new("dec", R[yu], 1),
            6 => Disassembly::new("ld", format!("{},{n:02x}", R[yu]), 2),
            _ => Disassembly::new(ROTA[yu], "", 1),
        },
        1 => {
            if z == 6 && y == 6 {
                Disassembly::new("halt", "", 1)
            } else {
                Disassembly::new("ld", format!("{},{}", R[yu], R[zu]), 1)
            }
        }
        2 => Disassembly::new(ALU[yu], format!("{}{}", ALUX[yu], R[zu]), 1),
        _ => match z {
            0 => Disassembly::new("ret", CC[yu], 1),
            1 => match (q, p) {
                (0, _) => Disassembly::new("pop", RP2[pu], 1),
                (_, 0) => Disassembly::new("ret", "", 1),
                (_, 1) => Disassembly::new("exx", "", 1),
                (_, 2) => Disassembly::new("jp", "hl", 1),
                (_, _) => Disassembly::new("ld", "sp,hl", 1),
            },
            2 => Disassembly::new("jp", format!("{},{nn:04x}", CC[yu]), 3),
            3 => match y {
                0 => Disassembly::new("jp", format!("{nn:04x}"), 3),
                2 => Disassembly::new("out", format!("({n:02x}),a"), 2),
                3 => Disassembly::new("in", format!("a,({n:02x})"), 2),
                4 => Disassembly::new("ex", "(sp),hl", 1),
                5 => Disassembly::new("ex", "de,hl", 1),
                6 => Disassembly::new("di", "", 1),
                _ => Disassembly::new("ei", "", 1),
            },
            4 => Disassembly::new("call", format!("{},{nn:04x}", CC[yu]), 3),
            5 => {
                if q == 0 {
                    Disassembly::new("push", RP2[pu], 1)
                } else {
                    Disassembly::new("call", format!("{nn:04x}"), 3)
                }
            }
            6 => Disassembly::new(ALU[yu], format!("{}{n:02x}", ALUX[yu]), 2),
            _ => Disassembly::new("rst", format!("{:02x}", y << 3), 1),
        },
    }
}

/// Decode after a DD/FD prefix, with the index-register substitutions.
///
/// `pc` addresses the byte after the prefix; lengths include the prefix.
fn da_index<B: Bus>(mem: &B, pc: u16, ir: &str) -> Disassembly {
    let m0 = mem.peek(pc);
    let m1 = mem.peek(pc.wrapping_add(1));
    let m2 = mem.peek(pc.wrapping_add(2));
    let x = m0 >> 6;
    let y = (m0 >> 3) & 7;
    let z = m0 & 7;
    let p = (m0 >> 4) & 3;
    let q = y & 1;
    let n0 = m1;
    let n1 = m2;
    let nn = (u16::from(m2) << 8) | u16::from(m1);
    let d = m1 as i8;
    let dj = pc.wrapping_add(2).wrapping_add(d as u16);

    let yu = y as usize;
    let pu = p as usize;
    let zu = z as usize;

    // (hl) -> (ix+d); bare h/l -> ixh/ixl; hl as a pair -> ix
    let sub0 = |idx: usize| -> String {
        if idx == 6 {
            indexed(ir, d)
        } else {
            R[idx].to_string()
        }
    };
    let sub1 = |idx: usize| -> String {
        match idx {
            4 => format!("{ir}h"),
            5 => format!("{ir}l"),
            _ => R[idx].to_string(),
        }
    };
    let sub_rp = |idx: usize| -> String {
        if idx == 2 { ir.to_string() } else { RP[idx].to_string() }
    };
    let sub_rp2 = |idx: usize| -> String {
        if idx == 2 { ir.to_string() } else { RP2[idx].to_string() }
    };

    match x {
        0 => match z {
            0 => match y {
                0 => Disassembly::new("nop", "", 2),
                1 => Disassembly::new("ex", "af,af'", 2),
                2 => Disassembly::new("djnz", format!("{dj:04x}"), 3),
                3 => Disassembly::new("jr", format!("{dj:04x}"), 3),
                _ => Disassembly::new("jr", format!("{},{dj:04x}", CC[yu - 4]), 3),
            },
            1 => {
                if q == 0 {
                    Disassembly::new("ld", format!("{},{nn:04x}", sub_rp(pu)), 4)
                } else {
                    Disassembly::new("add", format!("{ir},{}", sub_rp(pu)), 2)
                }
            }
            2 => match (q, p) {
                (0, 0) => Disassembly::new("ld", "(bc),a", 2),
                (0, 1) => Disassembly::new("ld", "(de),a", 2),
                (0, 2) => Disassembly::new("ld", format!("({nn:04x}),{ir}"), 4),
                (0, _) => Disassembly::new("ld", format!("({nn:04x}),a"), 4),
                (_, 0) => Disassembly::new("ld", "a,(bc)", 2),
                (_, 1) => Disassembly::new("ld", "a,(de)", 2),
                (_, 2) => Disassembly::new("ld", format!("{ir},({nn:04x})"), 4),
                (_, _) => Disassembly::new("ld", format!("a,({nn:04x})"), 4),
            },
            3 => {
                if q == 0 {
                    Disassembly::new("inc", sub_rp(pu), 2)
                } else {
                    Disassembly::new("dec", sub_rp(pu), 2)
                }
            }
            4 => {
                if y == 6 {
                    Disassembly::new("inc", sub0(yu), 3)
                } else {
                    Disassembly::new("inc", sub1(yu), 2)
                }
            }
            5 => {
                if y == 6 {
                    Disassembly::new("dec", sub0(yu), 3)
                } else {
                    Disassembly::new("dec", sub1(yu), 2)
                }
            }
            6 => {
                if y == 6 {
                    Disassembly::new("ld", format!("{},{n1:02x}", sub0(yu)), 4)
                } else {
                    Disassembly::new("ld", format!("{},{n0:02x}", sub1(yu)), 3)
                }
            }
            _ => Disassembly::new(ROTA[yu], "", 2),
        },
        1 => {
            if z == 6 && y == 6 {
                Disassembly::new("halt", "", 2)
            } else if z == 6 || y == 6 {
                Disassembly::new("ld", format!("{},{}", sub0(yu), sub0(zu)), 3)
            } else {
                Disassembly::new("ld", format!("{},{}", sub1(yu), sub1(zu)), 2)
            }
        }
        2 => {
            if z == 6 {
                Disassembly::new(ALU[yu], format!("{}{}", ALUX[yu], sub0(zu)), 3)
            } else {
                Disassembly::new(ALU[yu], format!("{}{}", ALUX[yu], sub1(zu)), 2)
            }
        }
        _ => match z {
            0 => Disassembly::new("ret", CC[yu], 2),
            1 => match (q, p) {
                (0, _) => Disassembly::new("pop", sub_rp2(pu), 2),
                (_, 0) => Disassembly::new("ret", "", 2),
                (_, 1) => Disassembly::new("exx", "", 2),
                (_, 2) => Disassembly::new("jp", ir, 2),
                (_, _) => Disassembly::new("ld", format!("sp,{ir}"), 2),
            },
            2 => Disassembly::new("jp", format!("{},{nn:04x}", CC[yu]), 4),
            3 => match y {
                0 => Disassembly::new("jp", format!("{nn:04x}"), 4),
                2 => Disassembly::new("out", format!("({n0:02x}),a"), 3),
                3 => Disassembly::new("in", format!("a,({n0:02x})"), 3),
                4 => Disassembly::new("ex", format!("(sp),{ir}"), 2),
                5 => Disassembly::new("ex", "de,hl", 2),
                6 => Disassembly::new("di", "", 2),
                _ => Disassembly::new("ei", "", 2),
            },
            4 => Disassembly::new("call", format!("{},{nn:04x}", CC[yu]), 4),
            5 => {
                if q == 0 {
                    Disassembly::new("push", sub_rp2(pu), 2)
                } else {
                    Disassembly::new("call", format!("{nn:04x}"), 4)
                }
            }
            6 => Disassembly::new(ALU[yu], format!("{}{n0:02x}", ALUX[yu]), 3),
            _ => Disassembly::new("rst", format!("{:02x}", y << 3), 2),
        },
    }
}

/// Decode after a CB prefix: rotate/shift/bit group.
fn da_cb<B: Bus>(mem: &B, pc: u16) -> Disassembly {
    let m0 = mem.peek(pc);
    let x = m0 >> 6;
    let y = (m0 >> 3) & 7;
    let z = (m0 & 7) as usize;
    let yu = y as usize;

    match x {
        0 => Disassembly::new(ROT[yu], R[z], 2),
        1 => Disassembly::new("bit", format!("{y},{}", R[z]), 2),
        2 => Disassembly::new("res", format!("{y},{}", R[z]), 2),
        _ => Disassembly::new("set", format!("{y},{}", R[z]), 2),
    }
}

/// Decode after DD CB / FD CB: `pc` addresses the displacement byte.
fn da_ddcb<B: Bus>(mem: &B, pc: u16, ir: &str) -> Disassembly {
    let d = mem.peek(pc) as i8;
    let m1 = mem.peek(pc.wrapping_add(1));
    let x = m1 >> 6;
    let y = (m1 >> 3) & 7;
    let z = (m1 & 7) as usize;
    let yu = y as usize;
    let target = indexed(ir, d);

    match x {
        0 => {
            if z == 6 {
                Disassembly::new(ROT[yu], target, 4)
            } else {
                Disassembly::new(ROT[yu], format!("{target},{}", R[z]), 4)
            }
        }
        1 => Disassembly::new("bit", format!("{y},{target}"), 4),
        2 => {
            if z == 6 {
                Disassembly::new("res", format!("{y},{target}"), 4)
            } else {
                Disassembly::new("res", format!("{y},{target},{}", R[z]), 4)
            }
        }
        _ => {
            if z == 6 {
                Disassembly::new("set", format!("{y},{target}"), 4)
            } else {
                Disassembly::new("set", format!("{y},{target},{}", R[z]), 4)
            }
        }
    }
}

/// Decode after an ED prefix.
fn da_ed<B: Bus>(mem: &B, pc: u16) -> Disassembly {
    let m0 = mem.peek(pc);
    let m1 = mem.peek(pc.wrapping_add(1));
    let m2 = mem.peek(pc.wrapping_add(2));
    let x = m0 >> 6;
    let y = (m0 >> 3) & 7;
    let z = m0 & 7;
    let p = (m0 >> 4) & 3;
    let q = y & 1;
    let nn = (u16::from(m2) << 8) | u16::from(m1);
    let yu = y as usize;
    let pu = p as usize;

    if x == 1 {
        return match z {
            0 => {
                if y == 6 {
                    Disassembly::new("in", "(c)", 2)
                } else {
                    Disassembly::new("in", format!("{},(c)", R[yu]), 2)
                }
            }
            1 => {
                if y == 6 {
                    Disassembly::new("out", "(c)", 2)
                } else {
                    Disassembly::new("out", format!("(c),{}", R[yu]), 2)
                }
            }
            2 => {
                if q == 0 {
                    Disassembly::new("sbc", format!("hl,{}", RP[pu]), 2)
                } else {
                    Disassembly::new("adc", format!("hl,{}", RP[pu]), 2)
                }
            }
            3 => {
                if q == 0 {
                    Disassembly::new("ld", format!("({nn:04x}),{}", RP[pu]), 4)
                } else {
                    Disassembly::new("ld", format!("{},({nn:04x})", RP[pu]), 4)
                }
            }
            4 => Disassembly::new("neg", "", 2),
            5 => {
                if y == 1 {
                    Disassembly::new("reti", "", 2)
                } else {
                    Disassembly::new("retn", "", 2)
                }
            }
            6 => Disassembly::new("im", IM_STR[usize::from(IM_MODES[yu])], 2),
            _ => match y {
                0 => Disassembly::new("ld", "i,a", 2),
                1 => Disassembly::new("ld", "r,a", 2),
                2 => Disassembly::new("ld", "a,i", 2),
                3 => Disassembly::new("ld", "a,r", 2),
                4 => Disassembly::new("rrd", "", 2),
                5 => Disassembly::new("rld", "", 2),
                _ => Disassembly::new("nop", "", 2),
            },
        };
    }
    if x == 2 && z <= 3 && y >= 4 {
        return Disassembly::new(BLI[z as usize][yu - 4], "", 2);
    }
    Disassembly::new("nop", "", 2)
}

const IM_STR: [&str; 3] = ["0", "1", "2"];

/// Decode after a DD/FD prefix: a second conflicting prefix makes the first
/// byte a plain NOP.
fn da_dd_fd<B: Bus>(mem: &B, pc: u16, ir: &str) -> Disassembly {
    match mem.peek(pc) {
        0xDD | 0xED | 0xFD => Disassembly::new("nop", "", 1),
        0xCB => da_ddcb(mem, pc.wrapping_add(1), ir),
        _ => da_index(mem, pc, ir),
    }
}
