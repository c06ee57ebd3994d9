//! ED-prefixed instructions: I/O, 16-bit arithmetic, block transfer and
//! search, interrupt control.
//!
//! The block-I/O quadrant (`INI`/`IND`/`OUTI`/`OUTD` and repeats) is the one
//! part of the opcode space that is intentionally unimplemented; it surfaces
//! as [`Error::InvalidOpcode`].

use emu_core::{Bus, IoBus};

use crate::Error;
use crate::alu;
use crate::flags::{CF, F_SZ, F_SZP, HF, NF, PF, SF, XF, YF, ZF};
use crate::tables::IM_MODES;

use super::Z80;

impl<M: Bus, I: IoBus> Z80<M, I> {
    /// Fetch and execute an ED-prefixed opcode. Returns the sub-table cost;
    /// the caller adds 4 for the prefix.
    pub(super) fn execute_ed(&mut self) -> Result<u32, Error> {
        let op = self.fetch8();
        let x = op >> 6;
        let y = (op >> 3) & 7;
        let z = op & 7;
        let p = (op >> 4) & 3;
        let q = y & 1;

        if x == 1 {
            return Ok(match z {
                // IN r, (C); y = 6 is the undocumented flag-only form
                0 => {
                    let port = self.regs.bc();
                    let val = self.io.read(port);
                    if y != 6 {
                        self.set_reg8(y, val);
                    }
                    self.regs.f = (self.regs.f & CF) | F_SZP[val as usize];
                    8
                }
                // OUT (C), r; y = 6 writes zero
                1 => {
                    let port = self.regs.bc();
                    let val = if y == 6 { 0 } else { self.get_reg8(y) };
                    self.io.write(port, val);
                    8
                }
                // SBC HL, rr / ADC HL, rr
                2 => {
                    let s = self.get_rp(p);
                    let d = self.regs.hl();
                    if q == 0 {
                        let res =
                            i32::from(d) - i32::from(s) - i32::from(self.regs.f & CF);
                        self.regs.f = alu::sbc16_flags(d, s, res);
                        self.regs.set_hl(res as u16);
                    } else {
                        let res =
                            u32::from(d) + u32::from(s) + u32::from(self.regs.f & CF);
                        self.regs.f = alu::adc16_flags(d, s, res);
                        self.regs.set_hl(res as u16);
                    }
                    11
                }
                // LD (nn), rr / LD rr, (nn)
                3 => {
                    let nn = self.fetch16();
                    if q == 0 {
                        let val = self.get_rp(p);
                        self.poke16(nn, val);
                    } else {
                        let val = self.peek16(nn);
                        self.set_rp(p, val);
                    }
                    16
                }
                // NEG: subtract A from zero
                4 => {
                    let a = self.regs.a;
                    let res = -i32::from(a);
                    self.regs.f = alu::sub_flags(0, a, res);
                    self.regs.a = res as u8;
                    4
                }
                // RETI / RETN
                5 => {
                    self.regs.pc = self.pop();
                    self.regs.iff1 = self.regs.iff2;
                    10
                }
                // IM 0/1/2
                6 => {
                    self.regs.im = IM_MODES[y as usize];
                    4
                }
                // LD I,A / LD R,A / LD A,I / LD A,R / RRD / RLD / NOP holes
                _ => match y {
                    0 => {
                        self.regs.i = self.regs.a;
                        9
                    }
                    1 => {
                        self.regs.r = self.regs.a;
                        9
                    }
                    2 => {
                        self.regs.a = self.regs.i;
                        self.ld_a_ir_flags();
                        9
                    }
                    3 => {
                        self.regs.a = self.regs.r;
                        self.ld_a_ir_flags();
                        9
                    }
                    4 => self.rxd(false),
                    5 => self.rxd(true),
                    _ => 4,
                },
            });
        }

        if x == 2 && z <= 3 && y >= 4 {
            let inc = y & 1 == 0;
            let repeat = y >= 6;
            return match z {
                0 => Ok(self.block_ld(inc, repeat)),
                1 => Ok(self.block_cp(inc, repeat)),
                // Block I/O is not implemented; report where and what.
                _ => Err(Error::InvalidOpcode {
                    pc: self.regs.pc.wrapping_sub(2),
                    code: [0xED, op],
                }),
            };
        }

        // Every other ED encoding is a hole that executes as a NOP.
        Ok(4)
    }

    /// Flags for `LD A,I` / `LD A,R`: S/Z from the byte, P/V from IFF2,
    /// H and N cleared, C preserved.
    fn ld_a_ir_flags(&mut self) {
        self.regs.f = (self.regs.f & CF)
            | F_SZ[self.regs.a as usize]
            | if self.regs.iff2 { PF } else { 0 };
    }

    /// RRD (`rld == false`) / RLD: 12-bit nibble rotate through A and (HL).
    fn rxd(&mut self, rld: bool) -> u32 {
        let addr = self.regs.hl();
        let n = self.mem.read(addr);
        let a = self.regs.a;
        if rld {
            self.mem.write(addr, (n << 4) | (a & 0x0F));
            self.regs.a = (a & 0xF0) | (n >> 4);
        } else {
            self.mem.write(addr, (n >> 4) | (a << 4));
            self.regs.a = (a & 0xF0) | (n & 0x0F);
        }
        self.regs.f = (self.regs.f & CF) | F_SZP[self.regs.a as usize];
        14
    }

    /// LDI/LDD/LDIR/LDDR.
    fn block_ld(&mut self, inc: bool, repeat: bool) -> u32 {
        let d = self.regs.de();
        let s = self.regs.hl();
        let n = self.regs.bc().wrapping_sub(1);
        let val = self.mem.read(s);
        self.mem.write(d, val);

        let mut f = self.regs.f & (SF | ZF | CF);
        let k = self.regs.a.wrapping_add(val);
        if k & 0x02 != 0 {
            f |= YF;
        }
        if k & 0x08 != 0 {
            f |= XF;
        }

        if inc {
            self.regs.set_de(d.wrapping_add(1));
            self.regs.set_hl(s.wrapping_add(1));
        } else {
            self.regs.set_de(d.wrapping_sub(1));
            self.regs.set_hl(s.wrapping_sub(1));
        }
        self.regs.set_bc(n);

        if n != 0 {
            f |= PF;
            if repeat {
                self.regs.f = f;
                self.dec_pc(2);
                return 17;
            }
        }
        self.regs.f = f;
        12
    }

    /// CPI/CPD/CPIR/CPDR.
    fn block_cp(&mut self, inc: bool, repeat: bool) -> u32 {
        let s = self.regs.hl();
        let n = self.regs.bc().wrapping_sub(1);
        let val = self.mem.read(s);
        let a = self.regs.a;
        let res = i32::from(a) - i32::from(val);

        let mut f = (self.regs.f & CF) | NF;
        f |= F_SZ[(res & 0xFF) as usize] & !(YF | XF);
        f |= ((i32::from(a) ^ i32::from(val) ^ res) & i32::from(HF)) as u8;
        // The undocumented Y/X bits come from the comparison result less
        // the half borrow.
        let mut k = res;
        if f & HF != 0 {
            k -= 1;
        }
        if k & 0x02 != 0 {
            f |= YF;
        }
        if k & 0x08 != 0 {
            f |= XF;
        }

        if inc {
            self.regs.set_hl(s.wrapping_add(1));
        } else {
            self.regs.set_hl(s.wrapping_sub(1));
        }
        self.regs.set_bc(n);

        if n != 0 {
            f |= PF;
            if repeat && f & ZF == 0 {
                self.regs.f = f;
                self.dec_pc(2);
                return 17;
            }
        }
        self.regs.f = f;
        12
    }
}
