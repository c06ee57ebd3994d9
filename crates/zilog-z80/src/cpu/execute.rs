//! Unprefixed instruction execution.

use emu_core::{Bus, IoBus};

use crate::Error;
use crate::alu;
use crate::flags::{CF, F_SZHV_DEC, F_SZHV_INC, F_SZP, HF, NF, PF, SF, XF, YF, ZF};

use super::Z80;

impl<M: Bus, I: IoBus> Z80<M, I> {
    /// Top-level opcode dispatch. Prefix bytes chain into their sub-tables,
    /// each adding 4 T-states for the consumed prefix.
    pub(crate) fn dispatch(&mut self, op: u8) -> Result<u32, Error> {
        Ok(match op {
            0xCB => 4 + self.execute_cb(),
            0xDD => 4 + self.execute_index(Index::Ix),
            0xED => 4 + self.execute_ed()?,
            0xFD => 4 + self.execute_index(Index::Iy),
            _ => self.execute_main(op),
        })
    }

    /// Execute an unprefixed opcode, returning its T-state cost.
    pub(super) fn execute_main(&mut self, op: u8) -> u32 {
        match op {
            // NOP
            0x00 => 4,

            // LD rr, nn (01=BC, 11=DE, 21=HL, 31=SP)
            0x01 | 0x11 | 0x21 | 0x31 => {
                let nn = self.fetch16();
                self.set_rp((op >> 4) & 3, nn);
                10
            }

            // LD (BC), A / LD (DE), A
            0x02 => {
                let addr = self.regs.bc();
                self.mem.write(addr, self.regs.a);
                7
            }
            0x12 => {
                let addr = self.regs.de();
                self.mem.write(addr, self.regs.a);
                7
            }

            // INC rr / DEC rr
            0x03 | 0x13 | 0x23 | 0x33 => {
                let rp = (op >> 4) & 3;
                let val = self.get_rp(rp).wrapping_add(1);
                self.set_rp(rp, val);
                6
            }
            0x0B | 0x1B | 0x2B | 0x3B => {
                let rp = (op >> 4) & 3;
                let val = self.get_rp(rp).wrapping_sub(1);
                self.set_rp(rp, val);
                6
            }

            // INC r
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x3C => {
                let r = (op >> 3) & 7;
                let n = self.get_reg8(r).wrapping_add(1);
                self.set_reg8(r, n);
                self.regs.f = (self.regs.f & CF) | F_SZHV_INC[n as usize];
                4
            }
            // INC (HL)
            0x34 => {
                let addr = self.regs.hl();
                let n = self.mem.read(addr).wrapping_add(1);
                self.mem.write(addr, n);
                self.regs.f = (self.regs.f & CF) | F_SZHV_INC[n as usize];
                11
            }

            // DEC r
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x3D => {
                let r = (op >> 3) & 7;
                let n = self.get_reg8(r).wrapping_sub(1);
                self.set_reg8(r, n);
                self.regs.f = (self.regs.f & CF) | F_SZHV_DEC[n as usize];
                4
            }
            // DEC (HL)
            0x35 => {
                let addr = self.regs.hl();
                let n = self.mem.read(addr).wrapping_sub(1);
                self.mem.write(addr, n);
                self.regs.f = (self.regs.f & CF) | F_SZHV_DEC[n as usize];
                11
            }

            // LD r, n
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x3E => {
                let n = self.fetch8();
                self.set_reg8((op >> 3) & 7, n);
                7
            }
            // LD (HL), n
            0x36 => {
                let n = self.fetch8();
                let addr = self.regs.hl();
                self.mem.write(addr, n);
                10
            }

            // RLCA
            0x07 => {
                self.regs.a = (self.regs.a << 1) | (self.regs.a >> 7);
                self.regs.f =
                    (self.regs.f & (SF | ZF | PF)) | (self.regs.a & (YF | XF | CF));
                4
            }
            // RRCA
            0x0F => {
                self.regs.f = (self.regs.f & (SF | ZF | PF)) | (self.regs.a & CF);
                self.regs.a = (self.regs.a >> 1) | (self.regs.a << 7);
                self.regs.f |= self.regs.a & (YF | XF);
                4
            }
            // RLA
            0x17 => {
                let res = (self.regs.a << 1) | (self.regs.f & CF);
                let carry = if self.regs.a & 0x80 != 0 { CF } else { 0 };
                self.regs.f = (self.regs.f & (SF | ZF | PF)) | carry | (res & (YF | XF));
                self.regs.a = res;
                4
            }
            // RRA
            0x1F => {
                let res = (self.regs.a >> 1) | (self.regs.f << 7);
                let carry = if self.regs.a & 0x01 != 0 { CF } else { 0 };
                self.regs.f = (self.regs.f & (SF | ZF | PF)) | carry | (res & (YF | XF));
                self.regs.a = res;
                4
            }

            // EX AF, AF'
            0x08 => {
                let tmp = self.regs.af();
                let alt = self.regs.alt_af;
                self.regs.set_af(alt);
                self.regs.alt_af = tmp;
                4
            }

            // ADD HL, rr
            0x09 | 0x19 | 0x29 | 0x39 => {
                let s = self.get_rp((op >> 4) & 3);
                let d = self.regs.hl();
                let res = u32::from(d) + u32::from(s);
                self.regs.f = alu::add16_flags(self.regs.f, d, s, res);
                self.regs.set_hl(res as u16);
                11
            }

            // LD A, (BC) / LD A, (DE)
            0x0A => {
                let addr = self.regs.bc();
                self.regs.a = self.mem.read(addr);
                7
            }
            0x1A => {
                let addr = self.regs.de();
                self.regs.a = self.mem.read(addr);
                7
            }

            // DJNZ e
            0x10 => {
                let e = self.fetch8();
                self.regs.b = self.regs.b.wrapping_sub(1);
                if self.regs.b != 0 {
                    self.rel_jump(e);
                    13
                } else {
                    8
                }
            }

            // JR e
            0x18 => {
                let e = self.fetch8();
                self.rel_jump(e);
                12
            }

            // JR cc, e (20=NZ, 28=Z, 30=NC, 38=C)
            0x20 | 0x28 | 0x30 | 0x38 => {
                let e = self.fetch8();
                if self.condition(((op >> 3) & 7) - 4) {
                    self.rel_jump(e);
                    12
                } else {
                    7
                }
            }

            // LD (nn), HL
            0x22 => {
                let nn = self.fetch16();
                self.mem.write(nn, self.regs.l);
                self.mem.write(nn.wrapping_add(1), self.regs.h);
                16
            }
            // LD HL, (nn)
            0x2A => {
                let nn = self.fetch16();
                self.regs.l = self.mem.read(nn);
                self.regs.h = self.mem.read(nn.wrapping_add(1));
                16
            }
            // LD (nn), A
            0x32 => {
                let nn = self.fetch16();
                self.mem.write(nn, self.regs.a);
                13
            }
            // LD A, (nn)
            0x3A => {
                let nn = self.fetch16();
                self.regs.a = self.mem.read(nn);
                13
            }

            // DAA
            0x27 => {
                let (a, f) = alu::daa(self.regs.a, self.regs.f);
                self.regs.a = a;
                self.regs.f = f;
                4
            }

            // CPL
            0x2F => {
                self.regs.a ^= 0xFF;
                self.regs.f = (self.regs.f & (SF | ZF | PF | CF))
                    | HF
                    | NF
                    | (self.regs.a & (YF | XF));
                4
            }

            // SCF
            0x37 => {
                self.regs.f =
                    (self.regs.f & (SF | ZF | PF)) | CF | (self.regs.a & (YF | XF));
                4
            }

            // CCF
            0x3F => {
                self.regs.f = ((self.regs.f & (SF | ZF | PF | CF))
                    | ((self.regs.f & CF) << 4)
                    | (self.regs.a & (YF | XF)))
                    ^ CF;
                4
            }

            // HALT: latch and rewind so the instruction refetches until an
            // interrupt lifts it.
            0x76 => {
                self.enter_halt();
                4
            }

            // LD r, r'
            0x40..=0x7F => {
                let dst = (op >> 3) & 7;
                let src = op & 7;
                if src == 6 {
                    let addr = self.regs.hl();
                    let val = self.mem.read(addr);
                    self.set_reg8(dst, val);
                    7
                } else if dst == 6 {
                    let addr = self.regs.hl();
                    let val = self.get_reg8(src);
                    self.mem.write(addr, val);
                    7
                } else {
                    let val = self.get_reg8(src);
                    self.set_reg8(dst, val);
                    4
                }
            }

            // ALU A, r / ALU A, (HL)
            0x80..=0xBF => {
                let z = op & 7;
                if z == 6 {
                    let addr = self.regs.hl();
                    let val = self.mem.read(addr);
                    self.alu_acc((op >> 3) & 7, val);
                    7
                } else {
                    let val = self.get_reg8(z);
                    self.alu_acc((op >> 3) & 7, val);
                    4
                }
            }

            // RET cc
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                if self.condition((op >> 3) & 7) {
                    self.regs.pc = self.pop();
                    11
                } else {
                    5
                }
            }

            // POP rr (C1=BC, D1=DE, E1=HL, F1=AF)
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let val = self.pop();
                match (op >> 4) & 3 {
                    0 => self.regs.set_bc(val),
                    1 => self.regs.set_de(val),
                    2 => self.regs.set_hl(val),
                    _ => self.regs.set_af(val),
                }
                10
            }

            // JP cc, nn
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                let nn = self.fetch16();
                if self.condition((op >> 3) & 7) {
                    self.regs.pc = nn;
                }
                10
            }

            // JP nn
            0xC3 => {
                self.regs.pc = self.fetch16();
                10
            }

            // CALL cc, nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                let nn = self.fetch16();
                if self.condition((op >> 3) & 7) {
                    let pc = self.regs.pc;
                    self.push(pc);
                    self.regs.pc = nn;
                    17
                } else {
                    10
                }
            }

            // PUSH rr (C5=BC, D5=DE, E5=HL, F5=AF)
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let val = match (op >> 4) & 3 {
                    0 => self.regs.bc(),
                    1 => self.regs.de(),
                    2 => self.regs.hl(),
                    _ => self.regs.af(),
                };
                self.push(val);
                11
            }

            // ALU A, n
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let n = self.fetch8();
                self.alu_acc((op >> 3) & 7, n);
                7
            }

            // RST p
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                let pc = self.regs.pc;
                self.push(pc);
                self.regs.pc = u16::from(op & 0x38);
                11
            }

            // RET
            0xC9 => {
                self.regs.pc = self.pop();
                10
            }

            // CALL nn
            0xCD => {
                let nn = self.fetch16();
                let pc = self.regs.pc;
                self.push(pc);
                self.regs.pc = nn;
                17
            }

            // OUT (n), A: port high byte comes from A
            0xD3 => {
                let n = self.fetch8();
                let port = (u16::from(self.regs.a) << 8) | u16::from(n);
                let a = self.regs.a;
                self.io.write(port, a);
                7
            }

            // IN A, (n)
            0xDB => {
                let n = self.fetch8();
                let port = (u16::from(self.regs.a) << 8) | u16::from(n);
                self.regs.a = self.io.read(port);
                7
            }

            // EXX
            0xD9 => {
                let tmp = self.regs.bc();
                let alt = self.regs.alt_bc;
                self.regs.set_bc(alt);
                self.regs.alt_bc = tmp;
                let tmp = self.regs.de();
                let alt = self.regs.alt_de;
                self.regs.set_de(alt);
                self.regs.alt_de = tmp;
                let tmp = self.regs.hl();
                let alt = self.regs.alt_hl;
                self.regs.set_hl(alt);
                self.regs.alt_hl = tmp;
                4
            }

            // EX (SP), HL
            0xE3 => {
                let sp = self.regs.sp;
                let tmp = self.peek16(sp);
                let hl = self.regs.hl();
                self.poke16(sp, hl);
                self.regs.set_hl(tmp);
                19
            }

            // JP (HL): the register's contents, not the word it points at
            0xE9 => {
                self.regs.pc = self.regs.hl();
                4
            }

            // EX DE, HL
            0xEB => {
                std::mem::swap(&mut self.regs.d, &mut self.regs.h);
                std::mem::swap(&mut self.regs.e, &mut self.regs.l);
                6
            }

            // DI / EI
            0xF3 => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
                4
            }
            0xFB => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
                4
            }

            // LD SP, HL
            0xF9 => {
                self.regs.sp = self.regs.hl();
                6
            }

            // Prefix bytes never reach this table
            0xCB | 0xDD | 0xED | 0xFD => {
                unreachable!("prefix bytes are dispatched before execute_main")
            }
        }
    }

    /// Accumulator ALU operation selected by the `y` field.
    pub(super) fn alu_acc(&mut self, y: u8, val: u8) {
        let a = self.regs.a;
        match y & 7 {
            0 => {
                let res = i32::from(a) + i32::from(val);
                self.regs.f = alu::add_flags(a, val, res);
                self.regs.a = res as u8;
            }
            1 => {
                let res = i32::from(a) + i32::from(val) + i32::from(self.regs.f & CF);
                self.regs.f = alu::add_flags(a, val, res);
                self.regs.a = res as u8;
            }
            2 => {
                let res = i32::from(a) - i32::from(val);
                self.regs.f = alu::sub_flags(a, val, res);
                self.regs.a = res as u8;
            }
            3 => {
                let res = i32::from(a) - i32::from(val) - i32::from(self.regs.f & CF);
                self.regs.f = alu::sub_flags(a, val, res);
                self.regs.a = res as u8;
            }
            4 => {
                self.regs.a &= val;
                self.regs.f = F_SZP[self.regs.a as usize] | HF;
            }
            5 => {
                self.regs.a ^= val;
                self.regs.f = F_SZP[self.regs.a as usize];
            }
            6 => {
                self.regs.a |= val;
                self.regs.f = F_SZP[self.regs.a as usize];
            }
            _ => {
                let res = i32::from(a) - i32::from(val);
                self.regs.f = alu::sub_flags(a, val, res);
            }
        }
    }
}

/// Index register selected by a `DD` or `FD` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Index {
    Ix,
    Iy,
}
