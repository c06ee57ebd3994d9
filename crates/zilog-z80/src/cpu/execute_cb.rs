//! CB-prefixed instructions: rotates, shifts and the bit group.

use emu_core::{Bus, IoBus};

use crate::alu;
use crate::flags::{CF, F_SZP, HF, PF, SF, ZF};

use super::Z80;

impl<M: Bus, I: IoBus> Z80<M, I> {
    /// Fetch and execute a CB-prefixed opcode. Returns the sub-table cost;
    /// the caller adds 4 for the prefix.
    pub(super) fn execute_cb(&mut self) -> u32 {
        let op = self.fetch8();
        let x = op >> 6;
        let y = (op >> 3) & 7;
        let z = op & 7;

        match x {
            // Rotate / shift group
            0 => {
                if z == 6 {
                    let addr = self.regs.hl();
                    let val = self.mem.read(addr);
                    let res = self.rotate_result(y, val);
                    self.mem.write(addr, res);
                    11
                } else {
                    let res = self.rotate_result(y, self.get_reg8(z));
                    self.set_reg8(z, res);
                    4
                }
            }
            // BIT y, r
            1 => {
                let (val, t) = if z == 6 {
                    let addr = self.regs.hl();
                    (self.mem.read(addr), 8)
                } else {
                    (self.get_reg8(z), 4)
                };
                self.bit_test(y, val);
                t
            }
            // RES y, r
            2 => {
                if z == 6 {
                    let addr = self.regs.hl();
                    let val = self.mem.read(addr) & !(1 << y);
                    self.mem.write(addr, val);
                    11
                } else {
                    let val = self.get_reg8(z) & !(1 << y);
                    self.set_reg8(z, val);
                    4
                }
            }
            // SET y, r
            _ => {
                if z == 6 {
                    let addr = self.regs.hl();
                    let val = self.mem.read(addr) | (1 << y);
                    self.mem.write(addr, val);
                    11
                } else {
                    let val = self.get_reg8(z) | (1 << y);
                    self.set_reg8(z, val);
                    4
                }
            }
        }
    }

    /// Apply a rotate/shift and update the flags from the result.
    pub(super) fn rotate_result(&mut self, y: u8, val: u8) -> u8 {
        let (res, carry) = alu::shift_rotate(y, val, self.regs.f & CF != 0);
        self.regs.f = F_SZP[res as usize] | u8::from(carry);
        res
    }

    /// BIT flag update: Z (and P/V) from the tested bit, S only for bit 7,
    /// H set, N cleared, C preserved.
    pub(super) fn bit_test(&mut self, y: u8, val: u8) {
        let bit = val & (1 << y);
        let mut f = (self.regs.f & CF) | HF;
        if bit == 0 {
            f |= ZF | PF;
        } else if y == 7 {
            f |= SF;
        }
        self.regs.f = f;
    }
}
