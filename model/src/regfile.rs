//! Register file: combinational reads, one synchronous write port.
//!
//! Register 0 is hardwired to zero. Writes land on `clock`, so a value
//! written in cycle k is first readable in cycle k+1.

pub struct RegisterFile {
    regs: Vec<u32>,
    mask: u32,
}

impl RegisterFile {
    pub fn new(count: usize, mask: u32) -> Self {
        RegisterFile { regs: vec![0; count], mask }
    }

    /// get value of register r
    pub fn read(&self, r: u32) -> u32 {
        if r == 0 {
            0
        } else {
            self.regs[r as usize]
        }
    }

    /// commit a write; gated by `write_en`, writes to register 0 are
    /// accepted but unobservable
    pub fn clock(&mut self, write_en: bool, r: u32, value: u32) {
        if write_en && r != 0 {
            self.regs[r as usize] = value & self.mask;
        }
    }

    /// clear all registers
    pub fn reset(&mut self) {
        self.regs.fill(0);
    }

    /// full architectural contents, index 0 forced to zero
    pub fn contents(&self) -> Vec<u32> {
        let mut v = self.regs.clone();
        v[0] = 0;
        v
    }
}
