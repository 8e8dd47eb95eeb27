//! Fixed-depth memory with gated combinational reads and synchronous
//! writes.
//!
//! The per-cycle access is described by a `MemCycle`; `read` evaluates the
//! combinational output for that cycle and `clock` commits the write. When
//! a read and a write hit the same address in the same cycle the read
//! observes the incoming write data (write-first bypass). Accesses beyond
//! the configured depth are addressing errors, never wraps.

use crate::error::{ModelError::AddressOutOfRange, Result};

/// One cycle's worth of port activity.
#[derive(Copy, Clone, Debug, Default)]
pub struct MemCycle {
    pub addr: u32,
    pub write_data: u32,
    pub read_en: bool,
    pub write_en: bool,
}

pub struct Memory {
    cells: Vec<u32>,
    mask: u32,
}

impl Memory {
    pub fn new(depth: usize, mask: u32) -> Self {
        Memory { cells: vec![0; depth], mask }
    }

    fn check(&self, en: bool, addr: u32) -> Result<()> {
        if en && addr as usize >= self.cells.len() {
            return Err(AddressOutOfRange { addr, depth: self.cells.len() });
        }
        Ok(())
    }

    /// Combinational read for this cycle.
    ///
    /// Also validates the write address, so a cycle that passes `read`
    /// cannot fail in `clock` and leave state half-committed.
    pub fn read(&self, cyc: &MemCycle) -> Result<u32> {
        self.check(cyc.write_en, cyc.addr)?;
        self.check(cyc.read_en, cyc.addr)?;
        if !cyc.read_en {
            return Ok(0);
        }
        if cyc.write_en {
            // write-first bypass
            return Ok(cyc.write_data & self.mask);
        }
        Ok(self.cells[cyc.addr as usize])
    }

    /// commit this cycle's write on the clock edge
    pub fn clock(&mut self, cyc: &MemCycle) -> Result<()> {
        self.check(cyc.write_en, cyc.addr)?;
        if cyc.write_en {
            self.cells[cyc.addr as usize] = cyc.write_data & self.mask;
        }
        Ok(())
    }

    /// ungated backdoor read, for loading checks and introspection
    pub fn peek(&self, addr: u32) -> Result<u32> {
        self.check(true, addr)?;
        Ok(self.cells[addr as usize])
    }

    /// ungated backdoor write, for image loading and preloads
    pub fn poke(&mut self, addr: u32, value: u32) -> Result<()> {
        self.check(true, addr)?;
        self.cells[addr as usize] = value & self.mask;
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn snapshot(&self) -> Vec<u32> {
        self.cells.clone()
    }

    pub fn restore(&mut self, image: &[u32]) {
        self.cells.copy_from_slice(image);
    }
}
