//! Program counter unit.
//!
//! A width-masked register updated on the clock edge from a four-way
//! selector. Branch resolution happens here: the control unit's static
//! branch enable is combined with the ALU zero flag.

/// next-PC selector
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PcSel {
    Increment,
    Branch,
    Jump,
    Hold,
}

impl PcSel {
    /// combine the control bundle with the dynamic zero flag
    pub fn resolve(branch: bool, jump: bool, zero: bool) -> PcSel {
        if jump {
            PcSel::Jump
        } else if branch && zero {
            PcSel::Branch
        } else {
            PcSel::Increment
        }
    }
}

pub struct ProgramCounter {
    pc: u32,
    /// sequential stride, the instruction size in bytes
    step: u32,
    mask: u32,
}

impl ProgramCounter {
    pub fn new(step: u32, mask: u32) -> Self {
        ProgramCounter { pc: 0, step, mask }
    }

    pub fn value(&self) -> u32 {
        self.pc
    }

    pub fn reset(&mut self) {
        self.pc = 0;
    }

    /// commit the next PC on the clock edge
    pub fn clock(&mut self, sel: PcSel, branch_target: u32, jump_target: u32) {
        self.pc = match sel {
            PcSel::Increment => self.pc.wrapping_add(self.step),
            PcSel::Branch => branch_target,
            PcSel::Jump => jump_target,
            PcSel::Hold => self.pc,
        } & self.mask;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(PcSel::resolve(false, false, false), PcSel::Increment);
        assert_eq!(PcSel::resolve(false, false, true), PcSel::Increment);
        assert_eq!(PcSel::resolve(true, false, false), PcSel::Increment);
        assert_eq!(PcSel::resolve(true, false, true), PcSel::Branch);
        assert_eq!(PcSel::resolve(false, true, false), PcSel::Jump);
        // jump wins over a taken branch
        assert_eq!(PcSel::resolve(true, true, true), PcSel::Jump);
    }

    #[test]
    fn test_increment_and_wrap() {
        let mut pc = ProgramCounter::new(2, 0xff);
        pc.clock(PcSel::Increment, 0, 0);
        assert_eq!(pc.value(), 2);
        // drive to the top of the 8-bit range
        for _ in 0..126 {
            pc.clock(PcSel::Increment, 0, 0);
        }
        assert_eq!(pc.value(), 254);
        pc.clock(PcSel::Increment, 0, 0);
        assert_eq!(pc.value(), 0);
    }

    #[test]
    fn test_branch_jump_hold() {
        let mut pc = ProgramCounter::new(4, u32::MAX);
        pc.clock(PcSel::Branch, 0x40, 0);
        assert_eq!(pc.value(), 0x40);
        pc.clock(PcSel::Jump, 0, 0x80);
        assert_eq!(pc.value(), 0x80);
        pc.clock(PcSel::Hold, 0x10, 0x20);
        assert_eq!(pc.value(), 0x80);
    }

    #[test]
    fn test_targets_masked_to_width() {
        let mut pc = ProgramCounter::new(2, 0xff);
        pc.clock(PcSel::Branch, 0x1fe, 0);
        assert_eq!(pc.value(), 0xfe);
    }

    #[test]
    fn test_reset() {
        let mut pc = ProgramCounter::new(4, u32::MAX);
        pc.clock(PcSel::Increment, 0, 0);
        pc.reset();
        assert_eq!(pc.value(), 0);
    }
}
