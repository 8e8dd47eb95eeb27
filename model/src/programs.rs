//! Canned machines for testing.
//!
//! Each machine pairs a program image (and optional data preloads) with
//! the architectural state it must reach after a fixed number of cycles.
//! The runner can boot them by name and the test suite sweeps them all.

use crate::cpu::Cpu;
use crate::error::{ModelError::UnknownMachine, Result};
use crate::isa::{Isa, MICRO8, RV32};

/// Structural instruction encoders for both machines.
pub mod encode {
    /// RV32 R-type
    pub fn r_type(opcode: u32, rd: u32, funct3: u32, rs1: u32, rs2: u32, funct7: u32) -> u32 {
        opcode | (rd << 7) | (funct3 << 12) | (rs1 << 15) | (rs2 << 20) | (funct7 << 25)
    }

    /// RV32 I-type
    pub fn i_type(opcode: u32, rd: u32, funct3: u32, rs1: u32, imm: i32) -> u32 {
        let imm = (imm as u32) & 0xfff;
        opcode | (rd << 7) | (funct3 << 12) | (rs1 << 15) | (imm << 20)
    }

    /// RV32 S-type
    pub fn s_type(opcode: u32, funct3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
        let imm = (imm as u32) & 0xfff;
        opcode
            | ((imm & 0x1f) << 7)
            | (funct3 << 12)
            | (rs1 << 15)
            | (rs2 << 20)
            | ((imm >> 5) << 25)
    }

    /// RV32 B-type; `imm` is the byte offset, bit 0 must be zero
    pub fn b_type(opcode: u32, funct3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
        let imm = (imm as u32) & 0x1fff;
        opcode
            | (((imm >> 11) & 1) << 7)
            | (((imm >> 1) & 0xf) << 8)
            | (funct3 << 12)
            | (rs1 << 15)
            | (rs2 << 20)
            | (((imm >> 5) & 0x3f) << 25)
            | (((imm >> 12) & 1) << 31)
    }

    /// pack words little-endian into a flat image
    pub fn words(insts: &[u32]) -> Vec<u8> {
        insts.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    /// narrow R-type: rs1[11:9] rs2[8:6] rd[5:3]
    pub fn m8_r(opcode: u32, rd: u32, rs1: u32, rs2: u32) -> u16 {
        ((opcode << 12) | (rs1 << 9) | (rs2 << 6) | (rd << 3)) as u16
    }

    /// narrow I-type (ADDI, LW): rs1[11:9] rd[8:6] imm[5:0]
    pub fn m8_i(opcode: u32, rd: u32, rs1: u32, imm: i32) -> u16 {
        ((opcode << 12) | (rs1 << 9) | (rd << 6) | ((imm as u32) & 0x3f)) as u16
    }

    /// narrow B-type (SW, BEQ): rs1[11:9] rs2[8:6] imm[5:0]
    pub fn m8_b(opcode: u32, rs1: u32, rs2: u32, imm: i32) -> u16 {
        ((opcode << 12) | (rs1 << 9) | (rs2 << 6) | ((imm as u32) & 0x3f)) as u16
    }

    /// narrow J-type: absolute target in [7:0]
    pub fn m8_j(opcode: u32, target: u32) -> u16 {
        ((opcode << 12) | (target & 0xff)) as u16
    }

    /// pack 16-bit instructions high byte first into a flat image
    pub fn halfwords(insts: &[u16]) -> Vec<u8> {
        insts
            .iter()
            .flat_map(|w| [(w >> 8) as u8, *w as u8])
            .collect()
    }
}

/// A named program with its expected final state.
pub struct Machine {
    pub name: &'static str,
    pub isa: &'static Isa,
    pub image: fn() -> Vec<u8>,
    /// data memory preloads, (address, value)
    pub data: &'static [(u32, u32)],
    /// cycles to run before checking
    pub cycles: usize,
    /// expected register values, (index, value)
    pub regs: &'static [(u32, u32)],
    /// expected data memory values, (address, value)
    pub mem: &'static [(u32, u32)],
    /// expected final PC
    pub pc: u32,
}

impl Machine {
    /// build a CPU with the machine's program and data loaded
    pub fn boot(&self) -> Result<Cpu> {
        let mut cpu = Cpu::new(self.isa);
        cpu.load_program(&(self.image)())?;
        for &(addr, value) in self.data {
            cpu.preload_data(addr, value)?;
        }
        Ok(cpu)
    }
}

fn narrow_demo() -> Vec<u8> {
    use encode::*;
    halfwords(&[
        m8_i(0b0101, 1, 0, 5),   // addi r1,r0,5
        m8_i(0b0101, 2, 0, 10),  // addi r2,r0,10
        m8_r(0b0000, 3, 1, 2),   // add r3,r1,r2
        m8_i(0b0001, 4, 0, 20),  // lw r4,20(r0)
        m8_b(0b0010, 0, 3, 25),  // sw r3,25(r0)
        m8_b(0b0011, 1, 2, 4),   // beq r1,r2,+4
        m8_j(0b0100, 0),         // jump 0
    ])
}

fn wide_demo() -> Vec<u8> {
    use encode::*;
    words(&[
        i_type(0b001_0011, 10, 0b000, 0, 50),    // addi x10,x0,50
        i_type(0b001_0011, 11, 0b000, 0, 60),    // addi x11,x0,60
        r_type(0b011_0011, 10, 0b000, 10, 11, 0), // add x10,x10,x11
        s_type(0b010_0011, 0b010, 0, 10, 8),     // sw x10,8(x0)
        i_type(0b000_0011, 11, 0b010, 0, 8),     // lw x11,8(x0)
        b_type(0b110_0011, 0b000, 10, 0, 8),     // beq x10,x0,+8
        b_type(0b110_0011, 0b000, 10, 11, 8),    // beq x10,x11,+8
        i_type(0b001_0011, 10, 0b000, 0, 999),   // skipped
        i_type(0b001_0011, 11, 0b000, 0, 777),   // addi x11,x0,777
    ])
}

fn wide_countdown() -> Vec<u8> {
    use encode::*;
    words(&[
        i_type(0b001_0011, 5, 0b000, 0, 3),    // addi x5,x0,3
        i_type(0b001_0011, 6, 0b000, 0, 0),    // addi x6,x0,0
        i_type(0b001_0011, 6, 0b000, 6, 1),    // addi x6,x6,1
        b_type(0b110_0011, 0b000, 6, 5, 8),    // beq x6,x5,+8
        b_type(0b110_0011, 0b000, 0, 0, -8),   // beq x0,x0,-8
    ])
}

pub const MACHINES: &[Machine] = &[
    Machine {
        name: "narrow-demo",
        isa: &MICRO8,
        image: narrow_demo,
        data: &[(20, 0xaa)],
        cycles: 7,
        regs: &[(1, 5), (2, 10), (3, 15), (4, 0xaa)],
        mem: &[(25, 15)],
        pc: 0,
    },
    Machine {
        name: "wide-demo",
        isa: &RV32,
        image: wide_demo,
        data: &[],
        cycles: 8,
        regs: &[(10, 110), (11, 777)],
        mem: &[(2, 110)],
        pc: 36,
    },
    Machine {
        name: "wide-loop",
        isa: &RV32,
        image: wide_countdown,
        data: &[],
        // 3 iterations of the count loop, one trailing NOP off the end
        cycles: 11,
        regs: &[(5, 3), (6, 3)],
        mem: &[],
        pc: 24,
    },
];

/// look up a canned machine by name
pub fn lookup_machine(name: &str) -> Result<&'static Machine> {
    MACHINES
        .iter()
        .find(|m| m.name == name)
        .ok_or_else(|| UnknownMachine(name.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_machines() {
        for machine in MACHINES {
            let mut cpu = machine.boot().unwrap();
            for _ in 0..machine.cycles {
                cpu.step().unwrap();
            }
            for &(r, v) in machine.regs {
                assert_eq!(cpu.reg(r), v, "{}: x{r}", machine.name);
            }
            for &(a, v) in machine.mem {
                assert_eq!(cpu.data(a).unwrap(), v, "{}: mem[{a}]", machine.name);
            }
            assert_eq!(cpu.pc(), machine.pc, "{}: pc", machine.name);
        }
    }

    #[test]
    fn test_lookup() {
        assert!(lookup_machine("wide-demo").is_ok());
        assert!(lookup_machine("nope").is_err());
    }

    #[test]
    fn test_narrow_encodings() {
        use encode::*;
        assert_eq!(m8_i(0b0101, 1, 0, 5), 0x5045);
        assert_eq!(m8_r(0b0000, 3, 1, 2), 0x0298);
        assert_eq!(m8_i(0b0001, 4, 0, 20), 0x1114);
        assert_eq!(m8_b(0b0010, 0, 3, 25), 0x20d9);
        assert_eq!(m8_b(0b0011, 1, 2, 4), 0x3284);
        assert_eq!(m8_j(0b0100, 0), 0x4000);
        assert_eq!(halfwords(&[0x5045]), vec![0x50, 0x45]);
    }

    #[test]
    fn test_wide_encodings() {
        use encode::*;
        // addi x10,x0,50 == 0x03200513
        assert_eq!(i_type(0b001_0011, 10, 0b000, 0, 50), 0x0320_0513);
        // add x10,x10,x11 == 0x00b50533
        assert_eq!(r_type(0b011_0011, 10, 0b000, 10, 11, 0), 0x00b5_0533);
        // sw x10,8(x0) == 0x00a02423
        assert_eq!(s_type(0b010_0011, 0b010, 0, 10, 8), 0x00a0_2423);
        // lw x11,8(x0) == 0x00802583
        assert_eq!(i_type(0b000_0011, 11, 0b010, 0, 8), 0x0080_2583);
        // beq x10,x11,+8 == 0x00b50463
        assert_eq!(b_type(0b110_0011, 0b000, 10, 11, 8), 0x00b5_0463);
        assert_eq!(words(&[0x0320_0513]), vec![0x13, 0x05, 0x20, 0x03]);
    }
}
