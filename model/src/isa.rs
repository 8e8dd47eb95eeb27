//! Static descriptions of the supported instruction sets.
//!
//! Everything that distinguishes the two machines lives in an `Isa` table:
//! field positions, opcode classes, immediate formats, memory geometry and
//! the handful of behavioral toggles the datapath consults. The datapath
//! itself is ISA-agnostic.

use crate::imm::{ImmFormat, Segment};

/// A contiguous bit field of an instruction word, inclusive on both ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub lo: u32,
    pub hi: u32,
}

impl Field {
    pub const fn new(lo: u32, hi: u32) -> Self {
        Field { lo, hi }
    }

    /// extract bits lo..=hi of `word`, shifted down to bit 0
    pub const fn extract(&self, word: u32) -> u32 {
        (word << (31 - self.hi)) >> (31 - self.hi + self.lo)
    }
}

/// mask covering the low `bits` bits of a word
pub const fn width_mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

/// The behavioral class an opcode belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpClass {
    /// register-register ALU
    Register,
    /// register-immediate ALU
    ImmArith,
    /// data memory read into a register
    Load,
    /// register into data memory
    Store,
    /// conditional branch on ALU zero
    Branch,
    /// unconditional absolute jump
    Jump,
}

/// Which register fields an instruction class carries, and where.
#[derive(Copy, Clone, Debug, Default)]
pub struct RegFields {
    pub rs1: Option<Field>,
    pub rs2: Option<Field>,
    pub rd: Option<Field>,
}

/// One row of an ISA's opcode table.
#[derive(Copy, Clone, Debug)]
pub struct ClassSpec {
    pub class: OpClass,
    pub regs: RegFields,
    /// immediate format selector fed to the immediate generator
    pub imm_sel: u32,
}

/// How the ALU operation is chosen from the instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AluDecode {
    /// every ALU-class instruction adds (the narrow machine)
    FixedAdd,
    /// funct3, plus funct7 bit 5 to split ADD/SUB
    Funct3Funct7,
}

/// Shift-amount handling at the ISA's data width.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShiftRule {
    /// truncate the amount to log2(width) bits
    MaskShamt,
    /// amounts >= width produce 0
    ZeroBeyondWidth,
}

/// How instructions are packed in instruction memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FetchLayout {
    /// two bytes per instruction, high byte at the lower address
    PackedBytesHighFirst,
    /// one 32-bit word per instruction, word-addressed via PC >> 2
    Words,
}

/// The base address a branch offset is added to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BranchBase {
    /// PC of the instruction after the branch
    SequentialPc,
    /// PC of the branch itself
    Pc,
}

/// A complete machine description.
pub struct Isa {
    pub name: &'static str,
    /// data width in bits
    pub xlen: u32,
    /// instruction size in bytes (PC stride)
    pub inst_bytes: u32,
    pub reg_count: usize,
    pub imem_depth: usize,
    pub dmem_depth: usize,
    pub opcode: Field,
    pub funct3: Option<Field>,
    pub funct7: Option<Field>,
    pub opcodes: &'static [(u32, ClassSpec)],
    pub imm_formats: &'static [ImmFormat],
    pub alu_decode: AluDecode,
    pub shift: ShiftRule,
    pub fetch: FetchLayout,
    pub branch_base: BranchBase,
    /// absolute jump target field, when the ISA has a jump
    pub jump_target: Option<Field>,
    /// right shift applied to the ALU result to index data memory
    pub dmem_addr_shift: u32,
}

impl Isa {
    /// mask for values at the ISA's data width
    pub const fn mask(&self) -> u32 {
        width_mask(self.xlen)
    }

    /// look up the class of a raw opcode value
    pub fn classify(&self, opcode: u32) -> Option<&'static ClassSpec> {
        self.opcodes
            .iter()
            .find(|(op, _)| *op == opcode)
            .map(|(_, spec)| spec)
    }

    /// funct3 field of `word`, or 0 when the ISA has none
    pub fn funct3_of(&self, word: u32) -> u32 {
        self.funct3.map_or(0, |f| f.extract(word))
    }

    /// funct7 field of `word`, or 0 when the ISA has none
    pub fn funct7_of(&self, word: u32) -> u32 {
        self.funct7.map_or(0, |f| f.extract(word))
    }
}

/// Opcode values for both machines.
pub mod op {
    // RV32 subset
    pub const RV_ALU: u32 = 0b011_0011;
    pub const RV_ALUI: u32 = 0b001_0011;
    pub const RV_LOAD: u32 = 0b000_0011;
    pub const RV_STORE: u32 = 0b010_0011;
    pub const RV_BR: u32 = 0b110_0011;

    // narrow machine, 4-bit opcodes
    pub const M8_R: u32 = 0b0000;
    pub const M8_LW: u32 = 0b0001;
    pub const M8_SW: u32 = 0b0010;
    pub const M8_BEQ: u32 = 0b0011;
    pub const M8_JUMP: u32 = 0b0100;
    pub const M8_ADDI: u32 = 0b0101;
}

/// immediate selector values shared by the control unit and generator
pub mod immsel {
    pub const I: u32 = 0;
    pub const S: u32 = 1;
    pub const B: u32 = 2;
}

const RV32_R: RegFields = RegFields {
    rs1: Some(Field::new(15, 19)),
    rs2: Some(Field::new(20, 24)),
    rd: Some(Field::new(7, 11)),
};

const RV32_I: RegFields = RegFields {
    rs1: Some(Field::new(15, 19)),
    rs2: None,
    rd: Some(Field::new(7, 11)),
};

const RV32_SB: RegFields = RegFields {
    rs1: Some(Field::new(15, 19)),
    rs2: Some(Field::new(20, 24)),
    rd: None,
};

const RV32_IMM: [ImmFormat; 3] = [
    // I: inst[31:20]
    ImmFormat {
        segments: &[Segment { bits: Field::new(20, 31), shift: 0 }],
        width: 12,
    },
    // S: inst[31:25] | inst[11:7]
    ImmFormat {
        segments: &[
            Segment { bits: Field::new(25, 31), shift: 5 },
            Segment { bits: Field::new(7, 11), shift: 0 },
        ],
        width: 12,
    },
    // B: inst[31] | inst[7] | inst[30:25] | inst[11:8] | 0
    ImmFormat {
        segments: &[
            Segment { bits: Field::new(31, 31), shift: 12 },
            Segment { bits: Field::new(7, 7), shift: 11 },
            Segment { bits: Field::new(25, 30), shift: 5 },
            Segment { bits: Field::new(8, 11), shift: 1 },
        ],
        width: 13,
    },
];

/// The 32-bit RISC-V subset: R/I arithmetic, LW, SW, BEQ-class branches.
pub static RV32: Isa = Isa {
    name: "rv32",
    xlen: 32,
    inst_bytes: 4,
    reg_count: 32,
    imem_depth: 1024,
    dmem_depth: 1024,
    opcode: Field::new(0, 6),
    funct3: Some(Field::new(12, 14)),
    funct7: Some(Field::new(25, 31)),
    opcodes: &[
        (op::RV_ALU, ClassSpec { class: OpClass::Register, regs: RV32_R, imm_sel: immsel::I }),
        (op::RV_ALUI, ClassSpec { class: OpClass::ImmArith, regs: RV32_I, imm_sel: immsel::I }),
        (op::RV_LOAD, ClassSpec { class: OpClass::Load, regs: RV32_I, imm_sel: immsel::I }),
        (op::RV_STORE, ClassSpec { class: OpClass::Store, regs: RV32_SB, imm_sel: immsel::S }),
        (op::RV_BR, ClassSpec { class: OpClass::Branch, regs: RV32_SB, imm_sel: immsel::B }),
    ],
    imm_formats: &RV32_IMM,
    alu_decode: AluDecode::Funct3Funct7,
    shift: ShiftRule::MaskShamt,
    fetch: FetchLayout::Words,
    branch_base: BranchBase::Pc,
    jump_target: None,
    dmem_addr_shift: 2,
};

const M8_RR: RegFields = RegFields {
    rs1: Some(Field::new(9, 11)),
    rs2: Some(Field::new(6, 8)),
    rd: Some(Field::new(3, 5)),
};

const M8_RI: RegFields = RegFields {
    rs1: Some(Field::new(9, 11)),
    rs2: None,
    rd: Some(Field::new(6, 8)),
};

const M8_RB: RegFields = RegFields {
    rs1: Some(Field::new(9, 11)),
    rs2: Some(Field::new(6, 8)),
    rd: None,
};

const M8_IMM: [ImmFormat; 1] = [
    // all immediate forms share inst[5:0]
    ImmFormat {
        segments: &[Segment { bits: Field::new(0, 5), shift: 0 }],
        width: 6,
    },
];

/// The narrow 8-bit machine: 16-bit instructions, 8 registers.
pub static MICRO8: Isa = Isa {
    name: "micro8",
    xlen: 8,
    inst_bytes: 2,
    reg_count: 8,
    imem_depth: 256,
    dmem_depth: 256,
    opcode: Field::new(12, 15),
    funct3: None,
    funct7: None,
    opcodes: &[
        (op::M8_R, ClassSpec { class: OpClass::Register, regs: M8_RR, imm_sel: immsel::I }),
        (op::M8_LW, ClassSpec { class: OpClass::Load, regs: M8_RI, imm_sel: immsel::I }),
        (op::M8_SW, ClassSpec { class: OpClass::Store, regs: M8_RB, imm_sel: immsel::I }),
        (op::M8_BEQ, ClassSpec { class: OpClass::Branch, regs: M8_RB, imm_sel: immsel::I }),
        (op::M8_JUMP, ClassSpec { class: OpClass::Jump, regs: RegFields { rs1: None, rs2: None, rd: None }, imm_sel: immsel::I }),
        (op::M8_ADDI, ClassSpec { class: OpClass::ImmArith, regs: M8_RI, imm_sel: immsel::I }),
    ],
    imm_formats: &M8_IMM,
    alu_decode: AluDecode::FixedAdd,
    shift: ShiftRule::ZeroBeyondWidth,
    fetch: FetchLayout::PackedBytesHighFirst,
    branch_base: BranchBase::SequentialPc,
    jump_target: Some(Field::new(0, 7)),
    dmem_addr_shift: 0,
};

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_field_extract() {
        let word = 0xdead_beef_u32;
        assert_eq!(Field::new(0, 31).extract(word), word);
        assert_eq!(Field::new(0, 6).extract(word), word & 0x7f);
        assert_eq!(Field::new(12, 14).extract(word), (word >> 12) & 7);
        assert_eq!(Field::new(25, 31).extract(word), word >> 25);
        assert_eq!(Field::new(31, 31).extract(word), 1);
    }

    #[test]
    fn test_width_mask() {
        assert_eq!(width_mask(8), 0xff);
        assert_eq!(width_mask(13), 0x1fff);
        assert_eq!(width_mask(32), u32::MAX);
    }

    #[test]
    fn test_classify() {
        assert_eq!(RV32.classify(op::RV_ALU).map(|s| s.class), Some(OpClass::Register));
        assert_eq!(RV32.classify(op::RV_BR).map(|s| s.class), Some(OpClass::Branch));
        assert!(RV32.classify(0b111_1111).is_none());
        assert_eq!(MICRO8.classify(op::M8_JUMP).map(|s| s.class), Some(OpClass::Jump));
        assert!(MICRO8.classify(0b1111).is_none());
    }

    #[test]
    fn test_funct_fields() {
        // add x0,x0,x0
        let add = 0x0000_0033;
        assert_eq!(RV32.funct3_of(add), 0);
        assert_eq!(RV32.funct7_of(add), 0);
        // sub x0,x0,x0
        let sub = 0x4000_0033;
        assert_eq!(RV32.funct7_of(sub), 0b0100000);
        // the narrow machine has neither field
        assert_eq!(MICRO8.funct3_of(0xffff), 0);
        assert_eq!(MICRO8.funct7_of(0xffff), 0);
    }
}
