//! Control unit: a pure, total mapping from instruction fields to the
//! datapath control bundle.
//!
//! Unknown opcodes decode to a harmless NOP bundle rather than an error,
//! so the model never traps on garbage fetch data. Branch resolution is
//! split the way the hardware splits it: the control unit asserts a static
//! branch enable, and the PC unit combines it with the ALU zero flag.

use crate::alu::AluOp;
use crate::isa::{immsel, AluDecode, Isa, OpClass};

/// writeback source mux
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WbSrc {
    Alu,
    Mem,
}

/// The full control bundle for one instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ControlSignals {
    pub reg_write: bool,
    pub mem_read: bool,
    pub mem_write: bool,
    /// ALU operand B from the immediate rather than rs2
    pub alu_src_imm: bool,
    pub alu_op: AluOp,
    pub imm_sel: u32,
    pub wb_src: WbSrc,
    pub branch: bool,
    pub jump: bool,
}

impl ControlSignals {
    /// the default bundle: all enables low, ALU adds, writeback from ALU
    pub const NOP: ControlSignals = ControlSignals {
        reg_write: false,
        mem_read: false,
        mem_write: false,
        alu_src_imm: false,
        alu_op: AluOp::Add,
        imm_sel: immsel::I,
        wb_src: WbSrc::Alu,
        branch: false,
        jump: false,
    };
}

/// ALU op for an R-type or I-arith instruction under funct3/funct7 decode.
/// SUB and SRA-style splits only exist for register-register SUB here;
/// everything unrecognized falls back to ADD.
fn funct_alu_op(funct3: u32, funct7: u32, reg_reg: bool) -> AluOp {
    match funct3 {
        0b000 => {
            if reg_reg && funct7 == 0b010_0000 {
                AluOp::Sub
            } else {
                AluOp::Add
            }
        }
        0b001 => AluOp::Sll,
        0b010 => AluOp::Slt,
        0b100 => AluOp::Xor,
        0b101 => AluOp::Srl,
        0b110 => AluOp::Or,
        0b111 => AluOp::And,
        _ => AluOp::Add,
    }
}

fn alu_op_for(isa: &Isa, class: OpClass, funct3: u32, funct7: u32) -> AluOp {
    match class {
        OpClass::Branch => AluOp::Sub,
        OpClass::Register | OpClass::ImmArith => match isa.alu_decode {
            AluDecode::FixedAdd => AluOp::Add,
            AluDecode::Funct3Funct7 => {
                funct_alu_op(funct3, funct7, class == OpClass::Register)
            }
        },
        // address generation
        _ => AluOp::Add,
    }
}

/// Decode `(opcode, funct3, funct7)` into a control bundle.
pub fn decode(isa: &Isa, opcode: u32, funct3: u32, funct7: u32) -> ControlSignals {
    let Some(spec) = isa.classify(opcode) else {
        return ControlSignals::NOP;
    };
    let alu_op = alu_op_for(isa, spec.class, funct3, funct7);
    let base = ControlSignals {
        alu_op,
        imm_sel: spec.imm_sel,
        ..ControlSignals::NOP
    };
    match spec.class {
        OpClass::Register => ControlSignals { reg_write: true, ..base },
        OpClass::ImmArith => ControlSignals {
            reg_write: true,
            alu_src_imm: true,
            ..base
        },
        OpClass::Load => ControlSignals {
            reg_write: true,
            mem_read: true,
            alu_src_imm: true,
            wb_src: WbSrc::Mem,
            ..base
        },
        OpClass::Store => ControlSignals {
            mem_write: true,
            alu_src_imm: true,
            ..base
        },
        OpClass::Branch => ControlSignals { branch: true, ..base },
        OpClass::Jump => ControlSignals { jump: true, ..base },
    }
}
