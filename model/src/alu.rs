//! Combinational ALU.
//!
//! Operates at the ISA's data width: inputs and the result are masked to
//! `xlen` bits, ADD/SUB wrap, SLT compares in signed two's complement at
//! that width. The two machines differ only in shift-amount handling.

use crate::imm::sign_extend;
use crate::isa::{Isa, ShiftRule};

/// ALU operation selectors, matching the 3-bit hardware encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add = 0b000,
    Sub = 0b001,
    And = 0b010,
    Or = 0b011,
    Xor = 0b100,
    Slt = 0b101,
    Sll = 0b110,
    Srl = 0b111,
}

impl AluOp {
    /// decode a raw 3-bit selector; out-of-range values have no operation
    pub fn from_bits(bits: u32) -> Option<AluOp> {
        match bits {
            0b000 => Some(AluOp::Add),
            0b001 => Some(AluOp::Sub),
            0b010 => Some(AluOp::And),
            0b011 => Some(AluOp::Or),
            0b100 => Some(AluOp::Xor),
            0b101 => Some(AluOp::Slt),
            0b110 => Some(AluOp::Sll),
            0b111 => Some(AluOp::Srl),
            _ => None,
        }
    }
}

/// result bus plus the zero flag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AluOut {
    pub result: u32,
    pub zero: bool,
}

fn shamt(isa: &Isa, b: u32) -> Option<u32> {
    match isa.shift {
        ShiftRule::MaskShamt => Some(b & (isa.xlen - 1)),
        ShiftRule::ZeroBeyondWidth => {
            if b >= isa.xlen {
                None
            } else {
                Some(b)
            }
        }
    }
}

/// evaluate `op` on `a` and `b` at the ISA's width
pub fn eval(isa: &Isa, op: AluOp, a: u32, b: u32) -> AluOut {
    let mask = isa.mask();
    let a = a & mask;
    let b = b & mask;
    let result = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Slt => {
            let sa = sign_extend(a, isa.xlen, 32) as i32;
            let sb = sign_extend(b, isa.xlen, 32) as i32;
            (sa < sb) as u32
        }
        AluOp::Sll => match shamt(isa, b) {
            Some(n) => a << n,
            None => 0,
        },
        AluOp::Srl => match shamt(isa, b) {
            Some(n) => a >> n,
            None => 0,
        },
    } & mask;
    AluOut { result, zero: result == 0 }
}

/// evaluate from a raw selector; an undefined selector drives the
/// default arm, result 0
pub fn eval_bits(isa: &Isa, bits: u32, a: u32, b: u32) -> AluOut {
    match AluOp::from_bits(bits) {
        Some(op) => eval(isa, op, a, b),
        None => AluOut { result: 0, zero: true },
    }
}
