//! Immediate generation.
//!
//! Each format is a list of bit-scatter segments: a field of the raw
//! instruction and the position it lands at in the assembled immediate.
//! The assembled value is sign-extended from the format's width to the
//! ISA's data width.

use crate::isa::{width_mask, Field, Isa};

/// One contiguous run of immediate bits inside the instruction word.
#[derive(Copy, Clone, Debug)]
pub struct Segment {
    /// where the bits sit in the instruction
    pub bits: Field,
    /// where they land in the immediate
    pub shift: u32,
}

/// A complete immediate format: segments plus the pre-extension width.
#[derive(Copy, Clone, Debug)]
pub struct ImmFormat {
    pub segments: &'static [Segment],
    pub width: u32,
}

/// sign-extend the low `from_bits` bits of `value` to `to_bits` bits
pub(crate) const fn sign_extend(value: u32, from_bits: u32, to_bits: u32) -> u32 {
    let value = value & width_mask(from_bits);
    let sign = 1 << (from_bits - 1);
    if value & sign == 0 {
        value
    } else {
        (value | !width_mask(from_bits)) & width_mask(to_bits)
    }
}

/// Assemble the immediate of `word` under format selector `sel`.
///
/// A selector outside the ISA's format table yields 0, matching the
/// hardware's default mux arm.
pub fn generate(isa: &Isa, word: u32, sel: u32) -> u32 {
    let Some(format) = isa.imm_formats.get(sel as usize) else {
        return 0;
    };
    let mut imm = 0;
    for seg in format.segments {
        imm |= seg.bits.extract(word) << seg.shift;
    }
    sign_extend(imm, format.width, isa.xlen)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::isa::{immsel, MICRO8, RV32};
    use crate::programs::encode;

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0b011111, 6, 8), 31);
        assert_eq!(sign_extend(0b111111, 6, 8), 0xff);
        assert_eq!(sign_extend(0b100000, 6, 8), 0xe0);
        assert_eq!(sign_extend(0x7ff, 12, 32), 0x7ff);
        assert_eq!(sign_extend(0x800, 12, 32), 0xffff_f800);
        assert_eq!(sign_extend(0, 12, 32), 0);
    }

    #[test]
    fn test_rv32_imm_i() {
        for val in [0i32, 1, -1, 2047, -2048, 100, -7] {
            let word = encode::i_type(0b001_0011, 1, 0b000, 2, val);
            let got = generate(&RV32, word, immsel::I);
            assert_eq!(got, val as u32, "imm {val}");
        }
    }

    #[test]
    fn test_rv32_imm_s() {
        for val in [0i32, 8, -4, 2047, -2048] {
            let word = encode::s_type(0b010_0011, 0b010, 1, 2, val);
            let got = generate(&RV32, word, immsel::S);
            assert_eq!(got, val as u32, "imm {val}");
        }
    }

    #[test]
    fn test_rv32_imm_b() {
        // branch offsets are even, bit 0 is implicit
        for val in [0i32, 8, -8, 4094, -4096, 16] {
            let word = encode::b_type(0b110_0011, 0b000, 1, 2, val);
            let got = generate(&RV32, word, immsel::B);
            assert_eq!(got, val as u32, "imm {val}");
        }
    }

    #[test]
    fn test_rv32_bad_selector() {
        let word = encode::i_type(0b001_0011, 1, 0b000, 2, -1);
        assert_eq!(generate(&RV32, word, 3), 0);
    }

    #[test]
    fn test_micro8_imm() {
        for val in [0i32, 5, 31, -1, -32, 20] {
            let word = encode::m8_i(0b0101, 1, 0, val);
            let got = generate(&MICRO8, word as u32, immsel::I);
            assert_eq!(got, (val as u32) & 0xff, "imm {val}");
        }
    }
}
