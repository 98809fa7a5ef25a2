//! Chip-8 opcodes are 16 bits, stored big-endian.
//!
//! The first nibble picks a category and, where a category holds several operations, the last
//! one or two nibbles pick within it. The rest carry operands: `x` and `y` name registers,
//! `nn` is an immediate byte and `nnn` a 12-bit address.

/// A fetched opcode split into every field an operation might use.
///
/// Decoding never fails; whether the opcode means anything is only decided at execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: u16,
    pub x: u8,
    pub y: u8,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
}

impl Instruction {
    pub fn decode(op: u16) -> Self {
        Instruction {
            op,
            x: ((op & 0x0F00) >> 8) as u8,
            y: ((op & 0x00F0) >> 4) as u8,
            n: (op & 0x000F) as u8,
            nn: (op & 0x00FF) as u8,
            nnn: op & 0x0FFF,
        }
    }

    /// `(category, x, y, n)`; the shape every operation is matched on
    pub fn nibbles(&self) -> (u8, u8, u8, u8) {
        ((self.op >> 12) as u8, self.x, self.y, self.n)
    }
}

impl From<u16> for Instruction {
    fn from(op: u16) -> Self {
        Instruction::decode(op)
    }
}

#[cfg(test)]
mod test_opcode {
    use super::*;

    #[test]
    fn test_nibbles() {
        assert_eq!(Instruction::decode(0xABCD).nibbles(), (0xA, 0xB, 0xC, 0xD));
        assert_eq!(Instruction::decode(0xF065).nibbles(), (0xF, 0x0, 0x6, 0x5));
    }

    #[test]
    fn test_fields_do_not_bleed() {
        let instruction = Instruction::decode(0x0F0F);
        assert_eq!(instruction.x, 0xF);
        assert_eq!(instruction.y, 0x0);
        assert_eq!(instruction.n, 0xF);
        assert_eq!(instruction.nn, 0x0F);
        assert_eq!(instruction.nnn, 0xF0F);
    }

    #[test]
    fn test_decode_keeps_raw_opcode() {
        let instruction = Instruction::decode(0xD123);
        assert_eq!(
            instruction,
            Instruction {
                op: 0xD123,
                x: 0x1,
                y: 0x2,
                n: 0x3,
                nn: 0x23,
                nnn: 0x123,
            }
        );
    }

    #[test]
    fn test_decode_accepts_any_value() {
        assert_eq!(Instruction::decode(0x0000).nnn, 0x000);
        assert_eq!(Instruction::from(0xFFFF).nn, 0xFF);
    }
}
