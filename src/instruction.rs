use std::convert::TryFrom;

use crate::error::Fault;
use crate::opcode::Instruction;

/// Every operation the interpreter understands, with the operands it uses.
///
/// `x` and `y` name registers, `nn` is an immediate byte and `nnn` an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// 0000
    Nop,
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1NNN
    Jump { nnn: u16 },
    /// 2NNN
    Call { nnn: u16 },
    /// 3XNN
    SkipEqImm { x: u8, nn: u8 },
    /// 4XNN
    SkipNeImm { x: u8, nn: u8 },
    /// 5XY0
    SkipEqReg { x: u8, y: u8 },
    /// 6XNN
    LoadImm { x: u8, nn: u8 },
    /// 7XNN
    AddImm { x: u8, nn: u8 },
    /// 8XY0
    Move { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    AddReg { x: u8, y: u8 },
    /// 8XY5
    Sub { x: u8, y: u8 },
    /// 8XY6
    ShiftRight { x: u8, y: u8 },
    /// 8XY7
    SubN { x: u8, y: u8 },
    /// 8XYE
    ShiftLeft { x: u8, y: u8 },
    /// 9XY0
    SkipNeReg { x: u8, y: u8 },
    /// ANNN
    LoadI { nnn: u16 },
    /// BNNN
    JumpOffset { nnn: u16 },
    /// CXNN
    Random { x: u8, nn: u8 },
    /// DXYN
    Draw { x: u8, y: u8, n: u8 },
    /// EX9E
    SkipPressed { x: u8 },
    /// EXA1
    SkipNotPressed { x: u8 },
    /// FX07
    LoadDelay { x: u8 },
    /// FX0A
    WaitKey { x: u8 },
    /// FX15
    SetDelay { x: u8 },
    /// FX18
    SetSound { x: u8 },
    /// FX1E
    AddI { x: u8 },
    /// FX29
    LoadGlyph { x: u8 },
    /// FX33
    Bcd { x: u8 },
    /// FX55
    Store { x: u8 },
    /// FX65
    Read { x: u8 },
}

/// Selects the correct Operation for a given Instruction
impl TryFrom<&Instruction> for Operation {
    type Error = Fault;

    fn try_from(inst: &Instruction) -> Result<Self, Self::Error> {
        let Instruction { x, y, n, nn, nnn, .. } = *inst;
        let operation = match inst.nibbles() {
            (0x0, 0x0, 0x0, 0x0) => Operation::Nop,
            (0x0, 0x0, 0xE, 0x0) => Operation::Cls,
            (0x0, 0x0, 0xE, 0xE) => Operation::Ret,
            (0x1, ..) => Operation::Jump { nnn },
            (0x2, ..) => Operation::Call { nnn },
            (0x3, ..) => Operation::SkipEqImm { x, nn },
            (0x4, ..) => Operation::SkipNeImm { x, nn },
            (0x5, .., 0x0) => Operation::SkipEqReg { x, y },
            (0x6, ..) => Operation::LoadImm { x, nn },
            (0x7, ..) => Operation::AddImm { x, nn },
            (0x8, .., 0x0) => Operation::Move { x, y },
            (0x8, .., 0x1) => Operation::Or { x, y },
            (0x8, .., 0x2) => Operation::And { x, y },
            (0x8, .., 0x3) => Operation::Xor { x, y },
            (0x8, .., 0x4) => Operation::AddReg { x, y },
            (0x8, .., 0x5) => Operation::Sub { x, y },
            (0x8, .., 0x6) => Operation::ShiftRight { x, y },
            (0x8, .., 0x7) => Operation::SubN { x, y },
            (0x8, .., 0xE) => Operation::ShiftLeft { x, y },
            (0x9, .., 0x0) => Operation::SkipNeReg { x, y },
            (0xA, ..) => Operation::LoadI { nnn },
            (0xB, ..) => Operation::JumpOffset { nnn },
            (0xC, ..) => Operation::Random { x, nn },
            (0xD, ..) => Operation::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Operation::SkipPressed { x },
            (0xE, _, 0xA, 0x1) => Operation::SkipNotPressed { x },
            (0xF, _, 0x0, 0x7) => Operation::LoadDelay { x },
            (0xF, _, 0x0, 0xA) => Operation::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Operation::SetDelay { x },
            (0xF, _, 0x1, 0x8) => Operation::SetSound { x },
            (0xF, _, 0x1, 0xE) => Operation::AddI { x },
            (0xF, _, 0x2, 0x9) => Operation::LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => Operation::Bcd { x },
            (0xF, _, 0x5, 0x5) => Operation::Store { x },
            (0xF, _, 0x6, 0x5) => Operation::Read { x },
            _ => return Err(Fault::UnknownOpcode { opcode: inst.op }),
        };
        Ok(operation)
    }
}

#[cfg(test)]
mod test_instruction {
    use super::*;

    fn operation(op: u16) -> Result<Operation, Fault> {
        Operation::try_from(&Instruction::decode(op))
    }

    #[test]
    fn test_fixed_opcodes() {
        assert_eq!(operation(0x0000), Ok(Operation::Nop));
        assert_eq!(operation(0x00E0), Ok(Operation::Cls));
        assert_eq!(operation(0x00EE), Ok(Operation::Ret));
    }

    #[test]
    fn test_operands_are_carried() {
        assert_eq!(operation(0x1ABC), Ok(Operation::Jump { nnn: 0xABC }));
        assert_eq!(operation(0x3A42), Ok(Operation::SkipEqImm { x: 0xA, nn: 0x42 }));
        assert_eq!(operation(0x8AB6), Ok(Operation::ShiftRight { x: 0xA, y: 0xB }));
        assert_eq!(operation(0xDAB6), Ok(Operation::Draw { x: 0xA, y: 0xB, n: 0x6 }));
        assert_eq!(operation(0xF265), Ok(Operation::Read { x: 0x2 }));
    }

    #[test]
    fn test_unmapped_opcodes() {
        for op in [0x00E1, 0x0123, 0x8AB8, 0x8ABF, 0xE19F, 0xF100, 0xFFFF].iter() {
            assert_eq!(operation(*op), Err(Fault::UnknownOpcode { opcode: *op }));
        }
    }

    #[test]
    fn test_register_skips_need_zero_trailing_nibble() {
        assert_eq!(operation(0x5AB0), Ok(Operation::SkipEqReg { x: 0xA, y: 0xB }));
        assert_eq!(operation(0x5AB1), Err(Fault::UnknownOpcode { opcode: 0x5AB1 }));
        assert_eq!(operation(0x9AB0), Ok(Operation::SkipNeReg { x: 0xA, y: 0xB }));
        assert_eq!(operation(0x9ABF), Err(Fault::UnknownOpcode { opcode: 0x9ABF }));
    }

    #[test]
    fn test_every_family_decodes_something() {
        let mapped = [
            0x00E0, 0x1000, 0x2000, 0x3000, 0x4000, 0x5000, 0x6000, 0x7000, 0x8000, 0x9000,
            0xA000, 0xB000, 0xC000, 0xD000, 0xE09E, 0xF007,
        ];
        assert!(mapped.iter().all(|op| operation(*op).is_ok()));
    }
}
