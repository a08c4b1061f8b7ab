//! # instruction set
//!
//! Every CHIP-8 instruction is two bytes, big-endian. The fields are always
//! in the same places, so we pull them all out up front and let the
//! instruction variant pick the ones it cares about:
//!
//! ```text
//!   c x y n
//!   ^ ^ ^ ^-- n:   low nibble, sub-selector / sprite height
//!   | | `---- y:   register index
//!   | `------ x:   register index
//!   `-------- c:   opcode class
//!       `-nn:  low byte, immediate
//!     `---nnn: low 12 bits, address
//! ```

use std::fmt;

/// a raw instruction word, split into its nibbles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn from_bytes(hi: u8, lo: u8) -> Self {
        Opcode(u16::from_be_bytes([hi, lo]))
    }

    pub fn class(self) -> u8 {
        (self.0 >> 12) as u8
    }
    pub fn x(self) -> u8 {
        ((self.0 >> 8) & 0xf) as u8
    }
    pub fn y(self) -> u8 {
        ((self.0 >> 4) & 0xf) as u8
    }
    pub fn n(self) -> u8 {
        (self.0 & 0xf) as u8
    }
    pub fn nn(self) -> u8 {
        (self.0 & 0xff) as u8
    }
    pub fn nnn(self) -> u16 {
        self.0 & 0x0fff
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

/// the executable CHIP-8 instructions; register operands are indices 0-15
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm(u8, u8),
    /// 4XNN
    SkipNeImm(u8, u8),
    /// 5XY0
    SkipEqReg(u8, u8),
    /// 9XY0
    SkipNeReg(u8, u8),
    /// 6XNN
    LoadImm(u8, u8),
    /// 7XNN
    AddImm(u8, u8),
    /// 8XY0
    Move(u8, u8),
    /// 8XY1
    Or(u8, u8),
    /// 8XY2
    And(u8, u8),
    /// 8XY3
    Xor(u8, u8),
    /// 8XY4
    AddCarry(u8, u8),
    /// 8XY5: VX - VY
    Sub(u8, u8),
    /// 8XY6
    ShiftRight(u8),
    /// 8XY7: VY - VX
    SubReversed(u8, u8),
    /// 8XYE
    ShiftLeft(u8),
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset(u16),
    /// CXNN
    Random(u8, u8),
    /// DXYN
    Draw(u8, u8, u8),
    /// EX9E
    SkipKeyPressed(u8),
    /// EXA1
    SkipKeyNotPressed(u8),
    /// FX07
    ReadDelayTimer(u8),
    /// FX15
    SetDelayTimer(u8),
    /// FX18
    SetSoundTimer(u8),
    /// FX1E
    AddIndex(u8),
    /// FX29
    FontAddress(u8),
    /// FX33
    StoreBcd(u8),
    /// FX55
    StoreRegisters(u8),
    /// FX65
    LoadRegisters(u8),
}

impl Instruction {
    /// turn a word into something executable, or `None` if no instruction
    /// has that bit pattern
    pub fn decode(op: Opcode) -> Option<Instruction> {
        use Instruction::*;
        let (x, y) = (op.x(), op.y());
        let i = match (op.class(), op.n()) {
            (0x0, _) => match op.0 {
                0x00e0 => Clear,
                0x00ee => Return,
                _ => return None,
            },
            (0x1, _) => Jump(op.nnn()),
            (0x2, _) => Call(op.nnn()),
            (0x3, _) => SkipEqImm(x, op.nn()),
            (0x4, _) => SkipNeImm(x, op.nn()),
            (0x5, 0x0) => SkipEqReg(x, y),
            (0x6, _) => LoadImm(x, op.nn()),
            (0x7, _) => AddImm(x, op.nn()),
            (0x8, 0x0) => Move(x, y),
            (0x8, 0x1) => Or(x, y),
            (0x8, 0x2) => And(x, y),
            (0x8, 0x3) => Xor(x, y),
            (0x8, 0x4) => AddCarry(x, y),
            (0x8, 0x5) => Sub(x, y),
            (0x8, 0x6) => ShiftRight(x),
            (0x8, 0x7) => SubReversed(x, y),
            (0x8, 0xe) => ShiftLeft(x),
            (0x9, 0x0) => SkipNeReg(x, y),
            (0xa, _) => LoadIndex(op.nnn()),
            (0xb, _) => JumpOffset(op.nnn()),
            (0xc, _) => Random(x, op.nn()),
            (0xd, n) => Draw(x, y, n),
            (0xe, _) => match op.nn() {
                0x9e => SkipKeyPressed(x),
                0xa1 => SkipKeyNotPressed(x),
                _ => return None,
            },
            (0xf, _) => match op.nn() {
                0x07 => ReadDelayTimer(x),
                0x15 => SetDelayTimer(x),
                0x18 => SetSoundTimer(x),
                0x1e => AddIndex(x),
                0x29 => FontAddress(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegisters(x),
                0x65 => LoadRegisters(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Instruction::*;

    #[test]
    fn test_fields() {
        let op = Opcode::from_bytes(0xd1, 0x2f);
        assert_eq!(op.0, 0xd12f);
        assert_eq!(op.class(), 0xd);
        assert_eq!(op.x(), 0x1);
        assert_eq!(op.y(), 0x2);
        assert_eq!(op.n(), 0xf);
        assert_eq!(op.nn(), 0x2f);
        assert_eq!(op.nnn(), 0x12f);
        assert_eq!(op.to_string(), "d12f");
    }

    #[test]
    fn test_decode_table() {
        let cases = [
            (0x00e0, Clear),
            (0x00ee, Return),
            (0x1234, Jump(0x234)),
            (0x2456, Call(0x456)),
            (0x342a, SkipEqImm(0x4, 0x2a)),
            (0x4a75, SkipNeImm(0xa, 0x75)),
            (0x5ae0, SkipEqReg(0xa, 0xe)),
            (0x63f5, LoadImm(0x3, 0xf5)),
            (0x7b12, AddImm(0xb, 0x12)),
            (0x8590, Move(0x5, 0x9)),
            (0x8101, Or(0x1, 0x0)),
            (0x8642, And(0x6, 0x4)),
            (0x87f3, Xor(0x7, 0xf)),
            (0x8264, AddCarry(0x2, 0x6)),
            (0x8c45, Sub(0xc, 0x4)),
            (0x8106, ShiftRight(0x1)),
            (0x86d7, SubReversed(0x6, 0xd)),
            (0x8e0e, ShiftLeft(0xe)),
            (0x9990, SkipNeReg(0x9, 0x9)),
            (0xa568, LoadIndex(0x568)),
            (0xbabc, JumpOffset(0xabc)),
            (0xc5af, Random(0x5, 0xaf)),
            (0xd7b0, Draw(0x7, 0xb, 0)),
            (0xe49e, SkipKeyPressed(0x4)),
            (0xeca1, SkipKeyNotPressed(0xc)),
            (0xf907, ReadDelayTimer(0x9)),
            (0xf315, SetDelayTimer(0x3)),
            (0xf718, SetSoundTimer(0x7)),
            (0xf91e, AddIndex(0x9)),
            (0xff29, FontAddress(0xf)),
            (0xf533, StoreBcd(0x5)),
            (0xf655, StoreRegisters(0x6)),
            (0xf265, LoadRegisters(0x2)),
        ];
        for (word, expected) in cases {
            assert_eq!(Instruction::decode(Opcode(word)), Some(expected), "{:04x}", word);
        }
    }

    #[test]
    fn test_undefined_patterns() {
        // 0NNN machine calls, unused sub-selectors, FX0A and friends
        for word in [
            0x0000, 0x00e1, 0x00ef, 0x0123, 0x5121, 0x912f, 0x8008, 0x800f, 0xe000, 0xe19f,
            0xf00a, 0xf030, 0xf075, 0xf085, 0xffff,
        ] {
            assert_eq!(Instruction::decode(Opcode(word)), None, "{:04x}", word);
        }
    }
}
