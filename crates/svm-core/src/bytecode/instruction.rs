//! Bytecode Instruction Representation
//!
//! Every byte decodes to exactly one `Instruction`: a defined opcode or an
//! explicit `Unknown` carrying the raw byte.

use std::fmt;

use super::opcode::OpCode;

/// Decoded instruction byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Op(OpCode),
    Unknown(u8),
}

impl Instruction {
    pub fn decode(byte: u8) -> Self {
        match OpCode::from_u8(byte) {
            Some(op) => Instruction::Op(op),
            None => Instruction::Unknown(byte),
        }
    }

    /// Raw byte this instruction was decoded from
    pub fn byte(self) -> u8 {
        match self {
            Instruction::Op(op) => op as u8,
            Instruction::Unknown(byte) => byte,
        }
    }
}

impl From<u8> for Instruction {
    fn from(byte: u8) -> Self {
        Instruction::decode(byte)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Op(op) => write!(f, "{}", op.mnemonic()),
            Instruction::Unknown(byte) => write!(f, "UNKNOWN(0x{:02X})", byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_decodes_and_keeps_its_value() {
        let mut known = 0;
        for byte in 0..=u8::MAX {
            let ins = Instruction::decode(byte);
            assert_eq!(ins.byte(), byte);
            if matches!(ins, Instruction::Op(_)) {
                known += 1;
            }
        }
        assert_eq!(known, OpCode::ALL.len());
    }

    #[test]
    fn display_names_unknown_bytes() {
        assert_eq!(Instruction::decode(0x21).to_string(), "MATH_ADD");
        assert_eq!(Instruction::decode(0xEE).to_string(), "UNKNOWN(0xEE)");
    }
}
