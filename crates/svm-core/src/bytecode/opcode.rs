//! Bytecode Opcode Definitions
//!
//! Defines the raw opcode set for SVM bytecode.
//! This file contains no execution semantics.
//! Opcodes are grouped in blocks of 16 by category.

/// Bytecode opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    // Early opcodes
    Exit        = 0x00,
    IntStore    = 0x01,
    IntPrint    = 0x02,
    IntToString = 0x03,
    IntRandom   = 0x04,

    // Jumps
    JumpTo = 0x10,
    JumpZ  = 0x11,
    JumpNz = 0x12,

    // Math
    MathXor = 0x20,
    MathAdd = 0x21,
    MathSub = 0x22,
    MathMul = 0x23,
    MathDiv = 0x24,
    MathInc = 0x25,
    MathDec = 0x26,
    MathAnd = 0x27,
    MathOr  = 0x28,
    MathLft = 0x29,
    MathRgt = 0x2A,

    // Strings
    StringStore  = 0x30,
    StringPrint  = 0x31,
    StringConcat = 0x32,
    StringSystem = 0x33,
    StringToInt  = 0x34,

    // Comparisons / tests
    CmpReg       = 0x40,
    CmpImmediate = 0x41,
    CmpString    = 0x42,
    IsString     = 0x43,
    IsNumber     = 0x44,

    // Misc
    Nop      = 0x50,
    StoreReg = 0x51,

    // Peek / poke
    Peek   = 0x60,
    Poke   = 0x61,
    Memcpy = 0x62,

    // Stack
    StackPush = 0x70,
    StackPop  = 0x71,
    StackRet  = 0x72,
    StackCall = 0x73,
}

impl OpCode {
    /// Every defined opcode, in byte order
    pub const ALL: [OpCode; 38] = [
        OpCode::Exit,
        OpCode::IntStore,
        OpCode::IntPrint,
        OpCode::IntToString,
        OpCode::IntRandom,
        OpCode::JumpTo,
        OpCode::JumpZ,
        OpCode::JumpNz,
        OpCode::MathXor,
        OpCode::MathAdd,
        OpCode::MathSub,
        OpCode::MathMul,
        OpCode::MathDiv,
        OpCode::MathInc,
        OpCode::MathDec,
        OpCode::MathAnd,
        OpCode::MathOr,
        OpCode::MathLft,
        OpCode::MathRgt,
        OpCode::StringStore,
        OpCode::StringPrint,
        OpCode::StringConcat,
        OpCode::StringSystem,
        OpCode::StringToInt,
        OpCode::CmpReg,
        OpCode::CmpImmediate,
        OpCode::CmpString,
        OpCode::IsString,
        OpCode::IsNumber,
        OpCode::Nop,
        OpCode::StoreReg,
        OpCode::Peek,
        OpCode::Poke,
        OpCode::Memcpy,
        OpCode::StackPush,
        OpCode::StackPop,
        OpCode::StackRet,
        OpCode::StackCall,
    ];

    /// Convert raw byte to opcode
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(OpCode::Exit),
            0x01 => Some(OpCode::IntStore),
            0x02 => Some(OpCode::IntPrint),
            0x03 => Some(OpCode::IntToString),
            0x04 => Some(OpCode::IntRandom),

            0x10 => Some(OpCode::JumpTo),
            0x11 => Some(OpCode::JumpZ),
            0x12 => Some(OpCode::JumpNz),

            0x20 => Some(OpCode::MathXor),
            0x21 => Some(OpCode::MathAdd),
            0x22 => Some(OpCode::MathSub),
            0x23 => Some(OpCode::MathMul),
            0x24 => Some(OpCode::MathDiv),
            0x25 => Some(OpCode::MathInc),
            0x26 => Some(OpCode::MathDec),
            0x27 => Some(OpCode::MathAnd),
            0x28 => Some(OpCode::MathOr),
            0x29 => Some(OpCode::MathLft),
            0x2A => Some(OpCode::MathRgt),

            0x30 => Some(OpCode::StringStore),
            0x31 => Some(OpCode::StringPrint),
            0x32 => Some(OpCode::StringConcat),
            0x33 => Some(OpCode::StringSystem),
            0x34 => Some(OpCode::StringToInt),

            0x40 => Some(OpCode::CmpReg),
            0x41 => Some(OpCode::CmpImmediate),
            0x42 => Some(OpCode::CmpString),
            0x43 => Some(OpCode::IsString),
            0x44 => Some(OpCode::IsNumber),

            0x50 => Some(OpCode::Nop),
            0x51 => Some(OpCode::StoreReg),

            0x60 => Some(OpCode::Peek),
            0x61 => Some(OpCode::Poke),
            0x62 => Some(OpCode::Memcpy),

            0x70 => Some(OpCode::StackPush),
            0x71 => Some(OpCode::StackPop),
            0x72 => Some(OpCode::StackRet),
            0x73 => Some(OpCode::StackCall),

            _ => None,
        }
    }

    /// Assembly-style name, used in traces
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Exit => "EXIT",
            OpCode::IntStore => "INT_STORE",
            OpCode::IntPrint => "INT_PRINT",
            OpCode::IntToString => "INT_TOSTRING",
            OpCode::IntRandom => "INT_RANDOM",
            OpCode::JumpTo => "JUMP_TO",
            OpCode::JumpZ => "JUMP_Z",
            OpCode::JumpNz => "JUMP_NZ",
            OpCode::MathXor => "MATH_XOR",
            OpCode::MathAdd => "MATH_ADD",
            OpCode::MathSub => "MATH_SUB",
            OpCode::MathMul => "MATH_MUL",
            OpCode::MathDiv => "MATH_DIV",
            OpCode::MathInc => "MATH_INC",
            OpCode::MathDec => "MATH_DEC",
            OpCode::MathAnd => "MATH_AND",
            OpCode::MathOr => "MATH_OR",
            OpCode::MathLft => "MATH_LFT",
            OpCode::MathRgt => "MATH_RGT",
            OpCode::StringStore => "STRING_STORE",
            OpCode::StringPrint => "STRING_PRINT",
            OpCode::StringConcat => "STRING_CONCAT",
            OpCode::StringSystem => "STRING_SYSTEM",
            OpCode::StringToInt => "STRING_TOINT",
            OpCode::CmpReg => "CMP_REG",
            OpCode::CmpImmediate => "CMP_IMMEDIATE",
            OpCode::CmpString => "CMP_STRING",
            OpCode::IsString => "IS_STRING",
            OpCode::IsNumber => "IS_NUMBER",
            OpCode::Nop => "NOP",
            OpCode::StoreReg => "STORE_REG",
            OpCode::Peek => "PEEK",
            OpCode::Poke => "POKE",
            OpCode::Memcpy => "MEMCPY",
            OpCode::StackPush => "STACK_PUSH",
            OpCode::StackPop => "STACK_POP",
            OpCode::StackRet => "STACK_RET",
            OpCode::StackCall => "STACK_CALL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_opcode_decodes_to_itself() {
        for op in OpCode::ALL {
            assert_eq!(OpCode::from_u8(op as u8), Some(op), "{}", op.mnemonic());
        }
    }

    #[test]
    fn gaps_between_blocks_are_undefined() {
        for byte in [0x05u8, 0x0F, 0x13, 0x2B, 0x35, 0x45, 0x52, 0x63, 0x74, 0x80, 0xFF] {
            assert_eq!(OpCode::from_u8(byte), None, "0x{:02X}", byte);
        }
    }
}
