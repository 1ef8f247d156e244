//! SVM Error Types
//!
//! Construction errors are reported through `SvmError`. Faults raised while an
//! instruction executes are `Fault`s; the execution loop wraps them into
//! `SvmError::Panic` once the machine has halted.

use std::io;

use thiserror::Error;

use crate::vm::memory::MAX_PROGRAM_SIZE;

/// Register variant names used in type mismatch reports
pub const NUMBER: &str = "number";
pub const STRING: &str = "string";

#[derive(Debug, Error)]
pub enum SvmError {
    /// A machine cannot be built from an empty buffer
    #[error("program is empty")]
    EmptyProgram,

    /// The program does not fit the addressable program area
    #[error("program is too large: {0} bytes (max {max})", max = MAX_PROGRAM_SIZE)]
    ProgramTooLarge(usize),

    /// Execution stopped on a fault
    #[error("panic: {0}")]
    Panic(#[from] Fault),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Execution-time fault raised by an instruction handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("register {register} doesn't contain a {expected}")]
    TypeMismatch {
        register: u8,
        expected: &'static str,
    },

    #[error("register {0} out of bounds")]
    InvalidRegister(u8),

    #[error("division by zero")]
    DivisionByZero,

    #[error("stack overflow - stack is full")]
    StackOverflow,

    #[error("stack underflow - stack is empty")]
    StackUnderflow,

    #[error("address {0} is outside RAM")]
    MemoryOutOfRange(i32),

    #[error("cannot copy to/from negative addresses")]
    NegativeAddress,

    /// Writing program output failed
    #[error("output error: {0}")]
    Output(String),
}

impl From<io::Error> for Fault {
    fn from(err: io::Error) -> Self {
        Fault::Output(err.to_string())
    }
}

pub type SvmResult<T> = Result<T, SvmError>;

/// Result of a single instruction handler
pub type OpResult = Result<(), Fault>;
