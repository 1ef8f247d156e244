//! Register File
//!
//! Sixteen typed slots. Accessors check the slot index and the variant and
//! report problems as faults; nothing is coerced.

use crate::error::{Fault, NUMBER, STRING};
use super::value::Value;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterFile {
    slots: [Value; REGISTER_COUNT],
}

impl RegisterFile {
    /// All registers start as `Number(0)`
    pub fn new() -> Self {
        RegisterFile {
            slots: Default::default(),
        }
    }

    pub fn get(&self, reg: u8) -> Result<&Value, Fault> {
        self.slots
            .get(reg as usize)
            .ok_or(Fault::InvalidRegister(reg))
    }

    /// Replace a register's value; the previous value is dropped here
    pub fn set(&mut self, reg: u8, value: Value) -> Result<(), Fault> {
        let slot = self
            .slots
            .get_mut(reg as usize)
            .ok_or(Fault::InvalidRegister(reg))?;
        *slot = value;
        Ok(())
    }

    pub fn number(&self, reg: u8) -> Result<i32, Fault> {
        self.get(reg)?.as_number().ok_or(Fault::TypeMismatch {
            register: reg,
            expected: NUMBER,
        })
    }

    pub fn string(&self, reg: u8) -> Result<&[u8], Fault> {
        self.get(reg)?.as_bytes().ok_or(Fault::TypeMismatch {
            register: reg,
            expected: STRING,
        })
    }

    /// Fails with `InvalidRegister` for indices past the file
    pub fn check(&self, reg: u8) -> Result<u8, Fault> {
        if (reg as usize) < REGISTER_COUNT {
            Ok(reg)
        } else {
            Err(Fault::InvalidRegister(reg))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.slots.iter()
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
