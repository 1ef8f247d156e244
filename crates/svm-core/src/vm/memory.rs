//! VM Memory Model
//!
//! One flat buffer is both the loaded program and the machine's RAM.
//! Instruction fetches and peek/poke/copy all index the same bytes.

use crate::error::{Fault, SvmError, SvmResult};

/// Size of the address space in bytes
pub const MEMORY_SIZE: usize = 0x1_0000;

/// Largest program accepted at construction
pub const MAX_PROGRAM_SIZE: usize = 0xFFFF;

/// Wraparound used while copying blocks; one less than the address space
pub const COPY_WRAP: i64 = 0xFFFF;

/// Unified code/data memory
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Memory {
    /// Zeroed memory with `program` loaded at offset 0
    pub fn load(program: &[u8]) -> SvmResult<Self> {
        if program.is_empty() {
            return Err(SvmError::EmptyProgram);
        }
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(SvmError::ProgramTooLarge(program.len()));
        }

        let mut bytes = vec![0u8; MEMORY_SIZE].into_boxed_slice();
        bytes[..program.len()].copy_from_slice(program);
        Ok(Memory { bytes })
    }

    /// Read a byte; addresses wrap at the end of memory
    pub fn read(&self, addr: usize) -> u8 {
        self.bytes[addr % MEMORY_SIZE]
    }

    pub fn write(&mut self, addr: usize, value: u8) {
        self.bytes[addr % MEMORY_SIZE] = value;
    }

    /// Translate a register value into an address, rejecting anything
    /// outside the address space
    pub fn address(value: i32) -> Result<usize, Fault> {
        if value < 0 || value as usize >= MEMORY_SIZE {
            return Err(Fault::MemoryOutOfRange(value));
        }
        Ok(value as usize)
    }

    /// Byte-by-byte copy. Negative endpoints are rejected; indices wrap
    /// modulo `COPY_WRAP`. Overlapping ranges see bytes written earlier in
    /// the same copy.
    pub fn copy(&mut self, dest: i32, src: i32, len: i32) -> Result<(), Fault> {
        if src < 0 || dest < 0 {
            return Err(Fault::NegativeAddress);
        }

        for i in 0..len.max(0) as i64 {
            let from = (src as i64 + i) % COPY_WRAP;
            let to = (dest as i64 + i) % COPY_WRAP;
            self.bytes[to as usize] = self.bytes[from as usize];
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory").field("size", &self.bytes.len()).finish()
    }
}
