//! Virtual Machine Core
//!
//! Defines the machine structure, operand decoding and the execution loop.
//! Instruction semantics live in `ops.rs`.

use std::io::{self, Write};

use log::debug;

use crate::bytecode::Instruction;
use crate::config::SvmConfig;
use crate::error::{Fault, OpResult, SvmError, SvmResult};
use crate::host::{Host, ShellHost};

use super::memory::{Memory, MEMORY_SIZE};
use super::register::RegisterFile;
use super::stack::Stack;
use super::value::Value;

/// Callback invoked with the fault that stopped execution
pub type PanicHandler = Box<dyn FnMut(&Fault)>;

/// Register-based virtual machine writing program output to `W`
pub struct VirtualMachine<W: Write = io::Stdout> {
    pub(super) config: SvmConfig,
    pub(super) registers: RegisterFile,
    pub(super) zero_flag: bool,
    pub(super) ip: usize,
    pub(super) memory: Memory,
    pub(super) stack: Stack,
    pub(super) running: bool,
    pub(super) out: W,
    pub(super) host: Box<dyn Host>,
    panic_handler: Option<PanicHandler>,
}

impl VirtualMachine<io::Stdout> {
    /// Create a VM with default configuration, printing to stdout
    pub fn new(program: &[u8]) -> SvmResult<Self> {
        Self::with_config(program, SvmConfig::default())
    }

    pub fn with_config(program: &[u8], config: SvmConfig) -> SvmResult<Self> {
        Self::with_output(program, config, io::stdout())
    }
}

impl<W: Write> VirtualMachine<W> {
    /// Create a VM whose INT_PRINT/STRING_PRINT output goes to `out`.
    /// Fails for empty programs and programs over 65535 bytes.
    pub fn with_output(program: &[u8], config: SvmConfig, out: W) -> SvmResult<Self> {
        let memory = Memory::load(program)?;
        Ok(VirtualMachine {
            config,
            registers: RegisterFile::new(),
            zero_flag: false,
            ip: 0,
            memory,
            stack: Stack::new(),
            running: true,
            out,
            host: Box::new(ShellHost),
            panic_handler: None,
        })
    }

    /// Replace the host used by STRING_SYSTEM
    pub fn set_host(&mut self, host: impl Host + 'static) {
        self.host = Box::new(host);
    }

    /// Install a callback that sees every fault before `run` returns it
    pub fn set_panic_handler(&mut self, handler: impl FnMut(&Fault) + 'static) {
        self.panic_handler = Some(Box::new(handler));
    }

    /// Run from address 0 with the configured instruction cap
    pub fn run(&mut self) -> SvmResult<usize> {
        self.run_with_limit(self.config.max_instructions)
    }

    /// Run from address 0 until EXIT, a fault, or `max` instructions
    /// (0 = no cap). Returns the number of instructions executed.
    pub fn run_with_limit(&mut self, max: usize) -> SvmResult<usize> {
        self.ip = 0;
        self.running = true;
        let mut count = 0;

        while self.running {
            if let Err(fault) = self.step() {
                return Err(self.panic(fault));
            }
            count += 1;

            if max > 0 && count >= max {
                self.running = false;
            }
        }

        if self.config.debug {
            debug!("executed {} instructions", count);
        }
        self.out.flush()?;
        Ok(count)
    }

    /// Execute the instruction at the current instruction pointer
    pub fn step(&mut self) -> OpResult {
        if self.ip >= MEMORY_SIZE {
            self.ip = 0;
        }
        let instruction = Instruction::decode(self.memory.read(self.ip));

        if self.config.debug {
            debug!("{:04x} - parsing op_code hex:{:02X} ({})", self.ip, instruction.byte(), instruction);
        }

        self.dispatch(instruction)
    }

    /// Stop the machine and hand the fault to the panic channel
    fn panic(&mut self, fault: Fault) -> SvmError {
        self.running = false;
        debug!("panic at {:04X}: {}", self.ip, fault);
        if let Some(handler) = self.panic_handler.as_mut() {
            handler(&fault);
        }
        // Keep whatever the program printed before the fault
        let _ = self.out.flush();
        SvmError::Panic(fault)
    }

    /// Advance to the next byte of the instruction stream and return it
    pub(super) fn next_byte(&mut self) -> u8 {
        self.ip += 1;
        if self.ip >= MEMORY_SIZE {
            self.ip = 0;
        }
        self.memory.read(self.ip)
    }

    /// Little-endian 16-bit operand: `low + 256 * high`
    pub(super) fn read_u16(&mut self) -> u16 {
        let low = self.next_byte() as u16;
        let high = self.next_byte() as u16;
        low | (high << 8)
    }

    /// Register operand, bounds checked
    pub(super) fn read_register(&mut self) -> Result<u8, Fault> {
        let reg = self.next_byte();
        self.registers.check(reg)
    }

    /// Embedded string literal: 16-bit length followed by raw bytes. Leaves
    /// the instruction pointer on the last byte read.
    pub(super) fn read_string(&mut self) -> Vec<u8> {
        let len = self.read_u16() as usize;
        (0..len).map(|_| self.next_byte()).collect()
    }

    /// Move past the current instruction
    pub(super) fn advance(&mut self) -> OpResult {
        self.ip += 1;
        Ok(())
    }

    pub fn config(&self) -> &SvmConfig {
        &self.config
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn register(&self, reg: u8) -> Option<&Value> {
        self.registers.get(reg).ok()
    }

    pub fn zero_flag(&self) -> bool {
        self.zero_flag
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn sp(&self) -> usize {
        self.stack.sp()
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Program output collected so far (for in-memory writers)
    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

impl<W: Write> std::fmt::Debug for VirtualMachine<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualMachine")
            .field("config", &self.config)
            .field("registers", &self.registers)
            .field("zero_flag", &self.zero_flag)
            .field("ip", &self.ip)
            .field("sp", &self.stack.sp())
            .field("running", &self.running)
            .finish()
    }
}
