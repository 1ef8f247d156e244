//! SVM Configuration
//!
//! Per-machine switches. The machine never consults process state; drivers
//! decide how to fill this in (the CLI reads it from the environment).

/// VM Configuration
#[derive(Debug, Clone, Default)]
pub struct SvmConfig {
    /// Trace every dispatched opcode and its decoded operands
    pub debug: bool,

    /// Log STRING_SYSTEM commands instead of handing them to the host
    pub fuzz_safe: bool,

    /// Instruction cap used by `run` (0 = unbounded)
    pub max_instructions: usize,
}

impl SvmConfig {
    /// Create a new configuration with everything switched off
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_fuzz_safe(mut self, fuzz_safe: bool) -> Self {
        self.fuzz_safe = fuzz_safe;
        self
    }

    pub fn with_max_instructions(mut self, max: usize) -> Self {
        self.max_instructions = max;
        self
    }
}
