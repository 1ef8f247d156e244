//! Simple Virtual Machine - CLI
//!
//! Minimal command-line interface to execute SVM bytecode.
//!
//! Usage: `svm <file> [max_instructions]`
//!
//! Environment:
//! - `DEBUG`: trace every instruction and dump registers after the run
//! - `FUZZ`: log STRING_SYSTEM commands instead of executing them

use std::env;
use std::fs;
use std::process;

use log::{Level, LevelFilter, Log, Metadata, Record};

use svm_core::config::SvmConfig;
use svm_core::error::SvmError;
use svm_core::vm::vm::VirtualMachine;

/// Writes log records to stderr
struct Logger;

impl Log for Logger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            match record.level() {
                Level::Debug | Level::Trace => eprintln!("{}", record.args()),
                level => eprintln!("{}: {}", level.as_str().to_lowercase(), record.args()),
            }
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

/// Build the machine configuration from the process environment
fn config_from_env(max_instructions: usize) -> SvmConfig {
    SvmConfig::new()
        .with_debug(env::var_os("DEBUG").is_some())
        .with_fuzz_safe(env::var_os("FUZZ").is_some())
        .with_max_instructions(max_instructions)
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(args.first().map(String::as_str).unwrap_or("svm"));
        return;
    }

    // Non-numeric limits count as "no limit"
    let max_instructions = args
        .get(2)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(0);
    let config = config_from_env(max_instructions);

    let _ = log::set_logger(&LOGGER);
    log::set_max_level(if config.debug { LevelFilter::Debug } else { LevelFilter::Warn });

    process::exit(run_file(&args[1], config));
}

fn run_file(path: &str, config: SvmConfig) -> i32 {
    // Read bytecode file
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("failed to read file {}: {}", path, e);
            return 1;
        }
    };

    let dump_registers = config.debug;

    // Create VM
    let mut vm = match VirtualMachine::with_config(&bytes, config) {
        Ok(vm) => vm,
        Err(e) => {
            eprintln!("failed to create virtual machine instance for file {}: {}", path, e);
            return 1;
        }
    };

    // Execute
    let status = match vm.run() {
        Ok(_) => 0,
        Err(SvmError::Panic(fault)) => {
            eprintln!("\x1b[31mpanic\x1b[0m: {}", fault);
            1
        }
        Err(e) => {
            eprintln!("runtime error: {}", e);
            1
        }
    };

    if dump_registers {
        print!("{}", vm.register_dump());
    }
    status
}

fn print_usage(program: &str) {
    println!("Simple Virtual Machine (SVM)");
    println!("Usage: {} <bytecode_file> [max_instructions]", program);
}

#[cfg(test)]
mod tests {
    use super::*;
    use svm_core::bytecode::OpCode;

    fn write_program(name: &str, bytes: &[u8]) -> String {
        let path = env::temp_dir().join(format!("svm-cli-{}-{}", process::id(), name));
        fs::write(&path, bytes).expect("write failed");
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn missing_file_exits_with_one() {
        assert_eq!(run_file("/definitely/not/here.bin", SvmConfig::new()), 1);
    }

    #[test]
    fn empty_file_exits_with_one() {
        let path = write_program("empty", &[]);
        assert_eq!(run_file(&path, SvmConfig::new()), 1);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn clean_run_exits_with_zero() {
        let path = write_program("ok", &[OpCode::MathInc as u8, 0, OpCode::Exit as u8]);
        assert_eq!(run_file(&path, SvmConfig::new()), 0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn panic_exits_with_one() {
        let path = write_program("panic", &[OpCode::StackRet as u8]);
        assert_eq!(run_file(&path, SvmConfig::new()), 1);
        let _ = fs::remove_file(path);
    }
}
