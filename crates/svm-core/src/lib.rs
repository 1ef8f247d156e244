//! Simple Virtual Machine - Core Library
//!
//! A register-based bytecode machine: sixteen typed registers, one 64 KiB
//! address space shared by code and data, and an integer stack for
//! PUSH/POP and CALL/RET.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod vm;
pub mod host;

// Re-export commonly used types
pub use error::{Fault, SvmError, SvmResult};
pub use config::SvmConfig;
pub use bytecode::{Instruction, OpCode};
pub use vm::value::Value;
pub use vm::vm::VirtualMachine;
pub use host::{Host, RecordingHost, ShellHost};

#[cfg(test)]
mod tests {
	use super::*;

	fn machine(program: &[u8]) -> VirtualMachine<Vec<u8>> {
		VirtualMachine::with_output(program, SvmConfig::new(), Vec::new()).expect("create failed")
	}

	#[test]
	fn store_and_print_number() {
		let program = [
			OpCode::IntStore as u8, 0x00, 0x05, 0x00,
			OpCode::IntPrint as u8, 0x00,
			OpCode::Exit as u8,
		];
		let mut vm = machine(&program);
		let executed = vm.run().expect("execution failed");
		assert_eq!(executed, 3);
		assert_eq!(vm.output().as_slice(), b"5");
		assert_eq!(vm.register(0), Some(&Value::Number(5)));
		assert!(!vm.is_running());
	}

	#[test]
	fn add_prints_sum_and_clears_zero_flag() {
		let program = [
			OpCode::IntStore as u8, 0, 1, 0,
			OpCode::IntStore as u8, 1, 2, 0,
			OpCode::MathAdd as u8, 2, 0, 1,
			OpCode::IntPrint as u8, 2,
			OpCode::Exit as u8,
		];
		let mut vm = machine(&program);
		vm.run().expect("execution failed");
		assert_eq!(vm.output().as_slice(), b"3");
		assert_eq!(vm.register(2), Some(&Value::Number(3)));
		assert!(!vm.zero_flag());
	}

	#[test]
	fn cmp_immediate_sets_and_clears_zero_flag() {
		let equal = [
			OpCode::IntStore as u8, 0, 0x34, 0x12,
			OpCode::CmpImmediate as u8, 0, 0x34, 0x12,
			OpCode::Exit as u8,
		];
		let mut vm = machine(&equal);
		vm.run().expect("execution failed");
		assert!(vm.zero_flag());

		let different = [
			OpCode::IntStore as u8, 0, 0x34, 0x12,
			OpCode::CmpImmediate as u8, 0, 0x35, 0x12,
			OpCode::Exit as u8,
		];
		let mut vm = machine(&different);
		vm.run().expect("execution failed");
		assert!(!vm.zero_flag());
	}

	#[test]
	fn pop_on_empty_stack_panics_without_further_output() {
		let program = [
			OpCode::StackPop as u8, 0,
			OpCode::IntPrint as u8, 0,
			OpCode::Exit as u8,
		];
		let mut vm = machine(&program);
		let res = vm.run();
		assert!(matches!(res, Err(SvmError::Panic(Fault::StackUnderflow))));
		assert!(vm.output().is_empty());
		assert!(!vm.is_running());
	}

	#[test]
	fn construction_rejects_bad_programs() {
		assert!(matches!(VirtualMachine::new(&[]), Err(SvmError::EmptyProgram)));
		let big = vec![OpCode::Nop as u8; 0x1_0000];
		assert!(matches!(VirtualMachine::new(&big), Err(SvmError::ProgramTooLarge(0x1_0000))));
	}

	#[test]
	fn panic_handler_sees_the_fault() {
		use std::cell::RefCell;
		use std::rc::Rc;

		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);

		let program = [
			OpCode::StringStore as u8, 0, 1, 0, b'x',
			OpCode::IntPrint as u8, 0,
		];
		let mut vm = machine(&program);
		vm.set_panic_handler(move |fault| sink.borrow_mut().push(fault.clone()));
		let res = vm.run();
		assert!(res.is_err());
		assert_eq!(
			seen.borrow().as_slice(),
			&[Fault::TypeMismatch { register: 0, expected: error::NUMBER }]
		);
	}
}
