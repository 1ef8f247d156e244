use svm_core::bytecode::OpCode;
use svm_core::{SvmConfig, Value, VirtualMachine};

fn machine(program: &[u8], config: SvmConfig) -> VirtualMachine<Vec<u8>> {
    VirtualMachine::with_output(program, config, Vec::new()).expect("create failed")
}

#[test]
fn instruction_cap_stops_an_endless_loop() {
    let code = [OpCode::JumpTo as u8, 0x00, 0x00];
    let mut vm = machine(&code, SvmConfig::new());
    assert_eq!(vm.run_with_limit(10).expect("execution failed"), 10);
    assert!(!vm.is_running());

    let mut vm = machine(&code, SvmConfig::new().with_max_instructions(25));
    assert_eq!(vm.config().max_instructions, 25);
    assert_eq!(vm.run().expect("execution failed"), 25);
}

#[test]
fn rerun_restarts_at_address_zero_keeping_state() {
    let code = [OpCode::MathInc as u8, 0, OpCode::Exit as u8];
    let mut vm = machine(&code, SvmConfig::new());
    vm.run().expect("first run failed");
    vm.run().expect("second run failed");
    assert_eq!(vm.register(0), Some(&Value::Number(2)));
}

#[test]
fn instruction_pointer_wraps_to_zero() {
    let mut code = vec![OpCode::Nop as u8; 0xFFFF];
    code[..11].copy_from_slice(&[
        OpCode::CmpImmediate as u8, 3, 42, 0,
        OpCode::JumpZ as u8, 0x0A, 0x00,
        OpCode::JumpTo as u8, 0xFC, 0xFF,
        OpCode::Exit as u8,
    ]);
    // INT_STORE r3, 42; the high byte comes from the zero padding at 0xFFFF
    code[0xFFFC] = OpCode::IntStore as u8;
    code[0xFFFD] = 3;
    code[0xFFFE] = 42;

    let mut vm = machine(&code, SvmConfig::new());
    assert_eq!(vm.run().expect("execution failed"), 7);
    assert_eq!(vm.register(3), Some(&Value::Number(42)));
}

#[test]
fn step_executes_one_instruction() {
    let code = [OpCode::MathInc as u8, 1, OpCode::MathInc as u8, 1, OpCode::Exit as u8];
    let mut vm = machine(&code, SvmConfig::new());
    vm.step().expect("step failed");
    assert_eq!(vm.ip(), 2);
    assert_eq!(vm.register(1), Some(&Value::Number(1)));
    assert!(vm.is_running());
}

#[test]
fn debug_tracing_does_not_change_results() {
    let code = [
        OpCode::IntStore as u8, 0, 6, 0,
        OpCode::IntStore as u8, 1, 7, 0,
        OpCode::MathMul as u8, 2, 0, 1,
        OpCode::IntPrint as u8, 2,
        OpCode::Exit as u8,
    ];
    let mut vm = machine(&code, SvmConfig::new().with_debug(true));
    vm.run().expect("execution failed");
    assert_eq!(vm.into_output(), b"42".to_vec());
}

#[test]
fn register_dump_lists_every_register() {
    let code = [
        OpCode::IntStore as u8, 0, 0x1F, 0x00,
        OpCode::StringStore as u8, 1, 3, 0, b'a', b'\n', b'"',
        OpCode::IsString as u8, 1,
        OpCode::Exit as u8,
    ];
    let mut vm = machine(&code, SvmConfig::new());
    vm.run().expect("execution failed");

    let dump = vm.register_dump();
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 18);
    assert_eq!(lines[0], "register dump");
    assert_eq!(lines[1], "\tregister 00 - decimal: 0031 [hex:001f]");
    assert_eq!(lines[2], "\tregister 01 - string: \"a\\n\\\"\"");
    assert_eq!(lines[16], "\tregister 15 - decimal: 0000 [hex:0000]");
    assert_eq!(lines[17], "\tz-flag: true");
    assert_eq!(vm.registers().iter().filter(|v| v.is_string()).count(), 1);
}
