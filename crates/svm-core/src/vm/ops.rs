//! Instruction Handlers
//!
//! One method per opcode. Every handler either ends with `advance()` (one
//! byte past its last operand) or sets the instruction pointer itself
//! (taken jumps, CALL, RET). Faults are returned, never printed here.

use std::io::Write;

use log::{info, warn};
use rand::Rng;

use crate::bytecode::{Instruction, OpCode};
use crate::error::{Fault, OpResult};

use super::memory::Memory;
use super::value::Value;
use super::vm::VirtualMachine;

/// Operand trace, emitted only when the machine runs with `debug` set
macro_rules! trace {
    ($vm:expr, $($arg:tt)*) => {
        if $vm.config.debug {
            log::debug!($($arg)*);
        }
    };
}

impl<W: Write> VirtualMachine<W> {
    pub(super) fn dispatch(&mut self, instruction: Instruction) -> OpResult {
        let op = match instruction {
            Instruction::Op(op) => op,
            Instruction::Unknown(byte) => return self.op_unknown(byte),
        };

        match op {
            OpCode::Exit => self.op_exit(),
            OpCode::Nop => self.op_nop(),

            OpCode::IntStore => self.op_int_store(),
            OpCode::IntPrint => self.op_int_print(),
            OpCode::IntToString => self.op_int_tostring(),
            OpCode::IntRandom => self.op_int_random(),

            OpCode::JumpTo => self.op_jump(op, |_| true),
            OpCode::JumpZ => self.op_jump(op, |z| z),
            OpCode::JumpNz => self.op_jump(op, |z| !z),

            OpCode::MathXor => self.op_math(op, |a, b| a ^ b),
            OpCode::MathAdd => self.op_math(op, i32::wrapping_add),
            OpCode::MathSub => self.op_math(op, i32::wrapping_sub),
            OpCode::MathMul => self.op_math(op, i32::wrapping_mul),
            OpCode::MathAnd => self.op_math(op, |a, b| a & b),
            OpCode::MathOr => self.op_math(op, |a, b| a | b),
            OpCode::MathLft => self.op_math(op, |a, b| a.wrapping_shl(b as u32)),
            OpCode::MathRgt => self.op_math(op, |a, b| a.wrapping_shr(b as u32)),
            OpCode::MathDiv => self.op_math_div(),
            OpCode::MathInc => self.op_step(op, 1),
            OpCode::MathDec => self.op_step(op, -1),

            OpCode::StringStore => self.op_string_store(),
            OpCode::StringPrint => self.op_string_print(),
            OpCode::StringConcat => self.op_string_concat(),
            OpCode::StringSystem => self.op_string_system(),
            OpCode::StringToInt => self.op_string_toint(),

            OpCode::CmpReg => self.op_cmp_reg(),
            OpCode::CmpImmediate => self.op_cmp_immediate(),
            OpCode::CmpString => self.op_cmp_string(),
            OpCode::IsString => self.op_is(op, Value::is_string),
            OpCode::IsNumber => self.op_is(op, Value::is_number),

            OpCode::StoreReg => self.op_store_reg(),

            OpCode::Peek => self.op_peek(),
            OpCode::Poke => self.op_poke(),
            OpCode::Memcpy => self.op_memcpy(),

            OpCode::StackPush => self.op_stack_push(),
            OpCode::StackPop => self.op_stack_pop(),
            OpCode::StackRet => self.op_stack_ret(),
            OpCode::StackCall => self.op_stack_call(),
        }
    }

    /// Unmapped byte: report it and keep going
    fn op_unknown(&mut self, byte: u8) -> OpResult {
        warn!("{:04X} - unknown opcode 0x{:02X}", self.ip, byte);
        self.advance()
    }

    fn op_exit(&mut self) -> OpResult {
        trace!(self, "EXIT");
        self.running = false;
        self.advance()
    }

    fn op_nop(&mut self) -> OpResult {
        trace!(self, "NOP");
        self.advance()
    }

    fn op_int_store(&mut self) -> OpResult {
        let reg = self.read_register()?;
        let value = self.read_u16() as i32;
        trace!(self, "INT_STORE (register {}) => {:04} [hex:{:04x}]", reg, value, value);

        self.registers.set(reg, Value::Number(value))?;
        self.advance()
    }

    fn op_int_print(&mut self) -> OpResult {
        let reg = self.read_register()?;
        let value = self.registers.number(reg)?;
        trace!(self, "INT_PRINT (register {}) => {} [hex:{:04x}]", reg, value, value);

        write!(self.out, "{}", value)?;
        self.advance()
    }

    fn op_int_tostring(&mut self) -> OpResult {
        let reg = self.read_register()?;
        trace!(self, "INT_TOSTRING (register {})", reg);

        let value = self.registers.number(reg)?;
        self.registers.set(reg, Value::String(value.to_string().into_bytes()))?;
        self.advance()
    }

    fn op_int_random(&mut self) -> OpResult {
        let reg = self.read_register()?;
        trace!(self, "INT_RANDOM (register {})", reg);

        let value = rand::thread_rng().gen_range(0..0x1_0000);
        self.registers.set(reg, Value::Number(value))?;
        self.advance()
    }

    fn op_jump(&mut self, op: OpCode, taken: fn(bool) -> bool) -> OpResult {
        let target = self.read_u16() as usize;
        trace!(self, "{} (offset {} [hex:{:04X}])", op.mnemonic(), target, target);

        if taken(self.zero_flag) {
            self.ip = target;
            Ok(())
        } else {
            self.advance()
        }
    }

    /// Read `dst, src1, src2` and check both sources hold numbers
    fn math_operands(&mut self, op: OpCode) -> Result<(u8, i32, i32), Fault> {
        let dst = self.read_register()?;
        let src1 = self.read_register()?;
        let src2 = self.read_register()?;
        trace!(self, "{} (register {} = register {}, register {})", op.mnemonic(), dst, src1, src2);

        let a = self.registers.number(src1)?;
        let b = self.registers.number(src2)?;
        Ok((dst, a, b))
    }

    fn store_result(&mut self, dst: u8, result: i32) -> OpResult {
        self.registers.set(dst, Value::Number(result))?;
        self.zero_flag = result == 0;
        self.advance()
    }

    fn op_math(&mut self, op: OpCode, apply: fn(i32, i32) -> i32) -> OpResult {
        let (dst, a, b) = self.math_operands(op)?;
        self.store_result(dst, apply(a, b))
    }

    fn op_math_div(&mut self) -> OpResult {
        let (dst, a, b) = self.math_operands(OpCode::MathDiv)?;
        if b == 0 {
            return Err(Fault::DivisionByZero);
        }
        self.store_result(dst, a.wrapping_div(b))
    }

    /// INC / DEC
    fn op_step(&mut self, op: OpCode, delta: i32) -> OpResult {
        let reg = self.read_register()?;
        trace!(self, "{} (register {})", op.mnemonic(), reg);

        let value = self.registers.number(reg)?.wrapping_add(delta);
        self.store_result(reg, value)
    }

    fn op_string_store(&mut self) -> OpResult {
        let reg = self.read_register()?;
        let text = self.read_string();
        trace!(self, "STRING_STORE (register {}) = '{}'", reg, String::from_utf8_lossy(&text));

        self.registers.set(reg, Value::String(text))?;
        self.advance()
    }

    fn op_string_print(&mut self) -> OpResult {
        let reg = self.read_register()?;
        trace!(self, "STRING_PRINT (register {})", reg);

        let text = self.registers.string(reg)?;
        self.out.write_all(text)?;
        self.advance()
    }

    fn op_string_concat(&mut self) -> OpResult {
        let dst = self.read_register()?;
        let src1 = self.read_register()?;
        let src2 = self.read_register()?;
        trace!(self, "STRING_CONCAT (register {} = register {} + register {})", dst, src1, src2);

        let mut joined = self.registers.string(src1)?.to_vec();
        joined.extend_from_slice(self.registers.string(src2)?);
        self.registers.set(dst, Value::String(joined))?;
        self.advance()
    }

    fn op_string_system(&mut self) -> OpResult {
        let reg = self.read_register()?;
        trace!(self, "STRING_SYSTEM (register {})", reg);

        let command = self.registers.string(reg)?.to_vec();
        if self.config.fuzz_safe {
            info!("fuzzing - skipping execution of: {}", String::from_utf8_lossy(&command));
            return self.advance();
        }

        // Anything already printed should reach the terminal before the child's output
        self.out.flush()?;
        match self.host.system(&command) {
            Ok(status) => trace!(self, "STRING_SYSTEM exited with {:?}", status),
            Err(e) => warn!("failed to run '{}': {}", String::from_utf8_lossy(&command), e),
        }
        self.advance()
    }

    fn op_string_toint(&mut self) -> OpResult {
        let reg = self.read_register()?;
        trace!(self, "STRING_TOINT (register {})", reg);

        let value = parse_int(self.registers.string(reg)?);
        self.registers.set(reg, Value::Number(value))?;
        self.advance()
    }

    fn op_cmp_reg(&mut self) -> OpResult {
        let reg1 = self.read_register()?;
        let reg2 = self.read_register()?;
        trace!(self, "CMP (register {} vs register {})", reg1, reg2);

        // Different variants compare unequal
        self.zero_flag = self.registers.get(reg1)? == self.registers.get(reg2)?;
        self.advance()
    }

    fn op_cmp_immediate(&mut self) -> OpResult {
        let reg = self.read_register()?;
        let value = self.read_u16() as i32;
        trace!(self, "CMP_IMMEDIATE (register {} vs {} [hex:{:04X}])", reg, value, value);

        self.zero_flag = self.registers.number(reg)? == value;
        self.advance()
    }

    fn op_cmp_string(&mut self) -> OpResult {
        let reg = self.read_register()?;
        let literal = self.read_string();
        trace!(self, "CMP_STRING (register {} vs '{}')", reg, String::from_utf8_lossy(&literal));

        self.zero_flag = self.registers.string(reg)? == literal.as_slice();
        self.advance()
    }

    fn op_is(&mut self, op: OpCode, test: fn(&Value) -> bool) -> OpResult {
        let reg = self.read_register()?;
        trace!(self, "{} (register {})", op.mnemonic(), reg);

        self.zero_flag = test(self.registers.get(reg)?);
        self.advance()
    }

    fn op_store_reg(&mut self) -> OpResult {
        let dst = self.read_register()?;
        let src = self.read_register()?;
        trace!(self, "STORE_REG (register {} = register {})", dst, src);

        let value = self.registers.get(src)?.clone();
        self.registers.set(dst, value)?;
        self.advance()
    }

    fn op_peek(&mut self) -> OpResult {
        let dst = self.read_register()?;
        let addr_reg = self.read_register()?;

        let addr = Memory::address(self.registers.number(addr_reg)?)?;
        let value = self.memory.read(addr);
        trace!(self, "PEEK (register {} = [{:04X}] => {:02X})", dst, addr, value);

        self.registers.set(dst, Value::Number(value as i32))?;
        self.advance()
    }

    fn op_poke(&mut self) -> OpResult {
        let src = self.read_register()?;
        let addr_reg = self.read_register()?;

        let value = self.registers.number(src)?;
        let addr = Memory::address(self.registers.number(addr_reg)?)?;
        trace!(self, "POKE ([{:04X}] = {:02X})", addr, value as u8);

        self.memory.write(addr, value as u8);
        self.advance()
    }

    fn op_memcpy(&mut self) -> OpResult {
        let dest_reg = self.read_register()?;
        let src_reg = self.read_register()?;
        let len_reg = self.read_register()?;

        let src = self.registers.number(src_reg)?;
        let dest = self.registers.number(dest_reg)?;
        let len = self.registers.number(len_reg)?;
        trace!(self, "MEMCPY ({:04x} bytes from {:04X} to {:04X})", len, src, dest);

        self.memory.copy(dest, src, len)?;
        self.advance()
    }

    fn op_stack_push(&mut self) -> OpResult {
        let reg = self.read_register()?;
        let value = self.registers.number(reg)?;
        trace!(self, "PUSH (register {} [={:04x}])", reg, value);

        self.stack.push(value)?;
        self.advance()
    }

    fn op_stack_pop(&mut self) -> OpResult {
        let reg = self.read_register()?;
        let value = self.stack.pop()?;
        trace!(self, "POP (register {}) => {:04x}", reg, value);

        self.registers.set(reg, Value::Number(value))?;
        self.advance()
    }

    fn op_stack_ret(&mut self) -> OpResult {
        let target = self.stack.pop()?;
        trace!(self, "RET => {:04x}", target);

        // Out-of-range targets are wrapped to 0 by the next fetch
        self.ip = target as u32 as usize;
        Ok(())
    }

    fn op_stack_call(&mut self) -> OpResult {
        let target = self.read_u16() as usize;
        trace!(self, "CALL (offset {:04X})", target);

        // Return to the byte after the target operand
        self.stack.push((self.ip + 1) as i32)?;
        self.ip = target;
        Ok(())
    }
}

/// Decimal prefix of `text` the way C's `atoi` reads it: optional leading
/// whitespace and sign, then digits. Anything else yields 0; overflow wraps.
pub fn parse_int(text: &[u8]) -> i32 {
    let mut rest = text
        .iter()
        .copied()
        .skip_while(|&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C))
        .peekable();

    let negative = match rest.peek() {
        Some(&b'-') => {
            rest.next();
            true
        }
        Some(&b'+') => {
            rest.next();
            false
        }
        _ => false,
    };

    let magnitude = rest
        .take_while(|b| b.is_ascii_digit())
        .fold(0i32, |acc, b| acc.wrapping_mul(10).wrapping_add((b - b'0') as i32));

    if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    }
}
