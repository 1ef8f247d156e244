//! VM Stack Implementation
//!
//! Fixed-capacity integer stack shared by PUSH/POP and CALL/RET.
//! `sp` is the index of the last occupied slot; 0 means empty, so slot 0 is
//! never written.

use crate::error::Fault;

/// Number of stack slots
pub const STACK_SIZE: usize = 1024;

#[derive(Debug, Clone)]
pub struct Stack {
    slots: Box<[i32]>,
    sp: usize,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            slots: vec![0; STACK_SIZE].into_boxed_slice(),
            sp: 0,
        }
    }

    /// Push value onto stack. The bound is checked before anything is
    /// written, and a failed push leaves `sp` untouched.
    pub fn push(&mut self, value: i32) -> Result<(), Fault> {
        if self.is_full() {
            return Err(Fault::StackOverflow);
        }
        self.sp += 1;
        self.slots[self.sp] = value;
        Ok(())
    }

    /// Pop value from stack
    pub fn pop(&mut self) -> Result<i32, Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow);
        }
        let value = self.slots[self.sp];
        self.sp -= 1;
        Ok(value)
    }

    /// Peek at top of stack without removing
    pub fn peek(&self) -> Option<i32> {
        (self.sp > 0).then(|| self.slots[self.sp])
    }

    /// True when the next push would land outside the slot array
    pub fn is_full(&self) -> bool {
        self.sp + 1 >= STACK_SIZE
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop_restores_sp() {
        let mut stack = Stack::new();
        stack.push(-12).unwrap();
        assert_eq!(stack.sp(), 1);
        assert_eq!(stack.peek(), Some(-12));
        assert_eq!(stack.pop(), Ok(-12));
        assert_eq!(stack.sp(), 0);
        assert!(stack.is_empty());
    }

    #[test]
    fn pop_on_empty_underflows() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), Err(Fault::StackUnderflow));
        assert_eq!(stack.peek(), None);
    }

    #[test]
    fn overflow_is_detected_before_the_write() {
        let mut stack = Stack::new();
        for i in 0..(STACK_SIZE - 1) as i32 {
            stack.push(i).unwrap();
        }
        assert!(stack.is_full());
        assert_eq!(stack.push(99), Err(Fault::StackOverflow));
        assert_eq!(stack.sp(), STACK_SIZE - 1);
        assert_eq!(stack.peek(), Some(STACK_SIZE as i32 - 2));
    }
}
