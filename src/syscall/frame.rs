//! Trapped Call Frame
//!
//! The record the trap mechanism hands the dispatcher: the user stack
//! pointer at trap time and the register slot the result word goes
//! back through. The call number and arguments live in user memory
//! above the stack pointer and are fetched through the validator, never
//! through this struct.

use crate::mm::VirtAddr;

/// Saved state of one trap, owned by the trap mechanism.
#[derive(Debug, Clone, Copy)]
pub struct TrapFrame {
    /// User stack pointer at trap time. Word 0 above it is the call
    /// number, words 1..N are the arguments.
    pub usp: VirtAddr,
    ret: u32,
}

impl TrapFrame {
    /// Frame for a trap taken with the given user stack pointer. The
    /// return slot starts as whatever the register held; a call that
    /// produces no value leaves it untouched.
    pub fn new(usp: VirtAddr) -> Self {
        Self { usp, ret: 0 }
    }

    /// Write the single result word.
    #[inline]
    pub fn set_return(&mut self, value: u32) {
        self.ret = value;
    }

    /// The result word the process will see in its return register.
    #[inline]
    pub fn return_value(&self) -> u32 {
        self.ret
    }

    /// The result word reinterpreted as the signed values most calls
    /// produce.
    #[inline]
    pub fn return_value_signed(&self) -> i32 {
        self.ret as i32
    }
}
