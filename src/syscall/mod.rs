//! System Call Interface
//!
//! The trust boundary between user processes and the kernel. A trap on
//! [`TRAP_VECTOR`] lands in [`Kernel::handle_trap`] with the trapped
//! frame; everything user-supplied is validated here before any other
//! subsystem sees it.
//!
//! # Protocol
//! Stack-passed: word 0 above the trapped user stack pointer is the
//! call number, words 1..N are the arguments (one machine word each,
//! pointers included). The single result word travels back through the
//! frame's return slot.
//!
//! Gate registration itself is the trap mechanism's one-time setup; the
//! constants below are what it registers.

mod frame;
mod handler;
mod number;
mod numeric;
mod validate;

pub use frame::TrapFrame;
pub use handler::{Abort, Kernel, TrapOutcome};
pub use number::{SyscallNumber, UnknownSyscall};
pub use numeric::{fibonacci, max_of_four_int};
pub use validate::{check_user_range, read_user_cstr, read_user_word, Access};

/// Interrupt vector of the system-call gate.
pub const TRAP_VECTOR: u8 = 0x30;

/// Privilege level allowed to invoke the gate (user mode).
pub const TRAP_DPL: u8 = 3;

/// The gate is registered interrupt-enabled: handlers run with
/// interrupts on and may block.
pub const TRAP_INTERRUPTS_ON: bool = true;
