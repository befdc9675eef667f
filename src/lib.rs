//! Minos - User-Program System-Call Boundary Layer
//!
//! The one place in the Minos teaching kernel where untrusted input
//! crosses the privilege boundary. User processes trap in with a call
//! number and stack-passed arguments; this crate validates every
//! user-supplied address, dispatches to the requested operation, and
//! keeps the per-process table of open file descriptors honest.
//!
//! # Trust Model
//! - Every argument word and every buffer range is validated before the
//!   kernel touches it
//! - Protocol violations (bad addresses, bad descriptors, malformed call
//!   numbers) terminate the offending process, never the kernel
//! - Operational failures (missing files, full tables) are reported
//!   in-band as -1/false return values
//!
//! # Collaborators
//! The scheduler, raw filesystem, console device and power control are
//! pre-existing kernel services reached through narrow traits
//! ([`process::ProcessControl`], [`fs::FileSys`], [`fs::FileObject`],
//! [`fs::Console`]). This crate implements the boundary and the resource
//! bookkeeping around them, not their semantics.
//!
//! # Concurrency
//! One kernel thread per process; the layer runs synchronously in the
//! calling thread. A single non-reentrant guard ([`fs::FsGuard`])
//! serializes all backing-store and console access system-wide.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod fs;
pub mod mm;
pub mod process;
pub mod syscall;

pub use process::Process;
pub use syscall::{Kernel, TrapFrame, TrapOutcome};
