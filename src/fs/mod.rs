//! Filesystem and Console Collaborators
//!
//! The raw filesystem and the console device are pre-existing kernel
//! services; this layer reaches them only through the narrow traits
//! below, and only while holding the single [`FsGuard`].
//!
//! # Locking Discipline
//! Minos has one disk and one console, so one non-reentrant guard
//! serializes every backing-store and console operation system-wide.
//! The guard *owns* the collaborators: code cannot touch the filesystem
//! or console without locking it first, which makes the discipline
//! structural rather than a convention.

use alloc::boxed::Box;
use spin::{Mutex, MutexGuard};

/// One open file resource, handed out by [`FileSys::open`].
///
/// The resource keeps its own cursor and deny-write flag; this layer
/// treats it as opaque beyond these operations. Ownership lives in
/// exactly one descriptor-table slot, and dropping the box closes the
/// resource.
pub trait FileObject: Send {
    /// Read at the cursor into `buf`; returns bytes read.
    fn read(&mut self, buf: &mut [u8]) -> usize;
    /// Write `buf` at the cursor; returns bytes written (0 if the
    /// resource is marked deny-write).
    fn write(&mut self, buf: &[u8]) -> usize;
    /// Reposition the cursor. No clamping beyond what the resource
    /// itself enforces.
    fn seek(&mut self, pos: u32);
    /// Current cursor position.
    fn tell(&self) -> u32;
    /// Total byte length of the file.
    fn len(&self) -> u32;
    /// Forbid writes through this resource (used while the file backs a
    /// running executable image).
    fn deny_write(&mut self);
}

/// The raw filesystem.
pub trait FileSys: Send {
    /// Create a zero-filled file entry of `initial_size` bytes.
    fn create(&mut self, name: &str, initial_size: u32) -> bool;
    /// Delete a named file entry.
    fn remove(&mut self, name: &str) -> bool;
    /// Open a named file, `None` if it does not exist.
    fn open(&mut self, name: &str) -> Option<Box<dyn FileObject>>;
}

/// The console device (descriptors 0 and 1).
pub trait Console: Send {
    /// Block for the next input character.
    fn getc(&mut self) -> u8;
    /// Write `buf` to the console as one block.
    fn put(&mut self, buf: &[u8]);
}

/// Everything that lives behind the access guard.
pub struct Backing {
    pub filesys: Box<dyn FileSys>,
    pub console: Box<dyn Console>,
}

/// The File-System Access Guard.
///
/// At most one thread executes any filesystem or console operation at a
/// time. Strictly non-reentrant: a thread that already holds the guard
/// must not lock it again. Hold it for the shortest span that keeps the
/// underlying operation atomic with respect to other processes.
pub struct FsGuard {
    backing: Mutex<Backing>,
}

impl FsGuard {
    /// Wrap the collaborators behind the guard.
    pub fn new(filesys: Box<dyn FileSys>, console: Box<dyn Console>) -> Self {
        Self {
            backing: Mutex::new(Backing { filesys, console }),
        }
    }

    /// Acquire the guard, blocking until it is free.
    pub fn lock(&self) -> MutexGuard<'_, Backing> {
        self.backing.lock()
    }
}
