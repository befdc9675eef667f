//! File Descriptor Table
//!
//! Per-process arena mapping small integer handles to open file
//! resources. Slots 0-2 are the reserved standard streams and never
//! hold an entry; slots 3..=127 hold either nothing or the sole owning
//! reference to one open resource.
//!
//! # Allocation Policy
//! Lowest free index first, scanning from slot 3. The policy is part of
//! the user-visible contract: after `k` OPENs a fresh process holds
//! exactly descriptors `{3, ..., k + 2}`, and a CLOSE followed by an
//! OPEN reuses the just-freed slot.

use alloc::boxed::Box;

use crate::fs::FileObject;

/// Number of slots, reserved streams included.
pub const FD_TABLE_SIZE: usize = 128;

/// A descriptor index known to lie within the table.
///
/// Newtype so raw argument words cannot index the table without a
/// bounds check.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct Fd(u8);

impl Fd {
    /// Standard input.
    pub const STDIN: Self = Self(0);
    /// Standard output.
    pub const STDOUT: Self = Self(1);
    /// Standard error (reserved, unused by the handlers).
    pub const STDERR: Self = Self(2);
    /// First slot available to OPEN.
    pub const FIRST_FILE: Self = Self(3);

    /// Check a raw descriptor word. Returns `None` when it falls
    /// outside 0..=127 (negative values included).
    #[inline]
    pub const fn new(raw: i32) -> Option<Self> {
        if raw >= 0 && raw < FD_TABLE_SIZE as i32 {
            Some(Self(raw as u8))
        } else {
            None
        }
    }

    /// Get the slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Error type for descriptor-table operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdError {
    /// The raw descriptor falls outside the table.
    OutOfRange,
    /// The slot holds no open resource.
    Empty,
    /// No free slot between 3 and 127.
    Full,
}

impl core::fmt::Display for FdError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "descriptor out of range"),
            Self::Empty => write!(f, "descriptor not open"),
            Self::Full => write!(f, "descriptor table full"),
        }
    }
}

/// The per-process descriptor table.
///
/// Private to the owning process and only ever touched from its own
/// kernel thread, so it needs no locking of its own.
pub struct FdTable {
    slots: [Option<Box<dyn FileObject>>; FD_TABLE_SIZE],
}

impl FdTable {
    /// Create an empty table (process start).
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Install a resource in the lowest free slot >= 3.
    ///
    /// On a full table the resource is dropped, which closes it.
    pub fn install(&mut self, file: Box<dyn FileObject>) -> Result<Fd, FdError> {
        for i in Fd::FIRST_FILE.index()..FD_TABLE_SIZE {
            if self.slots[i].is_none() {
                self.slots[i] = Some(file);
                return Ok(Fd(i as u8));
            }
        }
        Err(FdError::Full)
    }

    /// Borrow the resource in an occupied slot.
    pub fn get_mut(&mut self, fd: Fd) -> Result<&mut dyn FileObject, FdError> {
        match self.slots[fd.index()].as_deref_mut() {
            Some(file) => Ok(file),
            None => Err(FdError::Empty),
        }
    }

    /// Take the resource out of a slot, leaving it free.
    pub fn remove(&mut self, fd: Fd) -> Result<Box<dyn FileObject>, FdError> {
        self.slots[fd.index()].take().ok_or(FdError::Empty)
    }

    /// Close every still-open descriptor (process exit).
    pub fn drain(&mut self) {
        for slot in &mut self.slots[Fd::FIRST_FILE.index()..] {
            drop(slot.take());
        }
    }

    /// Number of occupied slots.
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;
    impl FileObject for Dummy {
        fn read(&mut self, _buf: &mut [u8]) -> usize {
            0
        }
        fn write(&mut self, buf: &[u8]) -> usize {
            buf.len()
        }
        fn seek(&mut self, _pos: u32) {}
        fn tell(&self) -> u32 {
            0
        }
        fn len(&self) -> u32 {
            0
        }
        fn deny_write(&mut self) {}
    }

    #[test]
    fn fd_bounds() {
        assert!(Fd::new(-1).is_none());
        assert!(Fd::new(128).is_none());
        assert_eq!(Fd::new(0), Some(Fd::STDIN));
        assert_eq!(Fd::new(3), Some(Fd::FIRST_FILE));
        assert_eq!(Fd::new(127).unwrap().index(), 127);
    }

    #[test]
    fn install_is_lowest_free_first() {
        let mut t = FdTable::new();
        for expect in 3..8 {
            let fd = t.install(Box::new(Dummy)).unwrap();
            assert_eq!(fd.index(), expect);
        }
    }

    #[test]
    fn remove_then_install_reuses_slot() {
        let mut t = FdTable::new();
        let a = t.install(Box::new(Dummy)).unwrap();
        let b = t.install(Box::new(Dummy)).unwrap();
        assert_eq!((a.index(), b.index()), (3, 4));
        t.remove(a).unwrap();
        let c = t.install(Box::new(Dummy)).unwrap();
        assert_eq!(c.index(), 3);
    }

    #[test]
    fn reserved_slots_stay_empty() {
        let mut t = FdTable::new();
        t.install(Box::new(Dummy)).unwrap();
        for raw in 0..3 {
            let fd = Fd::new(raw).unwrap();
            assert_eq!(t.get_mut(fd).err(), Some(FdError::Empty));
        }
    }

    #[test]
    fn table_fills_at_125_entries() {
        let mut t = FdTable::new();
        for _ in 3..FD_TABLE_SIZE {
            t.install(Box::new(Dummy)).unwrap();
        }
        assert_eq!(t.install(Box::new(Dummy)).err(), Some(FdError::Full));
        t.drain();
        assert_eq!(t.open_count(), 0);
        assert_eq!(t.install(Box::new(Dummy)).unwrap().index(), 3);
    }
}
