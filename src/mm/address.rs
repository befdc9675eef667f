//! User Virtual Address Type
//!
//! Type-safe wrapper for addresses handed in by user processes. A raw
//! argument word is never used as an address without going through
//! [`VirtAddr`], which keeps the "this came from user space" provenance
//! visible at every dereference site.
//!
//! # Memory Layout
//! Minos runs user programs on a 32-bit virtual machine. User-accessible
//! addresses occupy `[0, USER_TOP)`; everything at or above `USER_TOP`
//! belongs to the kernel. The null page is never mapped.

use core::fmt;

/// Width of one machine word (and of every stack-passed argument).
pub const WORD_SIZE: u32 = 4;

/// First address above the user-accessible range (kernel base).
pub const USER_TOP: u32 = 0xC000_0000;

/// Conventional load address of a user program's code segment.
pub const USER_CODE_BASE: u32 = 0x0804_8000;

/// A user-space virtual address.
///
/// Newtype over the raw 32-bit word so user pointers cannot be mixed up
/// with lengths, descriptors or plain integers. Carrying a `VirtAddr`
/// implies nothing about validity; validation happens at access time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VirtAddr(u32);

impl VirtAddr {
    /// Wrap a raw argument word as an address.
    #[inline]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Get the raw address value.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Check for the null pointer.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Check if the address itself lies below the kernel base.
    #[inline]
    pub const fn is_user(self) -> bool {
        self.0 < USER_TOP
    }

    /// Add a byte offset, `None` on 32-bit wrap-around.
    #[inline]
    pub fn checked_add(self, offset: u32) -> Option<Self> {
        self.0.checked_add(offset).map(Self)
    }

    /// One-past-the-end address of an access of `len` bytes starting
    /// here, `None` on wrap-around.
    #[inline]
    pub fn end_of(self, len: u32) -> Option<Self> {
        self.checked_add(len)
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#010x})", self.0)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_kernel_split() {
        assert!(VirtAddr::new(USER_CODE_BASE).is_user());
        assert!(VirtAddr::new(USER_TOP - 1).is_user());
        assert!(!VirtAddr::new(USER_TOP).is_user());
        assert!(!VirtAddr::new(0xFFFF_FFFF).is_user());
    }

    #[test]
    fn end_of_detects_wraparound() {
        let near_top = VirtAddr::new(u32::MAX - 2);
        assert!(near_top.end_of(8).is_none());
        assert_eq!(
            VirtAddr::new(0x1000).end_of(0x10),
            Some(VirtAddr::new(0x1010))
        );
    }
}
