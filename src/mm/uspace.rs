//! Simulated User Address Space
//!
//! Each process owns one contiguous mapped segment of its virtual
//! address space. The program loader (an external collaborator) fills
//! it before the first trap; this layer only performs checked loads and
//! stores on behalf of syscall arguments and I/O buffers.
//!
//! An access that is inside the user range but outside the mapped
//! segment behaves like a page fault on an unmapped page: it reports a
//! [`UserFault`], and the boundary layer kills the process the same way
//! it would for an out-of-range pointer. Words are little-endian, the
//! byte order of the user machine.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use super::address::VirtAddr;

/// Fault raised by an access to an unmapped user address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFault {
    /// First faulting address of the access.
    pub addr: VirtAddr,
    /// Length in bytes of the attempted access.
    pub len: u32,
}

impl fmt::Display for UserFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unmapped user access of {} bytes at {}", self.len, self.addr)
    }
}

/// The mapped portion of a process's user address space.
pub struct UserSpace {
    base: VirtAddr,
    bytes: Vec<u8>,
}

impl UserSpace {
    /// Create a zero-filled segment of `size` bytes starting at `base`.
    pub fn new(base: VirtAddr, size: usize) -> Self {
        Self {
            base,
            bytes: vec![0; size],
        }
    }

    /// Base address of the mapped segment.
    #[inline]
    pub fn base(&self) -> VirtAddr {
        self.base
    }

    /// One past the highest mapped address.
    #[inline]
    pub fn limit(&self) -> VirtAddr {
        VirtAddr::new(self.base.as_u32() + self.bytes.len() as u32)
    }

    /// Translate `[addr, addr + len)` into an offset range within the
    /// segment, faulting if any byte is unmapped.
    fn offset(&self, addr: VirtAddr, len: u32) -> Result<usize, UserFault> {
        let fault = UserFault { addr, len };
        let start = addr.as_u32().checked_sub(self.base.as_u32()).ok_or(fault)?;
        let end = start.checked_add(len).ok_or(fault)?;
        if end as usize > self.bytes.len() {
            return Err(fault);
        }
        Ok(start as usize)
    }

    /// Load one byte.
    pub fn load_byte(&self, addr: VirtAddr) -> Result<u8, UserFault> {
        let off = self.offset(addr, 1)?;
        Ok(self.bytes[off])
    }

    /// Store one byte.
    pub fn store_byte(&mut self, addr: VirtAddr, value: u8) -> Result<(), UserFault> {
        let off = self.offset(addr, 1)?;
        self.bytes[off] = value;
        Ok(())
    }

    /// Load one little-endian word.
    pub fn load_word(&self, addr: VirtAddr) -> Result<u32, UserFault> {
        let off = self.offset(addr, 4)?;
        let raw: [u8; 4] = self.bytes[off..off + 4].try_into().map_err(|_| UserFault { addr, len: 4 })?;
        Ok(u32::from_le_bytes(raw))
    }

    /// Store one little-endian word.
    pub fn store_word(&mut self, addr: VirtAddr, value: u32) -> Result<(), UserFault> {
        let off = self.offset(addr, 4)?;
        self.bytes[off..off + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Borrow `[addr, addr + len)` for reading.
    pub fn slice(&self, addr: VirtAddr, len: u32) -> Result<&[u8], UserFault> {
        let off = self.offset(addr, len)?;
        Ok(&self.bytes[off..off + len as usize])
    }

    /// Borrow `[addr, addr + len)` for writing.
    pub fn slice_mut(&mut self, addr: VirtAddr, len: u32) -> Result<&mut [u8], UserFault> {
        let off = self.offset(addr, len)?;
        Ok(&mut self.bytes[off..off + len as usize])
    }
}

impl fmt::Debug for UserSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserSpace({}..{})", self.base, self.limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_roundtrip_little_endian() {
        let base = VirtAddr::new(0x1000);
        let mut us = UserSpace::new(base, 64);
        us.store_word(base, 0xDEAD_BEEF).unwrap();
        assert_eq!(us.load_byte(base).unwrap(), 0xEF);
        assert_eq!(us.load_word(base).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn unmapped_access_faults() {
        let base = VirtAddr::new(0x1000);
        let us = UserSpace::new(base, 16);
        // Below the segment.
        assert!(us.load_byte(VirtAddr::new(0xFFF)).is_err());
        // Straddling the end: first byte mapped, last byte not.
        assert!(us.slice(VirtAddr::new(0x100E), 4).is_err());
        // Exactly at the end is fine.
        assert!(us.slice(VirtAddr::new(0x100C), 4).is_ok());
    }

    #[test]
    fn offset_overflow_faults() {
        let us = UserSpace::new(VirtAddr::new(0x1000), 16);
        assert!(us.slice(VirtAddr::new(0xFFFF_FFF0), 0x20).is_err());
    }
}
