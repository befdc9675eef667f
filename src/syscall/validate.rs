//! User Address Validation
//!
//! Every user-supplied address is checked here before the kernel
//! touches a single byte of it.
//!
//! # Rules
//! - Null is never valid, whatever the length
//! - Every byte of `[addr, addr + len)` must lie below `USER_TOP`;
//!   checking only the first byte of a multi-byte buffer is exactly the
//!   bug this module exists to prevent
//! - `addr + len` overflow is a violation, not a wrap-around
//! - A failed check aborts the offending process with status -1, the
//!   same path as an explicit exit; it never dereferences the pointer
//!   and never returns to the caller's happy path
//!
//! Ranges that pass validation can still hit an unmapped page inside
//! the user segment; those faults are reported by [`UserSpace`] and
//! handled identically.

use alloc::string::String;
use alloc::vec::Vec;
use bitflags::bitflags;
use log::warn;

use super::handler::Abort;
use crate::mm::{UserSpace, VirtAddr, USER_TOP};

bitflags! {
    /// Direction of the intended access, for diagnostics.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Access: u8 {
        /// The kernel will read the range.
        const READ = 1 << 0;
        /// The kernel will write the range.
        const WRITE = 1 << 1;
    }
}

/// Check that every byte of `[addr, addr + len)` is a non-null user
/// address. Runs on every argument word (at word width) and on every
/// buffer (at its full transfer length) before dispatch proceeds.
pub fn check_user_range(addr: VirtAddr, len: u32, access: Access) -> Result<(), Abort> {
    if addr.is_null() {
        warn!("rejected null pointer ({access:?}, {len} bytes)");
        return Err(Abort::Exit(-1));
    }
    let in_range = match addr.end_of(len) {
        // Empty range: only the address itself needs to be user-side.
        Some(end) if len == 0 => end.is_user(),
        Some(end) => addr.is_user() && end.as_u32() <= USER_TOP,
        None => false,
    };
    if !in_range {
        warn!("rejected {access:?} of {len} bytes at {addr}");
        return Err(Abort::Exit(-1));
    }
    Ok(())
}

/// Validated load of one argument word.
pub fn read_user_word(us: &UserSpace, addr: VirtAddr) -> Result<u32, Abort> {
    check_user_range(addr, crate::mm::WORD_SIZE, Access::READ)?;
    us.load_word(addr).map_err(|fault| {
        warn!("{fault}");
        Abort::Exit(-1)
    })
}

/// Validated read of a NUL-terminated user string.
///
/// Each byte's address is checked before the load, so an unterminated
/// string that runs off the user range (or off the mapped segment)
/// aborts the process instead of being dereferenced.
pub fn read_user_cstr(us: &UserSpace, addr: VirtAddr) -> Result<String, Abort> {
    let mut bytes = Vec::new();
    let mut cursor = addr;
    loop {
        check_user_range(cursor, 1, Access::READ)?;
        let byte = us.load_byte(cursor).map_err(|fault| {
            warn!("{fault}");
            Abort::Exit(-1)
        })?;
        if byte == 0 {
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }
        bytes.push(byte);
        cursor = match cursor.checked_add(1) {
            Some(next) => next,
            None => return Err(Abort::Exit(-1)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::USER_CODE_BASE;

    #[test]
    fn null_is_rejected_at_any_length() {
        assert!(check_user_range(VirtAddr::new(0), 0, Access::READ).is_err());
        assert!(check_user_range(VirtAddr::new(0), 16, Access::WRITE).is_err());
    }

    #[test]
    fn full_extent_is_checked() {
        // Starts inside, ends outside: must be rejected even though the
        // first byte is a valid user address.
        let straddle = VirtAddr::new(USER_TOP - 2);
        assert!(check_user_range(straddle, 1, Access::READ).is_ok());
        assert!(check_user_range(straddle, 4, Access::READ).is_err());
        // Ending exactly at the boundary is still in range.
        assert!(check_user_range(VirtAddr::new(USER_TOP - 4), 4, Access::READ).is_ok());
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(check_user_range(VirtAddr::new(u32::MAX - 8), 32, Access::READ).is_err());
    }

    #[test]
    fn kernel_addresses_are_rejected() {
        assert!(check_user_range(VirtAddr::new(USER_TOP), 1, Access::READ).is_err());
        assert!(check_user_range(VirtAddr::new(0xFFFF_0000), 4, Access::WRITE).is_err());
    }

    #[test]
    fn cstr_reads_until_nul() {
        let base = VirtAddr::new(USER_CODE_BASE);
        let mut us = UserSpace::new(base, 64);
        for (i, b) in b"a.txt\0".iter().enumerate() {
            us.store_byte(base.checked_add(i as u32).unwrap(), *b).unwrap();
        }
        assert_eq!(read_user_cstr(&us, base).unwrap(), "a.txt");
    }

    #[test]
    fn unterminated_cstr_aborts() {
        let base = VirtAddr::new(USER_CODE_BASE);
        let mut us = UserSpace::new(base, 8);
        for i in 0..8 {
            us.store_byte(base.checked_add(i).unwrap(), b'x').unwrap();
        }
        // Runs off the mapped segment before finding a terminator.
        assert_eq!(read_user_cstr(&us, base), Err(Abort::Exit(-1)));
    }
}
