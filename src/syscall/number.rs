//! System Call Numbers
//!
//! The numeric protocol shared with the user-mode library. The numbers
//! are wire-compatible with the existing callers; the enum exists so
//! the dispatcher gets exhaustiveness checking on top of the same flat
//! namespace.

/// Recognized system calls.
///
/// Discriminants are the on-stack call numbers. Anything that does not
/// map here is a protocol violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SyscallNumber {
    /// Power off the machine.
    Halt = 0,
    /// Terminate the current process with a status.
    Exit = 1,
    /// Spawn a new process image from a command line.
    Exec = 2,
    /// Wait for a child to terminate.
    Wait = 3,
    /// Create a file entry.
    Create = 4,
    /// Remove a file entry.
    Remove = 5,
    /// Open a file into the descriptor table.
    Open = 6,
    /// Byte length of an open file.
    Filesize = 7,
    /// Read through a descriptor.
    Read = 8,
    /// Write through a descriptor.
    Write = 9,
    /// Set a resource cursor.
    Seek = 10,
    /// Get a resource cursor.
    Tell = 11,
    /// Release a descriptor.
    Close = 12,
    /// Numeric utility: Fibonacci.
    Fibonacci = 13,
    /// Numeric utility: maximum of four integers.
    MaxOfFourInt = 14,
}

/// The raw call number did not name a recognized operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownSyscall(pub u32);

impl TryFrom<u32> for SyscallNumber {
    type Error = UnknownSyscall;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Ok(match raw {
            0 => Self::Halt,
            1 => Self::Exit,
            2 => Self::Exec,
            3 => Self::Wait,
            4 => Self::Create,
            5 => Self::Remove,
            6 => Self::Open,
            7 => Self::Filesize,
            8 => Self::Read,
            9 => Self::Write,
            10 => Self::Seek,
            11 => Self::Tell,
            12 => Self::Close,
            13 => Self::Fibonacci,
            14 => Self::MaxOfFourInt,
            _ => return Err(UnknownSyscall(raw)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_numbers_are_stable() {
        assert_eq!(SyscallNumber::try_from(0), Ok(SyscallNumber::Halt));
        assert_eq!(SyscallNumber::try_from(9), Ok(SyscallNumber::Write));
        assert_eq!(SyscallNumber::try_from(14), Ok(SyscallNumber::MaxOfFourInt));
        assert_eq!(SyscallNumber::try_from(15), Err(UnknownSyscall(15)));
    }
}
