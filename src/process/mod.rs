//! Process Control Block and Process-Control Collaborator
//!
//! The scheduler owns thread creation, context switching and the
//! parent/child wait protocol. This layer keeps only what the syscall
//! boundary needs per process: the executable name, the mapped user
//! segment, the descriptor table and the one-shot exit status.

mod fdtable;

use alloc::boxed::Box;
use alloc::string::String;

use crate::fs::FileObject;
use crate::mm::UserSpace;

pub use fdtable::{Fd, FdError, FdTable, FD_TABLE_SIZE};

/// Process identifier; -1 is the spawn-failure signal.
pub type Pid = i32;

/// The external process/scheduler collaborator.
///
/// Spawn and wait are blocking scheduler services; power-off ends the
/// whole machine. Methods take `&self` because several kernel threads
/// call in concurrently; implementations synchronize internally.
pub trait ProcessControl: Send + Sync {
    /// Spawn a new process image from a command line. Returns the new
    /// pid, or -1 on failure.
    fn spawn(&self, cmdline: &str) -> Pid;
    /// Block until the named child terminates; returns its exit status.
    fn wait(&self, pid: Pid) -> i32;
    /// Power off the entire system.
    fn power_off(&self);
}

/// Per-process state owned by the boundary layer.
pub struct Process {
    pid: Pid,
    name: String,
    /// The process's mapped user segment.
    pub uspace: UserSpace,
    /// Open file descriptors, slots 3..=127.
    pub fds: FdTable,
    exit_status: Option<i32>,
}

impl Process {
    /// Create the control block for a freshly loaded process. The
    /// descriptor table starts empty.
    pub fn new(pid: Pid, name: impl Into<String>, uspace: UserSpace) -> Self {
        Self {
            pid,
            name: name.into(),
            uspace,
            fds: FdTable::new(),
            exit_status: None,
        }
    }

    /// Process identifier.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Executable name, as shown in the exit record and compared by
    /// OPEN for deny-write marking.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exit status, once set by the exit path.
    pub fn exit_status(&self) -> Option<i32> {
        self.exit_status
    }

    /// Record the exit status. Set at most once; later calls (cannot
    /// happen on the exit path, which never returns to the process)
    /// keep the first value.
    pub fn set_exit_status(&mut self, status: i32) {
        self.exit_status.get_or_insert(status);
    }

    /// Move a resource into the lowest free descriptor slot.
    pub fn install_file(&mut self, file: Box<dyn FileObject>) -> Result<Fd, FdError> {
        self.fds.install(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::VirtAddr;

    #[test]
    fn exit_status_is_one_shot() {
        let mut p = Process::new(1, "init", UserSpace::new(VirtAddr::new(0x1000), 64));
        assert_eq!(p.exit_status(), None);
        p.set_exit_status(3);
        p.set_exit_status(7);
        assert_eq!(p.exit_status(), Some(3));
    }
}
