//! System Call Dispatcher
//!
//! Decodes the trapped call, validates every user-supplied word, routes
//! to the operation handler and writes the single result word back into
//! the frame.
//!
//! # Failure Tiers
//! - Protocol violations (bad address, bad descriptor given to an
//!   accessor, malformed call number) abort the offending process:
//!   the exit path with status -1, or a bare kernel-thread kill when
//!   the request could not even be decoded as a call
//! - Operational failures (missing file, full table, read/write on a
//!   descriptor that is not open) come back in-band as -1/false
//!
//! The kernel itself never panics or corrupts state on user input.

use alloc::boxed::Box;
use alloc::format;
use log::{debug, warn};

use super::frame::TrapFrame;
use super::number::SyscallNumber;
use super::numeric;
use super::validate::{self, Access};
use crate::fs::{Console, FileSys, FsGuard};
use crate::mm::{UserFault, VirtAddr, WORD_SIZE};
use crate::process::{Fd, Pid, Process, ProcessControl};

/// Non-local abort of the current process, raised anywhere inside the
/// boundary layer and resolved only by [`Kernel::handle_trap`]. The
/// process never observes it; the dispatcher never resumes a process
/// that raised one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abort {
    /// Terminate through the exit path (record, status, descriptor
    /// drain) with this status.
    Exit(i32),
    /// Kill the kernel thread without exit bookkeeping. Used when the
    /// request could not be validated as a call at all.
    Kill,
}

impl From<UserFault> for Abort {
    fn from(fault: UserFault) -> Self {
        warn!("{fault}");
        Abort::Exit(-1)
    }
}

/// What the trap stub should do after a handled trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOutcome {
    /// Resume the process; the result word is in the frame.
    Resume,
    /// Exit bookkeeping is done; the scheduler reclaims the thread and
    /// publishes the status to the waiting parent.
    Exit(i32),
    /// Terminate the kernel thread; no exit record was produced.
    Kill,
    /// Power-off was requested; do not return to user mode.
    Halt,
}

type SysResult<T> = Result<T, Abort>;

/// The system-call boundary: the dispatcher plus the guarded resources
/// it mediates. One instance serves every process in the system; all
/// methods take `&self` and are called concurrently from per-process
/// kernel threads.
pub struct Kernel {
    fs: FsGuard,
    control: Box<dyn ProcessControl>,
}

impl Kernel {
    /// Wire up the external collaborators. This is the one-time setup
    /// that accompanies trap-gate registration.
    pub fn new(
        filesys: Box<dyn FileSys>,
        console: Box<dyn Console>,
        control: Box<dyn ProcessControl>,
    ) -> Self {
        Self {
            fs: FsGuard::new(filesys, console),
            control,
        }
    }

    /// Handle one trapped system call.
    ///
    /// Reads the call number and arguments from user memory above
    /// `frame.usp`, validating each word before use. Aborts raised by
    /// validation or by the handlers are resolved here: `Exit` runs the
    /// full exit path, `Kill` does not.
    pub fn handle_trap(&self, proc: &mut Process, frame: &mut TrapFrame) -> TrapOutcome {
        match self.dispatch(proc, frame) {
            Ok(outcome) => outcome,
            Err(Abort::Exit(status)) => self.do_exit(proc, status),
            Err(Abort::Kill) => TrapOutcome::Kill,
        }
    }

    fn dispatch(&self, proc: &mut Process, frame: &mut TrapFrame) -> SysResult<TrapOutcome> {
        let raw = validate::read_user_word(&proc.uspace, frame.usp)? as i32;
        if raw < 0 {
            warn!("invalid system call number {raw}");
            return Err(Abort::Kill);
        }
        let nr = SyscallNumber::try_from(raw as u32).map_err(|unknown| {
            warn!("unknown system call {}", unknown.0);
            Abort::Kill
        })?;
        debug!("{}: syscall {nr:?}", proc.name());

        match nr {
            SyscallNumber::Halt => {
                self.control.power_off();
                Ok(TrapOutcome::Halt)
            }
            SyscallNumber::Exit => {
                let status = arg(proc, frame, 0)? as i32;
                Ok(self.do_exit(proc, status))
            }
            SyscallNumber::Exec => {
                let cmdline = VirtAddr::new(arg(proc, frame, 0)?);
                let pid = self.sys_exec(proc, cmdline)?;
                frame.set_return(pid as u32);
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Wait => {
                let pid = arg(proc, frame, 0)? as i32;
                frame.set_return(self.control.wait(pid) as u32);
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Create => {
                let name = VirtAddr::new(arg(proc, frame, 0)?);
                let size = arg(proc, frame, 1)?;
                let created = self.sys_create(proc, name, size)?;
                frame.set_return(created as u32);
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Remove => {
                let name = VirtAddr::new(arg(proc, frame, 0)?);
                let removed = self.sys_remove(proc, name)?;
                frame.set_return(removed as u32);
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Open => {
                let name = VirtAddr::new(arg(proc, frame, 0)?);
                let fd = self.sys_open(proc, name)?;
                frame.set_return(fd as u32);
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Filesize => {
                let fd = arg(proc, frame, 0)? as i32;
                let len = self.sys_filesize(proc, fd)?;
                frame.set_return(len as u32);
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Read => {
                let fd = arg(proc, frame, 0)? as i32;
                let buf = VirtAddr::new(arg(proc, frame, 1)?);
                let n = arg(proc, frame, 2)?;
                let read = self.sys_read(proc, fd, buf, n)?;
                frame.set_return(read as u32);
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Write => {
                let fd = arg(proc, frame, 0)? as i32;
                let buf = VirtAddr::new(arg(proc, frame, 1)?);
                let n = arg(proc, frame, 2)?;
                let written = self.sys_write(proc, fd, buf, n)?;
                frame.set_return(written as u32);
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Seek => {
                let fd = arg(proc, frame, 0)? as i32;
                let pos = arg(proc, frame, 1)?;
                self.sys_seek(proc, fd, pos)?;
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Tell => {
                let fd = arg(proc, frame, 0)? as i32;
                let pos = self.sys_tell(proc, fd)?;
                frame.set_return(pos);
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Close => {
                let fd = arg(proc, frame, 0)? as i32;
                self.sys_close(proc, fd)?;
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::Fibonacci => {
                let n = arg(proc, frame, 0)? as i32;
                frame.set_return(numeric::fibonacci(n) as u32);
                Ok(TrapOutcome::Resume)
            }
            SyscallNumber::MaxOfFourInt => {
                let a = arg(proc, frame, 0)? as i32;
                let b = arg(proc, frame, 1)? as i32;
                let c = arg(proc, frame, 2)? as i32;
                let d = arg(proc, frame, 3)? as i32;
                frame.set_return(numeric::max_of_four_int(a, b, c, d) as u32);
                Ok(TrapOutcome::Resume)
            }
        }
    }

    /// The exit path. Order matters: console record, then status, then
    /// descriptor drain, then hand the thread back to the scheduler.
    fn do_exit(&self, proc: &mut Process, status: i32) -> TrapOutcome {
        {
            let mut backing = self.fs.lock();
            let record = format!("{}: exit({})\n", proc.name(), status);
            backing.console.put(record.as_bytes());
        }
        proc.set_exit_status(status);
        // Dropping a resource may touch the backing store, so the drain
        // runs under the guard. Separate acquisition: the guard is
        // non-reentrant and the record block above already released it.
        let _backing = self.fs.lock();
        proc.fds.drain();
        TrapOutcome::Exit(status)
    }

    fn sys_exec(&self, proc: &Process, cmdline: VirtAddr) -> SysResult<Pid> {
        let cmd = validate::read_user_cstr(&proc.uspace, cmdline)?;
        // The collaborator's -1 failure signal passes through unchanged.
        Ok(self.control.spawn(&cmd))
    }

    fn sys_create(&self, proc: &Process, name: VirtAddr, size: u32) -> SysResult<bool> {
        if name.is_null() {
            return Err(Abort::Exit(-1));
        }
        let name = validate::read_user_cstr(&proc.uspace, name)?;
        Ok(self.fs.lock().filesys.create(&name, size))
    }

    fn sys_remove(&self, proc: &Process, name: VirtAddr) -> SysResult<bool> {
        if name.is_null() {
            return Err(Abort::Exit(-1));
        }
        let name = validate::read_user_cstr(&proc.uspace, name)?;
        Ok(self.fs.lock().filesys.remove(&name))
    }

    fn sys_open(&self, proc: &mut Process, name_ptr: VirtAddr) -> SysResult<i32> {
        if name_ptr.is_null() {
            return Err(Abort::Exit(-1));
        }
        let name = validate::read_user_cstr(&proc.uspace, name_ptr)?;
        // Guard held across open + slot install so the pair is atomic
        // with respect to other processes.
        let mut backing = self.fs.lock();
        let Some(mut file) = backing.filesys.open(&name) else {
            return Ok(-1);
        };
        if name == proc.name() {
            // A process must not write to its own running image.
            file.deny_write();
        }
        match proc.install_file(file) {
            Ok(fd) => Ok(fd.index() as i32),
            // Table full: the resource was dropped, which closed it.
            Err(_) => Ok(-1),
        }
    }

    fn sys_filesize(&self, proc: &mut Process, fd: i32) -> SysResult<i32> {
        if fd <= 0 {
            return Err(Abort::Exit(-1));
        }
        let fd = Fd::new(fd).ok_or(Abort::Exit(-1))?;
        let file = proc.fds.get_mut(fd).map_err(|_| Abort::Exit(-1))?;
        let _backing = self.fs.lock();
        Ok(file.len() as i32)
    }

    fn sys_seek(&self, proc: &mut Process, fd: i32, pos: u32) -> SysResult<()> {
        let fd = Fd::new(fd).ok_or(Abort::Exit(-1))?;
        let file = proc.fds.get_mut(fd).map_err(|_| Abort::Exit(-1))?;
        let _backing = self.fs.lock();
        file.seek(pos);
        Ok(())
    }

    fn sys_tell(&self, proc: &mut Process, fd: i32) -> SysResult<u32> {
        let fd = Fd::new(fd).ok_or(Abort::Exit(-1))?;
        let file = proc.fds.get_mut(fd).map_err(|_| Abort::Exit(-1))?;
        let _backing = self.fs.lock();
        Ok(file.tell())
    }

    fn sys_close(&self, proc: &mut Process, fd: i32) -> SysResult<()> {
        let fd = Fd::new(fd).ok_or(Abort::Exit(-1))?;
        let file = proc.fds.remove(fd).map_err(|_| Abort::Exit(-1))?;
        let _backing = self.fs.lock();
        drop(file);
        Ok(())
    }

    fn sys_read(&self, proc: &mut Process, fd: i32, buf: VirtAddr, n: u32) -> SysResult<i32> {
        validate::check_user_range(buf, n, Access::WRITE)?;
        if fd == Fd::STDIN.index() as i32 {
            let mut backing = self.fs.lock();
            let dst = proc.uspace.slice_mut(buf, n)?;
            // Console input arrives one character at a time.
            for slot in dst.iter_mut() {
                *slot = backing.console.getc();
            }
            return Ok(n as i32);
        }
        let Some(fd) = Fd::new(fd) else {
            return Ok(-1);
        };
        if fd.index() < Fd::FIRST_FILE.index() {
            return Ok(-1);
        }
        let Ok(file) = proc.fds.get_mut(fd) else {
            return Ok(-1);
        };
        let _backing = self.fs.lock();
        let dst = proc.uspace.slice_mut(buf, n)?;
        Ok(file.read(dst) as i32)
    }

    fn sys_write(&self, proc: &mut Process, fd: i32, buf: VirtAddr, n: u32) -> SysResult<i32> {
        validate::check_user_range(buf, n, Access::READ)?;
        if fd == Fd::STDOUT.index() as i32 {
            let mut backing = self.fs.lock();
            let src = proc.uspace.slice(buf, n)?;
            // One atomic block; the guard keeps other writers out.
            backing.console.put(src);
            return Ok(n as i32);
        }
        let Some(fd) = Fd::new(fd) else {
            return Ok(-1);
        };
        if fd.index() < Fd::FIRST_FILE.index() {
            return Ok(-1);
        }
        let Ok(file) = proc.fds.get_mut(fd) else {
            return Ok(-1);
        };
        let _backing = self.fs.lock();
        let src = proc.uspace.slice(buf, n)?;
        Ok(file.write(src) as i32)
    }
}

/// Validated load of argument word `index` (word 0 is the first
/// argument, at `usp + 4`).
fn arg(proc: &Process, frame: &TrapFrame, index: u32) -> SysResult<u32> {
    let addr = frame
        .usp
        .checked_add(WORD_SIZE * (index + 1))
        .ok_or(Abort::Exit(-1))?;
    validate::read_user_word(&proc.uspace, addr)
}
