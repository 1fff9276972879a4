//! Process-per-measurement isolation.
//!
//! Each measurement forks a child that installs the starting triple, applies
//! the operation, reads back the resulting triple and ships it to the parent
//! over a pipe before `_exit`ing. The child's credentials die with it, so no
//! measurement can observe another's leftovers, and the coordinator's own
//! identity is never touched.
//!
//! Between `fork` and `_exit` the child only makes async-signal-safe calls:
//! the identity syscalls, `write`, `close`. No allocation, no stdio, no
//! tracing.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use uidgraph_types::{IdentityPrimitives, IdentityState, Operation};

use crate::context::{ContextLauncher, LostReason, Outcome, SpawnError};

const REPORT_LEN: usize = 12;

/// Child exit codes. Only [`EXIT_REPORTED`] is accompanied by a full report.
const EXIT_REPORTED: libc::c_int = 0;
const EXIT_READBACK_FAILED: libc::c_int = 1;
const EXIT_WRITE_FAILED: libc::c_int = 2;

/// Launches every measurement in a freshly forked child process.
///
/// `P` is the primitive surface the child drives; in production this is
/// [`crate::OsPrimitives`]. It must be async-signal-safe.
#[derive(Debug, Default)]
pub struct ForkLauncher<P> {
    primitives: P,
}

impl<P> ForkLauncher<P> {
    pub fn new(primitives: P) -> Self {
        Self { primitives }
    }
}

impl<P: IdentityPrimitives> ContextLauncher for ForkLauncher<P> {
    fn measure(
        &mut self,
        state: IdentityState,
        operation: &Operation,
    ) -> Result<Outcome, SpawnError> {
        let (read_end, write_end) = pipe().map_err(SpawnError::Pipe)?;

        // SAFETY: the child branch below never returns and restricts itself to
        // async-signal-safe calls before `_exit`.
        let pid = unsafe { libc::fork() };
        match pid {
            -1 => Err(SpawnError::Fork(io::Error::last_os_error())),
            0 => {
                drop(read_end);
                run_child(&mut self.primitives, state, operation, &write_end)
            }
            child => {
                drop(write_end);
                let report = read_report(read_end);
                let status = wait_for_exit(child);
                Ok(classify(report, status))
            }
        }
    }
}

fn run_child<P: IdentityPrimitives>(
    primitives: &mut P,
    state: IdentityState,
    operation: &Operation,
    report: &OwnedFd,
) -> ! {
    // Both results are deliberately discarded: only the observed triple counts.
    let _ = primitives.set_state(state);
    let _ = operation.apply(primitives);

    let code = match primitives.state() {
        Ok(observed) => {
            if write_all_raw(report.as_raw_fd(), &observed.to_ne_bytes()) {
                EXIT_REPORTED
            } else {
                EXIT_WRITE_FAILED
            }
        }
        Err(_) => EXIT_READBACK_FAILED,
    };
    // SAFETY: `_exit` skips atexit handlers and stdio flushing, which belong to
    // the parent.
    unsafe { libc::_exit(code) }
}

fn write_all_raw(fd: RawFd, mut buf: &[u8]) -> bool {
    while !buf.is_empty() {
        // SAFETY: `buf` is a live slice and `len` never exceeds it.
        let rc = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
        if rc > 0 {
            buf = &buf[rc as usize..];
            continue;
        }
        if rc == -1 && io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
            continue;
        }
        return false;
    }
    true
}

fn pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds: [libc::c_int; 2] = [-1, -1];
    // SAFETY: `fds` has room for the two descriptors pipe2 writes.
    let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: pipe2 succeeded, so both descriptors are open and owned by us.
    Ok(unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) })
}

fn read_report(read_end: OwnedFd) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(REPORT_LEN);
    File::from(read_end).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Block until `pid` terminates, retrying waits interrupted by signals.
fn wait_for_exit(pid: libc::pid_t) -> io::Result<ExitStatus> {
    let mut status: libc::c_int = 0;
    retry_interrupted(|| {
        // SAFETY: `status` outlives the call; `pid` is our own child.
        let rc = unsafe { libc::waitpid(pid, &raw mut status, 0) };
        if rc == -1 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    })?;
    Ok(ExitStatus::from_raw(status))
}

/// Re-run `call` while it fails with `EINTR`. An interrupted wait is not a
/// termination.
fn retry_interrupted<T>(mut call: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    loop {
        match call() {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                tracing::debug!("Interrupted system call; retrying");
            }
            result => return result,
        }
    }
}

fn classify(report: io::Result<Vec<u8>>, status: io::Result<ExitStatus>) -> Outcome {
    if let Ok(bytes) = &report
        && let Ok(full) = <[u8; REPORT_LEN]>::try_from(bytes.as_slice())
    {
        return Outcome::Observed(IdentityState::from_ne_bytes(full));
    }

    let status = match status {
        Ok(status) => status,
        Err(err) => return Outcome::Lost(LostReason::Wait(err)),
    };
    if let Some(signal) = status.signal() {
        return Outcome::Lost(LostReason::Signaled(signal));
    }
    match (report, status.code()) {
        (_, Some(code)) if code != EXIT_REPORTED => Outcome::Lost(LostReason::Exited(code)),
        (Err(err), _) => Outcome::Lost(LostReason::Read(err)),
        (Ok(bytes), _) => Outcome::Lost(LostReason::ShortReport(bytes.len())),
    }
}
