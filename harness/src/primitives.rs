//! `libc` bindings for the uid-mutation primitives.

use std::io;

use uidgraph_types::{IdentityPrimitives, IdentityState, UidArg};

/// The calling process's own credentials.
///
/// Every method mutates or reads the real process identity, so this must only
/// be driven inside a disposable child. All calls are async-signal-safe: errors
/// are built from `errno` without allocating.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsPrimitives;

fn check(rc: libc::c_int) -> io::Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

impl IdentityPrimitives for OsPrimitives {
    type Error = io::Error;

    fn set_state(&mut self, state: IdentityState) -> io::Result<()> {
        // SAFETY: plain integer arguments; no memory is shared with the kernel.
        check(unsafe {
            libc::setresuid(
                state.real.raw(),
                state.effective.raw(),
                state.saved.raw(),
            )
        })
    }

    fn setuid(&mut self, uid: UidArg) -> io::Result<()> {
        // SAFETY: integer argument only.
        check(unsafe { libc::setuid(uid.raw()) })
    }

    fn seteuid(&mut self, euid: UidArg) -> io::Result<()> {
        // SAFETY: integer argument only.
        check(unsafe { libc::seteuid(euid.raw()) })
    }

    fn setreuid(&mut self, ruid: UidArg, euid: UidArg) -> io::Result<()> {
        // SAFETY: integer arguments only.
        check(unsafe { libc::setreuid(ruid.raw(), euid.raw()) })
    }

    fn setresuid(&mut self, ruid: UidArg, euid: UidArg, suid: UidArg) -> io::Result<()> {
        // SAFETY: integer arguments only.
        check(unsafe { libc::setresuid(ruid.raw(), euid.raw(), suid.raw()) })
    }

    fn state(&self) -> io::Result<IdentityState> {
        let (mut ruid, mut euid, mut suid): (libc::uid_t, libc::uid_t, libc::uid_t) = (0, 0, 0);
        // SAFETY: the three out-pointers are distinct live locals.
        check(unsafe { libc::getresuid(&raw mut ruid, &raw mut euid, &raw mut suid) })?;
        Ok(IdentityState::from_raw(ruid, euid, suid))
    }
}
