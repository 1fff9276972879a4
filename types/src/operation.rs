//! Identity-mutation operations and the primitive surface they run against.

use std::fmt;

use crate::{IdentityState, UidArg};

/// The identity syscalls an execution context exposes.
///
/// Implemented over `libc` by the harness and by simulated kernels in tests.
/// Implementations running inside a forked child must stay async-signal-safe:
/// no allocation, no locks, no stdio.
pub trait IdentityPrimitives {
    type Error;

    /// Install the full (real, effective, saved) triple (`setresuid`).
    fn set_state(&mut self, state: IdentityState) -> Result<(), Self::Error>;

    fn setuid(&mut self, uid: UidArg) -> Result<(), Self::Error>;

    fn seteuid(&mut self, euid: UidArg) -> Result<(), Self::Error>;

    fn setreuid(&mut self, ruid: UidArg, euid: UidArg) -> Result<(), Self::Error>;

    fn setresuid(&mut self, ruid: UidArg, euid: UidArg, suid: UidArg) -> Result<(), Self::Error>;

    /// Read back the full triple (`getresuid`).
    fn state(&self) -> Result<IdentityState, Self::Error>;
}

/// One identity-mutation primitive with concrete arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SetUid(UidArg),
    SetEuid(UidArg),
    SetReuid(UidArg, UidArg),
    SetResuid(UidArg, UidArg, UidArg),
}

impl Operation {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SetUid(_) => "setuid",
            Operation::SetEuid(_) => "seteuid",
            Operation::SetReuid(..) => "setreuid",
            Operation::SetResuid(..) => "setresuid",
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Operation::SetUid(_) | Operation::SetEuid(_) => 1,
            Operation::SetReuid(..) => 2,
            Operation::SetResuid(..) => 3,
        }
    }

    /// Arguments in call order; the slice length equals [`Operation::arity`].
    #[must_use]
    pub fn args(&self) -> ArgList {
        match *self {
            Operation::SetUid(x) | Operation::SetEuid(x) => {
                ArgList::new([x, UidArg::Keep, UidArg::Keep], 1)
            }
            Operation::SetReuid(x, y) => ArgList::new([x, y, UidArg::Keep], 2),
            Operation::SetResuid(x, y, z) => ArgList::new([x, y, z], 3),
        }
    }

    /// Invoke the primitive this operation names.
    pub fn apply<P: IdentityPrimitives>(&self, primitives: &mut P) -> Result<(), P::Error> {
        match *self {
            Operation::SetUid(x) => primitives.setuid(x),
            Operation::SetEuid(x) => primitives.seteuid(x),
            Operation::SetReuid(x, y) => primitives.setreuid(x, y),
            Operation::SetResuid(x, y, z) => primitives.setresuid(x, y, z),
        }
    }
}

/// Renders the edge label form: `name(a1[,a2[,a3]])`.
impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        for (i, arg) in self.args().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// Fixed-capacity argument list; avoids allocating per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgList {
    slots: [UidArg; 3],
    len: usize,
}

impl ArgList {
    const fn new(slots: [UidArg; 3], len: usize) -> Self {
        Self { slots, len }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[UidArg] {
        &self.slots[..self.len]
    }
}

impl std::ops::Deref for ArgList {
    type Target = [UidArg];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}
