//! Shared test utilities and fixtures
//!
//! A simulated kernel with Linux uid semantics, and a launcher that gives
//! every measurement its own copy of it.

#![allow(dead_code)]

use std::io;

use uidgraph_dot::GraphEmitter;
use uidgraph_harness::{
    ContextLauncher, Coordinator, LostReason, Outcome, RunSummary, SpawnError, SpawnRetry,
};
use uidgraph_types::{
    IdentityPrimitives, IdentityState, Operation, OperationCatalog, StateSpace, UidArg, ValueSet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    Perm,
    Inval,
}

/// Credentials of one simulated process, following Linux `kernel/sys.c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimKernel {
    ruid: u32,
    euid: u32,
    suid: u32,
}

impl SimKernel {
    pub fn root() -> Self {
        Self::with_state(IdentityState::from_raw(0, 0, 0))
    }

    pub fn with_state(state: IdentityState) -> Self {
        Self {
            ruid: state.real.raw(),
            euid: state.effective.raw(),
            suid: state.saved.raw(),
        }
    }

    fn privileged(&self) -> bool {
        self.euid == 0
    }

    fn holds(&self, uid: u32) -> bool {
        uid == self.ruid || uid == self.euid || uid == self.suid
    }
}

impl IdentityPrimitives for SimKernel {
    type Error = Errno;

    fn set_state(&mut self, state: IdentityState) -> Result<(), Errno> {
        self.setresuid(
            UidArg::Id(state.real),
            UidArg::Id(state.effective),
            UidArg::Id(state.saved),
        )
    }

    fn setuid(&mut self, uid: UidArg) -> Result<(), Errno> {
        let UidArg::Id(uid) = uid else {
            return Err(Errno::Inval);
        };
        let uid = uid.raw();
        if self.privileged() {
            self.ruid = uid;
            self.euid = uid;
            self.suid = uid;
        } else if uid == self.ruid || uid == self.suid {
            self.euid = uid;
        } else {
            return Err(Errno::Perm);
        }
        Ok(())
    }

    fn seteuid(&mut self, euid: UidArg) -> Result<(), Errno> {
        if euid == UidArg::Keep {
            return Err(Errno::Inval);
        }
        self.setresuid(UidArg::Keep, euid, UidArg::Keep)
    }

    fn setreuid(&mut self, ruid: UidArg, euid: UidArg) -> Result<(), Errno> {
        if !self.privileged() {
            if let UidArg::Id(r) = ruid
                && r.raw() != self.ruid
                && r.raw() != self.euid
            {
                return Err(Errno::Perm);
            }
            if let UidArg::Id(e) = euid
                && !self.holds(e.raw())
            {
                return Err(Errno::Perm);
            }
        }
        let old_ruid = self.ruid;
        if let UidArg::Id(r) = ruid {
            self.ruid = r.raw();
        }
        if let UidArg::Id(e) = euid {
            self.euid = e.raw();
        }
        let euid_moved_off_ruid = matches!(euid, UidArg::Id(e) if e.raw() != old_ruid);
        if ruid != UidArg::Keep || euid_moved_off_ruid {
            self.suid = self.euid;
        }
        Ok(())
    }

    fn setresuid(&mut self, ruid: UidArg, euid: UidArg, suid: UidArg) -> Result<(), Errno> {
        if !self.privileged() {
            for arg in [ruid, euid, suid] {
                if let UidArg::Id(uid) = arg
                    && !self.holds(uid.raw())
                {
                    return Err(Errno::Perm);
                }
            }
        }
        if let UidArg::Id(r) = ruid {
            self.ruid = r.raw();
        }
        if let UidArg::Id(e) = euid {
            self.euid = e.raw();
        }
        if let UidArg::Id(s) = suid {
            self.suid = s.raw();
        }
        Ok(())
    }

    fn state(&self) -> Result<IdentityState, Errno> {
        Ok(IdentityState::from_raw(self.ruid, self.euid, self.suid))
    }
}

/// Runs each measurement on a fresh copy of `base`; can be told to fail
/// context creation a number of times first.
pub struct InProcessLauncher {
    base: SimKernel,
    fail_next: u32,
    pub launched: usize,
}

impl InProcessLauncher {
    pub fn new(base: SimKernel) -> Self {
        Self {
            base,
            fail_next: 0,
            launched: 0,
        }
    }

    pub fn failing_first(mut self, failures: u32) -> Self {
        self.fail_next = failures;
        self
    }
}

impl ContextLauncher for InProcessLauncher {
    fn measure(
        &mut self,
        state: IdentityState,
        operation: &Operation,
    ) -> Result<Outcome, SpawnError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(SpawnError::Fork(io::Error::from(io::ErrorKind::WouldBlock)));
        }
        self.launched += 1;

        let mut context = self.base;
        let _ = context.set_state(state);
        let _ = operation.apply(&mut context);
        Ok(match context.state() {
            Ok(observed) => Outcome::Observed(observed),
            Err(_) => Outcome::Lost(LostReason::Exited(1)),
        })
    }
}

/// Run the full enumeration for `values` and return the graph text.
pub fn run_graph<L: ContextLauncher>(values: &ValueSet, launcher: L) -> (String, RunSummary, L) {
    let states = StateSpace::generate(values).unwrap();
    let catalog = OperationCatalog::generate(values).unwrap();
    let mut coordinator = Coordinator::new(launcher, SpawnRetry::Unbounded);
    let mut out = GraphEmitter::new(Vec::new());
    let summary = coordinator.run(&states, &catalog, &mut out).unwrap();
    let text = String::from_utf8(out.into_inner()).unwrap();
    (text, summary, coordinator.into_launcher())
}

pub fn node_lines(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| line.starts_with('"') && !line.contains("->"))
        .collect()
}

pub fn edge_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|line| line.contains("->")).collect()
}

pub fn edge(from: (u32, u32, u32), label: &str, to: (u32, u32, u32)) -> String {
    format!(
        "\"R={},E={},S={}\"->\"R={},E={},S={}\"[label=\"{label}\"]",
        from.0, from.1, from.2, to.0, to.1, to.2
    )
}
