//! Uids, operation arguments, and identity triples.

use std::fmt;

use crate::Operation;

/// A concrete principal identifier (the platform `uid_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(u32);

impl Uid {
    /// The raw value `(uid_t)-1`, reserved by the primitives to mean "unchanged".
    pub const SENTINEL_RAW: u32 = u32::MAX;

    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for Uid {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An argument to an identity-mutation primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UidArg {
    Id(Uid),
    /// Leave the corresponding identifier unchanged. Rendered as `-1`.
    Keep,
}

impl UidArg {
    /// The value handed to the OS: the uid itself, or `(uid_t)-1` for [`UidArg::Keep`].
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            UidArg::Id(uid) => uid.raw(),
            UidArg::Keep => Uid::SENTINEL_RAW,
        }
    }
}

impl From<Uid> for UidArg {
    fn from(uid: Uid) -> Self {
        UidArg::Id(uid)
    }
}

impl fmt::Display for UidArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UidArg::Id(uid) => write!(f, "{uid}"),
            UidArg::Keep => f.write_str("-1"),
        }
    }
}

/// The (real, effective, saved) uid triple of an execution context.
///
/// No invariant holds between the three values: any triple is a legal intended
/// starting point, even if the OS refuses to install it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityState {
    pub real: Uid,
    pub effective: Uid,
    pub saved: Uid,
}

impl IdentityState {
    #[must_use]
    pub const fn new(real: Uid, effective: Uid, saved: Uid) -> Self {
        Self {
            real,
            effective,
            saved,
        }
    }

    #[must_use]
    pub const fn from_raw(real: u32, effective: u32, saved: u32) -> Self {
        Self::new(Uid::new(real), Uid::new(effective), Uid::new(saved))
    }

    /// Native-endian wire form used to ship an observed triple out of a context.
    #[must_use]
    pub fn to_ne_bytes(self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self.real.raw().to_ne_bytes());
        out[4..8].copy_from_slice(&self.effective.raw().to_ne_bytes());
        out[8..12].copy_from_slice(&self.saved.raw().to_ne_bytes());
        out
    }

    #[must_use]
    pub fn from_ne_bytes(bytes: [u8; 12]) -> Self {
        let word = |i: usize| u32::from_ne_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Self::from_raw(word(0), word(4), word(8))
    }
}

impl fmt::Display for IdentityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R={},E={},S={}", self.real, self.effective, self.saved)
    }
}

/// An observed transition: `source --operation--> observed`.
///
/// Only ever built from a completed measurement; never computed analytically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEdge<'a> {
    pub source: IdentityState,
    pub operation: &'a Operation,
    pub observed: IdentityState,
}
