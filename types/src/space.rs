//! State-space and operation-catalog generators.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::{IdentityState, Operation, Uid, UidArg};

/// Ordered, non-empty, duplicate-free set of candidate uids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSet(Vec<Uid>);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueSetError {
    #[error("value set must not be empty")]
    Empty,
    #[error("value set lists uid {0} more than once")]
    Duplicate(Uid),
    #[error("uid {} is reserved as the \"unchanged\" argument", Uid::SENTINEL_RAW)]
    Sentinel,
}

impl ValueSet {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Result<Self, ValueSetError> {
        let mut uids: Vec<Uid> = Vec::new();
        for raw in values {
            if raw == Uid::SENTINEL_RAW {
                return Err(ValueSetError::Sentinel);
            }
            let uid = Uid::new(raw);
            if uids.contains(&uid) {
                return Err(ValueSetError::Duplicate(uid));
            }
            uids.push(uid);
        }
        if uids.is_empty() {
            return Err(ValueSetError::Empty);
        }
        Ok(Self(uids))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Uid] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// V' = V followed by the "unchanged" sentinel.
    fn extended(&self) -> impl Iterator<Item = UidArg> + Clone + '_ {
        self.0
            .iter()
            .copied()
            .map(UidArg::Id)
            .chain(std::iter::once(UidArg::Keep))
    }
}

/// `{0, 1000}`: root plus one ordinary account.
impl Default for ValueSet {
    fn default() -> Self {
        Self(vec![Uid::new(0), Uid::new(1000)])
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{what} for {values} values overflows the address space")]
    TooLarge { what: &'static str, values: usize },
    #[error("failed to allocate {len} {what}")]
    Allocation {
        what: &'static str,
        len: usize,
        #[source]
        source: TryReserveError,
    },
}

fn reserve<T>(what: &'static str, len: usize) -> Result<Vec<T>, CatalogError> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|source| CatalogError::Allocation { what, len, source })?;
    Ok(out)
}

/// Allocate room for `len` entries, where `None` means the count overflowed.
fn sized<T>(
    what: &'static str,
    values: usize,
    len: Option<usize>,
) -> Result<Vec<T>, CatalogError> {
    let len = len.ok_or(CatalogError::TooLarge { what, values })?;
    reserve(what, len)
}

/// Every candidate starting triple, r outermost, e middle, s innermost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSpace(Vec<IdentityState>);

impl StateSpace {
    /// Number of triples for `k` values: k³.
    #[must_use]
    pub fn size_for(k: usize) -> Option<usize> {
        k.checked_mul(k)?.checked_mul(k)
    }

    pub fn generate(values: &ValueSet) -> Result<Self, CatalogError> {
        let k = values.len();
        let mut states = sized("states", k, Self::size_for(k))?;
        for &real in values.as_slice() {
            for &effective in values.as_slice() {
                for &saved in values.as_slice() {
                    states.push(IdentityState::new(real, effective, saved));
                }
            }
        }
        Ok(Self(states))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[IdentityState] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IdentityState> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a StateSpace {
    type Item = &'a IdentityState;
    type IntoIter = std::slice::Iter<'a, IdentityState>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Every candidate operation over V' = V ∪ {unchanged}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationCatalog(Vec<Operation>);

impl OperationCatalog {
    /// Number of operations for `m = k + 1` extended values: 2m + m² + m³.
    #[must_use]
    pub fn size_for(m: usize) -> Option<usize> {
        let squared = m.checked_mul(m)?;
        let cubed = squared.checked_mul(m)?;
        m.checked_mul(2)?.checked_add(squared)?.checked_add(cubed)
    }

    /// For each x in V': `setuid(x)`, `seteuid(x)`, then `setreuid(x, y)` for
    /// each y, then `setresuid(x, y, z)` for each y and z. Labels and edge
    /// order downstream depend on this exact order.
    pub fn generate(values: &ValueSet) -> Result<Self, CatalogError> {
        let m = values.len() + 1;
        let mut ops = sized("operations", values.len(), Self::size_for(m))?;
        for x in values.extended() {
            ops.push(Operation::SetUid(x));
            ops.push(Operation::SetEuid(x));
            for y in values.extended() {
                ops.push(Operation::SetReuid(x, y));
            }
            for y in values.extended() {
                for z in values.extended() {
                    ops.push(Operation::SetResuid(x, y, z));
                }
            }
        }
        Ok(Self(ops))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Operation] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a OperationCatalog {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
