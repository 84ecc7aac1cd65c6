//! Variable identity allocation.

use std::fmt;

use serde::Serialize;

/// Identity of a variable within one generation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VariableId(u64);

impl VariableId {
    /// Id that no allocator ever hands out; used by corrupted references.
    pub const UNBOUND: VariableId = VariableId(u64::MAX);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == VariableId::UNBOUND {
            f.write_str("#unbound")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Issues monotonically increasing [`VariableId`]s.
#[derive(Debug, Clone, Default)]
pub struct VariableIdAllocator {
    next: u64,
}

/// Allocator state saved at the start of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorCheckpoint(u64);

impl VariableIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh variable id.
    pub fn allocate(&mut self) -> VariableId {
        let id = VariableId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`allocate`](Self::allocate) returns.
    pub fn peek_next(&self) -> VariableId {
        VariableId(self.next)
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next
    }

    pub fn checkpoint(&self) -> AllocatorCheckpoint {
        AllocatorCheckpoint(self.next)
    }

    /// Forget every id allocated after `checkpoint`.
    ///
    /// Only valid while none of those ids escaped into committed output.
    pub fn rollback(&mut self, checkpoint: AllocatorCheckpoint) {
        debug_assert!(checkpoint.0 <= self.next, "rollback to a future checkpoint");
        self.next = checkpoint.0;
    }
}
