//! Session symbol table.
//!
//! The register maps variable names to their allocated identity. Entries are
//! kept in registration order, which is what PPID resolution walks.

use indexmap::IndexMap;
use serde::Serialize;

use super::allocator::{VariableId, VariableIdAllocator};

/// Whether a registered name may be referenced yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationState {
    /// Registered by an assignment whose value is still being built.
    Pending,
    /// The assignment completed; the name is visible to references.
    Declared,
}

/// A register entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegisteredIdentifier {
    pub id: VariableId,
    pub state: DeclarationState,
}

impl RegisteredIdentifier {
    pub fn is_declared(&self) -> bool {
        self.state == DeclarationState::Declared
    }
}

/// Register state saved at the start of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterCheckpoint {
    len: usize,
}

/// Name → identity table shared across every instruction of a session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct IdentifierRegister {
    entries: IndexMap<String, RegisteredIdentifier>,
}

impl IdentifierRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredIdentifier> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// True if `name` is registered and its assignment has completed.
    pub fn is_declared(&self, name: &str) -> bool {
        self.get(name).is_some_and(RegisteredIdentifier::is_declared)
    }

    /// Bind `name` to an id, allocating one only if the name is new.
    ///
    /// Returns the id and whether it was freshly allocated. New entries start
    /// out [`Pending`](DeclarationState::Pending).
    pub fn register(
        &mut self,
        name: &str,
        allocator: &mut VariableIdAllocator,
    ) -> (VariableId, bool) {
        if let Some(entry) = self.entries.get(name) {
            return (entry.id, false);
        }

        let id = allocator.allocate();
        self.entries.insert(
            name.to_string(),
            RegisteredIdentifier {
                id,
                state: DeclarationState::Pending,
            },
        );
        (id, true)
    }

    /// Mark a registered name as declared. Returns false if it is unknown.
    pub fn declare(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.state = DeclarationState::Declared;
                true
            }
            None => false,
        }
    }

    /// The most recently registered declared identifier.
    pub fn latest_declared(&self) -> Option<(&str, &RegisteredIdentifier)> {
        self.entries
            .iter()
            .rev()
            .find(|(_, entry)| entry.is_declared())
            .map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegisteredIdentifier)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn checkpoint(&self) -> RegisterCheckpoint {
        RegisterCheckpoint {
            len: self.entries.len(),
        }
    }

    /// Drop every entry registered after `checkpoint`.
    ///
    /// Entries that existed at the checkpoint are already declared: names are
    /// only ever pending while their own assignment is in flight.
    pub fn rollback(&mut self, checkpoint: RegisterCheckpoint) {
        self.entries.truncate(checkpoint.len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_new_name_allocates() {
        let mut register = IdentifierRegister::new();
        let mut allocator = VariableIdAllocator::new();

        let (x, fresh) = register.register("x", &mut allocator);
        assert!(fresh);
        assert_eq!(x, VariableId::new(0));
        assert!(register.contains("x"));
        assert!(!register.is_declared("x"));
    }

    #[test]
    fn test_register_existing_name_reuses_id() {
        let mut register = IdentifierRegister::new();
        let mut allocator = VariableIdAllocator::new();

        let (first, _) = register.register("x", &mut allocator);
        register.declare("x");
        let (second, fresh) = register.register("x", &mut allocator);

        assert!(!fresh);
        assert_eq!(first, second);
        assert_eq!(allocator.allocated(), 1);
        assert!(register.is_declared("x"));
    }

    #[test]
    fn test_latest_declared_skips_pending() {
        let mut register = IdentifierRegister::new();
        let mut allocator = VariableIdAllocator::new();
        assert!(register.latest_declared().is_none());

        register.register("a", &mut allocator);
        register.declare("a");
        register.register("b", &mut allocator);

        let (name, entry) = register.latest_declared().unwrap();
        assert_eq!(name, "a");
        assert_eq!(entry.id, VariableId::new(0));
    }

    #[test]
    fn test_rollback_truncates() {
        let mut register = IdentifierRegister::new();
        let mut allocator = VariableIdAllocator::new();
        register.register("a", &mut allocator);
        register.declare("a");

        let checkpoint = register.checkpoint();
        register.register("b", &mut allocator);
        register.register("c", &mut allocator);
        register.rollback(checkpoint);

        assert_eq!(register.len(), 1);
        assert!(register.contains("a"));
        assert!(!register.contains("b"));
    }

    #[test]
    fn test_declare_unknown_name() {
        let mut register = IdentifierRegister::new();
        assert!(!register.declare("ghost"));
        assert!(register.is_empty());
    }
}
