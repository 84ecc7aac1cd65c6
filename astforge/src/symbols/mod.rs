//! Per-session symbol state: identity allocation and the identifier register.
//!
//! Both are owned by the caller and lent to the parser for each call, so one
//! parser can serve any number of independent sessions.

mod allocator;
mod register;

pub use allocator::{AllocatorCheckpoint, VariableId, VariableIdAllocator};
pub use register::{DeclarationState, IdentifierRegister, RegisterCheckpoint, RegisteredIdentifier};
