//! # Core Type Definitions
//!
//! This module contains all core types for the Strata staged IR substrate:
//! - IR identifiers (`BodyId`, `StatementId`, `DeclarationId`)
//! - Qualified names (`QualifiedName`)
//! - Declaration flag bitsets (`DeclarationFlags`)
//! - Statements held by block bodies (`Statement`, `StatementKind`)
//! - Error types (`StrataError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Serialize through `postcard` with stable field order

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// IR IDENTIFIERS
// =============================================================================

/// Unique identifier for a block body within an [`crate::ir::IrTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u64);

/// Unique identifier for a statement inside a block body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatementId(pub u64);

/// Unique identifier for a declaration in the semantic module tree.
/// Used as the parent handle in the tree's container lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclarationId(pub u64);

// =============================================================================
// QUALIFIED NAME
// =============================================================================

/// A fully-qualified, dot-separated declaration name (e.g. `pkg.foo`).
///
/// Qualified names are the identity of declarations across serialization:
/// two callables with the same qualified name and parameter-type names are
/// the same declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedName(pub String);

impl QualifiedName {
    /// Create a new qualified name from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the qualified name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the qualified name of a member nested under this name.
    #[must_use]
    pub fn member(&self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }
}

// =============================================================================
// DECLARATION FLAGS
// =============================================================================

/// Bitset of semantic flags attached to a declaration.
///
/// Flags round-trip through serialization exactly as stored; unknown bits
/// are carried opaquely and never interpreted or defaulted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct DeclarationFlags(pub u32);

impl DeclarationFlags {
    /// Parameter names are part of the binary-compatible signature.
    pub const STABLE_PARAMETER_NAMES: Self = Self(1);

    /// The empty flag set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Reconstruct a flag set from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Get the raw bit value.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check whether every bit of `flag` is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    /// Return this set with the bits of `flag` added.
    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    /// Return this set with the bits of `flag` removed.
    #[must_use]
    pub const fn without(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }
}

// =============================================================================
// STATEMENTS
// =============================================================================

/// The kind of a statement held by a block body.
///
/// The statement grammar is deliberately small: bodies only need enough
/// structure for carriers to snapshot and replay an ordered child list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatementKind {
    /// Invocation of a callable by qualified name.
    Call(QualifiedName),
    /// Assignment to a named local.
    Assign(String),
    /// Return from the enclosing callable.
    Return,
}

/// One statement in a block body's ordered child list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Statement {
    /// The statement's identity, stable across carrier round-trips.
    pub id: StatementId,
    /// What the statement does.
    pub kind: StatementKind,
}

impl Statement {
    /// Create a new statement.
    #[must_use]
    pub const fn new(id: StatementId, kind: StatementKind) -> Self {
        Self { id, kind }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Strata substrate.
///
/// - No silent failures
/// - Use `Result<T, StrataError>` for fallible operations
/// - The substrate never panics; all errors are surfaced to the caller
///
/// Container lifecycle misuse (`PayloadAlreadyAttached`, `PayloadNotAttached`,
/// `ContainerSealed`) indicates a programming error in the caller, not a
/// transient condition. `ContainerNotFound` and `ContainerCorrupt` are kept
/// distinct so callers can decide whether to regenerate or alert.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Materialization or sealing was attempted on a detached body.
    #[error("Body {0:?} is detached; its carrier store has been dropped")]
    DetachedBody(BodyId),

    /// The requested body does not exist in the tree.
    #[error("Body not found: {0:?}")]
    BodyNotFound(BodyId),

    /// A body was constructed with `start_offset > end_offset`.
    #[error("Invalid offsets: start {0} exceeds end {1}")]
    InvalidOffsets(u32, u32),

    /// A payload was attached to a container that already holds one.
    #[error("Container already has a payload attached")]
    PayloadAlreadyAttached,

    /// Commit was requested on a container with no payload attached.
    #[error("Container has no payload attached")]
    PayloadNotAttached,

    /// A mutation was attempted on a committed (sealed) container.
    #[error("Container is sealed; committed containers are immutable")]
    ContainerSealed,

    /// The path does not contain a container.
    #[error("No container found at {0}")]
    ContainerNotFound(PathBuf),

    /// A container is present but unreadable (bad magic, version, or bytes).
    #[error("Container corrupt: {0}")]
    ContainerCorrupt(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
