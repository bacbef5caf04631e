//! # strata-core
//!
//! The staged IR substrate for Strata - a lazily-materialized
//! intermediate-representation container with versioned serialization to a
//! portable on-disk library format.
//!
//! Two subsystems:
//! - **Staged IR**: block bodies whose statement lists swap between a live
//!   in-memory representation and stage-tagged carrier snapshots, gated by
//!   an explicitly-threaded [`stage::StageController`].
//! - **Library round-trip**: a module serializer, a versioned on-disk
//!   container, and a deserializer that reconstructs a module with matching
//!   declaration signatures and flags.
//!
//! ## Architectural Constraints
//!
//! - Is pure Rust: no async, no network dependencies
//! - Is deterministic: `BTreeMap`/`BTreeSet` only, no floats, no randomness
//! - Never panics; all errors are surfaced as `Result<T, StrataError>`
//! - Holds no ambient global state; the stage controller is passed in

// =============================================================================
// MODULES
// =============================================================================

pub mod container;
pub mod deserialize;
pub mod ir;
pub mod module;
pub mod primitives;
pub mod serialize;
pub mod stage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    BodyId, DeclarationFlags, DeclarationId, QualifiedName, Statement, StatementId,
    StatementKind, StrataError,
};

// =============================================================================
// RE-EXPORTS: Staged IR
// =============================================================================

pub use ir::{BlockBody, BodyState, Carrier, CarrierStore, IrTree};
pub use stage::{Stage, StageController};

// =============================================================================
// RE-EXPORTS: Library Round-Trip
// =============================================================================

pub use container::{LibraryContainer, Manifest, OpenContainer, VersionTags};
pub use deserialize::{decode_payload, deserialize_module, resolve_type};
pub use module::{
    Callable, ClassDeclaration, Declaration, DeclarationOrigin, Module, Parameter, Signature,
    TypeRef,
};
pub use serialize::{serialize_module, CallableRecord, PayloadHeader, SerializedPayload};
