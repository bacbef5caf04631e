//! # Semantic Module Model
//!
//! The declaration tree a resolution pipeline hands to the serializer:
//! a named module holding classes and callables. Strata does not resolve or
//! type-check anything itself; this model is the interface boundary to that
//! external pipeline.
//!
//! Declaration identity across serialization is the signature: qualified
//! name plus the ordered parameter-type-name tuple.

use crate::types::{DeclarationFlags, QualifiedName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// TYPE REFERENCES
// =============================================================================

/// A reference to a parameter type, by qualified name.
///
/// Deserialization tolerates names it cannot resolve: the parameter decodes
/// as `Unresolved` and the rest of the module is unaffected. Metadata
/// consumers must remain usable when a dependency graph has shifted since
/// serialization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeRef {
    /// The type is resolvable in the module's scope.
    Resolved(QualifiedName),
    /// Placeholder for a type name outside the module's scope.
    Unresolved(QualifiedName),
}

impl TypeRef {
    /// The referenced qualified name, resolved or not.
    #[must_use]
    pub const fn name(&self) -> &QualifiedName {
        match self {
            Self::Resolved(name) | Self::Unresolved(name) => name,
        }
    }

    /// Check whether the reference resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// One typed parameter of a callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// The declared parameter name.
    pub name: String,
    /// The parameter's type.
    pub ty: TypeRef,
}

impl Parameter {
    /// Create a parameter with a resolved type.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: QualifiedName) -> Self {
        Self {
            name: name.into(),
            ty: TypeRef::Resolved(ty),
        }
    }
}

// =============================================================================
// DECLARATION ORIGIN
// =============================================================================

/// Who wrote a declaration.
///
/// Only declarations the source program actually wrote are persisted as
/// distinct entries; compiler-synthesized overrides are skipped at
/// serialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeclarationOrigin {
    /// Written in source.
    #[default]
    UserWritten,
    /// Synthesized by the compiler as an override of an inherited member.
    SyntheticOverride,
}

// =============================================================================
// SIGNATURE
// =============================================================================

/// Serialization identity of a callable: qualified name plus the ordered
/// parameter-type-name tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Signature {
    /// Fully-qualified callable name.
    pub name: QualifiedName,
    /// Qualified names of the parameter types, in declaration order.
    pub parameter_types: Vec<QualifiedName>,
}

// =============================================================================
// CALLABLE
// =============================================================================

/// A callable declaration: function, method, or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callable {
    /// Fully-qualified name.
    pub name: QualifiedName,
    /// Ordered typed parameters.
    pub parameters: Vec<Parameter>,
    /// Semantic flag bitset.
    pub flags: DeclarationFlags,
    /// Whether the source program or the compiler wrote this declaration.
    pub origin: DeclarationOrigin,
}

impl Callable {
    /// Create a user-written callable with no flags set.
    #[must_use]
    pub fn new(name: QualifiedName, parameters: Vec<Parameter>) -> Self {
        Self {
            name,
            parameters,
            flags: DeclarationFlags::empty(),
            origin: DeclarationOrigin::UserWritten,
        }
    }

    /// Builder: replace the flag bitset.
    #[must_use]
    pub fn with_flags(mut self, flags: DeclarationFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Builder: mark the declaration's origin.
    #[must_use]
    pub fn with_origin(mut self, origin: DeclarationOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Whether parameter names are part of the binary-compatible signature.
    #[must_use]
    pub fn has_stable_parameter_names(&self) -> bool {
        self.flags
            .contains(DeclarationFlags::STABLE_PARAMETER_NAMES)
    }

    /// Set or clear the stable-parameter-names flag.
    pub fn set_stable_parameter_names(&mut self, value: bool) {
        self.flags = if value {
            self.flags.with(DeclarationFlags::STABLE_PARAMETER_NAMES)
        } else {
            self.flags.without(DeclarationFlags::STABLE_PARAMETER_NAMES)
        };
    }

    /// This callable's serialization identity.
    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature {
            name: self.name.clone(),
            parameter_types: self
                .parameters
                .iter()
                .map(|p| p.ty.name().clone())
                .collect(),
        }
    }
}

// =============================================================================
// DECLARATIONS
// =============================================================================

/// A class declaration: a namespace node holding nested declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    /// Fully-qualified class name.
    pub name: QualifiedName,
    /// Nested members, in resolution-pipeline insertion order.
    pub members: Vec<Declaration>,
}

impl ClassDeclaration {
    /// Create a class with no members.
    #[must_use]
    pub const fn new(name: QualifiedName) -> Self {
        Self {
            name,
            members: Vec::new(),
        }
    }

    /// Add a member, returning the class for chaining.
    #[must_use]
    pub fn with_member(mut self, member: Declaration) -> Self {
        self.members.push(member);
        self
    }
}

/// One node of a module's namespace tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Declaration {
    /// A class holding nested declarations.
    Class(ClassDeclaration),
    /// A callable.
    Callable(Callable),
}

// =============================================================================
// MODULE
// =============================================================================

/// A named collection of declarations forming a namespace tree.
///
/// Produced by the external resolution pipeline on the write side;
/// reconstructed by the deserializer on the read side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Module name.
    pub name: String,
    /// Names of modules this one depends on. A deserialized module depends
    /// only on itself.
    pub dependencies: Vec<String>,
    /// Top-level declarations, in insertion order.
    pub declarations: Vec<Declaration>,
}

impl Module {
    /// Create an empty module with no dependencies.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            declarations: Vec::new(),
        }
    }

    /// Create an empty module whose dependency set is itself.
    /// This is the shape the deserializer reconstructs.
    #[must_use]
    pub fn self_dependent(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            dependencies: vec![name.clone()],
            name,
            declarations: Vec::new(),
        }
    }

    /// Append a top-level declaration.
    pub fn push_declaration(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    /// All callables in the namespace tree, depth-first.
    #[must_use]
    pub fn callables(&self) -> Vec<&Callable> {
        fn walk<'a>(declarations: &'a [Declaration], out: &mut Vec<&'a Callable>) {
            for declaration in declarations {
                match declaration {
                    Declaration::Callable(callable) => out.push(callable),
                    Declaration::Class(class) => walk(&class.members, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.declarations, &mut out);
        out
    }

    /// Mutable depth-first view of all callables.
    pub fn callables_mut(&mut self) -> Vec<&mut Callable> {
        fn walk<'a>(declarations: &'a mut [Declaration], out: &mut Vec<&'a mut Callable>) {
            for declaration in declarations {
                match declaration {
                    Declaration::Callable(callable) => out.push(callable),
                    Declaration::Class(class) => walk(&mut class.members, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&mut self.declarations, &mut out);
        out
    }

    /// The set of user-written callable signatures.
    ///
    /// This is the identity the round-trip preserves; synthetic overrides
    /// are not persisted and therefore not part of the set. Returned as a
    /// `BTreeSet` so comparisons are order-independent.
    #[must_use]
    pub fn signatures(&self) -> BTreeSet<Signature> {
        self.callables()
            .into_iter()
            .filter(|c| c.origin == DeclarationOrigin::UserWritten)
            .map(Callable::signature)
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
