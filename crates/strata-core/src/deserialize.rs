//! # Module Deserializer
//!
//! Resolves a committed container back into an in-memory module whose
//! declaration signatures and flags match what was serialized.
//!
//! Validation order, all before record decode:
//! 1. Minimum payload size (header must be present)
//! 2. Maximum payload size (prevents memory exhaustion)
//! 3. Payload magic and version
//!
//! The reconstructed module depends only on itself. Parameter-type names
//! outside the builtin scope decode as [`TypeRef::Unresolved`] placeholders;
//! this per-record tolerance is the only place partial failure is accepted.

use crate::container::OpenContainer;
use crate::module::{Callable, Declaration, DeclarationOrigin, Module, Parameter, TypeRef};
use crate::primitives::{BUILTIN_TYPES, MAX_PAYLOAD_SIZE, MIN_PAYLOAD_SIZE};
use crate::serialize::{CallableRecord, PayloadHeader};
use crate::types::{DeclarationFlags, QualifiedName, StrataError};

// =============================================================================
// TYPE RESOLUTION
// =============================================================================

/// Resolve a parameter-type name within a reconstructed module's scope.
///
/// A self-dependent module can only see the builtin type table; anything
/// else becomes an unresolved placeholder rather than a failure.
#[must_use]
pub fn resolve_type(name: QualifiedName) -> TypeRef {
    if BUILTIN_TYPES.contains(&name.as_str()) {
        TypeRef::Resolved(name)
    } else {
        TypeRef::Unresolved(name)
    }
}

// =============================================================================
// PAYLOAD DECODING
// =============================================================================

/// Decode payload bytes into callable records.
///
/// This is a pure transformation - no file I/O.
pub fn decode_payload(bytes: &[u8]) -> Result<Vec<CallableRecord>, StrataError> {
    if bytes.len() < MIN_PAYLOAD_SIZE {
        return Err(StrataError::ContainerCorrupt(format!(
            "Payload too short: minimum {} bytes required",
            MIN_PAYLOAD_SIZE
        )));
    }
    if bytes.len() > MAX_PAYLOAD_SIZE {
        return Err(StrataError::ContainerCorrupt(format!(
            "Payload size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    // Validate header BEFORE touching record data.
    let header = PayloadHeader::from_bytes(bytes)?;
    header.validate()?;

    let records: Vec<CallableRecord> = postcard::from_bytes(&bytes[MIN_PAYLOAD_SIZE..])
        .map_err(|e| StrataError::ContainerCorrupt(format!("Malformed record data: {}", e)))?;

    // The serializer always emits parallel name/type lists; a mismatch is
    // corrupt data, not a shorter parameter list.
    for record in &records {
        if record.parameter_names.len() != record.parameter_types.len() {
            return Err(StrataError::ContainerCorrupt(format!(
                "Record {}: {} parameter names but {} parameter types",
                record.name.as_str(),
                record.parameter_names.len(),
                record.parameter_types.len()
            )));
        }
    }

    Ok(records)
}

// =============================================================================
// DESERIALIZATION
// =============================================================================

/// Reconstruct a module from an opened container.
///
/// Flags restore exactly as encoded; no inference or defaulting happens
/// here. Each record becomes a user-written top-level callable under a
/// module named after the container's entry, depending only on itself.
pub fn deserialize_module(container: &OpenContainer) -> Result<Module, StrataError> {
    let records = decode_payload(container.payload_bytes())?;

    let mut module = Module::self_dependent(container.entry_name());
    for record in records {
        let parameters = record
            .parameter_names
            .into_iter()
            .zip(record.parameter_types)
            .map(|(name, ty)| Parameter {
                name,
                ty: resolve_type(ty),
            })
            .collect();

        let callable = Callable {
            name: record.name,
            parameters,
            flags: DeclarationFlags::from_bits(record.flags),
            origin: DeclarationOrigin::UserWritten,
        };
        module.push_declaration(Declaration::Callable(callable));
    }

    Ok(module)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::PAYLOAD_MAGIC;
    use crate::serialize::serialize_module;

    #[test]
    fn builtin_types_resolve() {
        let ty = resolve_type(QualifiedName::new("strata.String"));
        assert!(ty.is_resolved());
    }

    #[test]
    fn foreign_types_become_placeholders() {
        let ty = resolve_type(QualifiedName::new("other.lib.Widget"));
        assert!(!ty.is_resolved());
        assert_eq!(ty.name().as_str(), "other.lib.Widget");
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let result = decode_payload(&PAYLOAD_MAGIC[0..3]);
        assert!(matches!(result, Err(StrataError::ContainerCorrupt(_))));
    }

    #[test]
    fn decode_rejects_wrong_magic() {
        let mut bytes = serialize_module(&Module::new("m"))
            .expect("serialize")
            .as_bytes()
            .to_vec();
        bytes[0..4].copy_from_slice(b"XXXX");

        assert!(matches!(
            decode_payload(&bytes),
            Err(StrataError::ContainerCorrupt(_))
        ));
    }

    #[test]
    fn decode_rejects_future_version() {
        let mut bytes = serialize_module(&Module::new("m"))
            .expect("serialize")
            .as_bytes()
            .to_vec();
        bytes[4] = bytes[4].wrapping_add(1);

        assert!(matches!(
            decode_payload(&bytes),
            Err(StrataError::ContainerCorrupt(_))
        ));
    }

    #[test]
    fn mismatched_parameter_lists_are_corrupt() {
        let records = vec![CallableRecord {
            name: QualifiedName::new("m.f"),
            parameter_names: vec!["x".to_owned()],
            parameter_types: Vec::new(),
            flags: 0,
        }];
        let mut bytes = PayloadHeader::new().to_bytes().to_vec();
        bytes.extend(postcard::to_stdvec(&records).expect("encode"));

        assert!(matches!(
            decode_payload(&bytes),
            Err(StrataError::ContainerCorrupt(_))
        ));
    }

    #[test]
    fn decode_empty_module_payload_yields_no_records() {
        let payload = serialize_module(&Module::new("m")).expect("serialize");
        let records = decode_payload(payload.as_bytes()).expect("decode");
        assert!(records.is_empty());
    }
}
