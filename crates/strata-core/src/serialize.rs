//! # Module Serializer
//!
//! Walks a module's namespace tree depth-first and encodes each user-written
//! callable into a versioned binary payload.
//!
//! Format: Header (5 bytes) + postcard-serialized record list.
//! - 4 bytes: Magic ("STRM")
//! - 1 byte: Version
//!
//! Emission order is the resolution pipeline's insertion order, not sorted;
//! consumers compare record *sets*. An empty module produces a valid payload
//! with zero records.

use crate::module::{DeclarationOrigin, Module};
use crate::primitives::{PAYLOAD_MAGIC, PAYLOAD_VERSION};
use crate::types::{QualifiedName, StrataError};
use serde::{Deserialize, Serialize};

// =============================================================================
// PAYLOAD HEADER
// =============================================================================

/// The payload header precedes all record data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PayloadHeader {
    /// Create a new header with the current format version.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            magic: PAYLOAD_MAGIC,
            version: PAYLOAD_VERSION,
        }
    }

    /// Validate the header. Checked before any record decode.
    pub fn validate(&self) -> Result<(), StrataError> {
        if self.magic != PAYLOAD_MAGIC {
            return Err(StrataError::ContainerCorrupt(
                "Invalid payload magic".to_string(),
            ));
        }
        if self.version != PAYLOAD_VERSION {
            return Err(StrataError::ContainerCorrupt(format!(
                "Unsupported payload version: {} (expected {})",
                self.version, PAYLOAD_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; 5] {
        [
            self.magic[0],
            self.magic[1],
            self.magic[2],
            self.magic[3],
            self.version,
        ]
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StrataError> {
        if bytes.len() < 5 {
            return Err(StrataError::ContainerCorrupt(
                "Payload too short for header".to_string(),
            ));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for PayloadHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// CALLABLE RECORD
// =============================================================================

/// One serialized callable: the on-disk shape of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableRecord {
    /// Fully-qualified callable name.
    pub name: QualifiedName,
    /// Declared parameter names, in order.
    pub parameter_names: Vec<String>,
    /// Qualified parameter-type names, in order.
    pub parameter_types: Vec<QualifiedName>,
    /// Raw flag bits, restored exactly as stored.
    pub flags: u32,
}

// =============================================================================
// SERIALIZED PAYLOAD
// =============================================================================

/// An encoded module payload: header + record bytes, ready to attach to a
/// library container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedPayload(Vec<u8>);

impl SerializedPayload {
    /// Wrap raw payload bytes read back from a container.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The payload bytes, header included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A payload is never shorter than its header.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// SERIALIZATION
// =============================================================================

/// Serialize a module's user-written callables into a versioned payload.
///
/// This is a pure transformation - no file I/O.
pub fn serialize_module(module: &Module) -> Result<SerializedPayload, StrataError> {
    let records: Vec<CallableRecord> = module
        .callables()
        .into_iter()
        .filter(|c| c.origin != DeclarationOrigin::SyntheticOverride)
        .map(|c| CallableRecord {
            name: c.name.clone(),
            parameter_names: c.parameters.iter().map(|p| p.name.clone()).collect(),
            parameter_types: c.parameters.iter().map(|p| p.ty.name().clone()).collect(),
            flags: c.flags.bits(),
        })
        .collect();

    let body = postcard::to_stdvec(&records)
        .map_err(|e| StrataError::SerializationError(e.to_string()))?;

    let header = PayloadHeader::new();
    let mut bytes = Vec::with_capacity(5 + body.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&body);

    Ok(SerializedPayload(bytes))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Callable, ClassDeclaration, Declaration, Parameter};
    use crate::types::DeclarationFlags;

    fn user_callable(name: &str) -> Callable {
        Callable::new(
            QualifiedName::new(name),
            vec![Parameter::new("x", QualifiedName::new("strata.Int"))],
        )
    }

    fn decode_records(payload: &SerializedPayload) -> Vec<CallableRecord> {
        postcard::from_bytes(&payload.as_bytes()[5..]).expect("records")
    }

    #[test]
    fn header_roundtrip() {
        let header = PayloadHeader::new();
        let restored = PayloadHeader::from_bytes(&header.to_bytes()).expect("parse");
        assert_eq!(restored, header);
        assert!(restored.validate().is_ok());
    }

    #[test]
    fn empty_module_is_a_valid_empty_payload() {
        let payload = serialize_module(&Module::new("m")).expect("serialize");
        assert_eq!(payload.len(), 5 + 1); // header + zero-length record list
        assert!(decode_records(&payload).is_empty());
    }

    #[test]
    fn synthetic_overrides_are_not_emitted() {
        let mut module = Module::new("m");
        module.push_declaration(Declaration::Callable(user_callable("m.f")));
        module.push_declaration(Declaration::Callable(
            user_callable("m.f").with_origin(crate::module::DeclarationOrigin::SyntheticOverride),
        ));

        let records = decode_records(&serialize_module(&module).expect("serialize"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, QualifiedName::new("m.f"));
    }

    #[test]
    fn nested_class_members_are_emitted() {
        let mut module = Module::new("m");
        module.push_declaration(Declaration::Class(
            ClassDeclaration::new(QualifiedName::new("m.C"))
                .with_member(Declaration::Callable(user_callable("m.C.f"))),
        ));

        let records = decode_records(&serialize_module(&module).expect("serialize"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, QualifiedName::new("m.C.f"));
    }

    #[test]
    fn flag_bits_are_emitted_verbatim() {
        let flags = DeclarationFlags::from_bits(0b1001);
        let mut module = Module::new("m");
        module.push_declaration(Declaration::Callable(
            user_callable("m.f").with_flags(flags),
        ));

        let records = decode_records(&serialize_module(&module).expect("serialize"));
        assert_eq!(records[0].flags, 0b1001);
    }
}
