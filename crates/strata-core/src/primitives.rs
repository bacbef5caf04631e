//! # Format Primitives
//!
//! Hardcoded format constants for the Strata library container.
//!
//! These constants are compiled into the binary and are immutable at runtime.
//! Every on-disk artifact carries a magic + version header that is validated
//! BEFORE any payload bytes are decoded.

/// Magic bytes for the container manifest record.
///
/// - Manifest = Magic ("STRL") + Version (u8) + entry name + version tags.
pub const MANIFEST_MAGIC: [u8; 4] = *b"STRL"; // Strata Library

/// Current container manifest version.
///
/// Increment this when making breaking changes to the manifest layout.
pub const MANIFEST_VERSION: u8 = 1;

/// Magic bytes for the serialized module payload.
///
/// - Payload = Magic ("STRM") + Version (u8) before record data.
pub const PAYLOAD_MAGIC: [u8; 4] = *b"STRM"; // Strata Metadata

/// Current payload format version.
///
/// Increment this when making breaking changes to the record encoding.
pub const PAYLOAD_VERSION: u8 = 1;

/// File name of the manifest record inside a container directory.
pub const MANIFEST_FILE: &str = "manifest";

/// File name of the payload blob inside a container directory.
pub const PAYLOAD_FILE: &str = "payload.bin";

// =============================================================================
// VALIDATION LIMITS
// =============================================================================

/// Maximum allowed payload size.
///
/// This prevents memory exhaustion from malicious or corrupted data.
/// 64 MB is a generous upper bound for module metadata.
///
/// Validated BEFORE attempting payload deserialization.
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024 * 1024; // 64 MB

/// Minimum valid payload size (header only).
pub const MIN_PAYLOAD_SIZE: usize = 5;

/// Maximum allowed manifest size.
///
/// Manifests hold a name and three optional version tags; anything larger
/// is not a manifest.
pub const MAX_MANIFEST_SIZE: usize = 64 * 1024; // 64 KB

// =============================================================================
// BUILTIN TYPE SCOPE
// =============================================================================

/// Type names resolvable within a reconstructed module's scope.
///
/// A deserialized module depends only on itself, so parameter types outside
/// this table decode as unresolved placeholders rather than failing the
/// deserialization.
pub const BUILTIN_TYPES: &[&str] = &[
    "strata.String",
    "strata.Int",
    "strata.Bool",
    "strata.Unit",
];
