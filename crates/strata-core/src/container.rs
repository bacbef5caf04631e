//! # Library Container
//!
//! The on-disk versioned container: a named directory holding a manifest
//! record and one payload blob.
//!
//! Layout:
//! - `<dir>/<name>/manifest` — magic ("STRL") + version + entry name +
//!   version tags, postcard-encoded.
//! - `<dir>/<name>/payload.bin` — the serialized module payload.
//!
//! Lifecycle: created empty → payload attached exactly once → committed
//! (sealed, immutable) → later opened read-only. Commit stages the bundle in
//! a dot-prefixed temp directory and atomically renames it into place, so a
//! crash mid-commit never leaves a container with a valid manifest but a
//! missing payload.

use crate::primitives::{
    MANIFEST_FILE, MANIFEST_MAGIC, MANIFEST_VERSION, MAX_MANIFEST_SIZE, PAYLOAD_FILE,
};
use crate::serialize::SerializedPayload;
use crate::types::StrataError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// VERSION TAGS
// =============================================================================

/// The container's version-tag record.
///
/// Each tag is independently optional: a library may carry any subset of
/// metadata, compiler, and IR versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VersionTags {
    /// Metadata format version.
    pub metadata_version: Option<String>,
    /// Version of the compiler that produced the library.
    pub compiler_version: Option<String>,
    /// IR format version.
    pub ir_version: Option<String>,
}

impl VersionTags {
    /// No tags present.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            metadata_version: None,
            compiler_version: None,
            ir_version: None,
        }
    }

    /// Builder: set the metadata version.
    #[must_use]
    pub fn with_metadata_version(mut self, v: impl Into<String>) -> Self {
        self.metadata_version = Some(v.into());
        self
    }

    /// Builder: set the compiler version.
    #[must_use]
    pub fn with_compiler_version(mut self, v: impl Into<String>) -> Self {
        self.compiler_version = Some(v.into());
        self
    }

    /// Builder: set the IR version.
    #[must_use]
    pub fn with_ir_version(mut self, v: impl Into<String>) -> Self {
        self.ir_version = Some(v.into());
        self
    }
}

// =============================================================================
// MANIFEST
// =============================================================================

/// The manifest record written at the head of every container.
///
/// Validated before any payload bytes are decoded (fail fast on version
/// mismatch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub magic: [u8; 4],
    pub version: u8,
    /// The named library entry this container holds.
    pub entry_name: String,
    /// Independently-optional version tags.
    pub tags: VersionTags,
}

impl Manifest {
    /// Create a manifest with the current container version.
    #[must_use]
    pub fn new(entry_name: impl Into<String>, tags: VersionTags) -> Self {
        Self {
            magic: MANIFEST_MAGIC,
            version: MANIFEST_VERSION,
            entry_name: entry_name.into(),
            tags,
        }
    }

    /// Validate magic and version.
    pub fn validate(&self) -> Result<(), StrataError> {
        if self.magic != MANIFEST_MAGIC {
            return Err(StrataError::ContainerCorrupt(
                "Invalid manifest magic".to_string(),
            ));
        }
        if self.version != MANIFEST_VERSION {
            return Err(StrataError::ContainerCorrupt(format!(
                "Unsupported container version: {} (expected {})",
                self.version, MANIFEST_VERSION
            )));
        }
        Ok(())
    }
}

// =============================================================================
// WRITABLE CONTAINER
// =============================================================================

/// A library container being assembled for commit.
#[derive(Debug)]
pub struct LibraryContainer {
    name: String,
    tags: VersionTags,
    payload: Option<SerializedPayload>,
    sealed: bool,
}

impl LibraryContainer {
    /// Create an empty, writable container for the named library entry.
    #[must_use]
    pub fn create(name: impl Into<String>, tags: VersionTags) -> Self {
        Self {
            name: name.into(),
            tags,
            payload: None,
            sealed: false,
        }
    }

    /// The library entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether the container has been committed.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Attach the payload. Exactly-once: a second attach fails with
    /// [`StrataError::PayloadAlreadyAttached`].
    pub fn attach_payload(&mut self, payload: SerializedPayload) -> Result<(), StrataError> {
        if self.sealed {
            return Err(StrataError::ContainerSealed);
        }
        if self.payload.is_some() {
            return Err(StrataError::PayloadAlreadyAttached);
        }
        self.payload = Some(payload);
        Ok(())
    }

    /// Commit the container under `dir`, sealing it.
    ///
    /// Fails with [`StrataError::PayloadNotAttached`] if no payload was ever
    /// attached. The bundle is written to `<dir>/.<name>.tmp` and renamed to
    /// `<dir>/<name>` in one step. Returns the committed path.
    pub fn commit(&mut self, dir: &Path) -> Result<PathBuf, StrataError> {
        if self.sealed {
            return Err(StrataError::ContainerSealed);
        }
        let payload = self
            .payload
            .as_ref()
            .ok_or(StrataError::PayloadNotAttached)?;

        let manifest = Manifest::new(&self.name, self.tags.clone());
        let manifest_bytes = postcard::to_stdvec(&manifest)
            .map_err(|e| StrataError::SerializationError(e.to_string()))?;

        let staging = dir.join(format!(".{}.tmp", self.name));
        let target = dir.join(&self.name);

        // Stale staging from a previous crashed commit is discarded.
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| StrataError::IoError(e.to_string()))?;
        }
        fs::create_dir_all(&staging).map_err(|e| StrataError::IoError(e.to_string()))?;
        fs::write(staging.join(MANIFEST_FILE), &manifest_bytes)
            .map_err(|e| StrataError::IoError(e.to_string()))?;
        fs::write(staging.join(PAYLOAD_FILE), payload.as_bytes())
            .map_err(|e| StrataError::IoError(e.to_string()))?;

        fs::rename(&staging, &target).map_err(|e| StrataError::IoError(e.to_string()))?;

        self.sealed = true;
        Ok(target)
    }
}

// =============================================================================
// READ-ONLY CONTAINER
// =============================================================================

/// A committed container resolved for reading.
#[derive(Debug)]
pub struct OpenContainer {
    path: PathBuf,
    manifest: Manifest,
    payload: Vec<u8>,
}

impl OpenContainer {
    /// Resolve a container at `path` for read access.
    ///
    /// - A missing directory or manifest is [`StrataError::ContainerNotFound`].
    /// - A present-but-unreadable manifest or missing payload file is
    ///   [`StrataError::ContainerCorrupt`].
    ///
    /// The manifest is validated here; payload bytes are read but not
    /// decoded until deserialization.
    pub fn open(path: &Path) -> Result<Self, StrataError> {
        if !path.is_dir() {
            return Err(StrataError::ContainerNotFound(path.to_path_buf()));
        }
        let manifest_path = path.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(StrataError::ContainerNotFound(path.to_path_buf()));
        }

        let manifest_bytes =
            fs::read(&manifest_path).map_err(|e| StrataError::IoError(e.to_string()))?;
        if manifest_bytes.len() > MAX_MANIFEST_SIZE {
            return Err(StrataError::ContainerCorrupt(
                "Manifest exceeds maximum size".to_string(),
            ));
        }
        let manifest: Manifest = postcard::from_bytes(&manifest_bytes)
            .map_err(|e| StrataError::ContainerCorrupt(format!("Malformed manifest: {}", e)))?;
        manifest.validate()?;

        let payload_path = path.join(PAYLOAD_FILE);
        if !payload_path.is_file() {
            return Err(StrataError::ContainerCorrupt(
                "Container has no payload file".to_string(),
            ));
        }
        let payload = fs::read(&payload_path).map_err(|e| StrataError::IoError(e.to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            manifest,
            payload,
        })
    }

    /// Where this container lives on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The validated manifest.
    #[must_use]
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The library entry name recorded at commit time.
    #[must_use]
    pub fn entry_name(&self) -> &str {
        &self.manifest.entry_name
    }

    /// The version tags recorded at commit time.
    #[must_use]
    pub const fn tags(&self) -> &VersionTags {
        &self.manifest.tags
    }

    /// Raw payload bytes, header included.
    #[must_use]
    pub fn payload_bytes(&self) -> &[u8] {
        &self.payload
    }
}

// =============================================================================
// TESTS
// =============================================================================
