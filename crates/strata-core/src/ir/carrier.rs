//! # Carriers
//!
//! A carrier is an immutable snapshot of a block body's persisted fields at
//! some stage. The statement list is stored as a `postcard`-encoded blob, so
//! a carrier is opaque until explicitly decoded back into live statements.
//!
//! Each body owns an append-only [`CarrierStore`]; there is no external
//! aliasing of carriers.

use crate::stage::Stage;
use crate::types::{Statement, StrataError};
use serde::{Deserialize, Serialize};

// =============================================================================
// CARRIER
// =============================================================================

/// An immutable snapshot of a body's persisted state at a given stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    stage: Stage,
    start_offset: u32,
    end_offset: u32,
    /// Encoded statement list. Decoding is a pure function of these bytes.
    statements: Vec<u8>,
}

impl Carrier {
    /// Snapshot live fields into a new carrier tagged with `stage`.
    pub fn snapshot(
        stage: Stage,
        start_offset: u32,
        end_offset: u32,
        statements: &[Statement],
    ) -> Result<Self, StrataError> {
        let encoded = postcard::to_stdvec(statements)
            .map_err(|e| StrataError::SerializationError(e.to_string()))?;
        Ok(Self {
            stage,
            start_offset,
            end_offset,
            statements: encoded,
        })
    }

    /// The stage this carrier was sealed at.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// The snapshotted source bounds.
    #[must_use]
    pub const fn offsets(&self) -> (u32, u32) {
        (self.start_offset, self.end_offset)
    }

    /// Decode the snapshotted statement list back into live statements.
    ///
    /// Pure: the carrier is not consumed or modified.
    pub fn decode_statements(&self) -> Result<Vec<Statement>, StrataError> {
        postcard::from_bytes(&self.statements)
            .map_err(|e| StrataError::DeserializationError(e.to_string()))
    }
}

// =============================================================================
// CARRIER STORE
// =============================================================================

/// Append-only store of a body's carriers, ordered by recency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarrierStore {
    carriers: Vec<Carrier>,
}

impl CarrierStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            carriers: Vec::new(),
        }
    }

    /// Append a carrier and return its slot index.
    pub fn push(&mut self, carrier: Carrier) -> usize {
        self.carriers.push(carrier);
        self.carriers.len() - 1
    }

    /// Get the carrier in the given slot.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Carrier> {
        self.carriers.get(index)
    }

    /// Locate the carrier nearest to, but not after, the given stage.
    ///
    /// When several carriers share the winning stage, the most recently
    /// appended one wins.
    #[must_use]
    pub fn nearest_at(&self, stage: Stage) -> Option<&Carrier> {
        self.carriers
            .iter()
            .filter(|c| c.stage() <= stage)
            .max_by_key(|c| c.stage())
    }

    /// The most recently appended carrier.
    #[must_use]
    pub fn latest(&self) -> Option<&Carrier> {
        self.carriers.last()
    }

    /// Number of carriers held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    /// Check whether the store holds no carriers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    /// Drop every carrier. Used when a body is detached from its tree.
    pub fn clear(&mut self) {
        self.carriers.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QualifiedName, StatementId, StatementKind};

    fn call(id: u64, name: &str) -> Statement {
        Statement::new(
            StatementId(id),
            StatementKind::Call(QualifiedName::new(name)),
        )
    }

    #[test]
    fn snapshot_decodes_back_to_input() {
        let statements = vec![call(1, "pkg.a"), call(2, "pkg.b")];
        let carrier = Carrier::snapshot(Stage(3), 0, 10, &statements).expect("snapshot");

        assert_eq!(carrier.stage(), Stage(3));
        assert_eq!(carrier.offsets(), (0, 10));
        assert_eq!(carrier.decode_statements().expect("decode"), statements);
    }

    #[test]
    fn empty_statement_list_snapshots() {
        let carrier = Carrier::snapshot(Stage(0), 4, 4, &[]).expect("snapshot");
        assert!(carrier.decode_statements().expect("decode").is_empty());
    }

    #[test]
    fn nearest_at_picks_latest_not_after_stage() {
        let mut store = CarrierStore::new();
        store.push(Carrier::snapshot(Stage(1), 0, 0, &[call(1, "a")]).expect("s1"));
        store.push(Carrier::snapshot(Stage(4), 0, 0, &[call(2, "b")]).expect("s4"));
        store.push(Carrier::snapshot(Stage(7), 0, 0, &[call(3, "c")]).expect("s7"));

        assert_eq!(store.nearest_at(Stage(0)).map(Carrier::stage), None);
        assert_eq!(
            store.nearest_at(Stage(1)).map(Carrier::stage),
            Some(Stage(1))
        );
        assert_eq!(
            store.nearest_at(Stage(5)).map(Carrier::stage),
            Some(Stage(4))
        );
        assert_eq!(
            store.nearest_at(Stage(100)).map(Carrier::stage),
            Some(Stage(7))
        );
    }

    #[test]
    fn nearest_at_ties_prefer_most_recent() {
        let mut store = CarrierStore::new();
        store.push(Carrier::snapshot(Stage(2), 0, 0, &[call(1, "old")]).expect("old"));
        store.push(Carrier::snapshot(Stage(2), 0, 0, &[call(2, "new")]).expect("new"));

        let winner = store.nearest_at(Stage(2)).expect("carrier");
        assert_eq!(
            winner.decode_statements().expect("decode"),
            vec![call(2, "new")]
        );
    }

    #[test]
    fn clear_drops_all_carriers() {
        let mut store = CarrierStore::new();
        store.push(Carrier::snapshot(Stage(1), 0, 0, &[]).expect("snapshot"));
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
        assert!(store.latest().is_none());
    }
}
