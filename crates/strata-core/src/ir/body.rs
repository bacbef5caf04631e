//! # Block Body
//!
//! A [`BlockBody`] is one staged IR tree element: an ordered sequence of
//! statements whose storage swaps between a live in-memory list and
//! stage-tagged carrier snapshots.
//!
//! The state is an explicit enum ([`BodyState`]): materialization is a pure
//! decode of a carrier followed by a state replacement, never an in-place
//! mutation racing with readers. `children()` and `seal()` take `&mut self`,
//! so exclusive per-body access is enforced by the borrow checker — the
//! single-owner-per-worker usage the pipeline guarantees.

use crate::ir::carrier::{Carrier, CarrierStore};
use crate::stage::{Stage, StageController};
use crate::types::{BodyId, Statement, StrataError};

// =============================================================================
// BODY STATE
// =============================================================================

/// Storage state of a body's statement list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyState {
    /// Statements resident in memory, directly readable and writable.
    Live(Vec<Statement>),
    /// Statements evicted into the carrier store; the index names the
    /// carrier produced by the seal that evicted them.
    Sealed(usize),
    /// Removed from its tree. Any access is a use-after-detach bug.
    Detached,
}

// =============================================================================
// BLOCK BODY
// =============================================================================

/// One staged IR tree element holding an ordered statement list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBody {
    id: BodyId,
    start_offset: u32,
    end_offset: u32,
    /// Stage at creation. Immutable after construction.
    created_on: Stage,
    /// Stage at which live fields were last written.
    last_modified: Stage,
    /// Highest stage this body has been transformed through. Tracks
    /// pipeline progress independent of mutation.
    lowered_up_to: Stage,
    state: BodyState,
    carriers: CarrierStore,
}

impl BlockBody {
    /// Create a fresh live body at the controller's current stage.
    ///
    /// Fails with [`StrataError::InvalidOffsets`] if `start_offset` exceeds
    /// `end_offset`.
    pub fn new(
        id: BodyId,
        stages: &StageController,
        start_offset: u32,
        end_offset: u32,
    ) -> Result<Self, StrataError> {
        if start_offset > end_offset {
            return Err(StrataError::InvalidOffsets(start_offset, end_offset));
        }
        let stage = stages.current();
        Ok(Self {
            id,
            start_offset,
            end_offset,
            created_on: stage,
            last_modified: stage,
            lowered_up_to: stage,
            state: BodyState::Live(Vec::new()),
            carriers: CarrierStore::new(),
        })
    }

    /// The body's identity within its tree.
    #[must_use]
    pub const fn id(&self) -> BodyId {
        self.id
    }

    /// Source bounds, `start <= end` by construction.
    #[must_use]
    pub const fn offsets(&self) -> (u32, u32) {
        (self.start_offset, self.end_offset)
    }

    /// Stage this body was created on.
    #[must_use]
    pub const fn created_on(&self) -> Stage {
        self.created_on
    }

    /// Stage at which live fields were last written.
    #[must_use]
    pub const fn last_modified(&self) -> Stage {
        self.last_modified
    }

    /// Highest stage this body has been transformed through.
    #[must_use]
    pub const fn lowered_up_to(&self) -> Stage {
        self.lowered_up_to
    }

    /// Record that the pipeline has transformed this body through `stage`.
    /// Never moves backwards.
    pub fn mark_lowered(&mut self, stage: Stage) {
        if stage > self.lowered_up_to {
            self.lowered_up_to = stage;
        }
    }

    /// Number of carriers sealed for this body.
    #[must_use]
    pub fn carrier_count(&self) -> usize {
        self.carriers.len()
    }

    /// Check whether this body has been detached from its tree.
    #[must_use]
    pub const fn is_detached(&self) -> bool {
        matches!(self.state, BodyState::Detached)
    }

    /// The live, mutable statement list.
    ///
    /// Materializes from the carrier store when needed:
    /// - A detached body fails with [`StrataError::DetachedBody`].
    /// - A fresh body (current stage at or before `created_on`) returns its
    ///   live list with no carrier lookup.
    /// - Forward read (current stage after the last write): materializes
    ///   only from a carrier sealed at an intermediate stage, after the
    ///   last write and not after the current stage. Carriers older than
    ///   the last write are stale; the live list — which may hold unsealed
    ///   mutations — is returned unchanged.
    /// - Replay read (current stage before the last write): materializes
    ///   from the carrier nearest to, but not after, the current stage.
    /// - On materialization the live list is replaced with the decoded list
    ///   and `last_modified` is set to the current stage. If no applicable
    ///   carrier exists, the existing live list is returned unchanged (the
    ///   body was never persisted at a relevant stage).
    pub fn children(
        &mut self,
        stages: &StageController,
    ) -> Result<&mut Vec<Statement>, StrataError> {
        let stage = stages.current();

        let replacement = match &self.state {
            BodyState::Detached => return Err(StrataError::DetachedBody(self.id)),
            BodyState::Sealed(sealing) => {
                // Evicted: decode from the carrier nearest to the current
                // stage, falling back to the sealing snapshot itself.
                let carrier = self
                    .carriers
                    .nearest_at(stage)
                    .or_else(|| self.carriers.get(*sealing))
                    .ok_or(StrataError::DetachedBody(self.id))?;
                Some(carrier.decode_statements()?)
            }
            BodyState::Live(_) if stage > self.created_on && self.last_modified != stage => {
                match self.carriers.nearest_at(stage) {
                    // Forward read: a carrier at or before the last write is
                    // stale — the live list may hold unsealed mutations.
                    Some(carrier)
                        if stage > self.last_modified
                            && carrier.stage() <= self.last_modified =>
                    {
                        None
                    }
                    Some(carrier) => Some(carrier.decode_statements()?),
                    None => None,
                }
            }
            BodyState::Live(_) => None,
        };

        if let Some(statements) = replacement {
            self.state = BodyState::Live(statements);
            self.last_modified = stage;
        }

        match &mut self.state {
            BodyState::Live(statements) => Ok(statements),
            _ => Err(StrataError::DetachedBody(self.id)),
        }
    }

    /// Append a statement to the live list, recording the write stage.
    pub fn push_statement(
        &mut self,
        stages: &StageController,
        statement: Statement,
    ) -> Result<(), StrataError> {
        let stage = stages.current();
        self.children(stages)?.push(statement);
        self.last_modified = stage;
        Ok(())
    }

    /// Replace the live list wholesale, recording the write stage.
    pub fn set_children(
        &mut self,
        stages: &StageController,
        statements: Vec<Statement>,
    ) -> Result<(), StrataError> {
        let stage = stages.current();
        let live = self.children(stages)?;
        *live = statements;
        self.last_modified = stage;
        Ok(())
    }

    /// Snapshot current live fields into a new carrier tagged with the
    /// current stage, append it to the carrier store, and evict the live
    /// list. Returns the sealed carrier.
    ///
    /// When sealing is required is pipeline policy; the body only guarantees
    /// that `children()` is correct given the carriers the pipeline sealed.
    pub fn seal(&mut self, stages: &StageController) -> Result<&Carrier, StrataError> {
        let stage = stages.current();

        let statements = match &self.state {
            BodyState::Detached => return Err(StrataError::DetachedBody(self.id)),
            BodyState::Live(live) => live.clone(),
            // Sealing an already-evicted body re-snapshots its current view.
            BodyState::Sealed(sealing) => self
                .carriers
                .nearest_at(stage)
                .or_else(|| self.carriers.get(*sealing))
                .ok_or(StrataError::DetachedBody(self.id))?
                .decode_statements()?,
        };

        let carrier = Carrier::snapshot(stage, self.start_offset, self.end_offset, &statements)?;
        let index = self.carriers.push(carrier);
        self.state = BodyState::Sealed(index);

        self.carriers
            .get(index)
            .ok_or(StrataError::DetachedBody(self.id))
    }

    /// Detach this body: drop the carrier store and poison the state.
    /// Called by the tree when the parent relation is severed.
    pub(crate) fn detach(&mut self) {
        self.state = BodyState::Detached;
        self.carriers.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
