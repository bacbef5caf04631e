//! # IR Tree
//!
//! Owns every block body and the parent lookup table. The child-to-container
//! relation is a table held by the tree root (`BodyId -> DeclarationId`),
//! not a back-pointer held by the child, so there are no ownership cycles
//! while "find my parent" stays answerable.
//!
//! Uses `BTreeMap` exclusively for deterministic ordering.

use crate::ir::body::BlockBody;
use crate::stage::StageController;
use crate::types::{BodyId, DeclarationId, StrataError};
use std::collections::BTreeMap;

/// The staged IR tree: body ownership plus the container lookup table.
#[derive(Debug, Default)]
pub struct IrTree {
    /// Body storage: BodyId -> BlockBody
    bodies: BTreeMap<BodyId, BlockBody>,

    /// Container lookup: BodyId -> owning declaration
    parents: BTreeMap<BodyId, DeclarationId>,

    /// Next body id to allocate.
    next_body: u64,
}

impl IrTree {
    /// Create an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bodies: BTreeMap::new(),
            parents: BTreeMap::new(),
            next_body: 0,
        }
    }

    /// Create a fresh body owned by `parent` at the current stage.
    /// Returns the allocated id.
    pub fn insert_body(
        &mut self,
        stages: &StageController,
        parent: DeclarationId,
        start_offset: u32,
        end_offset: u32,
    ) -> Result<BodyId, StrataError> {
        let id = BodyId(self.next_body);
        let body = BlockBody::new(id, stages, start_offset, end_offset)?;
        self.next_body = self.next_body.saturating_add(1);
        self.bodies.insert(id, body);
        self.parents.insert(id, parent);
        Ok(id)
    }

    /// Borrow a body.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&BlockBody> {
        self.bodies.get(&id)
    }

    /// Mutably borrow a body for staged reads and writes.
    #[must_use]
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut BlockBody> {
        self.bodies.get_mut(&id)
    }

    /// Find the declaration that owns a body.
    ///
    /// Detached bodies have no container: this returns `None` for them.
    #[must_use]
    pub fn container_of(&self, id: BodyId) -> Option<DeclarationId> {
        self.parents.get(&id).copied()
    }

    /// Sever a body from its container and drop its carrier store.
    ///
    /// The body stays resident in a poisoned state so that any later access
    /// through it is reported as [`StrataError::DetachedBody`] rather than
    /// silently reading stale data.
    pub fn detach(&mut self, id: BodyId) -> Result<(), StrataError> {
        let body = self
            .bodies
            .get_mut(&id)
            .ok_or(StrataError::BodyNotFound(id))?;
        body.detach();
        self.parents.remove(&id);
        Ok(())
    }

    /// Total number of bodies, detached ones included.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate body ids in deterministic order.
    pub fn body_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.keys().copied()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QualifiedName, Statement, StatementId, StatementKind};

    #[test]
    fn insert_allocates_sequential_ids() {
        let stages = StageController::new();
        let mut tree = IrTree::new();

        let a = tree
            .insert_body(&stages, DeclarationId(10), 0, 5)
            .expect("insert a");
        let b = tree
            .insert_body(&stages, DeclarationId(10), 5, 9)
            .expect("insert b");

        assert_eq!(a, BodyId(0));
        assert_eq!(b, BodyId(1));
        assert_eq!(tree.body_count(), 2);
    }

    #[test]
    fn container_lookup_answers_parent() {
        let stages = StageController::new();
        let mut tree = IrTree::new();

        let id = tree
            .insert_body(&stages, DeclarationId(42), 0, 1)
            .expect("insert");
        assert_eq!(tree.container_of(id), Some(DeclarationId(42)));
    }

    #[test]
    fn detach_clears_parent_and_poisons_body() {
        let stages = StageController::new();
        let mut tree = IrTree::new();
        let id = tree
            .insert_body(&stages, DeclarationId(1), 0, 1)
            .expect("insert");

        tree.detach(id).expect("detach");
        assert_eq!(tree.container_of(id), None);

        let body = tree.body_mut(id).expect("body still resident");
        assert!(matches!(
            body.children(&stages),
            Err(StrataError::DetachedBody(_))
        ));
    }

    #[test]
    fn detach_unknown_body_is_not_found() {
        let mut tree = IrTree::new();
        assert!(matches!(
            tree.detach(BodyId(99)),
            Err(StrataError::BodyNotFound(BodyId(99)))
        ));
    }

    #[test]
    fn bodies_stay_usable_through_tree_handle() {
        let stages = StageController::new();
        let mut tree = IrTree::new();
        let id = tree
            .insert_body(&stages, DeclarationId(1), 0, 8)
            .expect("insert");

        let body = tree.body_mut(id).expect("body");
        body.push_statement(
            &stages,
            Statement::new(StatementId(1), StatementKind::Return),
        )
        .expect("push");

        assert_eq!(body.children(&stages).expect("children").len(), 1);
    }
}
