//! # Stage Controller
//!
//! The compilation pipeline advances through a sequence of stages (lowering
//! passes). The [`StageController`] owns the process-wide stage counter and
//! is threaded explicitly into every staged-node operation — there is no
//! ambient global stage, so tests can inject a controller at any value.
//!
//! ## Contract
//!
//! - [`StageController::current`] is a side-effect-free atomic read.
//! - [`StageController::advance`] is single-writer: it must be called from
//!   one coordinating thread. Concurrent readers observe either the old or
//!   the new stage, never a torn value.
//! - There is no rollback. Stages only move forward within a run.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// STAGE
// =============================================================================

/// An opaque, monotonically increasing point in the compilation pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Stage(pub u64);

impl Stage {
    /// Create a stage from a raw counter value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

// =============================================================================
// STAGE CONTROLLER
// =============================================================================

/// Process-wide monotonic stage counter.
///
/// Gates whether staged fields may be read directly or must go through the
/// carrier-materialization path. A pure counter: it cannot fail.
#[derive(Debug, Default)]
pub struct StageController {
    counter: AtomicU64,
}

impl StageController {
    /// Create a controller starting at stage 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Create a controller already advanced to the given stage.
    ///
    /// Intended for tests and for replaying a pipeline from a known point.
    #[must_use]
    pub const fn starting_at(stage: Stage) -> Self {
        Self {
            counter: AtomicU64::new(stage.0),
        }
    }

    /// Read the current stage. Monotonic, side-effect-free.
    #[must_use]
    pub fn current(&self) -> Stage {
        Stage(self.counter.load(Ordering::Acquire))
    }

    /// Advance to the next stage and return it.
    ///
    /// Single-writer: concurrent advances are a contract violation. The
    /// increment itself is atomic, so readers never observe a torn value.
    /// The counter saturates at `u64::MAX` rather than wrapping, so a
    /// stage value never resets within a run.
    pub fn advance(&self) -> Stage {
        let updated = self
            .counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                Some(v.saturating_add(1))
            });
        match updated {
            Ok(previous) => Stage(previous.saturating_add(1)),
            Err(current) => Stage(current),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
