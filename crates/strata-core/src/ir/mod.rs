//! # IR Module
//!
//! The staged in-memory IR tree: block bodies whose child lists swap between
//! a live representation and stage-tagged carrier snapshots, plus the tree
//! that owns them and answers parent lookups.

mod body;
mod carrier;
mod tree;

pub use body::{BlockBody, BodyState};
pub use carrier::{Carrier, CarrierStore};
pub use tree::IrTree;
