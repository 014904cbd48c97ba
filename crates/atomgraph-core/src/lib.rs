//! # Atomgraph Core Library
//!
//! An in-memory molecular topology graph: atoms, bonds, residues, chains and
//! pseudobonds of a structure, with ring perception, polymer and secondary-structure
//! derivation, fine-grained change tracking and a versioned binary session format.
//!
//! ## Architectural Philosophy
//!
//! - **One owner.** A [`Structure`](core::models::structure::Structure) owns every
//!   entity and is the only way to create, change or destroy one, so the bond graph
//!   and residue membership can never disagree.
//! - **Ids, not pointers.** Entities refer to each other through generational ids;
//!   a stale id fails a lookup instead of dangling.
//! - **Lazy derivation.** Rings, polymers and secondary structure are recomputed on
//!   demand after an edit invalidates them.
//! - **Observable edits.** Every mutation lands in a
//!   [`ChangeTracker`](core::changes::ChangeTracker) that consumers drain at their
//!   own sync points.
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod core;
