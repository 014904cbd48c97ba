//! # Ring Perception
//!
//! Cycles in the covalent bond graph, computed on demand and cached per structure.
//!
//! ## Algorithm
//!
//! Bridges are removed first (they lie on no cycle), splitting the graph into
//! 2-edge-connected components that are processed independently (in parallel with
//! the `parallel` feature). For each component:
//!
//! - the **minimum cycle basis** is built Horton-style: candidate cycles come from
//!   every vertex's shortest-path tree and are accepted smallest-first while they
//!   stay linearly independent over GF(2);
//! - **all rings** are enumerated as simple cycles up to the size threshold.
//!
//! Results are cached on the structure keyed by [`RingQuery`] and dropped wholesale
//! on any topology edit.

mod cache;
mod finder;
mod perception;
mod query;
mod ring;

pub(crate) use cache::RingCache;
pub(crate) use finder::{RingGraph, find_rings};
pub use query::{RingMode, RingQuery};
pub use ring::{Ring, RingSet};
