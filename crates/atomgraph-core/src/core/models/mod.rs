//! # Core Models Module
//!
//! The entity store: a [`Structure`](structure::Structure) owns every atom, bond,
//! residue, chain, coordinate set and pseudobond of one molecule, and hands out
//! generational ids instead of references.
//!
//! ## Key Components
//!
//! - [`structure`] - The owning structure, its mutations and invariants
//! - [`atom`] - Atoms, elements, hide bits and draw modes
//! - [`topology`] - Covalent bonds and bond orders
//! - [`residue`] - Residues, residue keys, polymer and secondary-structure types
//! - [`chain`] - Chains indexing residues by chain id
//! - [`pseudobond`] - Pseudobond groups and their members
//! - [`coordset`] - Per-atom coordinates, one set per model
//! - [`ids`] - Handle types for every entity kind
//!
//! Attribute setters live with the structure because each write has to be recorded
//! and may invalidate derived state.
//!
//! ## Usage
//!
//! ```
//! use atomgraph::core::models::atom::Element;
//! use atomgraph::core::models::structure::Structure;
//!
//! let mut structure = Structure::new("water");
//! let residue = structure.add_residue("HOH", "W", 1, ' ')?;
//! let o = structure.add_atom(residue, "O", Element::O)?;
//! let h1 = structure.add_atom(residue, "H1", Element::H)?;
//! structure.add_bond(o, h1)?;
//! assert_eq!(structure.neighbors(o)?, vec![h1]);
//! # Ok::<(), atomgraph::core::models::error::StructureError>(())
//! ```

pub mod atom;
mod attributes;
pub mod chain;
pub mod color;
pub mod coordset;
pub mod error;
pub mod ids;
pub mod pseudobond;
pub mod residue;
pub mod structure;
pub mod topology;

#[cfg(test)]
pub(crate) mod fixtures;
