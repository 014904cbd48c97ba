//! # Core Module
//!
//! The molecular topology graph and everything derived from it.
//!
//! ## Architecture
//!
//! - **Entity store** ([`models`]) - Structures, atoms, bonds, residues, chains and pseudobonds
//! - **Ring perception** ([`rings`]) - Minimum cycle basis and full ring enumeration, cached per query
//! - **Polymers** ([`polymer`]) - Backbone linkage, polymer sequences and secondary structure
//! - **Change tracking** ([`changes`]) - Per-kind ledgers of created, modified and deleted entities
//! - **Redraw hints** ([`graphics`]) - Bit set of pending rendering work
//! - **Sessions** ([`io`]) - Versioned binary save and restore
//! - **Conventions** ([`topology`]) - Linkage atom names and default ring queries, from TOML
//! - **Helpers** ([`utils`]) - Backbone atom-name tables and torsion geometry
//!
//! Derived state is never stored eagerly: rings, polymers and secondary structure are
//! computed on first access after the edit that invalidated them.

pub mod changes;
pub mod graphics;
pub mod io;
pub mod models;
pub mod polymer;
pub mod rings;
pub mod topology;
pub mod utils;
