//! Shared helpers: backbone atom-name tables and coordinate geometry.

pub mod geometry;
pub mod identifiers;
