//! Reading and writing structures.
//!
//! The only format is the native binary session: a version number followed by a
//! flat int stream and a flat float stream. All formats share the [`traits::StructureFile`]
//! interface.

pub mod session;
pub mod traits;
