//! # Topology Module
//!
//! Conventions that decide how the bond graph is interpreted: which backbone atom
//! names link residues into polymers, and which ring query front ends use by default.
//!
//! ## Key Components
//!
//! - [`config`] - [`TopologyConfig`](config::TopologyConfig), loadable from TOML
//!
//! ## Usage
//!
//! ```no_run
//! use atomgraph::core::models::structure::Structure;
//! use atomgraph::core::topology::config::TopologyConfig;
//! use std::path::Path;
//!
//! let config = TopologyConfig::load(Path::new("topology.toml"))?;
//! let structure = Structure::with_config("1abc", &config);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
