use crate::cli::RingsArgs;
use crate::error::Result;
use atomgraph::core::rings::RingQuery;
use atomgraph::core::topology::config::{RingConfig, TopologyConfig};
use std::path::Path;
use tracing::debug;

/// Loads the topology configuration, or the built-in defaults without a path.
pub fn load_topology(path: Option<&Path>) -> Result<TopologyConfig> {
    match path {
        Some(path) => {
            let config = TopologyConfig::load(path)?;
            debug!(path = %path.display(), "Loaded topology configuration.");
            Ok(config)
        }
        None => Ok(TopologyConfig::default()),
    }
}

/// Builds the ring query from the config defaults, with command-line flags taking
/// precedence.
pub fn merge_ring_query(defaults: &RingConfig, args: &RingsArgs) -> RingQuery {
    let cross_residues = args
        .cross_residues_flag()
        .unwrap_or(defaults.cross_residues);
    let size_threshold = args.size_threshold.unwrap_or(defaults.size_threshold);
    RingQuery::minimum()
        .cross_residues(cross_residues)
        .size_threshold(size_threshold)
}
