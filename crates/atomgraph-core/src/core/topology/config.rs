use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Backbone atom names whose bond links one residue to the next.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct PolymerConfig {
    /// Upstream and downstream atom names of an amino-acid peptide bond.
    pub amino_linkage: [String; 2],
    /// Upstream and downstream atom names of a nucleotide phosphodiester bond.
    pub nucleic_linkage: [String; 2],
}

impl Default for PolymerConfig {
    fn default() -> Self {
        Self {
            amino_linkage: ["C".to_string(), "N".to_string()],
            nucleic_linkage: ["O3'".to_string(), "P".to_string()],
        }
    }
}

/// Default ring query parameters for front ends.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct RingConfig {
    pub cross_residues: bool,
    pub size_threshold: usize,
}

/// Tunable topology conventions, loadable from TOML.
///
/// ```toml
/// [polymer]
/// amino-linkage = ["C", "N"]
/// nucleic-linkage = ["O3'", "P"]
///
/// [rings]
/// cross-residues = false
/// size-threshold = 0
/// ```
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct TopologyConfig {
    pub polymer: PolymerConfig,
    pub rings: RingConfig,
}

impl TopologyConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}
