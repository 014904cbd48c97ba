pub mod convert;
pub mod info;
pub mod polymers;
pub mod rings;

use crate::error::{CliError, Result};
use crate::utils::progress::Spinner;
use atomgraph::core::io::session::{SessionFile, SessionMetadata};
use atomgraph::core::models::ids::AtomId;
use atomgraph::core::models::structure::Structure;
use atomgraph::core::topology::config::TopologyConfig;
use std::path::Path;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub topology: TopologyConfig,
    pub show_progress: bool,
}

/// Loads a session behind a spinner, attaching the path to any failure.
pub fn load_session(path: &Path, ctx: &Context) -> Result<(Structure, SessionMetadata)> {
    let spinner = Spinner::new(ctx.show_progress);
    spinner.start(&format!("Loading {}...", path.display()));
    let loaded = SessionFile::read_from_path_with_config(path, &ctx.topology).map_err(|source| {
        CliError::SessionLoad {
            path: path.to_path_buf(),
            source,
        }
    })?;
    spinner.finish(&format!("Loaded {} atoms", loaded.0.atom_count()));
    Ok(loaded)
}

/// `<residue key>@<atom name>`, e.g. `12.A@CA`.
pub fn atom_label(structure: &Structure, atom_id: AtomId) -> String {
    let Some(atom) = structure.atom(atom_id) else {
        return "?".to_string();
    };
    match structure.residue(atom.residue()) {
        Some(residue) => format!("{}@{}", residue.key(), atom.name()),
        None => atom.name().to_string(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use atomgraph::core::io::session::SessionFile;
    use atomgraph::core::io::traits::StructureFile;
    use atomgraph::core::models::atom::Element;
    use atomgraph::core::models::structure::Structure;
    use tempfile::NamedTempFile;

    /// A two-residue peptide plus a benzene ligand in chain B.
    pub(crate) fn sample_structure() -> Structure {
        let mut s = Structure::new("sample");
        let mut residues = Vec::new();
        for number in 1..=2 {
            let r = s.add_residue("ALA", "A", number, ' ').unwrap();
            let n = s.add_atom(r, "N", Element::N).unwrap();
            let ca = s.add_atom(r, "CA", Element::C).unwrap();
            let c = s.add_atom(r, "C", Element::C).unwrap();
            s.add_bond(n, ca).unwrap();
            s.add_bond(ca, c).unwrap();
            residues.push((n, c));
        }
        s.add_bond(residues[0].1, residues[1].0).unwrap();

        let ligand = s.add_residue("BNZ", "B", 101, ' ').unwrap();
        let ring: Vec<_> = (1..=6)
            .map(|i| s.add_atom(ligand, &format!("C{i}"), Element::C).unwrap())
            .collect();
        for i in 0..6 {
            s.add_bond(ring[i], ring[(i + 1) % 6]).unwrap();
        }
        s
    }

    pub(crate) fn sample_session() -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        SessionFile::write_structure_to_path(&sample_structure(), file.path()).unwrap();
        file
    }
}
