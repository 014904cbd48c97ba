use super::{Context, load_session};
use crate::cli::PolymersArgs;
use crate::error::Result;
use std::io::Write;

pub fn run(args: &PolymersArgs, ctx: &Context, out: &mut impl Write) -> Result<()> {
    let (mut structure, _) = load_session(&args.session, ctx)?;
    let polymers = structure.polymers();
    if polymers.is_empty() {
        writeln!(out, "No polymers found.")?;
        return Ok(());
    }

    for (index, polymer) in polymers.iter().enumerate() {
        writeln!(
            out,
            "Polymer {} ({}, {} residues)",
            index + 1,
            polymer.polymer_type(),
            polymer.len()
        )?;
        let sequence = polymer
            .residues()
            .iter()
            .filter_map(|&id| structure.residue(id))
            .map(|residue| format!("{} {}", residue.name(), residue.key()))
            .collect::<Vec<_>>();
        writeln!(out, "  {}", sequence.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::sample_session;
    use atomgraph::core::io::session::SessionFile;
    use atomgraph::core::io::traits::StructureFile;
    use atomgraph::core::models::atom::Element;
    use atomgraph::core::models::structure::Structure;
    use tempfile::NamedTempFile;

    #[test]
    fn prints_each_sequence_with_its_type() {
        let session = sample_session();
        let args = PolymersArgs {
            session: session.path().to_path_buf(),
        };
        let mut out = Vec::new();
        run(&args, &Context::default(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Polymer 1 (amino, 2 residues)"));
        assert!(text.contains("ALA 1.A, ALA 2.A"));
        assert!(!text.contains("BNZ"));
    }

    #[test]
    fn reports_when_nothing_is_linked() {
        let mut structure = Structure::new("ions");
        let r = structure.add_residue("NA", "I", 1, ' ').unwrap();
        structure.add_atom(r, "NA", Element::from_number(11).unwrap()).unwrap();
        let file = NamedTempFile::new().unwrap();
        SessionFile::write_structure_to_path(&structure, file.path()).unwrap();

        let args = PolymersArgs {
            session: file.path().to_path_buf(),
        };
        let mut out = Vec::new();
        run(&args, &Context::default(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No polymers found.\n");
    }
}
