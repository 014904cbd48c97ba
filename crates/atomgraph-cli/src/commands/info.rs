use super::{Context, load_session};
use crate::cli::InfoArgs;
use crate::error::Result;
use std::io::Write;
use tracing::info;

pub fn run(args: &InfoArgs, ctx: &Context, out: &mut impl Write) -> Result<()> {
    let (mut structure, metadata) = load_session(&args.session, ctx)?;
    let polymers = structure.polymers();
    info!(polymers = polymers.len(), "Summarized session.");

    writeln!(out, "Session:      {}", args.session.display())?;
    writeln!(out, "Name:         {}", structure.name())?;
    writeln!(out, "Version:      {}", metadata.version)?;
    writeln!(out, "Atoms:        {}", structure.atom_count())?;
    writeln!(out, "Bonds:        {}", structure.bond_count())?;
    writeln!(out, "Residues:     {}", structure.residue_count())?;
    writeln!(out, "Chains:       {}", structure.chain_count())?;
    writeln!(out, "Pseudobonds:  {}", structure.pseudobond_count())?;
    writeln!(out, "Polymers:     {}", polymers.len())?;
    Ok(())
}
