use super::{Context, atom_label, load_session};
use crate::cli::RingsArgs;
use crate::config::merge_ring_query;
use crate::error::Result;
use crate::utils::progress::Spinner;
use std::fs::File;
use std::io::Write;
use tracing::info;

/// Writes one CSV row per ring: `ring,size,atoms`, atoms space-separated in ring order.
pub fn run(args: &RingsArgs, ctx: &Context, stdout: &mut impl Write) -> Result<()> {
    let (structure, _) = load_session(&args.session, ctx)?;
    let query = merge_ring_query(&ctx.topology.rings, args);

    let spinner = Spinner::new(ctx.show_progress);
    spinner.start("Perceiving rings...");
    let rings = if args.all {
        structure.all_rings(&query)
    } else {
        structure.rings(&query)
    };
    spinner.finish(&format!("Found {} rings", rings.len()));
    info!(rings = rings.len(), all = args.all, "Ring perception finished.");

    let sink: Box<dyn Write + '_> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(stdout),
    };
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(["ring", "size", "atoms"])?;
    for (index, ring) in rings.iter().enumerate() {
        let atoms = ring
            .atoms()
            .iter()
            .map(|&atom| atom_label(&structure, atom))
            .collect::<Vec<_>>()
            .join(" ");
        writer.write_record([(index + 1).to_string(), ring.size().to_string(), atoms])?;
    }
    writer.flush()?;
    Ok(())
}
