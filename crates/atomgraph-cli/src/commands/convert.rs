use super::{Context, load_session};
use crate::cli::ConvertArgs;
use crate::error::{CliError, Result};
use atomgraph::core::io::session::{SessionFile, SessionMetadata, SessionVersion};
use atomgraph::core::io::traits::StructureFile;
use std::io::Write;
use tracing::info;

pub fn run(args: &ConvertArgs, ctx: &Context, out: &mut impl Write) -> Result<()> {
    let version = match args.schema_version {
        Some(n) => SessionVersion::try_from(n).map_err(|e| CliError::Argument(e.to_string()))?,
        None => SessionVersion::CURRENT,
    };
    let (structure, metadata) = load_session(&args.session, ctx)?;

    SessionFile::write_to_path(&structure, &SessionMetadata { version }, &args.output)?;
    info!(from = %metadata.version, to = %version, "Converted session.");
    writeln!(
        out,
        "Wrote {} (version {} -> {})",
        args.output.display(),
        metadata.version,
        version
    )?;
    Ok(())
}
