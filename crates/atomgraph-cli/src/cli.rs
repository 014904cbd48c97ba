use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Atomgraph Developers",
    version,
    about = "Atomgraph CLI - Inspect and convert molecular topology session files.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Topology configuration file in TOML format (linkage names, ring defaults)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set the number of threads for parallel ring perception.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print entity counts, polymer count and schema version of a session.
    Info(InfoArgs),
    /// List the rings of a session's bond graph as CSV.
    Rings(RingsArgs),
    /// Print the polymer sequences of a session.
    Polymers(PolymersArgs),
    /// Rewrite a session at a chosen schema version.
    #[command(disable_version_flag = true)]
    Convert(ConvertArgs),
}

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the session file.
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,
}

/// Arguments for the `rings` subcommand.
#[derive(Args, Debug)]
pub struct RingsArgs {
    /// Path to the session file.
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// Allow rings that span more than one residue, overriding the config file.
    #[arg(long, overrides_with = "no_cross_residues")]
    pub cross_residues: bool,

    /// Keep rings within single residues, overriding the config file.
    #[arg(long, overrides_with = "cross_residues")]
    pub no_cross_residues: bool,

    /// Largest ring size to report (0 for no limit), overriding the config file.
    #[arg(long, value_name = "INT")]
    pub size_threshold: Option<usize>,

    /// Enumerate every ring instead of the minimum cycle basis.
    #[arg(long)]
    pub all: bool,

    /// Write the CSV to a file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl RingsArgs {
    /// The cross-residue setting given on the command line, if any. The last of
    /// `--cross-residues` and `--no-cross-residues` wins.
    pub fn cross_residues_flag(&self) -> Option<bool> {
        match (self.cross_residues, self.no_cross_residues) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }
}

/// Arguments for the `polymers` subcommand.
#[derive(Args, Debug)]
pub struct PolymersArgs {
    /// Path to the session file.
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Path to the input session file.
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// Path for the rewritten session file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Schema version to write. Defaults to the newest.
    #[arg(long = "version", value_name = "N")]
    pub schema_version: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["atomgraph", "info", "a.session", "-vv", "-c", "topo.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("topo.toml")));
        assert!(matches!(cli.command, Commands::Info(_)));
    }

    #[test]
    fn rings_overrides_parse() {
        let cli = Cli::parse_from([
            "atomgraph",
            "rings",
            "a.session",
            "--cross-residues",
            "--size-threshold",
            "8",
            "--all",
        ]);
        let Commands::Rings(args) = cli.command else {
            panic!("expected rings");
        };
        assert!(args.cross_residues);
        assert_eq!(args.size_threshold, Some(8));
        assert!(args.all);
        assert!(args.output.is_none());
    }

    #[test]
    fn last_cross_residue_flag_wins() {
        let parse = |flags: &[&str]| {
            let mut argv = vec!["atomgraph", "rings", "a.session"];
            argv.extend_from_slice(flags);
            let Commands::Rings(args) = Cli::parse_from(argv).command else {
                panic!("expected rings");
            };
            args.cross_residues_flag()
        };
        assert_eq!(parse(&[]), None);
        assert_eq!(parse(&["--no-cross-residues"]), Some(false));
        assert_eq!(parse(&["--no-cross-residues", "--cross-residues"]), Some(true));
        assert_eq!(parse(&["--cross-residues", "--no-cross-residues"]), Some(false));
    }

    #[test]
    fn convert_requires_output() {
        assert!(Cli::try_parse_from(["atomgraph", "convert", "a.session"]).is_err());
        let cli =
            Cli::try_parse_from(["atomgraph", "convert", "a.session", "-o", "b.session", "--version", "1"])
                .unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.schema_version, Some(1));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["atomgraph", "-q", "-v", "info", "a.session"]).is_err());
    }
}
