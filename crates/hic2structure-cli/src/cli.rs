use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "hic2structure - Simulate 3-D chromosome structures from Hi-C contacts with LAMMPS, and derive contact maps from the result.",
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
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: extract contacts, simulate with LAMMPS, write structure and contact map.
    Run(RunArgs),
    /// Print the header of a .hic file (chromosomes and resolutions).
    Inspect(InspectArgs),
    /// Extract contacts and write the LAMMPS input deck without running the simulation.
    Deck(DeckArgs),
    /// Derive the structure and contact map from an existing LAMMPS dump.
    Contacts(ContactsArgs),
}

/// Configuration file and `--set` overrides shared by every configurable subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S simulation.timesteps=500000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Where the contacts come from and how they are filtered.
#[derive(Args, Debug, Clone)]
pub struct ExtractionArgs {
    /// Path to the .hic file.
    #[arg(long = "hic", required = true, value_name = "PATH")]
    pub hic: PathBuf,

    /// Tab-separated contact block for the chromosome (straw / `juicer_tools dump` output).
    #[arg(long = "contacts", required = true, value_name = "PATH")]
    pub contacts: PathBuf,

    /// Chromosome to model.
    #[arg(short, long, value_name = "NAME")]
    pub chromosome: Option<String>,

    /// Bin size in base pairs.
    #[arg(short, long, value_name = "BP")]
    pub resolution: Option<i32>,

    /// Keep only contacts with a value strictly above this.
    #[arg(short = 't', long, value_name = "FLOAT")]
    pub count_threshold: Option<f64>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SimulationArgs {
    /// Maximum FENE bond extension.
    #[arg(long, value_name = "FLOAT")]
    pub bond_coeff: Option<f64>,

    /// Number of LAMMPS timesteps to run.
    #[arg(long, value_name = "INT")]
    pub timesteps: Option<u64>,

    /// Seed for the initial random walk and the Langevin thermostat.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ContactMapArgs {
    /// Atoms closer than this are in contact.
    #[arg(short = 'd', long, value_name = "FLOAT")]
    pub distance_threshold: Option<f64>,

    /// Value written on the diagonal of the contact map.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub diagonal: Option<DiagonalArg>,

    /// Write contact pairs only, without distances.
    #[arg(long)]
    pub binary: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct EngineArgs {
    /// LAMMPS executable name or path.
    #[arg(long, value_name = "EXE")]
    pub lammps: Option<PathBuf>,

    /// Show LAMMPS' own console output.
    #[arg(long)]
    pub show_lammps_output: bool,

    /// Copy the LAMMPS run directory here instead of discarding it.
    #[arg(long, value_name = "DIR")]
    pub keep_run_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DiagonalArg {
    /// Zero on every diagonal cell.
    Zero,
    /// The largest distance in the map.
    MaxObserved,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub extraction: ExtractionArgs,

    /// Output directory for structure.csv, contactmap.tsv and sim.log.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub simulation: SimulationArgs,

    #[command(flatten)]
    pub contact_map: ContactMapArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the .hic file.
    #[arg(required = true, value_name = "PATH")]
    pub hic: PathBuf,
}

/// Arguments for the `deck` subcommand.
#[derive(Args, Debug)]
pub struct DeckArgs {
    #[command(flatten)]
    pub extraction: ExtractionArgs,

    /// Directory to write in.input and the data file into.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub simulation: SimulationArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `contacts` subcommand.
#[derive(Args, Debug)]
pub struct ContactsArgs {
    /// LAMMPS dump with columns `id x y z ix iy iz`.
    #[arg(long, required = true, value_name = "PATH")]
    pub dump: PathBuf,

    /// Output directory for structure.csv and contactmap.tsv.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub contact_map: ContactMapArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_arguments_parse() {
        let cli = Cli::parse_from([
            "hic2structure",
            "-vv",
            "run",
            "--hic",
            "a.hic",
            "--contacts",
            "block.tsv",
            "-c",
            "2L",
            "-r",
            "500000",
            "-o",
            "out",
            "--diagonal",
            "max-observed",
            "-S",
            "simulation.timesteps=10",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.extraction.chromosome.as_deref(), Some("2L"));
                assert_eq!(args.extraction.resolution, Some(500_000));
                assert_eq!(args.contact_map.diagonal, Some(DiagonalArg::MaxObserved));
                assert_eq!(args.config.set_values, vec!["simulation.timesteps=10"]);
                assert!(!args.contact_map.binary);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["hic2structure", "-q", "-v", "inspect", "a.hic"]);
        assert!(result.is_err());
    }

    #[test]
    fn contacts_requires_dump() {
        let result = Cli::try_parse_from(["hic2structure", "contacts", "-o", "out"]);
        assert!(result.is_err());
    }
}
