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
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "confsel - Cluster molecular conformers by geometry and hydrogen bonds, and select the lowest-energy conformer of every cluster.",
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

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cluster the conformers listed in an energy table and select one per cluster.
    Select(SelectArgs),
    /// Cluster every geometry file of a directory and print the cluster labels.
    Cluster(ClusterArgs),
}

/// Options shared by every command that runs the clustering sweep.
#[derive(Args, Debug, Default)]
pub struct ClusteringArgs {
    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seed for K-means initialization, for reproducible runs.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Smallest number of clusters to try.
    #[arg(long, value_name = "INT")]
    pub min_k: Option<usize>,

    /// Exclusive upper bound on the number of clusters.
    /// Defaults to a fifth of the number of conformers.
    #[arg(long, value_name = "INT")]
    pub max_k: Option<usize>,

    /// Step between consecutive cluster counts.
    #[arg(long, value_name = "INT")]
    pub k_step: Option<usize>,

    /// Number of K-means initializations per cluster count.
    #[arg(long, value_name = "INT")]
    pub restarts: Option<usize>,

    /// Save the inertia curve with the chosen cluster count as an SVG plot.
    #[arg(long)]
    pub plot: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S clustering.restarts=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `select` subcommand.
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// CSV file whose first column names the conformer files and which has an
    /// `energy/(kcal/mol)` column.
    #[arg(required = true, value_name = "ENERGY_FILE")]
    pub energy_file: PathBuf,

    /// Directory receiving the report, the plot and the `selected/` directory.
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub clustering: ClusteringArgs,
}

/// Arguments for the `cluster` subcommand.
#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// Directory holding the geometry files.
    #[arg(required = true, value_name = "DIR")]
    pub directory: PathBuf,

    /// Extension of the geometry files to pick up.
    #[arg(short, long, value_name = "EXT", default_value = "gjf")]
    pub extension: String,

    #[command(flatten)]
    pub clustering: ClusteringArgs,
}
