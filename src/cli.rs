use std::path::PathBuf;

use clap::Parser;

/// Command-line options for the fex binary.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct FexCLI {
    /// The path to the config file
    #[arg(short, long, default_value = "fex.toml")]
    pub config_path: PathBuf,

    /// The directory to start in (defaults to the process working directory)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Maximum level of tracing output
    #[arg(short, long, default_value_t = tracing::Level::WARN)]
    pub log_level: tracing::Level,
}
