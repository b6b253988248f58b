use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "gomod-license",
    about = "Resolve the license of every go.mod dependency from the local module cache",
    version
)]
pub struct Cli {
    /// Directory containing the manifest
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Manifest file name inside the directory
    #[arg(long, default_value = "go.mod", value_name = "FILE")]
    pub modfile: PathBuf,

    /// Previous output used to fill in dependencies resolved as "unknown"
    #[arg(long, value_name = "FILE")]
    pub known: Option<PathBuf>,

    /// Config file [default: ./.gomod-license/config.toml, fallback ~/.config/gomod-license/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Module cache root [default: $GOMODCACHE, then $GOPATH/pkg/mod]
    #[arg(long, value_name = "DIR")]
    pub cache_root: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Dependencies resolved in parallel [default: from config, else 8]
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Log each dependency as it is resolved
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress progress and warnings
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Json,
    Terminal,
}
