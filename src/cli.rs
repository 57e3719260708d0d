//! CLI argument parsing
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::comparison::Alignment;
use crate::pipeline::{AnalyzeConfig, CompareConfig, DEFAULT_MEDIAN_K};

#[derive(Parser, Debug)]
#[command(name = "estimator-accuracy")]
#[command(version)]
#[command(about = "Accuracy statistics of distinct-count estimator simulations", long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Per-step error statistics of every results_p{p}.csv run
    Analyze(AnalyzeArgs),
    /// Baseline vs median-of-k comparison for every precision
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Directory holding the results CSV files
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for per-run series (default: <DATA_DIR>/plots)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// How baseline and improved series are paired
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlignmentArg {
    /// Pair by position, truncating to the shorter series
    Positional,
    /// Pair points with equal step values
    ByStep,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Directory holding the results CSV files
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for per-variant series (default: <DATA_DIR>/plots_compare)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Series alignment
    #[arg(long, value_enum, default_value = "positional")]
    pub alignment: AlignmentArg,

    /// Number of combined sketches reported when file names do not encode it
    #[arg(long, value_name = "K", default_value_t = DEFAULT_MEDIAN_K)]
    pub default_k: u32,
}

impl From<AlignmentArg> for Alignment {
    fn from(value: AlignmentArg) -> Self {
        match value {
            AlignmentArg::Positional => Alignment::Positional,
            AlignmentArg::ByStep => Alignment::ByStep,
        }
    }
}

impl From<AnalyzeArgs> for AnalyzeConfig {
    fn from(args: AnalyzeArgs) -> Self {
        Self {
            data_dir: args.data_dir,
            out_dir: args.out_dir,
        }
    }
}

impl From<CompareArgs> for CompareConfig {
    fn from(args: CompareArgs) -> Self {
        Self {
            data_dir: args.data_dir,
            out_dir: args.out_dir,
            alignment: args.alignment.into(),
            default_k: args.default_k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["estimator-accuracy", "analyze"]).unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        let config = AnalyzeConfig::from(args);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.out_dir(), PathBuf::from("data").join("plots"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_compare_args() {
        let cli = Cli::try_parse_from([
            "estimator-accuracy",
            "compare",
            "--data-dir",
            "runs",
            "--alignment",
            "by-step",
            "--default-k",
            "7",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        let config = CompareConfig::from(args);
        assert_eq!(config.alignment, Alignment::ByStep);
        assert_eq!(config.default_k, 7);
        assert_eq!(config.out_dir(), PathBuf::from("runs").join("plots_compare"));
    }

    #[test]
    fn test_rejects_unknown_alignment() {
        let result = Cli::try_parse_from(["estimator-accuracy", "compare", "--alignment", "fuzzy"]);
        assert!(result.is_err());
    }
}
