use anyhow::Result;
use clap::Parser;
use estimator_accuracy::cli::{Cli, Command};
use estimator_accuracy::pipeline::{analyze, compare_all, AnalyzeConfig, CompareConfig};
use estimator_accuracy::report::{render_comparisons, render_runs};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber, `RUST_LOG` takes precedence over `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Analyze(args) => {
            let report = analyze(&AnalyzeConfig::from(args))?;
            if !report.runs.is_empty() {
                println!("{}", render_runs(&report.summaries()));
            }
            if !report.failures.is_empty() {
                anyhow::bail!("{} run(s) failed", report.failures.len());
            }
        }
        Command::Compare(args) => {
            let report = compare_all(&CompareConfig::from(args))?;
            if !report.comparisons.is_empty() {
                println!("{}", render_comparisons(&report.comparisons));
                println!();
                println!("Improved estimator: median of k={} estimates", report.median_k);
            }
            if !report.failures.is_empty() {
                anyhow::bail!("{} comparison(s) failed", report.failures.len());
            }
        }
    }
    Ok(())
}
