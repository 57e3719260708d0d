//! Batch drivers over a data directory.
//!
//! Each precision parameter is processed on its own: a failing run is recorded and the
//! driver moves on to the next `p`.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::comparison::{compare, Alignment, Comparison};
use crate::dataset::{parse_median_k, read_observations, write_csv, DataDir};
use crate::error::{AnalysisError, Result};
use crate::run::{analyze_run, step_series, RunAnalysis, RunSummary, REFERENCE_STREAM};
use crate::statistics::StepSummary;

/// Number of combined sketches assumed when improved file names do not tell
pub const DEFAULT_MEDIAN_K: u32 = 5;

/// Options of single-run analysis
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    pub data_dir: PathBuf,
    /// Destination of per-run series, `<data_dir>/plots` when not set
    pub out_dir: Option<PathBuf>,
}

impl AnalyzeConfig {
    pub fn out_dir(&self) -> PathBuf {
        self.out_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("plots"))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.data_dir.join("summary.csv")
    }
}

/// Options of baseline vs improved comparison
#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub data_dir: PathBuf,
    /// Destination of per-variant series, `<data_dir>/plots_compare` when not set
    pub out_dir: Option<PathBuf>,
    pub alignment: Alignment,
    pub default_k: u32,
}

impl CompareConfig {
    pub fn out_dir(&self) -> PathBuf {
        self.out_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("plots_compare"))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.data_dir.join("summary_compare.csv")
    }
}

/// Run that could not be processed
#[derive(Debug)]
pub struct Failure {
    pub p: u8,
    pub error: AnalysisError,
}

#[derive(Debug, Default)]
pub struct AnalyzeReport {
    /// Analyses ordered by ascending `p`
    pub runs: Vec<RunAnalysis>,
    pub failures: Vec<Failure>,
    /// Written summary file, `None` when no run was found
    pub summary_path: Option<PathBuf>,
}

impl AnalyzeReport {
    pub fn summaries(&self) -> Vec<RunSummary> {
        self.runs.iter().map(|r| r.summary).collect()
    }
}

#[derive(Debug)]
pub struct CompareReport {
    /// One entry per baseline precision, ascending
    pub comparisons: Vec<Comparison>,
    pub failures: Vec<Failure>,
    /// Number of sketches combined by the improved estimator
    pub median_k: u32,
    /// Written summary file, `None` when nothing could be compared
    pub summary_path: Option<PathBuf>,
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| AnalysisError::io(path, e))
}

/// Remove a summary left by an earlier invocation that this one does not replace
fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            warn!(summary = %path.display(), "removed stale summary");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AnalysisError::io(path, e)),
    }
}

fn log_listing(dir: &DataDir) {
    warn!(dir = %dir.root().display(), "no matching results files");
    for name in dir.file_names() {
        info!(" - {}", name);
    }
}

fn analyze_file(p: u8, path: &Path, out_dir: &Path) -> Result<RunAnalysis> {
    let store = read_observations(path)?;
    let analysis = analyze_run(p, &store)?;
    write_csv(&out_dir.join(format!("series_p{}.csv", p)), &analysis.series)?;
    write_csv(
        &out_dir.join(format!("stream{}_p{}.csv", REFERENCE_STREAM, p)),
        &analysis.reference_trajectory,
    )?;
    Ok(analysis)
}

/// Analyze every `results_p{p}.csv` of the data directory
pub fn analyze(config: &AnalyzeConfig) -> Result<AnalyzeReport> {
    let dir = DataDir::open(&config.data_dir)?;
    let runs = dir.runs();
    if runs.is_empty() {
        log_listing(&dir);
        return Ok(AnalyzeReport::default());
    }

    let out_dir = config.out_dir();
    create_dir(&out_dir)?;

    let mut report = AnalyzeReport::default();
    for run in runs {
        match analyze_file(run.p, &run.path, &out_dir) {
            Ok(analysis) => {
                info!(p = run.p, file = run.file_name(), "done");
                report.runs.push(analysis);
            }
            Err(error) => {
                error!(p = run.p, file = run.file_name(), %error, "run skipped");
                report.failures.push(Failure { p: run.p, error });
            }
        }
    }
    report.runs.sort_by_key(|r| r.summary.p);

    let summary_path = config.summary_path();
    write_csv(&summary_path, &report.summaries())?;
    info!(series = %out_dir.display(), summary = %summary_path.display(), "analysis written");
    report.summary_path = Some(summary_path);
    Ok(report)
}

fn variant_series(path: &Path, out_dir: &Path, name: String) -> Result<Vec<StepSummary>> {
    let store = read_observations(path)?;
    let series = step_series(&store)?;
    write_csv(&out_dir.join(format!("{}_series.csv", name)), &series)?;
    write_csv(
        &out_dir.join(format!("{}_stream{}.csv", name, REFERENCE_STREAM)),
        &store.trajectory(REFERENCE_STREAM),
    )?;
    Ok(series)
}

fn compare_precision(
    dir: &DataDir,
    p: u8,
    config: &CompareConfig,
    out_dir: &Path,
) -> Result<(Comparison, Option<String>)> {
    let baseline = match dir.baseline(p) {
        Some(path) => Some(variant_series(&path, out_dir, format!("base_p{}", p))?),
        None => None,
    };
    let improved_path = dir.improved(p);
    let improved = match &improved_path {
        Some(path) => Some(variant_series(path, out_dir, format!("imp_p{}", p))?),
        None => None,
    };
    let comparison = compare(p, baseline.as_deref(), improved.as_deref(), config.alignment)?;
    let improved_name = improved_path
        .as_deref()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .map(str::to_owned);
    Ok((comparison, improved_name))
}

/// Compare baseline and improved results for every baseline precision of the data directory
pub fn compare_all(config: &CompareConfig) -> Result<CompareReport> {
    let dir = DataDir::open(&config.data_dir)?;
    let mut report = CompareReport {
        comparisons: Vec::new(),
        failures: Vec::new(),
        median_k: config.default_k,
        summary_path: None,
    };

    let precisions = dir.baseline_precisions();
    if precisions.is_empty() {
        log_listing(&dir);
        remove_stale(&config.summary_path())?;
        return Ok(report);
    }

    let out_dir = config.out_dir();
    create_dir(&out_dir)?;

    let mut median_k = None;
    for p in precisions {
        match compare_precision(&dir, p, config, &out_dir) {
            Ok((comparison, improved_name)) => {
                if let (None, Some(name)) = (median_k, &improved_name) {
                    median_k = parse_median_k(name);
                }
                if let Comparison::Computed(summary) = &comparison {
                    info!(
                        p,
                        improved = improved_name.as_deref().unwrap_or_default(),
                        factor = summary.std_improvement_factor,
                        "done"
                    );
                }
                report.comparisons.push(comparison);
            }
            Err(error) => {
                error!(p, %error, "comparison skipped");
                report.failures.push(Failure { p, error });
            }
        }
    }
    report.median_k = median_k.unwrap_or(config.default_k);

    let computed: Vec<_> = report
        .comparisons
        .iter()
        .filter_map(Comparison::computed)
        .copied()
        .collect();
    if computed.is_empty() {
        warn!(dir = %dir.root().display(), "no improved results to compare against");
        remove_stale(&config.summary_path())?;
        return Ok(report);
    }

    let summary_path = config.summary_path();
    write_csv(&summary_path, &computed)?;
    info!(
        series = %out_dir.display(),
        summary = %summary_path.display(),
        median_k = report.median_k,
        "comparison written"
    );
    report.summary_path = Some(summary_path);
    Ok(report)
}
