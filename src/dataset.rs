//! On-disk simulation results.
//!
//! A data directory holds one CSV file per run, the precision parameter being encoded in the
//! file name:
//! - `results_p{p}.csv` or `results_base_p{p}.csv` - baseline estimator
//! - `results_med{k}_p{p}.csv`, `results_improved*_p{p}.csv`, `results_k{k}_p{p}.csv` -
//!   median-of-k estimator
//!
//! Every file has a header row naming the columns
//! `stream_id,step,fraction,processed,true_f0,estimate` in any order.
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::accuracy::MAX_PRECISION;
use crate::comparison::ComparisonSummary;
use crate::error::{AnalysisError, Result};
use crate::observation::{Observation, ObservationStore, TrajectoryPoint};
use crate::run::RunSummary;
use crate::statistics::StepSummary;

/// Columns every results file must provide
const COLUMNS: [&str; 6] = [
    "stream_id",
    "step",
    "fraction",
    "processed",
    "true_f0",
    "estimate",
];

/// Prefixes of improved-variant files in lookup priority
const IMPROVED_PREFIXES: [&str; 3] = ["results_med", "results_improved", "results_k"];

fn precision_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_p(\d+)\.csv$").expect("valid regex"))
}

fn median_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"med(\d+)").expect("valid regex"))
}

fn k_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"k(\d+)").expect("valid regex"))
}

/// Parse precision parameter from a file name ending with `_p{p}.csv`
pub fn parse_precision(file_name: &str) -> Option<u8> {
    let caps = precision_regex().captures(file_name)?;
    let p: u8 = caps[1].parse().ok()?;
    (p <= MAX_PRECISION).then_some(p)
}

/// Parse number of combined sketches from an improved-variant file name
pub fn parse_median_k(file_name: &str) -> Option<u32> {
    [median_regex(), k_regex()]
        .into_iter()
        .find_map(|re| re.captures(file_name)?[1].parse().ok())
}

/// Shell-like `{prefix}*{suffix}` match
fn matches_pattern(name: &str, prefix: &str, suffix: &str) -> bool {
    name.len() >= prefix.len() + suffix.len() && name.starts_with(prefix) && name.ends_with(suffix)
}

/// Results file of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFile {
    pub p: u8,
    pub path: PathBuf,
}

impl RunFile {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Data directory listing, file names sorted lexicographically
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
    file_names: Vec<String>,
    out_of_range: Vec<String>,
}

impl DataDir {
    /// List data directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(AnalysisError::MissingDataDir(root));
        }
        let mut file_names = Vec::new();
        for entry in fs::read_dir(&root).map_err(|e| AnalysisError::io(&root, e))? {
            let entry = entry.map_err(|e| AnalysisError::io(&root, e))?;
            if let Some(name) = entry.file_name().to_str() {
                file_names.push(name.to_owned());
            }
        }
        file_names.sort();
        debug!(dir = %root.display(), entries = file_names.len(), "listed data directory");

        let out_of_range: Vec<String> = file_names
            .iter()
            .filter(|name| precision_regex().is_match(name) && parse_precision(name).is_none())
            .cloned()
            .collect();
        for name in &out_of_range {
            warn!(file = %name, max = MAX_PRECISION, "precision out of range, file ignored");
        }
        Ok(Self {
            root,
            file_names,
            out_of_range,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all directory entries
    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    /// Names ending with `_p{p}.csv` whose precision is above the supported maximum
    pub fn out_of_range(&self) -> &[String] {
        &self.out_of_range
    }

    fn run_files<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = RunFile> + 'a {
        self.file_names
            .iter()
            .filter(move |name| matches_pattern(name, prefix, ".csv"))
            .filter_map(move |name| {
                Some(RunFile {
                    p: parse_precision(name)?,
                    path: self.root.join(name),
                })
            })
    }

    /// Baseline runs `results_p{p}.csv` in file name order
    pub fn runs(&self) -> Vec<RunFile> {
        self.run_files("results_p").collect()
    }

    /// Distinct precisions having a baseline file, ascending
    pub fn baseline_precisions(&self) -> Vec<u8> {
        let mut ps: Vec<u8> = self
            .run_files("results_p")
            .chain(self.run_files("results_base_p"))
            .map(|run| run.p)
            .collect();
        ps.sort_unstable();
        ps.dedup();
        ps
    }

    fn existing(&self, name: &str) -> Option<PathBuf> {
        self.file_names
            .binary_search_by(|n| n.as_str().cmp(name))
            .ok()
            .map(|_| self.root.join(name))
    }

    /// Baseline file of precision `p`, `results_base_p{p}.csv` preferred over `results_p{p}.csv`
    pub fn baseline(&self, p: u8) -> Option<PathBuf> {
        self.existing(&format!("results_base_p{}.csv", p))
            .or_else(|| self.existing(&format!("results_p{}.csv", p)))
    }

    /// First improved-variant file of precision `p`
    pub fn improved(&self, p: u8) -> Option<PathBuf> {
        let suffix = format!("_p{}.csv", p);
        IMPROVED_PREFIXES.iter().find_map(|prefix| {
            self.file_names
                .iter()
                .find(|name| matches_pattern(name, prefix, &suffix))
                .map(|name| self.root.join(name))
        })
    }
}

fn parse_field<T: std::str::FromStr>(
    path: &Path,
    line: usize,
    fields: &[&str],
    index: usize,
    column: &str,
) -> Result<T> {
    let raw = fields.get(index).copied().unwrap_or_default();
    raw.parse().map_err(|_| AnalysisError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("invalid {} value {:?}", column, raw),
    })
}

/// Parse results CSV from `reader`; `path` is used in error messages only
pub fn parse_observations(path: &Path, reader: impl BufRead) -> Result<ObservationStore> {
    let mut lines = reader.lines().enumerate();
    let header = match lines.next() {
        Some((_, line)) => line.map_err(|e| AnalysisError::io(path, e))?,
        None => return Ok(ObservationStore::new()),
    };
    let header: Vec<&str> = header
        .trim_start_matches('\u{feff}')
        .split(',')
        .map(str::trim)
        .collect();

    let mut indices = [0usize; COLUMNS.len()];
    for (slot, column) in indices.iter_mut().zip(COLUMNS) {
        *slot = header
            .iter()
            .position(|h| *h == column)
            .ok_or_else(|| AnalysisError::Parse {
                path: path.to_path_buf(),
                line: 1,
                message: format!("missing column {:?}", column),
            })?;
    }
    let [stream_id, step, fraction, processed, true_f0, estimate] = indices;

    let mut store = ObservationStore::new();
    for (i, line) in lines {
        let line = line.map_err(|e| AnalysisError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let n = i + 1;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        store.push(Observation {
            stream_id: parse_field(path, n, &fields, stream_id, COLUMNS[0])?,
            step: parse_field(path, n, &fields, step, COLUMNS[1])?,
            fraction: parse_field(path, n, &fields, fraction, COLUMNS[2])?,
            processed: parse_field(path, n, &fields, processed, COLUMNS[3])?,
            true_f0: parse_field(path, n, &fields, true_f0, COLUMNS[4])?,
            estimate: parse_field(path, n, &fields, estimate, COLUMNS[5])?,
        });
    }
    Ok(store)
}

/// Read results CSV file
pub fn read_observations(path: &Path) -> Result<ObservationStore> {
    let file = fs::File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let store = parse_observations(path, BufReader::new(file))?;
    debug!(path = %path.display(), observations = store.len(), "read observations");
    Ok(store)
}

/// Record written as one CSV row
pub trait CsvRecord {
    const HEADER: &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

impl CsvRecord for RunSummary {
    const HEADER: &'static [&'static str] =
        &["p", "m", "theory_rse", "mean_err_last", "std_err_last"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.p.to_string(),
            self.m.to_string(),
            self.theory_rse.to_string(),
            self.mean_err_last.to_string(),
            self.std_err_last.to_string(),
        ]
    }
}

impl CsvRecord for ComparisonSummary {
    const HEADER: &'static [&'static str] = &[
        "p",
        "m",
        "theory_rse_base",
        "base_mean_err_last",
        "base_std_err_last",
        "imp_mean_err_last",
        "imp_std_err_last",
        "std_improvement_factor",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.p.to_string(),
            self.m.to_string(),
            self.theory_rse_base.to_string(),
            self.base_mean_err_last.to_string(),
            self.base_std_err_last.to_string(),
            self.imp_mean_err_last.to_string(),
            self.imp_std_err_last.to_string(),
            self.std_improvement_factor.to_string(),
        ]
    }
}

impl CsvRecord for StepSummary {
    const HEADER: &'static [&'static str] = &[
        "step",
        "fraction",
        "mean_estimate",
        "stdev_estimate",
        "mean_rel_error",
        "stdev_rel_error",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.step.to_string(),
            self.fraction.to_string(),
            self.mean_estimate.to_string(),
            self.stdev_estimate.to_string(),
            self.mean_rel_error.to_string(),
            self.stdev_rel_error.to_string(),
        ]
    }
}

impl CsvRecord for TrajectoryPoint {
    const HEADER: &'static [&'static str] = &["fraction", "true_f0", "estimate"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.fraction.to_string(),
            self.true_f0.to_string(),
            self.estimate.to_string(),
        ]
    }
}

/// Format records as CSV text
pub fn to_csv<R: CsvRecord>(records: &[R]) -> String {
    let mut output = R::HEADER.join(",");
    output.push('\n');
    for record in records {
        output.push_str(&record.fields().join(","));
        output.push('\n');
    }
    output
}

/// Write records into CSV file, replacing existing one
pub fn write_csv<R: CsvRecord>(path: &Path, records: &[R]) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| AnalysisError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(to_csv(records).as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| AnalysisError::io(path, e))?;
    debug!(path = %path.display(), rows = records.len(), "wrote csv");
    Ok(())
}
