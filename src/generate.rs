use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use chrono::TimeDelta;
use encoding_rs::Encoding;
use log::{debug, error, info, warn};
use rayon::prelude::*;

use crate::{
    cli::GenerateArgs,
    config::{DEFAULT_OUTPUT_NAME, InferenceConfig},
    emit,
    error::InferError,
    infer::{ColumnInferencer, InferredTable},
    io_utils::{self, ScriptWriter},
};

/// Lines between progress reports.
const PROGRESS_INTERVAL: usize = 100_000;

/// Outcome of scanning one input file.
#[derive(Debug)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub table: InferredTable,
    /// Set when scanning stopped early on a malformed row.
    pub truncated: Option<InferError>,
}

pub fn execute(args: &GenerateArgs) -> Result<()> {
    let config = InferenceConfig::from_args(&args.inference);
    let input_encoding = io_utils::resolve_encoding(args.inference.input_encoding.as_deref())?;
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    let output_path = resolve_output_path(args.output.as_deref(), &args.files);
    let mut writer = ScriptWriter::create(&output_path, output_encoding)?;

    let started = Instant::now();
    let scripts = run_ordered(&args.files, args.jobs, |path| {
        scan_file(path, &config, input_encoding)
            .map(|scanned| emit::render_script(&scanned.file_name, &scanned.table, &config))
    })?;

    let mut completed = 0usize;
    for (path, script) in args.files.iter().zip(scripts) {
        match script {
            Ok(text) => {
                writer
                    .write_text(&text)
                    .with_context(|| format!("Writing script to {output_path:?}"))?;
                completed += 1;
            }
            Err(err) => error!("Skipping {path:?}: {err:#}"),
        }
    }
    writer.finish()?;

    info!(
        "Completed {completed} of {} file(s) into {output_path:?} in {}",
        args.files.len(),
        format_elapsed(started.elapsed())
    );
    Ok(())
}

/// Runs `work` over every input and returns the results in input order.
/// With more than one job the files are spread over a dedicated pool; each
/// file is still scanned by a single thread.
pub fn run_ordered<T, F>(inputs: &[PathBuf], jobs: usize, work: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&Path) -> T + Sync,
{
    if jobs <= 1 || inputs.len() <= 1 {
        return Ok(inputs.iter().map(|path| work(path)).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.min(inputs.len()))
        .build()
        .context("Building worker pool")?;
    Ok(pool.install(|| inputs.par_iter().map(|path| work(path)).collect()))
}

/// Scans one file to completion or to its first malformed row.
pub fn scan_file(
    path: &Path,
    config: &InferenceConfig,
    encoding: &'static Encoding,
) -> Result<ScannedFile> {
    let started = Instant::now();
    debug!("Scanning {path:?}");
    let mut reader = io_utils::open_csv_reader_from_path(path, &config.dialect)?;
    let mut inferencer = ColumnInferencer::new(config);
    let mut record = csv::ByteRecord::new();
    let mut truncated = None;

    while reader
        .read_row(&mut record)
        .with_context(|| format!("Reading {path:?}"))?
    {
        let line = inferencer.lines_read() + 1;
        let (fields, had_errors) = io_utils::decode_record(&record, encoding);
        if had_errors {
            warn!(
                "{path:?}: line {line} is not valid {}; malformed bytes replaced",
                encoding.name()
            );
        }
        if let Err(err) = inferencer.observe_row(&fields) {
            error!("{path:?}: {err}: {}", err.preview().join(", "));
            truncated = Some(err);
            break;
        }
        if line % PROGRESS_INTERVAL == 0 {
            debug!("{path:?}: {line} lines read");
        }
    }

    if inferencer.lines_read() == 0 {
        return Err(InferError::EmptyInput {
            path: path.to_path_buf(),
        }
        .into());
    }

    let table = inferencer.finish();
    debug!(
        "{path:?}: {} entries, {} columns in {}",
        table.data_rows,
        table.columns.len(),
        format_elapsed(started.elapsed())
    );
    Ok(ScannedFile {
        path: path.to_path_buf(),
        file_name: input_file_name(path),
        table,
        truncated,
    })
}

fn input_file_name(path: &Path) -> String {
    if io_utils::is_dash(path) {
        return "stdin".to_string();
    }
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Explicit output path, or `mysql_load.sql` beside the first input.
pub fn resolve_output_path(output: Option<&Path>, inputs: &[PathBuf]) -> PathBuf {
    if let Some(path) = output {
        return path.to_path_buf();
    }
    let directory = inputs
        .first()
        .filter(|first| !io_utils::is_dash(first))
        .and_then(|first| first.parent())
        .unwrap_or_else(|| Path::new(""));
    directory.join(DEFAULT_OUTPUT_NAME)
}

/// Renders a duration as `N days, N hours, N minutes, S seconds.`, leaving
/// out leading units that are zero.
pub fn format_elapsed(elapsed: Duration) -> String {
    let delta = TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::MAX);
    let days = delta.num_days();
    let hours = delta.num_hours() % 24;
    let minutes = delta.num_minutes() % 60;
    let seconds = delta.num_seconds() % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days} days, "));
    }
    if days > 0 || hours > 0 {
        out.push_str(&format!("{hours} hours, "));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes} minutes, "));
    }
    out.push_str(&format!("{seconds} seconds."));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_time_omits_leading_zero_units() {
        assert_eq!(format_elapsed(Duration::from_millis(4_500)), "4 seconds.");
        assert_eq!(
            format_elapsed(Duration::from_secs(3_725)),
            "1 hours, 2 minutes, 5 seconds."
        );
        assert_eq!(
            format_elapsed(Duration::from_secs(86_400 + 61)),
            "1 days, 0 hours, 1 minutes, 1 seconds."
        );
    }

    #[test]
    fn default_output_sits_beside_first_input() {
        let inputs = vec![PathBuf::from("data/a.csv"), PathBuf::from("other/b.csv")];
        assert_eq!(
            resolve_output_path(None, &inputs),
            PathBuf::from("data").join(DEFAULT_OUTPUT_NAME)
        );
        assert_eq!(
            resolve_output_path(Some(Path::new("-")), &inputs),
            PathBuf::from("-")
        );
        assert_eq!(
            resolve_output_path(None, &[PathBuf::from("a.csv")]),
            PathBuf::from(DEFAULT_OUTPUT_NAME)
        );
    }

    #[test]
    fn parallel_results_keep_input_order() {
        let inputs: Vec<PathBuf> = (0..16).map(|i| PathBuf::from(format!("f{i}.csv"))).collect();
        let names = run_ordered(&inputs, 4, |path| input_file_name(path)).expect("pool");
        let expected: Vec<String> = (0..16).map(|i| format!("f{i}.csv")).collect();
        assert_eq!(names, expected);
    }
}
