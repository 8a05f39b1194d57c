use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::analysis::Analyzer;
use crate::config::PipelineConfig;
use crate::error::AnalysisError;
use crate::models::Report;

/// Outcome for one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub report: Report,
}

/// Analyse every file on the blocking pool, one independent pipeline each.
///
/// Results come back in input order. A file that cannot be read or decoded
/// gets a failure report; it never aborts the rest of the batch.
pub async fn analyze_files(
    paths: Vec<PathBuf>,
    config: PipelineConfig,
    debug_root: Option<PathBuf>,
) -> Vec<FileReport> {
    let mut handles = Vec::with_capacity(paths.len());

    for (idx, path) in paths.iter().cloned().enumerate() {
        let config = config.clone();
        let debug_dir = debug_root.as_ref().map(|root| debug_dir_for(root, idx, &path));
        handles.push(tokio::task::spawn_blocking(move || {
            analyze_file(path, config, debug_dir)
        }));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (handle, path) in handles.into_iter().zip(paths) {
        let report = match handle.await {
            Ok(report) => report,
            Err(e) => FileReport {
                path,
                report: Report::failure(format!("analysis task failed: {}", e), "internal"),
            },
        };
        reports.push(report);
    }
    reports
}

fn analyze_file(path: PathBuf, config: PipelineConfig, debug_dir: Option<PathBuf>) -> FileReport {
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read file");
            return FileReport {
                path,
                report: Report::failure(e.to_string(), "io"),
            };
        }
    };

    let result = Analyzer::new(config)
        .and_then(|analyzer| match debug_dir {
            Some(dir) => analyzer.with_debug(dir),
            None => Ok(analyzer),
        })
        .and_then(|analyzer| analyzer.analyze_bytes(&bytes));

    match &result {
        Ok(analysis) => info!(path = %path.display(), ratio = analysis.ratio, "analysed"),
        Err(e) => log_failure(&path, e),
    }

    FileReport {
        path,
        report: Report::from(result),
    }
}

fn log_failure(path: &std::path::Path, err: &AnalysisError) {
    warn!(path = %path.display(), kind = err.kind(), error = %err, "analysis failed");
}

/// `<root>/NN_<file stem>` so several images never share a debug directory
fn debug_dir_for(root: &std::path::Path, idx: usize, path: &std::path::Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    root.join(format!("{:02}_{}", idx + 1, stem))
}
