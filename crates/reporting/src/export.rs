use crate::error::ReportingError;
use crate::markdown::render_markdown;
use analytics::Report;
use std::fs;
use std::path::{Path, PathBuf};

pub const MARKDOWN_FILE: &str = "summary_report.md";
pub const JSON_FILE: &str = "summary_report.json";

/// Writes `summary_report.md` into `dir`, creating it if needed.
pub fn write_markdown(report: &Report, dir: &Path) -> Result<PathBuf, ReportingError> {
    write_file(dir, MARKDOWN_FILE, render_markdown(report))
}

/// Writes the whole report as pretty-printed JSON into `dir`.
pub fn write_json(report: &Report, dir: &Path) -> Result<PathBuf, ReportingError> {
    let json = serde_json::to_string_pretty(report)?;
    write_file(dir, JSON_FILE, json)
}

fn write_file(dir: &Path, name: &str, contents: String) -> Result<PathBuf, ReportingError> {
    let io_error = |path: &Path| {
        let path = path.display().to_string();
        move |source| ReportingError::Io { path, source }
    };

    fs::create_dir_all(dir).map_err(io_error(dir))?;
    let path = dir.join(name);
    fs::write(&path, contents).map_err(io_error(&path))?;

    tracing::info!(path = %path.display(), "Report saved.");
    Ok(path)
}
