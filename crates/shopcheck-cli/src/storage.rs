//! Persistent report storage, `~/.shopcheck/reports/`
//!
//! Every executed run is saved regardless of `--output` mode.
//! Directory layout: `{host_port}_{timestamp}/`

use std::path::{Path, PathBuf};

use shopcheck_core::clock::{timestamp_compact, timestamp_iso};
use shopcheck_core::{Config, Failure, SuiteReport, Verdict};

/// Everything needed to persist one suite run.
pub struct ReportData<'a> {
    pub config: &'a Config,
    pub report: &'a SuiteReport,
    /// Failures after policy filtering
    pub failures: &'a [Failure],
    pub verdict: &'a Verdict,
    pub strict: bool,
}

/// Save a run under `~/.shopcheck/reports/`.
///
/// Returns the report directory path on success.
pub fn save_report(data: &ReportData) -> Result<PathBuf, std::io::Error> {
    save_report_in(&report_base_dir()?, data)
}

fn save_report_in(base: &Path, data: &ReportData) -> Result<PathBuf, std::io::Error> {
    let report_dir = base.join(build_dir_name(&data.config.base_url));
    std::fs::create_dir_all(&report_dir)?;

    let config_toml =
        toml::to_string_pretty(data.config).map_err(|e| std::io::Error::other(e.to_string()))?;
    std::fs::write(report_dir.join("config.toml"), config_toml)?;

    let report = data.report;
    let summary = serde_json::json!({
        "verdict": {
            "status": data.verdict.status.to_string(),
            "exit_code": data.verdict.exit_code,
            "reason": data.verdict.reason,
            "strict": data.strict,
        },
        "stats": {
            "scenarios": report.outcomes.len(),
            "passed": report.passed(),
            "failed": report.failed(),
            "flaky_failed": report.flaky_failed(),
            "skipped": report.skipped(),
        },
        "meta": {
            "saved_at": timestamp_iso(),
            "started_at": report.started_at,
            "duration_ms": report.duration_ms,
            "base_url": report.base_url,
            "run_tag": report.run_tag,
        },
    });
    std::fs::write(report_dir.join("summary.json"), to_json(&summary)?)?;
    std::fs::write(report_dir.join("report.json"), to_json(report)?)?;

    if !data.failures.is_empty() {
        std::fs::write(report_dir.join("failures.json"), to_json(data.failures)?)?;
        let http_content = shopcheck_core::to_http_file(data.failures, "base_url");
        std::fs::write(report_dir.join("reproductions.http"), http_content)?;
    }

    Ok(report_dir)
}

fn to_json(value: &(impl serde::Serialize + ?Sized)) -> Result<String, std::io::Error> {
    serde_json::to_string_pretty(value).map_err(|e| std::io::Error::other(e.to_string()))
}

fn report_base_dir() -> Result<PathBuf, std::io::Error> {
    let home = std::env::var("HOME")
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotFound, "HOME not set"))?;
    Ok(PathBuf::from(home).join(".shopcheck").join("reports"))
}

/// `{host_port}_{timestamp}` e.g. `automationexercise.com_20260205T193000`
fn build_dir_name(base_url: &str) -> String {
    format!("{}_{}", extract_host_port(base_url), timestamp_compact())
}

/// `"http://localhost:8080/path"` → `"localhost_8080"`
fn extract_host_port(url: &str) -> String {
    url.split("://")
        .nth(1)
        .unwrap_or(url)
        .split('/')
        .next()
        .filter(|h| !h.is_empty())
        .unwrap_or("unknown")
        .replace(':', "_")
}
