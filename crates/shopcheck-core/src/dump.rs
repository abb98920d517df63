//! Full request/response dump to JSONL files
//!
//! Writes every exchange of a run (not just failures) to per-operation JSONL
//! files for post-hoc analysis.
//!
//! ```text
//! .shopcheck/dumps/
//! ├── GET__productsList.jsonl
//! ├── POST__verifyLogin.jsonl
//! └── index.json
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::report::Exchange;

/// Summary of a dump, written as `index.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpIndex {
    /// Total exchanges dumped
    pub total: u64,
    /// Per-operation file listing
    pub operations: Vec<DumpOperationEntry>,
    /// Directory where files were written
    pub dump_dir: PathBuf,
}

/// An entry in the dump index for one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpOperationEntry {
    /// Operation label, e.g. "POST /verifyLogin"
    pub operation: String,
    /// Filename within dump directory
    pub file: String,
    /// Number of exchanges in this file
    pub count: u64,
}

/// Write exchanges to per-operation JSONL files.
///
/// With `mask_secrets`, password parameters are replaced by `***`.
///
/// # Errors
///
/// Returns error if the dump directory cannot be created or files cannot be written.
pub fn write_dump(
    exchanges: &[&Exchange],
    dump_dir: &Path,
    mask_secrets: bool,
) -> Result<DumpIndex, DumpError> {
    std::fs::create_dir_all(dump_dir)
        .map_err(|e| DumpError::Io(format!("create {}: {e}", dump_dir.display())))?;

    // BTreeMap keeps files sorted by operation
    let mut groups: BTreeMap<&str, Vec<&Exchange>> = BTreeMap::new();
    for exchange in exchanges {
        groups
            .entry(exchange.operation.as_str())
            .or_default()
            .push(exchange);
    }

    let mut entries = Vec::new();
    let mut total: u64 = 0;

    for (operation, exchanges) in groups {
        let filename = sanitize_filename(operation);
        let filepath = dump_dir.join(&filename);

        let file = std::fs::File::create(&filepath)
            .map_err(|e| DumpError::Io(format!("create {}: {e}", filepath.display())))?;
        let mut writer = std::io::BufWriter::new(file);

        let count = exchanges.len() as u64;
        total += count;

        for exchange in exchanges {
            let line = if mask_secrets {
                serde_json::to_string(&mask_exchange(exchange))
            } else {
                serde_json::to_string(exchange)
            }
            .map_err(|e| DumpError::Serialize(e.to_string()))?;
            writeln!(writer, "{line}")
                .map_err(|e| DumpError::Io(format!("write {}: {e}", filepath.display())))?;
        }

        writer
            .flush()
            .map_err(|e| DumpError::Io(format!("flush {}: {e}", filepath.display())))?;

        entries.push(DumpOperationEntry {
            operation: operation.to_string(),
            file: filename,
            count,
        });
    }

    let index = DumpIndex {
        total,
        operations: entries,
        dump_dir: dump_dir.to_path_buf(),
    };

    let index_path = dump_dir.join("index.json");
    let index_json =
        serde_json::to_string_pretty(&index).map_err(|e| DumpError::Serialize(e.to_string()))?;
    std::fs::write(&index_path, index_json)
        .map_err(|e| DumpError::Io(format!("write {}: {e}", index_path.display())))?;

    Ok(index)
}

/// Maximum characters kept from the operation label in the filename.
const MAX_FILENAME_LEN: usize = 200;

/// "GET /getUserDetailByEmail" → "GET__getUserDetailByEmail.jsonl"
fn sanitize_filename(operation: &str) -> String {
    let sanitized: String = operation
        .chars()
        .take(MAX_FILENAME_LEN)
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' => c,
            _ => '_',
        })
        .collect();
    format!("{sanitized}.jsonl")
}

fn mask_exchange(exchange: &Exchange) -> Exchange {
    let mut masked = exchange.clone();
    masked.request.params = exchange.request.params.masked();
    masked
}

#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("cannot write dump: {0}")]
    Io(String),
    #[error("cannot encode exchange: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RequestParams;
    use crate::scenario::ParamPlacement;
    use crate::verdict::{RequestSnapshot, ResponseSnapshot};

    fn exchange(scenario: &str, operation: &str, status: u16) -> Exchange {
        let (method, path) = operation.split_once(' ').unwrap();
        Exchange {
            scenario: scenario.into(),
            operation: operation.into(),
            request: RequestSnapshot {
                method: method.into(),
                url: format!("http://localhost/api{path}"),
                params: RequestParams::new()
                    .with("email", "helen@gmail.com")
                    .with("password", "12345"),
                placement: ParamPlacement::Form,
            },
            response: Some(ResponseSnapshot {
                status_code: status,
                content_type: Some("application/json".into()),
                body: Some(r#"{"responseCode": 200, "message": "User exists!"}"#.into()),
                latency_ms: 12,
                shape: None,
            }),
            envelope: None,
            error: None,
        }
    }

    #[test]
    fn sanitize_simple() {
        assert_eq!(sanitize_filename("GET /brandsList"), "GET__brandsList.jsonl");
    }

    #[test]
    fn sanitize_odd_characters() {
        assert_eq!(
            sanitize_filename("GET /getUserDetailByEmail?email=a@b"),
            "GET__getUserDetailByEmail_email_a_b.jsonl"
        );
    }

    #[test]
    fn mask_replaces_password_only() {
        let masked = mask_exchange(&exchange("t07", "POST /verifyLogin", 200));
        assert_eq!(masked.request.params.get("password"), Some("***"));
        assert_eq!(masked.request.params.get("email"), Some("helen@gmail.com"));
    }

    #[test]
    fn no_mask_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let e = exchange("t07", "POST /verifyLogin", 200);
        let index = write_dump(&[&e], dir.path(), false).unwrap();
        assert_eq!(index.total, 1);

        let content = std::fs::read_to_string(dir.path().join(&index.operations[0].file)).unwrap();
        let parsed: Exchange = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed.request.params.get("password"), Some("12345"));
    }

    #[test]
    fn write_dump_groups_by_operation() {
        let dir = tempfile::tempdir().unwrap();
        let a = exchange("t07", "POST /verifyLogin", 200);
        let b = exchange("t08", "POST /verifyLogin", 200);
        let c = exchange("t01", "GET /productsList", 200);

        let index = write_dump(&[&a, &b, &c], dir.path(), true).unwrap();

        assert_eq!(index.total, 3);
        assert_eq!(index.operations.len(), 2);
        assert_eq!(index.operations[0].operation, "GET /productsList");
        assert_eq!(index.operations[0].count, 1);
        assert_eq!(index.operations[1].operation, "POST /verifyLogin");
        assert_eq!(index.operations[1].count, 2);

        for entry in &index.operations {
            let content = std::fs::read_to_string(dir.path().join(&entry.file)).unwrap();
            let lines: Vec<_> = content.lines().collect();
            assert_eq!(lines.len(), entry.count as usize, "{}", entry.file);
            for line in lines {
                let parsed: Exchange = serde_json::from_str(line).unwrap();
                assert_eq!(parsed.request.params.get("password"), Some("***"));
            }
        }

        let parsed: DumpIndex =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("index.json")).unwrap())
                .unwrap();
        assert_eq!(parsed.total, 3);
    }

    #[test]
    fn write_dump_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = write_dump(&[], dir.path(), true).unwrap();
        assert_eq!(index.total, 0);
        assert!(index.operations.is_empty());
        assert!(dir.path().join("index.json").exists());
    }
}
