//! Batch redaction of files.
//!
//! Files are processed concurrently on one shared, read-only service. Reading
//! and writing go through `tokio::fs`; the pipeline itself is CPU-bound and runs
//! on the blocking pool.

use crate::error::BatchError;
use crate::metadata::RedactionMetadata;
use crate::RedactionService;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Suffix appended to the input file name for the masked copy
pub const REDACTED_SUFFIX: &str = "redacted";

/// Outcome for a single input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub metadata: Option<RedactionMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Where the masked copy of `input` is written
pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let mut name = input.file_name().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".");
    name.push(REDACTED_SUFFIX);

    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Redact every input concurrently; reports come back in input order.
///
/// An input whose output path was already claimed by an earlier input is
/// reported as a conflict and never read or written.
pub async fn redact_files(
    service: Arc<RedactionService>,
    inputs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Vec<FileReport> {
    info!(files = inputs.len(), "Starting batch redaction");

    let mut slots: Vec<Option<Result<RedactionMetadata, BatchError>>> =
        inputs.iter().map(|_| None).collect();
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut tasks = JoinSet::new();
    for (index, input) in inputs.iter().enumerate() {
        let output = output_path(input, output_dir.as_deref());
        if let Some(first) = claimed.get(&output) {
            slots[index] = Some(Err(BatchError::OutputConflict {
                path: output,
                first: first.to_path_buf(),
            }));
            continue;
        }
        claimed.insert(output.clone(), input);

        let service = Arc::clone(&service);
        let input = input.clone();
        tasks.spawn(async move {
            let result = redact_file(service, &input, &output).await;
            (index, result)
        });
    }
    drop(claimed);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!(error = %e, "Batch task failed to complete"),
        }
    }

    let reports: Vec<FileReport> = inputs
        .into_iter()
        .zip(slots)
        .map(|(input, slot)| {
            let output = output_path(&input, output_dir.as_deref());
            match slot.unwrap_or_else(|| Err(BatchError::Task("task aborted".to_string()))) {
                Ok(metadata) => FileReport {
                    input,
                    output: Some(output),
                    metadata: Some(metadata),
                    error: None,
                },
                Err(e) => {
                    warn!(input = %input.display(), error = %e, "File not redacted");
                    FileReport {
                        input,
                        output: None,
                        metadata: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect();

    info!(
        files = reports.len(),
        failed = reports.iter().filter(|r| !r.is_ok()).count(),
        "Batch redaction finished"
    );
    reports
}

async fn redact_file(
    service: Arc<RedactionService>,
    input: &Path,
    output: &Path,
) -> Result<RedactionMetadata, BatchError> {
    let text = tokio::fs::read_to_string(input)
        .await
        .map_err(|source| BatchError::Read {
            path: input.to_path_buf(),
            source,
        })?;

    let response = tokio::task::spawn_blocking(move || service.redact(&text))
        .await
        .map_err(|e| BatchError::Task(e.to_string()))??;

    tokio::fs::write(output, response.redacted_text.as_bytes())
        .await
        .map_err(|source| BatchError::Write {
            path: output.to_path_buf(),
            source,
        })?;

    debug!(
        input = %input.display(),
        total = response.metadata.total_redactions,
        "File redacted"
    );
    Ok(response.metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_next_to_input() {
        let path = output_path(Path::new("/data/notes.txt"), None);
        assert_eq!(path, PathBuf::from("/data/notes.txt.redacted"));
    }

    #[test]
    fn test_output_path_in_output_dir() {
        let path = output_path(Path::new("/data/notes.txt"), Some(Path::new("/out")));
        assert_eq!(path, PathBuf::from("/out/notes.txt.redacted"));
    }

    #[test]
    fn test_output_dir_flattens_same_file_names() {
        let dir = Some(Path::new("/out"));
        assert_eq!(
            output_path(Path::new("/a/notes.txt"), dir),
            output_path(Path::new("/b/notes.txt"), dir)
        );
    }
}
