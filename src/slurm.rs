//! Interface to Slurm queue commands.
//!
//! This module provides the query side of the dashboard: listing job ids via
//! `squeue` and fetching per-job detail blocks via `scontrol show job`. The
//! [`QueueSource`] trait keeps the snapshot builder independent of process
//! spawning so tests can substitute canned text blocks.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// How the Slurm binary path was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathResolution {
    /// Explicitly configured via config file or environment variable
    Configured,
    /// Auto-detected via PATH (found squeue in user's PATH)
    AutoDetected,
    /// Fell back to default /usr/bin
    Fallback,
}

/// Find the directory containing Slurm binaries.
///
/// Resolution order:
/// 1. Explicit path provided (from config or `--slurm-path`) - validated to
///    be an existing directory; an invalid path warns and resolution
///    continues.
/// 2. Auto-detect via PATH using the `which` crate to find `squeue`, then
///    extract the parent directory.
/// 3. Fallback to `/usr/bin` if PATH detection fails.
pub fn find_slurm_bin_path(config_path: Option<&Path>) -> (PathBuf, PathResolution) {
    if let Some(path) = config_path {
        if path.is_dir() {
            return (path.to_path_buf(), PathResolution::Configured);
        }
        eprintln!(
            "Warning: Configured slurm_bin_path '{}' is not a valid directory, trying auto-detection",
            path.display()
        );
    }

    if let Ok(squeue_path) = which::which("squeue")
        && let Some(parent) = squeue_path.parent()
    {
        return (parent.to_path_buf(), PathResolution::AutoDetected);
    }

    let fallback = PathBuf::from("/usr/bin");
    if !fallback.join("squeue").exists() {
        eprintln!(
            "Warning: Slurm binaries not found in PATH or {}. Commands may fail.",
            fallback.display()
        );
    }
    (fallback, PathResolution::Fallback)
}

/// A single queue query failed.
///
/// The snapshot builder treats every variant the same way - the affected
/// listing or job is dropped from the snapshot - but the variants keep
/// diagnostics precise in the debug log.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with status {code}: {stderr}")]
    Status {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("{command} produced no output")]
    EmptyOutput { command: String },
}

/// Source of raw queue text.
///
/// All three methods return unparsed scheduler output: whitespace/newline
/// separated id lists, or one `KEY=VALUE` detail block per job.
pub trait QueueSource {
    /// Ids of all jobs belonging to `user`.
    fn user_job_ids(&self, user: &str) -> Result<String, QueryError>;

    /// Ids of every pending job cluster-wide.
    fn pending_job_ids(&self) -> Result<String, QueryError>;

    /// Detail block for one job.
    fn job_detail(&self, job_id: &str) -> Result<String, QueryError>;
}

/// Production [`QueueSource`] backed by the `squeue`/`scontrol` binaries.
#[derive(Debug, Clone)]
pub struct SlurmQueue {
    /// Path to directory containing Slurm binaries (squeue, scontrol)
    pub slurm_bin_path: PathBuf,
    #[allow(dead_code)] // Kept for diagnostics
    resolution: PathResolution,
}

impl Default for SlurmQueue {
    fn default() -> Self {
        Self::with_config(None)
    }
}

impl SlurmQueue {
    /// Create a queue interface, preferring the configured binary directory.
    #[must_use]
    pub fn with_config(config_path: Option<&Path>) -> Self {
        let (path, resolution) = find_slurm_bin_path(config_path);
        Self {
            slurm_bin_path: path,
            resolution,
        }
    }

    /// Run a command and return its stdout, mapping failures to [`QueryError`].
    fn run(&self, binary: &str, args: &[&str]) -> Result<String, QueryError> {
        let path = self.slurm_bin_path.join(binary);
        let label = || format!("{} {}", binary, args.join(" "));

        let output = Command::new(&path)
            .args(args)
            .output()
            .map_err(|e| QueryError::Spawn {
                command: label(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(QueryError::Status {
                command: label(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Test if Slurm commands are available.
    ///
    /// # Errors
    /// Returns a specific message when the squeue binary is missing, not
    /// executable, or exits non-zero.
    pub fn test_connection(&self) -> Result<(), String> {
        let squeue_path = self.slurm_bin_path.join("squeue");

        match Command::new(&squeue_path).arg("--version").output() {
            Ok(output) => {
                if output.status.success() {
                    Ok(())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(format!(
                        "squeue command failed with exit code {}: {}",
                        output.status.code().unwrap_or(-1),
                        stderr.trim()
                    ))
                }
            }
            Err(e) => {
                let msg = match e.kind() {
                    std::io::ErrorKind::NotFound => {
                        format!("squeue binary not found at '{}'", squeue_path.display())
                    }
                    std::io::ErrorKind::PermissionDenied => {
                        format!(
                            "permission denied when trying to execute '{}'",
                            squeue_path.display()
                        )
                    }
                    _ => format!("failed to execute squeue: {e}"),
                };
                Err(msg)
            }
        }
    }

    /// Get current username from environment
    pub fn current_user() -> String {
        std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .unwrap_or_else(|_| {
                eprintln!(
                    "Warning: Could not determine username from USER or LOGNAME environment variables"
                );
                "unknown".to_string()
            })
    }
}

impl QueueSource for SlurmQueue {
    fn user_job_ids(&self, user: &str) -> Result<String, QueryError> {
        self.run("squeue", &["-u", user, "-h", "-o", "%i"])
    }

    fn pending_job_ids(&self) -> Result<String, QueryError> {
        self.run("squeue", &["-h", "-t", "PD", "-o", "%i"])
    }

    fn job_detail(&self, job_id: &str) -> Result<String, QueryError> {
        let text = self.run("scontrol", &["show", "job", job_id])?;
        if text.trim().is_empty() {
            return Err(QueryError::EmptyOutput {
                command: format!("scontrol show job {}", job_id),
            });
        }
        Ok(text)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_display() {
        let err = QueryError::Status {
            command: "squeue -h -t PD -o %i".to_string(),
            code: 1,
            stderr: "slurm_load_jobs error".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("squeue"));
        assert!(msg.contains("status 1"));
        assert!(msg.contains("slurm_load_jobs"));
    }

    #[test]
    fn test_find_slurm_bin_path_rejects_bad_config() {
        let (_, resolution) =
            find_slurm_bin_path(Some(Path::new("/definitely/not/a/real/dir")));
        assert_ne!(resolution, PathResolution::Configured);
    }

    #[test]
    fn test_find_slurm_bin_path_accepts_existing_dir() {
        let (path, resolution) = find_slurm_bin_path(Some(Path::new("/tmp")));
        assert_eq!(path, PathBuf::from("/tmp"));
        assert_eq!(resolution, PathResolution::Configured);
    }
}
