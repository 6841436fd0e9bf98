use crate::lotto::paths::LottoPaths;
use crate::lotto::util::now_epoch_secs;
use crate::lotto::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub at_epoch_secs: u64,
    pub phase: String,
    pub status: String,
    pub message: String,
}

pub fn audit_log_path(paths: &LottoPaths) -> PathBuf {
    paths.logs_dir.join("audit.log")
}

pub fn append_event(paths: &LottoPaths, phase: &str, status: &str, message: &str) -> Result<()> {
    fs::create_dir_all(&paths.logs_dir)
        .with_context(|| format!("failed to create {}", paths.logs_dir.display()))?;
    let event = AuditEvent {
        at_epoch_secs: now_epoch_secs()?,
        phase: phase.to_string(),
        status: status.to_string(),
        message: message.to_string(),
    };

    let line = format!("{}\n", serde_json::to_string(&event)?);
    let path = audit_log_path(paths);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

pub fn append_or_warn(paths: &LottoPaths, phase: &str, status: &str, message: &str) -> bool {
    let Err(err) = append_event(paths, phase, status, message) else {
        return true;
    };
    warn::emit(WarnEvent {
        code: "audit_unwritable",
        stage: phase,
        action: "continue",
        target: &audit_log_path(paths).display().to_string(),
        reason: "append_failed",
        err: &format!("{err:#}"),
    });
    false
}
