use crate::lotto::game::Game;
use crate::lotto::record::{Accumulator, DrawResult};
use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    last_updated: String,
    total_records: usize,
    jackpots: BTreeMap<Game, String>,
    games: BTreeMap<Game, Vec<DrawResult>>,
}

impl Dataset {
    pub fn last_updated(&self) -> &str {
        &self.last_updated
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    pub fn jackpots(&self) -> &BTreeMap<Game, String> {
        &self.jackpots
    }

    pub fn games(&self) -> &BTreeMap<Game, Vec<DrawResult>> {
        &self.games
    }
}

/// Records are ordered by date, newest first. The sort is stable, so draws
/// sharing a date keep accumulation order (archive before live).
pub fn finalize(
    acc: Accumulator,
    jackpots: BTreeMap<Game, String>,
    last_updated: String,
) -> Dataset {
    let mut games = acc.into_collections();
    for records in games.values_mut() {
        records.sort_by(|a, b| b.date.cmp(&a.date));
    }
    let total_records = games.values().map(Vec::len).sum();
    Dataset {
        last_updated,
        total_records,
        jackpots,
        games,
    }
}

#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
}

pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<WriteOutcome> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;

    let payload = serde_json::to_vec(dataset).context("failed to serialize dataset")?;
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
    tmp.write_all(&payload)
        .with_context(|| format!("failed to write temp file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("failed to sync temp file for {}", path.display()))?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&payload);
    Ok(WriteOutcome {
        path: path.to_path_buf(),
        bytes: payload.len(),
        sha256: format!("{:x}", hasher.finalize()),
    })
}
