use crate::error::MemberSkip;
use crate::logging;
use crate::lotto::config::HistoryConfig;
use crate::lotto::encoding::{TextEncoding, decode_with_fallback};
use crate::lotto::game::Game;
use crate::lotto::normalize::normalize_line;
use crate::lotto::paths::bundle_path;
use crate::lotto::record::Accumulator;
use crate::lotto::warn::{self, WarnEvent};
use std::fs;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    pub bundles_found: usize,
    pub bundles_failed: usize,
    pub members_read: usize,
    pub members_skipped: usize,
    pub lines_accepted: usize,
    pub lines_rejected: usize,
    pub lines_duplicate: usize,
}

impl IngestOutcome {
    fn absorb(&mut self, other: IngestOutcome) {
        self.bundles_found += other.bundles_found;
        self.bundles_failed += other.bundles_failed;
        self.members_read += other.members_read;
        self.members_skipped += other.members_skipped;
        self.lines_accepted += other.lines_accepted;
        self.lines_rejected += other.lines_rejected;
        self.lines_duplicate += other.lines_duplicate;
    }
}

pub fn is_tabular_member(name: &str) -> bool {
    if !name.to_ascii_lowercase().ends_with(".csv") {
        return false;
    }
    !name
        .split(['/', '\\'])
        .any(|component| component.starts_with("__"))
}

/// Lines ended by `\n`, `\r\n` or a bare `\r`.
fn member_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(end) = rest.find(['\r', '\n']) else {
            let line = rest;
            rest = "";
            return Some(line);
        };
        let line = &rest[..end];
        let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[end + terminator..];
        Some(line)
    })
}

pub fn ingest_text(text: &str, games: &[Game], acc: &mut Accumulator) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();
    for line in member_lines(text) {
        match normalize_line(line, games) {
            Ok(record) => {
                if acc.admit(record) {
                    outcome.lines_accepted += 1;
                } else {
                    outcome.lines_duplicate += 1;
                }
            }
            Err(_) => outcome.lines_rejected += 1,
        }
    }
    outcome
}

fn read_member<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
) -> Result<Option<(String, Vec<u8>)>, MemberSkip> {
    let mut member = archive.by_index(index)?;
    if member.is_dir() || !is_tabular_member(member.name()) {
        return Ok(None);
    }
    let name = member.name().to_string();
    let mut raw = Vec::new();
    member.read_to_end(&mut raw)?;
    Ok(Some((name, raw)))
}

pub fn ingest_bundle(
    path: &Path,
    games: &[Game],
    acc: &mut Accumulator,
) -> Result<IngestOutcome, zip::result::ZipError> {
    let file = fs::File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    let bundle = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("bundle");

    let mut outcome = IngestOutcome::default();
    for index in 0..archive.len() {
        let (name, raw) = match read_member(&mut archive, index) {
            Ok(Some(member)) => member,
            Ok(None) => continue,
            Err(err) => {
                outcome.members_skipped += 1;
                warn::emit(WarnEvent {
                    code: "member_unreadable",
                    stage: "ingest",
                    action: "skip_member",
                    target: &format!("{bundle}#{index}"),
                    reason: "read_failed",
                    err: &err.to_string(),
                });
                continue;
            }
        };

        let Some((encoding, text)) = decode_with_fallback(&raw, &TextEncoding::FALLBACK_CHAIN)
        else {
            outcome.members_skipped += 1;
            warn::emit(WarnEvent {
                code: "member_undecodable",
                stage: "ingest",
                action: "skip_member",
                target: &format!("{bundle}:{name}"),
                reason: "no_encoding_matched",
                err: &MemberSkip::Undecodable.to_string(),
            });
            continue;
        };

        outcome.members_read += 1;
        let lines = ingest_text(&text, games, acc);
        logging::info(
            "ingest",
            format!(
                "member={bundle}:{name} encoding={} accepted={} rejected={} duplicate={}",
                encoding.label(),
                lines.lines_accepted,
                lines.lines_rejected,
                lines.lines_duplicate
            ),
        );
        outcome.absorb(lines);
    }
    Ok(outcome)
}

pub fn ingest_history(
    history: &HistoryConfig,
    data_dir: &Path,
    games: &[Game],
    acc: &mut Accumulator,
) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();
    for year in history.years() {
        let path = bundle_path(data_dir, year);
        if !path.is_file() {
            continue;
        }
        outcome.bundles_found += 1;
        logging::info("ingest", format!("reading {}", path.display()));
        match ingest_bundle(&path, games, acc) {
            Ok(bundle) => outcome.absorb(bundle),
            Err(err) => {
                outcome.bundles_failed += 1;
                warn::emit(WarnEvent {
                    code: "bundle_unreadable",
                    stage: "ingest",
                    action: "skip_year",
                    target: &year.to_string(),
                    reason: "open_failed",
                    err: &err.to_string(),
                });
            }
        }
    }
    outcome
}
