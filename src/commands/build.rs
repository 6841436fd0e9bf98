use anyhow::Result;

use crate::commands::CommandReport;
use crate::lotto::audit::append_or_warn;
use crate::lotto::config::load_config;
use crate::lotto::http::{HttpJackpotSource, HttpLiveSource};
use crate::lotto::jackpot::JackpotSource;
use crate::lotto::live::LiveSource;
use crate::lotto::paths::resolve_paths;
use crate::lotto::pipeline::{BuildOutcome, Sources, run_build};

fn fill_report(report: &mut CommandReport, outcome: &BuildOutcome) {
    let ingest = &outcome.ingest;
    report.detail(format!(
        "history.bundles={} failed={}",
        ingest.bundles_found, ingest.bundles_failed
    ));
    report.detail(format!(
        "history.members={} skipped={}",
        ingest.members_read, ingest.members_skipped
    ));
    report.detail(format!(
        "history.lines accepted={} rejected={} duplicate={}",
        ingest.lines_accepted, ingest.lines_rejected, ingest.lines_duplicate
    ));

    match (&outcome.merge, &outcome.window) {
        (Some(merge), Some(window)) => {
            report.detail(format!("live.window={window}"));
            report.detail(format!(
                "live.games fetched={} failed={}",
                merge.games_fetched, merge.games_failed
            ));
            report.detail(format!(
                "live.items={} admitted={} duplicates={} skipped={}",
                merge.items, merge.admitted, merge.duplicates, merge.skipped
            ));
        }
        _ => report.detail("live=disabled"),
    }

    for (game, amount) in &outcome.jackpots {
        report.detail(format!("jackpot.{}={amount}", game.api_code()));
    }
    for (game, count) in &outcome.per_game {
        report.detail(format!("records.{}={count}", game.api_code()));
    }
    report.detail(format!("total_records={}", outcome.total_records));
    report.detail(format!("last_updated={}", outcome.last_updated));
    report.detail(format!("output={}", outcome.output.path.display()));
    report.detail(format!("output.bytes={}", outcome.output.bytes));
    report.detail(format!("output.sha256={}", outcome.output.sha256));
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = match load_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            append_or_warn(&paths, "build", "failed", &format!("{err:#}"));
            return Err(err);
        }
    };
    let mut report = CommandReport::new("build");

    let live = if cfg.live.enabled {
        Some(HttpLiveSource::new(&cfg.live)?)
    } else {
        None
    };
    let jackpot = if cfg.jackpot.enabled {
        Some(HttpJackpotSource::new(&cfg.live, &cfg.jackpot)?)
    } else {
        None
    };
    let sources = Sources {
        live: live.as_ref().map(|source| source as &dyn LiveSource),
        jackpot: jackpot.as_ref().map(|source| source as &dyn JackpotSource),
    };

    match run_build(&paths, &cfg, sources) {
        Ok(outcome) => {
            fill_report(&mut report, &outcome);
            append_or_warn(
                &paths,
                "build",
                "ok",
                &format!("total_records={}", outcome.total_records),
            );
            Ok(report)
        }
        Err(err) => {
            append_or_warn(&paths, "build", "failed", &format!("{err:#}"));
            Err(err)
        }
    }
}
