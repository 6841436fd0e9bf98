use crate::logging;
use crate::lotto::audit::append_or_warn;
use crate::lotto::config::LottoConfig;
use crate::lotto::dataset::{WriteOutcome, finalize, write_dataset};
use crate::lotto::game::Game;
use crate::lotto::ingest::{IngestOutcome, ingest_history};
use crate::lotto::jackpot::{JackpotSource, collect_jackpots};
use crate::lotto::live::{LiveSource, MergeOutcome, MonthWindow, merge_live};
use crate::lotto::paths::LottoPaths;
use crate::lotto::record::Accumulator;
use crate::lotto::util::{format_timestamp, local_now};
use anyhow::Result;
use std::collections::BTreeMap;

pub struct Sources<'a> {
    pub live: Option<&'a dyn LiveSource>,
    pub jackpot: Option<&'a dyn JackpotSource>,
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub ingest: IngestOutcome,
    pub merge: Option<MergeOutcome>,
    pub window: Option<MonthWindow>,
    pub jackpots: BTreeMap<Game, String>,
    pub per_game: Vec<(Game, usize)>,
    pub total_records: usize,
    pub last_updated: String,
    pub output: WriteOutcome,
}

/// Ingest archives, merge live results, scrape jackpots and write the
/// dataset. The output file is touched only after everything else succeeded.
pub fn run_build(paths: &LottoPaths, cfg: &LottoConfig, sources: Sources<'_>) -> Result<BuildOutcome> {
    let games = cfg.ranked_games();
    let timezone = cfg.timezone()?;
    let mut acc = Accumulator::new(&games);

    logging::info(
        "ingest",
        format!(
            "data_dir={} years={}..={}",
            paths.data_dir.display(),
            cfg.history.first_year,
            cfg.history.last_year
        ),
    );
    let ingest = ingest_history(&cfg.history, &paths.data_dir, &games, &mut acc);
    let ingest_message = format!(
        "bundles={} failed={} members={} skipped_members={} accepted={} rejected={} duplicate={}",
        ingest.bundles_found,
        ingest.bundles_failed,
        ingest.members_read,
        ingest.members_skipped,
        ingest.lines_accepted,
        ingest.lines_rejected,
        ingest.lines_duplicate
    );
    logging::info("ingest", &ingest_message);
    append_or_warn(paths, "ingest", "ok", &ingest_message);

    let mut merge = None;
    let mut window = None;
    if let Some(live) = sources.live {
        let today = local_now(timezone).date();
        let span = MonthWindow::ending_at(today, cfg.live.lookback_months);
        let merged = merge_live(live, &games, &span, cfg.live.pacing(), &mut acc);
        let merge_message = format!(
            "window={span} fetched={} failed={} items={} admitted={} duplicates={} skipped={}",
            merged.games_fetched,
            merged.games_failed,
            merged.items,
            merged.admitted,
            merged.duplicates,
            merged.skipped
        );
        logging::info("merge", &merge_message);
        append_or_warn(paths, "merge", "ok", &merge_message);
        merge = Some(merged);
        window = Some(span);
    } else {
        logging::info("merge", "live fetch disabled");
    }

    let jackpots = match sources.jackpot {
        Some(source) => {
            let found = collect_jackpots(source, &games);
            append_or_warn(paths, "jackpot", "ok", &format!("figures={}", found.len()));
            found
        }
        None => BTreeMap::new(),
    };

    let last_updated = format_timestamp(local_now(timezone));
    let dataset = finalize(acc, jackpots, last_updated);
    let per_game: Vec<(Game, usize)> = dataset
        .games()
        .iter()
        .map(|(game, records)| (*game, records.len()))
        .collect();
    for (game, count) in &per_game {
        logging::info("finalize", format!("game={game} records={count}"));
    }

    let output = write_dataset(&paths.output_file, &dataset)?;
    let write_message = format!(
        "path={} bytes={} sha256={} total_records={}",
        output.path.display(),
        output.bytes,
        output.sha256,
        dataset.total_records()
    );
    logging::info("write", &write_message);
    append_or_warn(paths, "write", "ok", &write_message);

    Ok(BuildOutcome {
        ingest,
        merge,
        window,
        jackpots: dataset.jackpots().clone(),
        per_game,
        total_records: dataset.total_records(),
        last_updated: dataset.last_updated().to_string(),
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::tempdir;

    struct OneDrawLiveSource;

    impl LiveSource for OneDrawLiveSource {
        fn fetch(&self, game: Game, _window: &MonthWindow) -> Result<Vec<Value>, FetchError> {
            match game {
                Game::Lotto649 => Ok(vec![json!({
                    "lotteryDate": "2099-01-02T00:00:00",
                    "period": 188000001,
                    "drawNumberAppear": [40, 2, 13]
                })]),
                _ => Err(FetchError::Status(500)),
            }
        }
    }

    struct QuietJackpots;

    impl JackpotSource for QuietJackpots {
        fn fetch_page(&self, _game: Game) -> Result<String, FetchError> {
            Ok("<div>更新中</div>".to_string())
        }
    }

    fn test_paths(root: &std::path::Path) -> LottoPaths {
        LottoPaths {
            lotto_home: root.to_path_buf(),
            data_dir: root.join("data"),
            output_file: root.join("data/lottery-data.json"),
            logs_dir: root.join("logs"),
        }
    }

    #[test]
    fn build_without_archives_writes_live_records() {
        let tmp = tempdir().expect("tempdir");
        let paths = test_paths(tmp.path());
        let mut cfg = LottoConfig::default();
        cfg.live.pacing_ms = 0;

        let outcome = run_build(
            &paths,
            &cfg,
            Sources {
                live: Some(&OneDrawLiveSource),
                jackpot: Some(&QuietJackpots),
            },
        )
        .expect("build");

        assert_eq!(outcome.total_records, 1);
        assert_eq!(outcome.merge.expect("merge ran").games_failed, 5);
        assert_eq!(outcome.jackpots.len(), 2);

        let raw = fs::read_to_string(&paths.output_file).expect("output");
        let json: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(json["total_records"], 1);
        assert_eq!(json["games"]["大樂透"][0]["numbers"], json!([40, 2, 13]));
        assert_eq!(json["games"]["大樂透"][0]["source"], "api");
        assert_eq!(json["jackpots"]["威力彩"], "更新中");
        assert!(crate::lotto::audit::audit_log_path(&paths).exists());
    }

    #[test]
    fn disabled_sources_still_produce_a_dataset() {
        let tmp = tempdir().expect("tempdir");
        let paths = test_paths(tmp.path());
        let cfg = LottoConfig::default();

        let outcome = run_build(
            &paths,
            &cfg,
            Sources {
                live: None,
                jackpot: None,
            },
        )
        .expect("build");

        assert!(outcome.merge.is_none());
        assert_eq!(outcome.total_records, 0);
        assert_eq!(outcome.per_game.len(), Game::RANKED.len());
        assert!(paths.output_file.exists());
    }
}
