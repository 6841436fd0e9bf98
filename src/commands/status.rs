use anyhow::Result;
use serde_json::Value;
use std::env;
use std::fs;

use crate::commands::CommandReport;
use crate::lotto::audit::audit_log_path;
use crate::lotto::config::{LottoConfig, load_config, resolve_config_path};
use crate::lotto::paths::{LottoPaths, resolve_paths};

include!(concat!(env!("OUT_DIR"), "/lotto_env_allowlist.rs"));

pub fn unknown_lotto_vars<I>(vars: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut unknown: Vec<String> = vars
        .into_iter()
        .filter(|key| key.starts_with("LOTTO_"))
        .filter(|key| !GENERATED_LOTTO_ENV_ALLOWLIST.contains(&key.as_str()))
        .collect();
    unknown.sort();
    unknown
}

fn report_config(report: &mut CommandReport, cfg: &LottoConfig) {
    let games: Vec<&str> = cfg
        .ranked_games()
        .into_iter()
        .map(|game| game.api_code())
        .collect();
    report.detail(format!("games={}", games.join(",")));
    report.detail(format!(
        "history.years={}..={}",
        cfg.history.first_year, cfg.history.last_year
    ));
    report.detail(format!("live.enabled={}", cfg.live.enabled));
    report.detail(format!("live.api_base={}", cfg.live.api_base));
    report.detail(format!(
        "live.lookback_months={} page_size={} timeout_secs={} pacing_ms={}",
        cfg.live.lookback_months, cfg.live.page_size, cfg.live.timeout_secs, cfg.live.pacing_ms
    ));
    report.detail(format!("jackpot.enabled={}", cfg.jackpot.enabled));
    report.detail(format!("jackpot.base_url={}", cfg.jackpot.base_url));
    report.detail(format!(
        "output.timezone={}",
        cfg.output.timezone.as_deref().unwrap_or("local")
    ));
}

fn report_archives(report: &mut CommandReport, paths: &LottoPaths, cfg: &LottoConfig) {
    if !paths.data_dir.is_dir() {
        report.issue(format!("missing data dir ({})", paths.data_dir.display()));
        return;
    }
    let present: Vec<String> = cfg
        .history
        .years()
        .filter(|year| paths.bundle_path(*year).is_file())
        .map(|year| year.to_string())
        .collect();
    if present.is_empty() {
        report.detail("archives.present=none");
    } else {
        report.detail(format!("archives.present={}", present.join(",")));
    }
}

fn report_output(report: &mut CommandReport, paths: &LottoPaths) {
    let path = &paths.output_file;
    if !path.exists() {
        report.detail("output.state=missing");
        return;
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            report.issue(format!("output unreadable ({}): {err}", path.display()));
            return;
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(doc) => {
            report.detail("output.state=present");
            report.detail(format!(
                "output.total_records={}",
                doc.get("total_records").and_then(Value::as_u64).unwrap_or(0)
            ));
            report.detail(format!(
                "output.last_updated={}",
                doc.get("last_updated").and_then(Value::as_str).unwrap_or("unknown")
            ));
        }
        Err(err) => report.issue(format!("output corrupt ({}): {err}", path.display())),
    }
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("build_uuid={}", env!("BUILD_UUID")));
    report.detail(format!("lotto_home={}", paths.lotto_home.display()));
    report.detail(format!("data_dir={}", paths.data_dir.display()));
    report.detail(format!("output_file={}", paths.output_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    report.detail(format!("audit_log={}", audit_log_path(&paths).display()));
    match resolve_config_path() {
        Some(path) => report.detail(format!(
            "config_path={} exists={}",
            path.display(),
            path.is_file()
        )),
        None => report.detail("config_path=unresolved"),
    }

    match load_config() {
        Ok(cfg) => {
            report_config(&mut report, &cfg);
            report_archives(&mut report, &paths, &cfg);
        }
        Err(err) => report.issue(format!("config invalid: {err:#}")),
    }
    report_output(&mut report, &paths);

    for key in unknown_lotto_vars(env::vars().map(|(key, _)| key)) {
        report.issue(format!("unknown environment variable {key}"));
    }

    Ok(report)
}
