use crate::error::LottoError;
use crate::lotto::game::Game;
use anyhow::{Result, anyhow};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub first_year: i32,
    pub last_year: i32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            first_year: 2021,
            last_year: 2050,
        }
    }
}

impl HistoryConfig {
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.first_year..=self.last_year
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub enabled: bool,
    pub api_base: String,
    pub page_size: u32,
    pub lookback_months: u32,
    pub timeout_secs: u64,
    pub pacing_ms: u64,
    pub user_agent: String,
    pub referer: String,
    pub tls_insecure: bool,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://api.taiwanlottery.com/TLCAPIWeB/Lottery".to_string(),
            page_size: 200,
            lookback_months: 3,
            timeout_secs: 30,
            pacing_ms: 500,
            user_agent: "Mozilla/5.0".to_string(),
            referer: "https://www.taiwanlottery.com/".to_string(),
            tls_insecure: false,
        }
    }
}

impl LiveConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JackpotConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for JackpotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.taiwanlottery.com/lotto/result".to_string(),
            timeout_secs: 20,
        }
    }
}

impl JackpotConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// IANA zone for `last_updated` and the lookback window; system local
    /// time when unset.
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LottoConfig {
    pub games: Vec<String>,
    pub history: HistoryConfig,
    pub live: LiveConfig,
    pub jackpot: JackpotConfig,
    pub output: OutputConfig,
}

impl Default for LottoConfig {
    fn default() -> Self {
        Self {
            games: Game::RANKED
                .iter()
                .map(|game| game.api_code().to_string())
                .collect(),
            history: HistoryConfig::default(),
            live: LiveConfig::default(),
            jackpot: JackpotConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl LottoConfig {
    pub fn ranked_games(&self) -> Vec<Game> {
        let listed: Vec<Game> = self
            .games
            .iter()
            .filter_map(|code| Game::from_api_code(code))
            .collect();
        Game::RANKED
            .into_iter()
            .filter(|game| listed.contains(game))
            .collect()
    }

    pub fn timezone(&self) -> Result<Option<Tz>, LottoError> {
        match self.output.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|_| LottoError::UnknownTimezone(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialLottoConfig {
    games: Option<Vec<String>>,
    history: Option<HistoryConfig>,
    live: Option<LiveConfig>,
    jackpot: Option<JackpotConfig>,
    output: Option<OutputConfig>,
}

fn env_or_i32(var: &str, fallback: i32) -> i32 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<i32>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_u32(var: &str, fallback: u32) -> u32 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u32>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => {
            let trimmed = v.trim();
            match trimmed {
                "1" | "true" | "TRUE" | "yes" | "on" => true,
                "0" | "false" | "FALSE" | "no" | "off" => false,
                _ => fallback,
            }
        }
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_optional_string(var: &str, fallback: Option<String>) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => fallback,
    }
}

fn env_or_csv_list(var: &str, fallback: &[String]) -> Vec<String> {
    match env::var(var) {
        Ok(v) => {
            let out = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>();
            if out.is_empty() {
                fallback.to_vec()
            } else {
                out
            }
        }
        Err(_) => fallback.to_vec(),
    }
}

fn validate(cfg: &LottoConfig) -> Result<()> {
    if cfg.games.is_empty() {
        return Err(anyhow!("invalid games: list at least one game code"));
    }
    for code in &cfg.games {
        if Game::from_api_code(code).is_none() {
            return Err(LottoError::UnknownGame(code.clone()).into());
        }
    }
    if cfg.history.first_year > cfg.history.last_year {
        return Err(anyhow!(
            "invalid history years: require first_year <= last_year"
        ));
    }
    if cfg.live.page_size == 0 {
        return Err(anyhow!("invalid live page size: must be >= 1"));
    }
    if cfg.live.lookback_months == 0 {
        return Err(anyhow!("invalid live lookback: must be >= 1 month"));
    }
    if cfg.live.api_base.trim().is_empty() {
        return Err(anyhow!("invalid live api base: cannot be empty"));
    }
    if cfg.live.timeout_secs == 0 || cfg.jackpot.timeout_secs == 0 {
        return Err(anyhow!("invalid timeout: must be >= 1 second"));
    }
    if cfg.live.timeout_secs <= cfg.jackpot.timeout_secs {
        return Err(anyhow!(
            "invalid timeouts: require jackpot timeout < live api timeout"
        ));
    }
    if cfg.jackpot.base_url.trim().is_empty() {
        return Err(anyhow!("invalid jackpot base url: cannot be empty"));
    }
    cfg.timezone()?;
    Ok(())
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("LOTTO_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".lotto").join("lotto.toml"))
}

fn merge_file_config(base: &mut LottoConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let parsed: PartialLottoConfig = toml::from_str(&raw).map_err(|err| {
        LottoError::InvalidConfig(format!("failed to parse {}: {err}", path.display()))
    })?;
    if let Some(games) = parsed.games {
        base.games = games;
    }
    if let Some(history) = parsed.history {
        base.history = history;
    }
    if let Some(live) = parsed.live {
        base.live = live;
    }
    if let Some(jackpot) = parsed.jackpot {
        base.jackpot = jackpot;
    }
    if let Some(output) = parsed.output {
        base.output = output;
    }
    Ok(())
}

fn apply_env_overrides(cfg: &mut LottoConfig) {
    cfg.games = env_or_csv_list("LOTTO_GAMES", &cfg.games);
    cfg.history.first_year = env_or_i32("LOTTO_HISTORY_FIRST_YEAR", cfg.history.first_year);
    cfg.history.last_year = env_or_i32("LOTTO_HISTORY_LAST_YEAR", cfg.history.last_year);
    cfg.live.enabled = env_or_bool("LOTTO_LIVE_ENABLED", cfg.live.enabled);
    cfg.live.api_base = env_or_string("LOTTO_API_BASE", &cfg.live.api_base);
    cfg.live.page_size = env_or_u32("LOTTO_API_PAGE_SIZE", cfg.live.page_size);
    cfg.live.lookback_months = env_or_u32("LOTTO_API_LOOKBACK_MONTHS", cfg.live.lookback_months);
    cfg.live.timeout_secs = env_or_u64("LOTTO_API_TIMEOUT_SECS", cfg.live.timeout_secs);
    cfg.live.pacing_ms = env_or_u64("LOTTO_API_PACING_MS", cfg.live.pacing_ms);
    cfg.live.user_agent = env_or_string("LOTTO_USER_AGENT", &cfg.live.user_agent);
    cfg.live.referer = env_or_string("LOTTO_REFERER", &cfg.live.referer);
    cfg.live.tls_insecure = env_or_bool("LOTTO_TLS_INSECURE", cfg.live.tls_insecure);
    cfg.jackpot.enabled = env_or_bool("LOTTO_JACKPOT_ENABLED", cfg.jackpot.enabled);
    cfg.jackpot.base_url = env_or_string("LOTTO_JACKPOT_BASE", &cfg.jackpot.base_url);
    cfg.jackpot.timeout_secs =
        env_or_u64("LOTTO_JACKPOT_TIMEOUT_SECS", cfg.jackpot.timeout_secs);
    cfg.output.timezone = env_or_optional_string("LOTTO_TIMEZONE", cfg.output.timezone.take());
}

pub fn load_config() -> Result<LottoConfig> {
    let mut cfg = LottoConfig::default();
    merge_file_config(&mut cfg)?;
    apply_env_overrides(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}
