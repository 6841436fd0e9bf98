use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LottoPaths {
    pub lotto_home: PathBuf,
    pub data_dir: PathBuf,
    pub output_file: PathBuf,
    pub logs_dir: PathBuf,
}

impl LottoPaths {
    pub fn bundle_path(&self, year: i32) -> PathBuf {
        bundle_path(&self.data_dir, year)
    }
}

pub fn bundle_path(data_dir: &Path, year: i32) -> PathBuf {
    data_dir.join(format!("{year}.zip"))
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<LottoPaths> {
    let lotto_home = match env::var("LOTTO_HOME") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => required_home_dir()?.join("lotto"),
    };

    let data_dir = env_or_default_path("LOTTO_DATA_DIR", lotto_home.join("data"));
    let output_file =
        env_or_default_path("LOTTO_OUTPUT_FILE", data_dir.join("lottery-data.json"));
    let logs_dir = env_or_default_path("LOTTO_LOGS_DIR", lotto_home.join("logs"));

    Ok(LottoPaths {
        lotto_home,
        data_dir,
        output_file,
        logs_dir,
    })
}
