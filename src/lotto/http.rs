use crate::error::FetchError;
use crate::lotto::config::{JackpotConfig, LiveConfig};
use crate::lotto::game::Game;
use crate::lotto::jackpot::JackpotSource;
use crate::lotto::live::{LiveSource, MonthWindow, parse_live_envelope};
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use serde_json::Value;
use std::time::Duration;

fn build_client(live: &LiveConfig, timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&live.user_agent).context("invalid user agent header")?,
    );
    headers.insert(
        REFERER,
        HeaderValue::from_str(&live.referer).context("invalid referer header")?,
    );
    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .danger_accept_invalid_certs(live.tls_insecure)
        .build()
        .context("failed to build http client")
}

fn ensure_success(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    Ok(response)
}

pub struct HttpLiveSource {
    client: Client,
    api_base: String,
    page_size: u32,
}

impl HttpLiveSource {
    pub fn new(live: &LiveConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(live, live.timeout())?,
            api_base: live.api_base.trim_end_matches('/').to_string(),
            page_size: live.page_size,
        })
    }

    pub fn request_url(&self, game: Game, window: &MonthWindow) -> String {
        format!(
            "{}/{}Result?period&startMonth={}&endMonth={}&pageNum=1&pageSize={}",
            self.api_base,
            game.api_code(),
            window.start,
            window.end,
            self.page_size
        )
    }
}

impl LiveSource for HttpLiveSource {
    fn fetch(&self, game: Game, window: &MonthWindow) -> Result<Vec<Value>, FetchError> {
        let url = self.request_url(game, window);
        let response = ensure_success(self.client.get(&url).send()?)?;
        let body: Value = response
            .json()
            .map_err(|err| FetchError::Body(err.to_string()))?;
        parse_live_envelope(game, &body)
    }
}

pub struct HttpJackpotSource {
    client: Client,
    base_url: String,
}

impl HttpJackpotSource {
    pub fn new(live: &LiveConfig, jackpot: &JackpotConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(live, jackpot.timeout())?,
            base_url: jackpot.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn page_url(&self, game: Game) -> Option<String> {
        let slug = game.jackpot_slug()?;
        Some(format!("{}/{slug}", self.base_url))
    }
}

impl JackpotSource for HttpJackpotSource {
    fn fetch_page(&self, game: Game) -> Result<String, FetchError> {
        let Some(url) = self.page_url(game) else {
            return Err(FetchError::Body(format!("{game} has no jackpot page")));
        };
        let response = ensure_success(self.client.get(&url).send()?)?;
        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn live_url_carries_window_and_paging() {
        let live = LiveConfig {
            api_base: "https://api.example.test/Lottery/".to_string(),
            page_size: 50,
            ..LiveConfig::default()
        };
        let source = HttpLiveSource::new(&live).expect("client");
        let today = NaiveDate::from_ymd_opt(2024, 1, 9).expect("date");
        let window = MonthWindow::ending_at(today, 3);
        assert_eq!(
            source.request_url(Game::ThreeStar, &window),
            "https://api.example.test/Lottery/3DResult?period&startMonth=2023-11&endMonth=2024-01&pageNum=1&pageSize=50"
        );
    }

    #[test]
    fn jackpot_urls_exist_only_for_rolling_games() {
        let source =
            HttpJackpotSource::new(&LiveConfig::default(), &JackpotConfig::default()).expect("client");
        assert_eq!(
            source.page_url(Game::SuperLotto638).as_deref(),
            Some("https://www.taiwanlottery.com/lotto/result/super_lotto638")
        );
        assert!(source.page_url(Game::Daily539).is_none());
    }
}
