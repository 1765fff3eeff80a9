use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_JLEAGUE_URL: &str = "https://data.j-league.or.jp/SFMS01/search?competition_years=20261&competition_frame_ids=35&competition_ids=707&competition_ids=708&competition_ids=709&tv_relay_station_name=";
pub const DEFAULT_PROLEAGUE_URL: &str = "https://www.proleague.be/jpl-kalender";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FootballDataConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for FootballDataConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.football-data.org/v4".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimits {
    /// Minimum gap between two league requests to the API.
    pub league_pause_ms: u64,
    /// How long to wait after an HTTP 429 before moving on.
    pub rate_limit_backoff_secs: u64,
}

impl RateLimits {
    pub fn league_pause(&self) -> Duration {
        Duration::from_millis(self.league_pause_ms)
    }

    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_secs(self.rate_limit_backoff_secs)
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            league_pause_ms: 1000,
            rate_limit_backoff_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapingConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub jleague_url: String,
    pub proleague_url: String,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            request_timeout_secs: 30,
            jleague_url: DEFAULT_JLEAGUE_URL.to_string(),
            proleague_url: DEFAULT_PROLEAGUE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("public/data"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScraperConfig {
    pub football_data: FootballDataConfig,
    pub rate_limits: RateLimits,
    pub scraping: ScrapingConfig,
    pub output: OutputConfig,
    pub roster_path: Option<PathBuf>,
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.football_data.api_key = non_empty_var("FOOTBALL_DATA_KEY")
            .or_else(|| non_empty_var("FOOTBALL_DATA_API_KEY"));
        if let Some(base_url) = non_empty_var("FOOTBALL_DATA_BASE_URL") {
            config.football_data.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(pause) = parsed_var::<u64>("LEAGUE_PAUSE_MS") {
            config.rate_limits.league_pause_ms = pause;
        }
        if let Some(backoff) = parsed_var::<u64>("RATE_LIMIT_BACKOFF_SECS") {
            config.rate_limits.rate_limit_backoff_secs = backoff;
        }
        if let Some(user_agent) = non_empty_var("SCRAPER_USER_AGENT") {
            config.scraping.user_agent = user_agent;
        }
        if let Some(timeout) = parsed_var::<u64>("SCRAPER_TIMEOUT_SECS") {
            config.scraping.request_timeout_secs = timeout;
        }
        if let Some(url) = non_empty_var("JLEAGUE_URL") {
            config.scraping.jleague_url = url;
        }
        if let Some(url) = non_empty_var("PROLEAGUE_URL") {
            config.scraping.proleague_url = url;
        }
        if let Some(dir) = non_empty_var("DATA_DIR") {
            config.output.data_dir = PathBuf::from(dir);
        }
        config.roster_path = non_empty_var("ROSTER_PATH").map(PathBuf::from);

        config
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|value| value.trim().parse::<T>().ok())
}
