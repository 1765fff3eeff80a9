//! football-data.org v4 client: per-league fixtures and team lists.

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::MatchSource;
use crate::competition::{Competition, API_COMPETITIONS};
use crate::config::{FootballDataConfig, RateLimits};
use crate::http::Throttle;
use crate::kickoff::{KickoffError, KickoffJst};
use crate::metrics::MetricsCollector;
use crate::roster::Roster;
use crate::types::Match;
use crate::window::DateWindow;

const AUTH_HEADER: &str = "X-Auth-Token";
const TBD_TEAM: &str = "TBD";

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMatch {
    pub id: u64,
    pub utc_date: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub matchday: Option<u32>,
    pub home_team: ApiTeamRef,
    pub away_team: ApiTeamRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTeamRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ApiTeamRef {
    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| TBD_TEAM.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TeamsResponse {
    #[serde(default)]
    teams: Vec<Team>,
}

/// Team entry as written to `teams/{code}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub tla: Option<String>,
    #[serde(default)]
    pub crest: Option<String>,
}

/// Convert one API fixture into a canonical record.
pub fn map_match(
    api: &ApiMatch,
    competition: &Competition,
    roster: &Roster,
) -> Result<Match, KickoffError> {
    let kickoff = KickoffJst::parse_utc(&api.utc_date)?;
    let home_team = api.home_team.display_name();
    let away_team = api.away_team.display_name();
    let has_japanese_player =
        roster.match_has_japanese_player(&home_team, &away_team, competition);

    Ok(Match {
        id: api.id.to_string(),
        api_match_id: api.id.to_string(),
        competition_name: competition.clone(),
        competition_id: competition.football_data_id().map(|id| id.to_string()),
        round: api.matchday.filter(|day| *day > 0).map(|day| format!("第{}節", day)),
        kickoff_datetime_jst: kickoff,
        home_team,
        away_team,
        home_team_id: api.home_team.id.map(|id| id.to_string()),
        away_team_id: api.away_team.id.map(|id| id.to_string()),
        has_japanese_player,
        status: api.status.clone(),
    })
}

pub struct FootballDataClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limits: RateLimits,
    throttle: Throttle,
    metrics: MetricsCollector,
}

impl FootballDataClient {
    pub fn new(
        client: reqwest::Client,
        config: &FootballDataConfig,
        api_key: String,
        rate_limits: RateLimits,
        metrics: MetricsCollector,
    ) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            throttle: Throttle::new(rate_limits.league_pause()),
            rate_limits,
            metrics,
        }
    }

    /// GET a JSON document. `Ok(None)` means the API rate limited us and the
    /// back-off has already been slept.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        self.throttle.wait(&self.metrics).await;

        let url = format!("{}{}", self.base_url, path);
        let tracker = self.metrics.record_request_start();
        let response = match self
            .client
            .get(&url)
            .header(AUTH_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracker.finish(false);
                return Err(e).with_context(|| format!("Request to {} failed", url));
            }
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracker.finish(false);
            self.metrics.record_rate_limited();
            let backoff = self.rate_limits.rate_limit_backoff();
            warn!("Rate limit reached for {}, waiting {:?}", path, backoff);
            tokio::time::sleep(backoff).await;
            return Ok(None);
        }
        if !status.is_success() {
            tracker.finish(false);
            bail!("API request failed: {} for {}", status, path);
        }

        let body = response.json::<T>().await;
        tracker.finish(body.is_ok());
        let body = body.with_context(|| format!("Invalid JSON from {}", path))?;
        Ok(Some(body))
    }

    pub async fn league_matches(
        &self,
        competition: &Competition,
        window: &DateWindow,
    ) -> Result<Vec<ApiMatch>> {
        let Some(id) = competition.football_data_id() else {
            bail!("{} is not served by football-data.org", competition);
        };
        let query = [
            ("dateFrom", window.start.date().format("%Y-%m-%d").to_string()),
            ("dateTo", window.end.date().format("%Y-%m-%d").to_string()),
        ];
        let response: Option<MatchesResponse> = self
            .get_json(&format!("/competitions/{}/matches", id), &query)
            .await?;
        Ok(response.map(|r| r.matches).unwrap_or_default())
    }

    pub async fn league_teams(&self, competition: &Competition) -> Result<Vec<Team>> {
        let Some(code) = competition.football_data_code() else {
            bail!("{} is not served by football-data.org", competition);
        };
        let response: Option<TeamsResponse> = self
            .get_json(&format!("/competitions/{}/teams", code), &[])
            .await?;
        Ok(response.map(|r| r.teams).unwrap_or_default())
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

/// Fixtures for every API competition within a date window.
pub struct FootballDataSource<'a> {
    api: &'a FootballDataClient,
    roster: &'a Roster,
    window: DateWindow,
}

impl<'a> FootballDataSource<'a> {
    pub fn new(api: &'a FootballDataClient, roster: &'a Roster, window: DateWindow) -> Self {
        Self { api, roster, window }
    }

    fn map_league(&self, competition: &Competition, fixtures: &[ApiMatch]) -> Vec<Match> {
        let mut skipped = 0;
        let mapped: Vec<Match> = fixtures
            .iter()
            .filter_map(|fixture| match map_match(fixture, competition, self.roster) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping match {} in {}: {}", fixture.id, competition, e);
                    skipped += 1;
                    None
                }
            })
            .collect();
        self.api.metrics().record_rows(mapped.len(), skipped);
        mapped
    }
}

impl MatchSource for FootballDataSource<'_> {
    fn name(&self) -> &str {
        "football-data.org"
    }

    async fn fetch(&self) -> Result<Vec<Match>> {
        info!(
            "Fetching matches from {} to {}",
            self.window.start.date(),
            self.window.end.date()
        );
        let mut all = Vec::new();

        for competition in API_COMPETITIONS.iter() {
            info!("Fetching {}...", competition);
            let fixtures = match self.api.league_matches(competition, &self.window).await {
                Ok(fixtures) => fixtures,
                Err(e) => {
                    error!("Error fetching {}: {:#}", competition, e);
                    self.api.metrics().record_error(format!("{}: {:#}", competition, e));
                    continue;
                }
            };
            if fixtures.is_empty() {
                info!("No matches found for {}", competition);
                continue;
            }
            info!("Found {} matches for {}", fixtures.len(), competition);
            all.extend(self.map_league(competition, &fixtures));
        }

        Ok(all)
    }
}
