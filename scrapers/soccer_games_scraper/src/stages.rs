//! One function per pipeline entry point. Each stage is a single sequential
//! pass that ends by writing flat JSON under the data directory.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::competition::{Competition, API_COMPETITIONS};
use crate::config::ScraperConfig;
use crate::error::PipelineError;
use crate::filter::{format_line, MatchFilter};
use crate::http::build_client;
use crate::merge::{combine, prepare_secondary, refresh_competition};
use crate::metrics::MetricsCollector;
use crate::roster::{Roster, RosterReport};
use crate::sources::football_data::{FootballDataClient, FootballDataSource};
use crate::sources::jleague::JLeagueSource;
use crate::sources::proleague::ProLeagueSource;
use crate::sources::{collect_best_effort, MatchSource, SecondarySource};
use crate::store::{read_matches, write_json, write_matches, ArtifactPaths};
use crate::types::Match;
use crate::window::{DateWindow, FETCH_WINDOW_DAYS, REMERGE_WINDOW_DAYS};

const API_KEY_VAR: &str = "FOOTBALL_DATA_KEY";

/// What a stage produced. `written` is empty when nothing was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub records: usize,
    pub written: Vec<PathBuf>,
}

impl StageReport {
    fn skipped() -> Self {
        Self {
            records: 0,
            written: Vec::new(),
        }
    }
}

fn api_client(config: &ScraperConfig, metrics: &MetricsCollector) -> Result<FootballDataClient> {
    let api_key = config
        .football_data
        .api_key
        .clone()
        .ok_or(PipelineError::MissingCredential(API_KEY_VAR))?;
    Ok(FootballDataClient::new(
        build_client(&config.scraping)?,
        &config.football_data,
        api_key,
        config.rate_limits.clone(),
        metrics.clone(),
    ))
}

/// Load a secondary artifact for the combined feed. A missing or unreadable
/// file contributes nothing.
fn load_secondary(
    paths: &ArtifactPaths,
    source: SecondarySource,
    window: &DateWindow,
    roster: &Roster,
) -> Vec<Match> {
    let path = paths.secondary(source);
    if !path.exists() {
        info!("{} data file not found, skipping...", source.competition());
        return Vec::new();
    }
    match read_matches(&path) {
        Ok(records) => {
            let total = records.len();
            let prepared = prepare_secondary(records, source.flag_policy(), window, roster);
            info!(
                "Loaded {} {} matches (filtered from {})",
                prepared.len(),
                source.competition(),
                total
            );
            prepared
        }
        Err(e) => {
            error!("Error loading {} data: {:#}", source.competition(), e);
            Vec::new()
        }
    }
}

/// Fetch every API league, fold in the scraped artifacts and write `matches.json`.
pub async fn run_fetch_matches(
    config: &ScraperConfig,
    roster: &Roster,
    now: DateTime<Utc>,
) -> Result<StageReport> {
    info!("Starting to fetch match data...");
    let metrics = MetricsCollector::new();
    let api = api_client(config, &metrics)?;
    let paths = ArtifactPaths::new(&config.output.data_dir);
    let window = DateWindow::rolling(now, FETCH_WINDOW_DAYS);

    let primary = collect_best_effort(&FootballDataSource::new(&api, roster, window)).await;
    info!("Fetched {} matches from football-data.org", primary.len());

    let secondaries = SecondarySource::ALL
        .into_iter()
        .map(|source| load_secondary(&paths, source, &window, roster))
        .collect();
    let all = combine(primary, secondaries);
    info!("Total matches: {}", all.len());
    metrics.log_summary("fetch_matches");

    if all.is_empty() {
        warn!("No matches to save");
        return Ok(StageReport::skipped());
    }
    let path = paths.matches();
    write_matches(&path, &all)?;
    Ok(StageReport {
        records: all.len(),
        written: vec![path],
    })
}

async fn run_scrape<S: MatchSource>(
    source: &S,
    target: SecondarySource,
    config: &ScraperConfig,
    metrics: &MetricsCollector,
    now: DateTime<Utc>,
) -> Result<StageReport> {
    let window = DateWindow::rolling(now, FETCH_WINDOW_DAYS);
    info!("Date range: {} to {}", window.start.date(), window.end.date());

    let fetched = collect_best_effort(source).await;
    let in_window: Vec<Match> = fetched
        .into_iter()
        .filter(|m| window.contains(&m.kickoff_datetime_jst))
        .collect();
    info!("Filtered to {} matches in date range", in_window.len());
    metrics.log_summary(source.name());

    if in_window.is_empty() {
        warn!("No {} matches to save", target.competition());
        return Ok(StageReport::skipped());
    }
    let path = ArtifactPaths::new(&config.output.data_dir).secondary(target);
    write_matches(&path, &in_window)?;
    Ok(StageReport {
        records: in_window.len(),
        written: vec![path],
    })
}

pub async fn run_fetch_jleague(config: &ScraperConfig, now: DateTime<Utc>) -> Result<StageReport> {
    info!("Starting to fetch J.League match data...");
    let metrics = MetricsCollector::new();
    let client = build_client(&config.scraping)?;
    let source = JLeagueSource::new(&client, &config.scraping.jleague_url, &metrics);
    run_scrape(&source, SecondarySource::JLeague, config, &metrics, now).await
}

pub async fn run_fetch_proleague(config: &ScraperConfig, now: DateTime<Utc>) -> Result<StageReport> {
    info!("Starting to fetch Jupiler Pro League match data...");
    let metrics = MetricsCollector::new();
    let client = build_client(&config.scraping)?;
    let source = ProLeagueSource::new(&client, &config.scraping.proleague_url, &metrics);
    run_scrape(&source, SecondarySource::ProLeague, config, &metrics, now).await
}

/// Replace one scraped competition inside `matches.json` with its latest
/// artifact. Both files must exist.
pub fn run_merge(
    config: &ScraperConfig,
    roster: &Roster,
    source: SecondarySource,
    now: DateTime<Utc>,
) -> Result<StageReport> {
    let competition = source.competition();
    info!("Merging {} data into matches.json...", competition);
    let paths = ArtifactPaths::new(&config.output.data_dir);

    let matches_path = paths.matches();
    if !matches_path.exists() {
        return Err(PipelineError::MissingInput(matches_path).into());
    }
    let existing = read_matches(&matches_path)?;
    info!("Loaded {} matches from matches.json", existing.len());

    let source_path = paths.secondary(source);
    if !source_path.exists() {
        return Err(PipelineError::MissingInput(source_path).into());
    }
    let fresh = read_matches(&source_path)?;
    info!("Loaded {} {} matches", fresh.len(), competition);

    let window = DateWindow::rolling(now, REMERGE_WINDOW_DAYS);
    let fresh = prepare_secondary(fresh, source.flag_policy(), &window, roster);
    let merged = refresh_competition(existing, fresh, &competition, &window);

    write_matches(&matches_path, &merged)?;
    info!(
        "{} matches: {}",
        competition,
        merged
            .iter()
            .filter(|m| m.competition_name == competition)
            .count()
    );
    Ok(StageReport {
        records: merged.len(),
        written: vec![matches_path],
    })
}

pub fn run_merge_jleague(
    config: &ScraperConfig,
    roster: &Roster,
    now: DateTime<Utc>,
) -> Result<StageReport> {
    run_merge(config, roster, SecondarySource::JLeague, now)
}

/// Write `teams/{code}.json` for every API competition that returns teams.
pub async fn run_fetch_teams(config: &ScraperConfig) -> Result<StageReport> {
    info!("Starting to fetch team data...");
    let metrics = MetricsCollector::new();
    let api = api_client(config, &metrics)?;
    let paths = ArtifactPaths::new(&config.output.data_dir);
    let mut report = StageReport::skipped();

    for competition in API_COMPETITIONS.iter() {
        info!("Fetching teams for {}...", competition);
        let teams = match api.league_teams(competition).await {
            Ok(teams) => teams,
            Err(e) => {
                error!("Error fetching {}: {:#}", competition, e);
                metrics.record_error(format!("{}: {:#}", competition, e));
                continue;
            }
        };
        if teams.is_empty() {
            info!("No teams found for {}", competition);
            continue;
        }
        let Some(path) = paths.teams(competition) else {
            continue;
        };
        info!("Found {} teams for {}", teams.len(), competition);
        write_json(&path, &teams)?;
        info!("Successfully saved teams to {}", path.display());
        report.records += teams.len();
        report.written.push(path);
    }

    metrics.log_summary("fetch_teams");
    Ok(report)
}

pub fn run_roster_report(roster: &Roster) -> RosterReport {
    let report = roster.report();
    info!("Roster: {} leagues", report.leagues);
    info!("Total teams: {}", report.teams);
    for name in &report.unknown_competitions {
        warn!("Roster competition {:?} is not a known competition", name);
    }
    report
}

/// Lines of `matches.json` that pass `filter`.
pub fn run_show(config: &ScraperConfig, filter: &MatchFilter) -> Result<Vec<String>> {
    let paths = ArtifactPaths::new(&config.output.data_dir);
    let path = paths.matches();
    if !path.exists() {
        return Err(PipelineError::MissingInput(path).into());
    }
    let records = read_matches(&path)?;
    Ok(filter.apply(&records).into_iter().map(format_line).collect())
}

/// Parse a `--competition` argument, accepting either a name or an API code.
pub fn competition_arg(raw: &str) -> Competition {
    API_COMPETITIONS
        .iter()
        .find(|c| c.football_data_code().is_some_and(|code| code.eq_ignore_ascii_case(raw)))
        .cloned()
        .unwrap_or_else(|| Competition::from(raw))
}
