use anyhow::{anyhow, Context, Result};
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{MatchSource, ParsedRows};
use crate::competition::Competition;
use crate::http::fetch_html;
use crate::kickoff::KickoffJst;
use crate::metrics::MetricsCollector;
use crate::types::{normalize_team_name, Match, STATUS_FINISHED, STATUS_TIMED};

const ID_TAG: &str = "proleague";
const MATCHES_POINTER: &str = "/props/pageProps/data/page/grids/0/areas/0/modules/0/data";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextDataMatch {
    #[serde(default)]
    home_team: Option<NextDataTeam>,
    #[serde(default)]
    away_team: Option<NextDataTeam>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    period: Option<NextDataPeriod>,
}

#[derive(Debug, Default, Deserialize)]
struct NextDataTeam {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NextDataPeriod {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

fn team_name(team: &Option<NextDataTeam>) -> Option<String> {
    team.as_ref()
        .and_then(|t| t.name.as_deref())
        .map(normalize_team_name)
        .filter(|name| !name.is_empty())
}

/// Pull the `__NEXT_DATA__` JSON document out of a rendered Next.js page.
pub fn extract_next_data(html: &str) -> Result<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__")
        .map_err(|e| anyhow!("Invalid selector: {:?}", e))?;
    let script = document
        .select(&selector)
        .next()
        .ok_or_else(|| anyhow!("__NEXT_DATA__ not found in HTML"))?;
    let raw: String = script.text().collect();
    serde_json::from_str(&raw).context("__NEXT_DATA__ is not valid JSON")
}

/// Parse the calendar page. Kickoffs in the page are UTC instants.
pub fn parse_calendar(html: &str) -> Result<ParsedRows> {
    let next_data = extract_next_data(html)?;
    let module_data = next_data.pointer(MATCHES_POINTER);
    let raw_matches = module_data
        .and_then(|data| data.get("matches"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut parsed = ParsedRows::default();
    if raw_matches.is_empty() {
        let keys: Vec<String> = module_data
            .and_then(Value::as_object)
            .map(|data| data.keys().cloned().collect())
            .unwrap_or_default();
        warn!("No matches in __NEXT_DATA__. module data keys: {:?}", keys);
        return Ok(parsed);
    }

    for (index, raw) in raw_matches.into_iter().enumerate() {
        let fixture: NextDataMatch = match serde_json::from_value(raw) {
            Ok(fixture) => fixture,
            Err(e) => {
                warn!("Skipping match {}: {}", index, e);
                parsed.skipped += 1;
                continue;
            }
        };

        let (Some(home), Some(away)) = (team_name(&fixture.home_team), team_name(&fixture.away_team))
        else {
            parsed.skipped += 1;
            continue;
        };
        let Some(timestamp) = fixture.time.as_deref().or(fixture.date.as_deref()) else {
            parsed.skipped += 1;
            continue;
        };
        let kickoff = match KickoffJst::parse_utc(timestamp) {
            Ok(kickoff) => kickoff,
            Err(e) => {
                warn!("Skipping match {} ({} - {}): {}", index, home, away, e);
                parsed.skipped += 1;
                continue;
            }
        };

        let finished = fixture
            .period
            .and_then(|period| period.kind)
            .is_some_and(|kind| kind == "FullTime");
        let id = format!("{}-{}-{}", ID_TAG, index, kickoff.label_millis());

        parsed.matches.push(Match::scraped(
            id,
            Competition::JupilerProLeague,
            None,
            kickoff,
            home,
            away,
            false,
            if finished { STATUS_FINISHED } else { STATUS_TIMED },
        ));
    }

    Ok(parsed)
}

pub struct ProLeagueSource<'a> {
    client: &'a reqwest::Client,
    url: String,
    metrics: &'a MetricsCollector,
}

impl<'a> ProLeagueSource<'a> {
    pub fn new(client: &'a reqwest::Client, url: &str, metrics: &'a MetricsCollector) -> Self {
        Self {
            client,
            url: url.to_string(),
            metrics,
        }
    }
}

impl MatchSource for ProLeagueSource<'_> {
    fn name(&self) -> &str {
        "Jupiler Pro League"
    }

    async fn fetch(&self) -> Result<Vec<Match>> {
        info!("Fetching Pro League data from: {}", self.url);
        let html = fetch_html(self.client, &self.url, self.metrics).await?;
        let parsed = parse_calendar(&html)?;
        self.metrics.record_rows(parsed.matches.len(), parsed.skipped);
        info!(
            "Extracted {} Pro League matches ({} skipped)",
            parsed.matches.len(),
            parsed.skipped
        );
        Ok(parsed.matches)
    }
}
