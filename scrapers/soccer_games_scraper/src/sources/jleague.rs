use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use super::{MatchSource, ParsedRows};
use crate::competition::Competition;
use crate::http::fetch_html;
use crate::kickoff::{KickoffError, KickoffJst};
use crate::metrics::MetricsCollector;
use crate::types::{normalize_team_name, Match, STATUS_FINISHED, STATUS_TIMED};

const ID_TAG: &str = "jleague";
const MIN_CELLS: usize = 8;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {}: {:?}", css, e))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Team cells usually wrap the club name in a link; fall back to the cell text.
fn team_text(cell: &ElementRef, link: &Selector) -> String {
    let mut links = cell.select(link).peekable();
    if links.peek().is_some() {
        links.flat_map(|a| a.text()).collect::<String>()
    } else {
        cell_text(cell)
    }
}

/// Parse the schedule table of the J.League data site.
///
/// Columns are season, competition, round, date, kickoff, home, score, away,
/// followed by stadium and broadcast columns that are ignored.
pub fn parse_schedule(html: &str) -> Result<ParsedRows> {
    let document = Html::parse_document(html);
    let row_selector = selector("table tbody tr")?;
    let cell_selector = selector("td")?;
    let link_selector = selector("a")?;

    let mut parsed = ParsedRows::default();

    for (index, row) in document.select(&row_selector).enumerate() {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() < MIN_CELLS {
            debug!("Row {} has {} cells, not a fixture row", index, cells.len());
            continue;
        }

        let round = cell_text(&cells[2]);
        let date = cell_text(&cells[3]);
        let time = cell_text(&cells[4]);
        let score = cell_text(&cells[6]);

        let kickoff = match KickoffJst::parse_jleague(&date, &time) {
            Ok(kickoff) => kickoff,
            Err(KickoffError::Undetermined) | Err(KickoffError::MissingTime) => {
                debug!("Row {} has no fixed kickoff yet ({} {})", index, date, time);
                parsed.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!("Skipping row {}: {}", index, e);
                parsed.skipped += 1;
                continue;
            }
        };

        let status = if !score.is_empty() && score != "-" {
            STATUS_FINISHED
        } else {
            STATUS_TIMED
        };
        let id = format!("{}-{}-{}", ID_TAG, index, kickoff.label_millis());

        parsed.matches.push(Match::scraped(
            id,
            Competition::JLeague,
            (!round.is_empty()).then_some(round),
            kickoff,
            normalize_team_name(&team_text(&cells[5], &link_selector)),
            normalize_team_name(&team_text(&cells[7], &link_selector)),
            true,
            status,
        ));
    }

    Ok(parsed)
}

pub struct JLeagueSource<'a> {
    client: &'a reqwest::Client,
    url: String,
    metrics: &'a MetricsCollector,
}

impl<'a> JLeagueSource<'a> {
    pub fn new(client: &'a reqwest::Client, url: &str, metrics: &'a MetricsCollector) -> Self {
        Self {
            client,
            url: url.to_string(),
            metrics,
        }
    }
}

impl MatchSource for JLeagueSource<'_> {
    fn name(&self) -> &str {
        "J.League"
    }

    async fn fetch(&self) -> Result<Vec<Match>> {
        info!("Fetching J.League data from: {}", self.url);
        let html = fetch_html(self.client, &self.url, self.metrics).await?;
        let parsed = parse_schedule(&html)?;
        self.metrics.record_rows(parsed.matches.len(), parsed.skipped);
        info!(
            "Extracted {} J.League matches ({} rows skipped)",
            parsed.matches.len(),
            parsed.skipped
        );
        Ok(parsed.matches)
    }
}
