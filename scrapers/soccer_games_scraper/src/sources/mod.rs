pub mod football_data;
pub mod jleague;
pub mod proleague;

use anyhow::Result;
use tracing::{error, info};

use crate::competition::Competition;
use crate::types::Match;

/// Anything that yields canonical match records for one upstream.
#[allow(async_fn_in_trait)]
pub trait MatchSource {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<Match>>;
}

/// Run a source and turn any failure into an empty, logged result.
pub async fn collect_best_effort<S: MatchSource>(source: &S) -> Vec<Match> {
    match source.fetch().await {
        Ok(matches) => {
            info!("{}: {} matches", source.name(), matches.len());
            matches
        }
        Err(e) => {
            error!("{}: fetch failed: {:#}", source.name(), e);
            Vec::new()
        }
    }
}

/// Records recovered from one page, plus the number of rows dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRows {
    pub matches: Vec<Match>,
    pub skipped: usize,
}

/// Whether a secondary artifact's `has_japanese_player` values are kept as-is
/// or recomputed from the roster when merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagPolicy {
    Trusted,
    Recompute,
}

/// A scraped source whose artifact is merged into the combined feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondarySource {
    JLeague,
    ProLeague,
}

impl SecondarySource {
    pub const ALL: [SecondarySource; 2] = [SecondarySource::JLeague, SecondarySource::ProLeague];

    pub fn competition(&self) -> Competition {
        match self {
            SecondarySource::JLeague => Competition::JLeague,
            SecondarySource::ProLeague => Competition::JupilerProLeague,
        }
    }

    pub fn artifact_name(&self) -> &'static str {
        match self {
            SecondarySource::JLeague => "matches.jleague.json",
            SecondarySource::ProLeague => "matches.proleague.json",
        }
    }

    pub fn flag_policy(&self) -> FlagPolicy {
        match self {
            SecondarySource::JLeague => FlagPolicy::Trusted,
            SecondarySource::ProLeague => FlagPolicy::Recompute,
        }
    }
}
