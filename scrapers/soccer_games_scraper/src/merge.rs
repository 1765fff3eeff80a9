//! Combining per-source record lists into the single sorted feed.

use tracing::info;

use crate::competition::Competition;
use crate::roster::Roster;
use crate::sources::FlagPolicy;
use crate::types::Match;
use crate::window::DateWindow;

/// Stable ascending sort on the JST kickoff.
pub fn sort_by_kickoff(matches: &mut [Match]) {
    matches.sort_by_key(|m| m.kickoff_datetime_jst);
}

pub fn is_sorted_by_kickoff(matches: &[Match]) -> bool {
    matches
        .windows(2)
        .all(|pair| pair[0].kickoff_datetime_jst <= pair[1].kickoff_datetime_jst)
}

/// Keep the in-window records of a secondary artifact, recomputing the
/// nationality flag when the source's own value is not trusted.
pub fn prepare_secondary(
    records: Vec<Match>,
    policy: FlagPolicy,
    window: &DateWindow,
    roster: &Roster,
) -> Vec<Match> {
    records
        .into_iter()
        .filter(|m| window.contains(&m.kickoff_datetime_jst))
        .map(|mut m| {
            if policy == FlagPolicy::Recompute {
                m.has_japanese_player =
                    roster.match_has_japanese_player(&m.home_team, &m.away_team, &m.competition_name);
            }
            m
        })
        .collect()
}

/// Append every secondary list to the primary one and sort the result.
pub fn combine(primary: Vec<Match>, secondaries: Vec<Vec<Match>>) -> Vec<Match> {
    let mut all = primary;
    for secondary in secondaries {
        all.extend(secondary);
    }
    sort_by_kickoff(&mut all);
    all
}

/// Replace every record of `competition` in `existing` with the in-window
/// part of `fresh`, returning the sorted result.
pub fn refresh_competition(
    existing: Vec<Match>,
    fresh: Vec<Match>,
    competition: &Competition,
    window: &DateWindow,
) -> Vec<Match> {
    let before = existing.len();
    let mut kept: Vec<Match> = existing
        .into_iter()
        .filter(|m| &m.competition_name != competition)
        .collect();
    info!(
        "Removed {} existing {} matches",
        before - kept.len(),
        competition
    );

    let fresh_total = fresh.len();
    let fresh: Vec<Match> = fresh
        .into_iter()
        .filter(|m| window.contains(&m.kickoff_datetime_jst))
        .collect();
    info!(
        "Filtered to {} {} matches (from {})",
        fresh.len(),
        competition,
        fresh_total
    );

    kept.extend(fresh);
    sort_by_kickoff(&mut kept);
    kept
}
