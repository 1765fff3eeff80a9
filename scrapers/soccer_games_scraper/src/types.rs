use serde::{Deserialize, Serialize};

use crate::competition::Competition;
use crate::kickoff::KickoffJst;

pub const STATUS_FINISHED: &str = "FINISHED";
pub const STATUS_TIMED: &str = "TIMED";

/// Canonical fixture record shared by every source and artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub api_match_id: String,
    pub competition_name: Competition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition_id: Option<String>,
    #[serde(default)]
    pub round: Option<String>,
    pub kickoff_datetime_jst: KickoffJst,
    pub home_team: String,
    pub away_team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_team_id: Option<String>,
    pub has_japanese_player: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Match {
    /// A record for a scraped source, which has no upstream ids.
    #[allow(clippy::too_many_arguments)]
    pub fn scraped(
        id: String,
        competition: Competition,
        round: Option<String>,
        kickoff: KickoffJst,
        home_team: String,
        away_team: String,
        has_japanese_player: bool,
        status: &str,
    ) -> Self {
        Self {
            api_match_id: id.clone(),
            id,
            competition_name: competition,
            competition_id: None,
            round,
            kickoff_datetime_jst: kickoff,
            home_team,
            away_team,
            home_team_id: None,
            away_team_id: None,
            has_japanese_player,
            status: Some(status.to_string()),
        }
    }
}

/// Collapse runs of whitespace, including the full-width space, into one
/// ASCII space and trim the ends.
pub fn normalize_team_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
