//! Curated list of clubs with Japanese players, keyed by competition.
//!
//! The list lives in `data/japanese.manual.json` and is compiled into the
//! binary. Edit the JSON file, not this module.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::competition::Competition;

const EMBEDDED_ROSTER: &str = include_str!("../data/japanese.manual.json");
const JAPAN_TOKENS: [&str; 2] = ["Japan", "日本"];

#[derive(Debug, Clone, Default)]
pub struct Roster {
    teams: HashMap<Competition, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterReport {
    pub leagues: usize,
    pub teams: usize,
    pub unknown_competitions: Vec<String>,
}

impl Roster {
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_ROSTER).context("Embedded roster is not valid JSON")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Roster file {} is not valid JSON", path.display()))
    }

    /// Use the file at `path` when given, otherwise the embedded list.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, Vec<String>> = serde_json::from_str(raw)?;
        let teams = parsed
            .into_iter()
            .map(|(name, patterns)| (Competition::from(name), patterns))
            .collect();
        Ok(Self { teams })
    }

    pub fn patterns(&self, competition: &Competition) -> &[String] {
        self.teams
            .get(competition)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether `team` is known to field a Japanese player in `competition`.
    ///
    /// A pattern matches when either string contains the other, so both
    /// "FC Bayern München" and a bare "Bayern" hit the "Bayern" entry.
    pub fn has_japanese_player(&self, team: &str, competition: &Competition) -> bool {
        if JAPAN_TOKENS.iter().any(|token| team.contains(token)) {
            return true;
        }
        if team.is_empty() {
            return false;
        }
        self.patterns(competition)
            .iter()
            .any(|pattern| team.contains(pattern.as_str()) || pattern.contains(team))
    }

    pub fn match_has_japanese_player(
        &self,
        home_team: &str,
        away_team: &str,
        competition: &Competition,
    ) -> bool {
        let home = self.has_japanese_player(home_team, competition);
        let away = self.has_japanese_player(away_team, competition);
        debug!(
            "Roster check in {}: {}={} {}={}",
            competition, home_team, home, away_team, away
        );
        home || away
    }

    pub fn report(&self) -> RosterReport {
        let mut unknown_competitions: Vec<String> = self
            .teams
            .keys()
            .filter(|competition| !competition.is_known())
            .map(|competition| competition.name().to_string())
            .collect();
        unknown_competitions.sort();

        RosterReport {
            leagues: self.teams.len(),
            teams: self.teams.values().map(Vec::len).sum(),
            unknown_competitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn roster() -> Roster {
        Roster::embedded().unwrap()
    }

    #[test]
    fn test_substring_match_on_club_name() {
        assert!(roster().has_japanese_player("FC Bayern München", &Competition::Bundesliga));
    }

    #[test]
    fn test_unlisted_team_is_false() {
        assert!(!roster().has_japanese_player("AS Roma", &Competition::SerieA));
    }

    #[test]
    fn test_japan_token_always_matches() {
        let roster = roster();
        assert!(roster.has_japanese_player("Japan", &Competition::WorldCup));
        assert!(roster.has_japanese_player("日本代表", &Competition::Other("Friendly".into())));
    }

    #[test]
    fn test_team_contained_in_pattern() {
        // "Leeds" is a substring of the "Leeds United" pattern.
        assert!(roster().has_japanese_player("Leeds", &Competition::PremierLeague));
    }

    #[test]
    fn test_unknown_competition_has_no_patterns() {
        let roster = roster();
        let competition = Competition::Other("Scottish Premiership".into());
        assert!(roster.patterns(&competition).is_empty());
        assert!(!roster.has_japanese_player("Celtic FC", &competition));
    }

    #[test]
    fn test_empty_team_name_never_matches() {
        assert!(!roster().has_japanese_player("", &Competition::Bundesliga));
    }

    #[test]
    fn test_either_side_flags_the_match() {
        let roster = roster();
        assert!(roster.match_has_japanese_player(
            "Olympique de Marseille",
            "AS Monaco FC",
            &Competition::Ligue1
        ));
        assert!(!roster.match_has_japanese_player(
            "Olympique de Marseille",
            "Paris Saint-Germain FC",
            &Competition::Ligue1
        ));
    }

    #[test]
    fn test_embedded_roster_report() {
        let report = roster().report();
        assert_eq!(report.leagues, 11);
        assert_eq!(report.teams, 41);
        assert!(report.unknown_competitions.is_empty());
    }

    #[test]
    fn test_load_from_file_overrides_embedded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Serie A": ["Roma"], "Copa Libertadores": []}}"#).unwrap();

        let roster = Roster::load(Some(file.path())).unwrap();
        assert!(roster.has_japanese_player("AS Roma", &Competition::SerieA));
        assert!(!roster.has_japanese_player("Parma Calcio 1913", &Competition::SerieA));
        assert_eq!(roster.report().unknown_competitions, vec!["Copa Libertadores"]);
    }
}
