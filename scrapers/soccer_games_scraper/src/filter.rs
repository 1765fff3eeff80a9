use crate::competition::Competition;
use crate::types::Match;
use crate::window::DateWindow;

/// Display-time selection over the combined feed.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub competition: Option<Competition>,
    pub japanese_only: bool,
    pub window: Option<DateWindow>,
}

impl MatchFilter {
    pub fn matches(&self, record: &Match) -> bool {
        if self.japanese_only && !record.has_japanese_player {
            return false;
        }
        if let Some(competition) = &self.competition {
            if &record.competition_name != competition {
                return false;
            }
        }
        self.window
            .map_or(true, |window| window.contains(&record.kickoff_datetime_jst))
    }

    pub fn apply<'a>(&self, records: &'a [Match]) -> Vec<&'a Match> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// One line per fixture: `DD HH:MM  competition  home - away  [JP]`.
pub fn format_line(record: &Match) -> String {
    let kickoff = record.kickoff_datetime_jst.naive().format("%d %H:%M");
    let marker = if record.has_japanese_player { "  [JP]" } else { "" };
    format!(
        "{}  {}  {} - {}{}",
        kickoff, record.competition_name, record.home_team, record.away_team, marker
    )
}
