use serde::{Deserialize, Serialize};
use std::fmt;

/// Every league the feed knows about. Names that are not in this list survive
/// a round trip through `Other` so older artifacts never lose records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Competition {
    ChampionsLeague,
    PrimeiraLiga,
    PremierLeague,
    Eredivisie,
    Bundesliga,
    Ligue1,
    SerieA,
    LaLiga,
    Championship,
    WorldCup,
    JLeague,
    JupilerProLeague,
    Other(String),
}

/// Competitions available on the football-data.org free plan, in fetch order.
pub const API_COMPETITIONS: [Competition; 10] = [
    Competition::ChampionsLeague,
    Competition::PrimeiraLiga,
    Competition::PremierLeague,
    Competition::Eredivisie,
    Competition::Bundesliga,
    Competition::Ligue1,
    Competition::SerieA,
    Competition::LaLiga,
    Competition::Championship,
    Competition::WorldCup,
];

impl Competition {
    pub fn name(&self) -> &str {
        match self {
            Competition::ChampionsLeague => "UEFA Champions League",
            Competition::PrimeiraLiga => "Primeira Liga",
            Competition::PremierLeague => "Premier League",
            Competition::Eredivisie => "Eredivisie",
            Competition::Bundesliga => "Bundesliga",
            Competition::Ligue1 => "Ligue 1",
            Competition::SerieA => "Serie A",
            Competition::LaLiga => "La Liga",
            Competition::Championship => "Championship",
            Competition::WorldCup => "World Cup",
            Competition::JLeague => "J.League",
            Competition::JupilerProLeague => "Jupiler Pro League",
            Competition::Other(name) => name,
        }
    }

    /// Numeric competition id used by the football-data.org matches endpoint.
    pub fn football_data_id(&self) -> Option<u32> {
        match self {
            Competition::ChampionsLeague => Some(2001),
            Competition::PrimeiraLiga => Some(2017),
            Competition::PremierLeague => Some(2021),
            Competition::Eredivisie => Some(2003),
            Competition::Bundesliga => Some(2002),
            Competition::Ligue1 => Some(2015),
            Competition::SerieA => Some(2019),
            Competition::LaLiga => Some(2014),
            Competition::Championship => Some(2016),
            Competition::WorldCup => Some(2000),
            _ => None,
        }
    }

    /// Short code used by the football-data.org teams endpoint.
    pub fn football_data_code(&self) -> Option<&'static str> {
        match self {
            Competition::ChampionsLeague => Some("CL"),
            Competition::PrimeiraLiga => Some("PPL"),
            Competition::PremierLeague => Some("PL"),
            Competition::Eredivisie => Some("DED"),
            Competition::Bundesliga => Some("BL1"),
            Competition::Ligue1 => Some("FL1"),
            Competition::SerieA => Some("SA"),
            Competition::LaLiga => Some("PD"),
            Competition::Championship => Some("ELC"),
            Competition::WorldCup => Some("WC"),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Competition::Other(_))
    }
}

impl From<&str> for Competition {
    fn from(name: &str) -> Self {
        match name {
            "UEFA Champions League" => Competition::ChampionsLeague,
            "Primeira Liga" => Competition::PrimeiraLiga,
            "Premier League" => Competition::PremierLeague,
            "Eredivisie" => Competition::Eredivisie,
            "Bundesliga" => Competition::Bundesliga,
            "Ligue 1" => Competition::Ligue1,
            "Serie A" => Competition::SerieA,
            "La Liga" => Competition::LaLiga,
            "Championship" => Competition::Championship,
            "World Cup" => Competition::WorldCup,
            "J.League" => Competition::JLeague,
            "Jupiler Pro League" => Competition::JupilerProLeague,
            other => Competition::Other(other.to_string()),
        }
    }
}

impl From<String> for Competition {
    fn from(name: String) -> Self {
        match Competition::from(name.as_str()) {
            Competition::Other(_) => Competition::Other(name),
            known => known,
        }
    }
}

impl From<Competition> for String {
    fn from(competition: Competition) -> Self {
        match competition {
            Competition::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

impl fmt::Display for Competition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
