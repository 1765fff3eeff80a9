use chrono::{DateTime, TimeZone, Utc};
use mockito::{Matcher, Mock, Server, ServerGuard};
use pretty_assertions::assert_eq;
use std::path::Path;

use soccer_games_scraper::competition::Competition;
use soccer_games_scraper::config::{FootballDataConfig, RateLimits, ScraperConfig};
use soccer_games_scraper::kickoff::KickoffJst;
use soccer_games_scraper::merge::is_sorted_by_kickoff;
use soccer_games_scraper::sources::football_data::Team;
use soccer_games_scraper::stages;
use soccer_games_scraper::store::{read_matches, write_matches};
use soccer_games_scraper::types::{Match, STATUS_TIMED};
use soccer_games_scraper::Roster;

const MATCHES_FIXTURE: &str = include_str!("fixtures/football_data_matches.json");
const TEAMS_FIXTURE: &str = include_str!("fixtures/football_data_teams.json");
const JLEAGUE_FIXTURE: &str = include_str!("fixtures/jleague_schedule.html");
const PROLEAGUE_FIXTURE: &str = include_str!("fixtures/proleague_calendar.html");

/// 2026-02-05 12:00 in Tokyo.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 5, 3, 0, 0).unwrap()
}

fn config_for(server: &ServerGuard, data_dir: &Path) -> ScraperConfig {
    let mut config = ScraperConfig {
        football_data: FootballDataConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
        },
        rate_limits: RateLimits {
            league_pause_ms: 0,
            rate_limit_backoff_secs: 0,
        },
        ..ScraperConfig::default()
    };
    config.scraping.jleague_url = format!("{}/SFMS01/search", server.url());
    config.scraping.proleague_url = format!("{}/jpl-kalender", server.url());
    config.output.data_dir = data_dir.to_path_buf();
    config
}

async fn mock_pages(server: &mut ServerGuard) -> Vec<Mock> {
    let jleague = server
        .mock("GET", "/SFMS01/search")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(JLEAGUE_FIXTURE)
        .create_async()
        .await;
    let proleague = server
        .mock("GET", "/jpl-kalender")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(PROLEAGUE_FIXTURE)
        .create_async()
        .await;
    vec![jleague, proleague]
}

async fn mock_api_matches(server: &mut ServerGuard) -> Vec<Mock> {
    let bundesliga = server
        .mock("GET", "/competitions/2002/matches")
        .match_header("x-auth-token", "test-key")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(MATCHES_FIXTURE)
        .create_async()
        .await;
    let premier_league = server
        .mock("GET", "/competitions/2021/matches")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;
    let others = server
        .mock(
            "GET",
            Matcher::Regex(r"^/competitions/(2001|2017|2003|2015|2019|2014|2016|2000)/matches$".to_string()),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"matches": []}"#)
        .create_async()
        .await;
    vec![bundesliga, premier_league, others]
}

fn summary(matches: &[Match]) -> Vec<(String, String, bool)> {
    matches
        .iter()
        .map(|m| {
            (
                m.kickoff_datetime_jst.to_string(),
                m.home_team.clone(),
                m.has_japanese_player,
            )
        })
        .collect()
}

#[test_log::test(tokio::test)]
async fn test_fetch_jleague_writes_window() {
    let mut server = Server::new_async().await;
    let _pages = mock_pages(&mut server).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());

    let report = stages::run_fetch_jleague(&config, now()).await.unwrap();

    assert_eq!(report.records, 2);
    let written = read_matches(&dir.path().join("matches.jleague.json")).unwrap();
    assert_eq!(
        summary(&written),
        vec![
            ("2026-02-06T19:00:00.000Z".to_string(), "鹿島アントラーズ".to_string(), true),
            ("2026-02-07T14:00:00.000Z".to_string(), "ＦＣ東京".to_string(), true),
        ]
    );
    assert_eq!(written[0].away_team, "浦和 レッズ");
    assert_eq!(written[0].round.as_deref(), Some("第１節第１日"));
    assert!(written[1].id.starts_with("jleague-2-"));
}

#[test_log::test(tokio::test)]
async fn test_fetch_proleague_writes_window() {
    let mut server = Server::new_async().await;
    let _pages = mock_pages(&mut server).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());

    let report = stages::run_fetch_proleague(&config, now()).await.unwrap();

    assert_eq!(report.records, 2);
    let written = read_matches(&dir.path().join("matches.proleague.json")).unwrap();
    assert_eq!(
        summary(&written),
        vec![
            ("2026-02-08T00:00:00.000Z".to_string(), "KAA Gent".to_string(), false),
            ("2026-02-07T04:45:00.000Z".to_string(), "Standard de Liège".to_string(), false),
        ]
    );
    assert!(written.iter().all(|m| m.round.is_none()));
}

#[test_log::test(tokio::test)]
async fn test_failed_scrape_keeps_previous_artifact() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/SFMS01/search")
        .with_status(503)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    let previous = dir.path().join("matches.jleague.json");
    write_matches(&previous, &[]).unwrap();
    let before = std::fs::read_to_string(&previous).unwrap();

    let report = stages::run_fetch_jleague(&config, now()).await.unwrap();

    assert_eq!(report.records, 0);
    assert!(report.written.is_empty());
    assert_eq!(std::fs::read_to_string(&previous).unwrap(), before);
}

#[test_log::test(tokio::test)]
async fn test_full_pipeline_combines_sources() {
    let mut server = Server::new_async().await;
    let _pages = mock_pages(&mut server).await;
    let _api = mock_api_matches(&mut server).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    let roster = Roster::embedded().unwrap();

    stages::run_fetch_jleague(&config, now()).await.unwrap();
    stages::run_fetch_proleague(&config, now()).await.unwrap();
    let report = stages::run_fetch_matches(&config, &roster, now()).await.unwrap();

    assert_eq!(report.records, 6);
    let combined = read_matches(&dir.path().join("matches.json")).unwrap();
    assert!(is_sorted_by_kickoff(&combined));
    assert_eq!(
        summary(&combined),
        vec![
            ("2026-02-05T19:00:00.000Z".to_string(), "FC Bayern München".to_string(), true),
            ("2026-02-06T19:00:00.000Z".to_string(), "鹿島アントラーズ".to_string(), true),
            ("2026-02-07T04:45:00.000Z".to_string(), "Standard de Liège".to_string(), false),
            ("2026-02-07T14:00:00.000Z".to_string(), "ＦＣ東京".to_string(), true),
            ("2026-02-07T23:30:00.000Z".to_string(), "1. FC Union Berlin".to_string(), true),
            ("2026-02-08T00:00:00.000Z".to_string(), "KAA Gent".to_string(), true),
        ]
    );

    let bayern = &combined[0];
    assert_eq!(bayern.id, "537785");
    assert_eq!(bayern.competition_name, Competition::Bundesliga);
    assert_eq!(bayern.competition_id.as_deref(), Some("2002"));
    assert_eq!(bayern.round.as_deref(), Some("第21節"));
    assert_eq!(bayern.away_team_id.as_deref(), Some("2"));
}

#[test_log::test(tokio::test)]
async fn test_fetch_matches_without_any_data_writes_nothing() {
    let mut server = Server::new_async().await;
    let rate_limited = server
        .mock("GET", Matcher::Regex(r"^/competitions/\d+/matches$".to_string()))
        .match_query(Matcher::Any)
        .with_status(429)
        .expect(10)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    let roster = Roster::embedded().unwrap();

    let report = stages::run_fetch_matches(&config, &roster, now()).await.unwrap();

    assert_eq!(report.records, 0);
    assert!(!dir.path().join("matches.json").exists());
    rate_limited.assert_async().await;
}

#[test_log::test(tokio::test)]
async fn test_merge_jleague_replaces_stale_records() {
    let mut server = Server::new_async().await;
    let _pages = mock_pages(&mut server).await;
    let _api = mock_api_matches(&mut server).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    let roster = Roster::embedded().unwrap();

    stages::run_fetch_jleague(&config, now()).await.unwrap();
    stages::run_fetch_proleague(&config, now()).await.unwrap();
    stages::run_fetch_matches(&config, &roster, now()).await.unwrap();

    let fresh = vec![
        Match::scraped(
            "jleague-3-1771615800000".to_string(),
            Competition::JLeague,
            Some("第３節".to_string()),
            KickoffJst::parse_jleague("26/02/20(金)", "19:30").unwrap(),
            "ヴィッセル神戸".to_string(),
            "サンフレッチェ広島".to_string(),
            true,
            STATUS_TIMED,
        ),
        Match::scraped(
            "jleague-9-1774872000000".to_string(),
            Competition::JLeague,
            None,
            KickoffJst::parse_jleague("26/03/30(月)", "12:00").unwrap(),
            "アルビレックス新潟".to_string(),
            "清水エスパルス".to_string(),
            true,
            STATUS_TIMED,
        ),
    ];
    write_matches(&dir.path().join("matches.jleague.json"), &fresh).unwrap();

    let report = stages::run_merge_jleague(&config, &roster, now()).unwrap();

    assert_eq!(report.records, 6 - 2 + 1);
    let merged = read_matches(&dir.path().join("matches.json")).unwrap();
    assert!(is_sorted_by_kickoff(&merged));
    let jleague: Vec<&str> = merged
        .iter()
        .filter(|m| m.competition_name == Competition::JLeague)
        .map(|m| m.home_team.as_str())
        .collect();
    assert_eq!(jleague, vec!["ヴィッセル神戸"]);
    assert_eq!(merged.last().map(|m| m.id.as_str()), Some("jleague-3-1771615800000"));
}

#[test_log::test(tokio::test)]
async fn test_fetch_matches_continues_after_server_error() {
    let mut server = Server::new_async().await;
    let champions_league = server
        .mock("GET", "/competitions/2001/matches")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let bundesliga = server
        .mock("GET", "/competitions/2002/matches")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(MATCHES_FIXTURE)
        .create_async()
        .await;
    let _others = server
        .mock(
            "GET",
            Matcher::Regex(r"^/competitions/(2017|2021|2003|2015|2019|2014|2016|2000)/matches$".to_string()),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"matches": []}"#)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    let roster = Roster::embedded().unwrap();

    let report = stages::run_fetch_matches(&config, &roster, now()).await.unwrap();

    assert_eq!(report.records, 2);
    let written = read_matches(&dir.path().join("matches.json")).unwrap();
    assert_eq!(
        summary(&written),
        vec![
            ("2026-02-05T19:00:00.000Z".to_string(), "FC Bayern München".to_string(), true),
            ("2026-02-07T23:30:00.000Z".to_string(), "1. FC Union Berlin".to_string(), true),
        ]
    );
    champions_league.assert_async().await;
    bundesliga.assert_async().await;
}

#[test_log::test(tokio::test)]
async fn test_merge_jleague_skips_malformed_records() {
    let server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());
    let roster = Roster::embedded().unwrap();

    let existing = Match::scraped(
        "proleague-0-1770404400000".to_string(),
        Competition::JupilerProLeague,
        None,
        KickoffJst::parse_stored("2026-02-06T19:00:00.000Z").unwrap(),
        "KAA Gent".to_string(),
        "Club Brugge".to_string(),
        false,
        STATUS_TIMED,
    );
    write_matches(&dir.path().join("matches.json"), &[existing]).unwrap();

    let good = Match::scraped(
        "jleague-0-1770544800000".to_string(),
        Competition::JLeague,
        Some("第１節".to_string()),
        KickoffJst::parse_jleague("26/02/08(日)", "14:00").unwrap(),
        "ＦＣ東京".to_string(),
        "柏レイソル".to_string(),
        true,
        STATUS_TIMED,
    );
    let mut broken = serde_json::to_value(&good).unwrap();
    broken["id"] = "jleague-1-0".into();
    broken["kickoff_datetime_jst"] = "2026-02-07T14:00Z".into();
    let raw = serde_json::Value::Array(vec![serde_json::to_value(&good).unwrap(), broken]);
    std::fs::write(dir.path().join("matches.jleague.json"), raw.to_string()).unwrap();

    let report = stages::run_merge_jleague(&config, &roster, now()).unwrap();

    assert_eq!(report.records, 2);
    let merged = read_matches(&dir.path().join("matches.json")).unwrap();
    let ids: Vec<&str> = merged.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["proleague-0-1770404400000", "jleague-0-1770544800000"]);
}

#[test_log::test(tokio::test)]
async fn test_fetch_teams_writes_per_competition() {
    let mut server = Server::new_async().await;
    let bundesliga = server
        .mock("GET", "/competitions/BL1/teams")
        .match_header("x-auth-token", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TEAMS_FIXTURE)
        .create_async()
        .await;
    let _others = server
        .mock(
            "GET",
            Matcher::Regex(r"^/competitions/(CL|PPL|PL|DED|FL1|SA|PD|ELC|WC)/teams$".to_string()),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"teams": []}"#)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path());

    let report = stages::run_fetch_teams(&config).await.unwrap();

    assert_eq!(report.records, 2);
    assert_eq!(report.written, vec![dir.path().join("teams").join("BL1.json")]);
    let raw = std::fs::read_to_string(dir.path().join("teams/BL1.json")).unwrap();
    let teams: Vec<Team> = serde_json::from_str(&raw).unwrap();
    assert_eq!(teams[0].name, "FC Bayern München");
    assert_eq!(teams[1].short_name.as_deref(), Some("Frankfurt"));
    assert!(!dir.path().join("teams/PL.json").exists());
    bundesliga.assert_async().await;
}
