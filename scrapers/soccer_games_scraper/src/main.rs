use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use tracing::info;

use soccer_games_scraper::filter::MatchFilter;
use soccer_games_scraper::sources::SecondarySource;
use soccer_games_scraper::stages::{self, StageReport};
use soccer_games_scraper::window::{DateWindow, FETCH_WINDOW_DAYS};
use soccer_games_scraper::{Roster, ScraperConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Football fixture aggregation pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScrapedSource {
    Jleague,
    Proleague,
}

impl From<ScrapedSource> for SecondarySource {
    fn from(source: ScrapedSource) -> Self {
        match source {
            ScrapedSource::Jleague => SecondarySource::JLeague,
            ScrapedSource::Proleague => SecondarySource::ProLeague,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch football-data.org fixtures and write the combined matches.json
    FetchMatches,
    /// Scrape the J.League schedule into matches.jleague.json
    FetchJleague,
    /// Scrape the Jupiler Pro League calendar into matches.proleague.json
    FetchProleague,
    /// Replace one scraped competition inside matches.json
    Merge {
        #[arg(short, long, value_enum, default_value_t = ScrapedSource::Jleague)]
        source: ScrapedSource,
    },
    /// Write the team list of every API competition to teams/{code}.json
    FetchTeams,
    /// Validate the Japanese-player roster and print its counts
    Roster,
    /// List upcoming fixtures from matches.json
    Show {
        /// Competition name or football-data.org code (e.g. BL1)
        #[arg(short, long)]
        competition: Option<String>,
        /// Include fixtures without a Japanese player
        #[arg(long)]
        all: bool,
    },
}

fn log_report(stage: &str, report: &StageReport) {
    info!("{}: {} records, {} files written", stage, report.records, report.written.len());
}

fn main() -> Result<()> {
    dotenv().ok();
    soccer_games_scraper::logging::init();

    let cli = Cli::parse();
    let config = ScraperConfig::from_env();
    let roster = Roster::load(config.roster_path.as_deref())?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Commands::FetchMatches => {
            let report = rt.block_on(stages::run_fetch_matches(&config, &roster, Utc::now()))?;
            log_report("fetch_matches", &report);
        }
        Commands::FetchJleague => {
            let report = rt.block_on(stages::run_fetch_jleague(&config, Utc::now()))?;
            log_report("fetch_jleague", &report);
        }
        Commands::FetchProleague => {
            let report = rt.block_on(stages::run_fetch_proleague(&config, Utc::now()))?;
            log_report("fetch_proleague", &report);
        }
        Commands::Merge { source } => {
            let report = stages::run_merge(&config, &roster, source.into(), Utc::now())?;
            log_report("merge", &report);
        }
        Commands::FetchTeams => {
            let report = rt.block_on(stages::run_fetch_teams(&config))?;
            log_report("fetch_teams", &report);
        }
        Commands::Roster => {
            let report = stages::run_roster_report(&roster);
            println!(
                "{} leagues, {} teams, {} unknown competitions",
                report.leagues,
                report.teams,
                report.unknown_competitions.len()
            );
        }
        Commands::Show { competition, all } => {
            let filter = MatchFilter {
                competition: competition.as_deref().map(stages::competition_arg),
                japanese_only: !all,
                window: Some(DateWindow::rolling(Utc::now(), FETCH_WINDOW_DAYS)),
            };
            for line in stages::run_show(&config, &filter)? {
                println!("{}", line);
            }
        }
    }

    info!("Done!");
    Ok(())
}
