use anyhow::Result;
use chrono::Utc;
use dotenv::dotenv;
use soccer_games_scraper::{stages, Roster, ScraperConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    soccer_games_scraper::logging::init();

    let config = ScraperConfig::from_env();
    let roster = Roster::load(config.roster_path.as_deref())?;
    stages::run_fetch_matches(&config, &roster, Utc::now()).await?;

    println!("Done!");
    Ok(())
}
