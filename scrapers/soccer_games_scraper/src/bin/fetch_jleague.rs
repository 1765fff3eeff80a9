use anyhow::Result;
use chrono::Utc;
use dotenv::dotenv;
use soccer_games_scraper::{stages, ScraperConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    soccer_games_scraper::logging::init();

    let config = ScraperConfig::from_env();
    stages::run_fetch_jleague(&config, Utc::now()).await?;

    println!("Done!");
    Ok(())
}
