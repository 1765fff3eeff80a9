pub mod competition;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod kickoff;
pub mod logging;
pub mod merge;
pub mod metrics;
pub mod roster;
pub mod sources;
pub mod stages;
pub mod store;
pub mod types;
pub mod window;

pub use competition::Competition;
pub use config::ScraperConfig;
pub use kickoff::KickoffJst;
pub use roster::Roster;
pub use types::Match;
