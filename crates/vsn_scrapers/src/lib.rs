pub mod cli;
pub mod fetch;
pub mod logging;
pub mod manager;
pub mod registry;
pub mod scheduler;
pub mod scrapers;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use fetch::{HttpFetcher, PageFetcher};
pub use logging::init_logging;
pub use manager::{IngestManager, ReferenceOutcome, RunOutcome, RunStats};
pub use registry::{ListingDiscovery, SourceRegistry};
pub use scheduler::Scheduler;
pub use scrapers::Scraper;

pub mod prelude {
    pub use super::manager::{IngestManager, RunOutcome};
    pub use super::registry::SourceRegistry;
    pub use super::scrapers::Scraper;
    pub use vsn_core::{Article, Error, Result};
}
