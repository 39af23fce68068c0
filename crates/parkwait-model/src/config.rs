use crate::park::ParkIdentity;
use crate::schedule::{DutyCycleScheduler, ScheduleError, ScheduleWindow};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_INTERVAL_MINUTES: u64 = 5;

/// Which attractions a scrape keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScrapeMode {
    /// Every attraction listed on the page.
    ScrapeAll,
    /// Only the first attraction whose name contains `search_word`.
    ScrapeOne { search_word: String },
}

impl ScrapeMode {
    pub fn from_search_word(search_word: Option<String>) -> Self {
        match search_word {
            Some(word) if !word.trim().is_empty() => ScrapeMode::ScrapeOne {
                search_word: word.trim().to_string(),
            },
            _ => ScrapeMode::ScrapeAll,
        }
    }
}

/// Immutable settings for one scraper process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub interval_minutes: u64,
    pub window: ScheduleWindow,
    /// Parks scraped in order within each cycle.
    pub parks: Vec<ParkIdentity>,
    pub mode: ScrapeMode,
    /// Directory the daily CSV ledgers are written to.
    pub output_dir: PathBuf,
}

impl ScraperConfig {
    pub fn scheduler(&self) -> Result<DutyCycleScheduler, ScheduleError> {
        DutyCycleScheduler::new(self.window, self.interval_minutes)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            window: ScheduleWindow::default(),
            parks: vec![ParkIdentity::Land],
            mode: ScrapeMode::ScrapeAll,
            output_dir: PathBuf::from("."),
        }
    }
}
