use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use parkwait_acquire::{build_snapshot, FetchError, PageFetcher, PageSelectors};
use parkwait_ledger::CsvLedger;
use parkwait_model::{
    AttractionSnapshot, DutyCycleScheduler, NextAction, ParkIdentity, ScrapeMode, ScraperConfig,
};
use std::future::Future;

/// Source of wall-clock time for scheduling and row timestamps.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Result of scraping one park once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Persisted { attractions: usize },
    /// The page loaded but yielded no attractions, or no containers at all.
    Empty,
    FetchFailed,
    PersistFailed,
}

/// Drives fetch -> snapshot -> ledger cycles under the duty-cycle scheduler.
pub struct PollLoop<F, C> {
    fetcher: F,
    clock: C,
    scheduler: DutyCycleScheduler,
    selectors: PageSelectors,
    mode: ScrapeMode,
    parks: Vec<ParkIdentity>,
    ledger: CsvLedger,
}

impl<F: PageFetcher, C: Clock> PollLoop<F, C> {
    pub fn new(fetcher: F, clock: C, config: &ScraperConfig, selectors: PageSelectors) -> Result<Self> {
        Ok(Self {
            fetcher,
            clock,
            scheduler: config.scheduler()?,
            selectors,
            mode: config.mode.clone(),
            parks: config.parks.clone(),
            ledger: CsvLedger::new(&config.output_dir),
        })
    }

    /// Poll until `shutdown` resolves.
    ///
    /// `shutdown` is only observed while sleeping, never during a fetch. A
    /// failed cycle is logged and the loop carries on; only a scheduling error
    /// ends it early.
    pub async fn run<S>(&mut self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let window = self.scheduler.window();
        tracing::info!(
            interval_minutes = self.scheduler.interval().as_secs() / 60,
            start_hour = window.start_hour(),
            end_hour = window.end_hour(),
            parks = ?self.parks,
            "Scraping started"
        );
        tracing::info!("Press Ctrl+C to stop");

        loop {
            let pause = match self.scheduler.next_action(self.clock.now())? {
                NextAction::Active { interval } => {
                    for park in self.parks.clone() {
                        self.run_cycle(park).await;
                    }
                    tracing::info!("Next fetch in {} minutes", interval.as_secs() / 60);
                    interval
                }
                NextAction::Dormant { wait, wake_at } => {
                    tracing::info!(
                        wake_at = %wake_at,
                        "Outside active hours, waiting {:.2} hours",
                        wait.as_secs_f64() / 3600.0
                    );
                    wait
                }
            };

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Scraping stopped");
                    return Ok(());
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    /// Scrape one park and persist the snapshot. Never fails: every error is
    /// logged once and reported in the outcome.
    pub async fn run_cycle(&mut self, park: ParkIdentity) -> CycleOutcome {
        let url = park.attraction_url();
        tracing::info!(park = %park, "Fetching wait times");

        let groups = match self.fetcher.fetch(&url, &self.selectors).await {
            Ok(groups) => groups,
            // The page loaded but listed nothing (e.g. between listings): no data, not a failure.
            Err(e @ FetchError::NotFound { .. }) => {
                tracing::warn!(park = %park, "No wait time data found: {e}");
                return CycleOutcome::Empty;
            }
            Err(e) => {
                tracing::error!(park = %park, url = %url, "Failed to fetch wait times: {e}");
                return CycleOutcome::FetchFailed;
            }
        };

        let snapshot = build_snapshot(&groups, &self.selectors, &self.mode);
        if snapshot.is_empty() {
            tracing::warn!(park = %park, containers = groups.len(), "No wait time data found");
            return CycleOutcome::Empty;
        }

        match self.persist(park, &snapshot) {
            Ok(()) => {
                tracing::info!(park = %park, attractions = snapshot.len(), "Saved wait times");
                CycleOutcome::Persisted {
                    attractions: snapshot.len(),
                }
            }
            Err(e) => {
                tracing::error!(park = %park, "Failed to save wait times: {e}");
                CycleOutcome::PersistFailed
            }
        }
    }

    fn persist(&mut self, park: ParkIdentity, snapshot: &AttractionSnapshot) -> Result<()> {
        let now = self.clock.now();
        self.ledger.ensure_header(park, snapshot, now.date())?;
        self.ledger.append(park, snapshot, now)?;
        Ok(())
    }
}
