mod logging;
mod poll;
mod shutdown;

use anyhow::{Context, Result};
use clap::Parser;
use parkwait_acquire::{HttpPageFetcher, PageSelectors};
use parkwait_model::{ParkIdentity, ScheduleWindow, ScrapeMode, ScraperConfig};
use std::path::PathBuf;

use crate::poll::{LocalClock, PollLoop};
use crate::shutdown::Interrupt;

#[derive(Parser)]
#[command(name = "parkwait")]
#[command(about = "Poll theme park attraction wait times into daily CSV files")]
#[command(version)]
struct Cli {
    /// Minutes between fetches during active hours
    #[arg(long, default_value_t = parkwait_model::DEFAULT_INTERVAL_MINUTES)]
    interval_minutes: u64,

    /// First hour of the active window (inclusive)
    #[arg(long, default_value_t = 9)]
    start_hour: u32,

    /// Hour the active window closes (exclusive)
    #[arg(long, default_value_t = 21)]
    end_hour: u32,

    /// Park(s) to scrape; "both" scrapes land then sea each cycle
    #[arg(short, long, default_value = "land", value_enum)]
    park: ParkChoice,

    /// Only record the first attraction whose name contains this text
    #[arg(short, long)]
    search_word: Option<String>,

    /// Directory for the daily CSV files
    #[arg(short = 'O', long, default_value = ".")]
    output_dir: PathBuf,

    /// Log file, appended to alongside console output
    #[arg(long, default_value = "parkwait.log")]
    log_file: PathBuf,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps in logs instead of local time
    #[arg(long)]
    utc: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ParkChoice {
    /// Tokyo Disneyland
    Land,
    /// Tokyo DisneySea
    Sea,
    Both,
}

impl ParkChoice {
    fn parks(self) -> Vec<ParkIdentity> {
        match self {
            ParkChoice::Land => vec![ParkIdentity::from_is_land(true)],
            ParkChoice::Sea => vec![ParkIdentity::from_is_land(false)],
            ParkChoice::Both => vec![ParkIdentity::Land, ParkIdentity::Sea],
        }
    }
}

impl Cli {
    fn config(&self) -> Result<ScraperConfig> {
        Ok(ScraperConfig {
            interval_minutes: self.interval_minutes,
            window: ScheduleWindow::new(self.start_hour, self.end_hour)?,
            parks: self.park.parks(),
            mode: ScrapeMode::from_search_word(self.search_word.clone()),
            output_dir: self.output_dir.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Suppress noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    logging::init(level, cli.utc, &cli.log_file)?;

    let config = cli.config()?;
    if let ScrapeMode::ScrapeOne { search_word } = &config.mode {
        tracing::info!(search_word = %search_word, "Recording a single attraction");
    }

    let interrupt = Interrupt::install().context("Failed to listen for Ctrl+C")?;
    let mut poll = PollLoop::new(
        HttpPageFetcher::new(),
        LocalClock,
        &config,
        PageSelectors::default(),
    )?;

    if let Err(e) = poll.run(interrupt.recv()).await {
        tracing::error!("Unexpected error: {e:#}");
        return Err(e);
    }

    Ok(())
}
