use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use vinyl_tracker::archive;
use vinyl_tracker::config::{Config, DEFAULT_CONFIG_FILE};
use vinyl_tracker::server::{self, AppState};
use vinyl_tracker::{
    display, page, queries, AsyncVinylTracker, Collector, HttpFetcher, Result, SortKey,
    TrackerError, VinylTracker, VinylTrackerBuilder,
};

/// Vinyl price tracker - scrape record prices and keep their history.
#[derive(Parser, Debug)]
#[command(name = "vinyl-tracker")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape every URL in the input list and store today's prices
    Scrape {
        /// URL list (overrides scrape.input)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show the latest price of every record
    Prices {
        #[arg(long, value_enum, default_value_t = SortKey::Artist)]
        sort: SortKey,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the full price history of one record
    History {
        id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Show min/max/average price of one record
    Trend { id: i64 },

    /// Serve the JSON API
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Scrape into the JSON files instead of the database
    Archive {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = SortKey::Artist)]
        sort: SortKey,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    if let Some(level) = cli.log_level.clone() {
        config.logging.level = level;
    }
    if cli.json_logs {
        config.logging.format = "json".into();
    }
    config.logging.init();

    if let Err(e) = run(cli.command, config).await {
        error!(error = %e, "fatal error");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Scrape { input } => {
            let tracker = open(&config)?;
            let urls = page::read_url_list(input.unwrap_or(config.scrape.input))?;
            let scraped = tracker.collector()?.collect(&urls).await?;
            tracker.ingest(&scraped)?;
            println!("{}", display::latest_table(&tracker.prices().latest()?));
        }
        Commands::Prices { sort, json } => {
            let tracker = open(&config)?;
            let latest = tracker.prices().latest_sorted(sort)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&latest)?);
            } else {
                println!("{}", display::latest_table(&latest));
            }
        }
        Commands::History { id, json } => {
            let tracker = open(&config)?;
            let history = tracker
                .prices()
                .history(id)?
                .ok_or_else(|| TrackerError::NotFound(format!("no record with id {id}")))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                println!("{}", display::history_table(&history));
            }
        }
        Commands::Trend { id } => {
            let tracker = open(&config)?;
            match tracker.prices().trend(id)? {
                Some(trend) => println!("{}", display::trend_summary(&trend)),
                None => return Err(TrackerError::NotFound(format!("no prices for record {id}"))),
            }
        }
        Commands::Serve { bind } => {
            let tracker = open(&config)?;
            let collector = tracker.collector()?;
            let state = Arc::new(AppState {
                tracker: AsyncVinylTracker::new(tracker),
                collector,
                input: config.scrape.input.clone(),
            });
            let bind = bind.unwrap_or(config.server.bind);
            server::serve(state, &bind).await?;
        }
        Commands::Archive { input, sort } => {
            let fetcher = HttpFetcher::from_config(&config.scrape)?;
            let collector = Collector::new(fetcher)
                .concurrency(config.scrape.concurrency)
                .timeout(config.scrape.timeout());
            let urls = page::read_url_list(input.unwrap_or(config.scrape.input))?;
            let mut scraped = collector.collect(&urls).await?;
            archive::record_snapshot(&config.archive, queries::prices::today(), &mut scraped, sort)?;

            println!("{}", display::scraped_table(&scraped));
        }
    }
    Ok(())
}

fn open(config: &Config) -> Result<VinylTracker> {
    VinylTrackerBuilder::from_config(config).build()
}
