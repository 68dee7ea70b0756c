mod api;
mod app;
mod colors;
mod config;
mod geo;
mod logging;
mod map;
mod mood;
mod terminal;
mod ui;

use api::MoodApi;
use app::Dashboard;
use clap::{Parser, Subcommand};
use config::{Config, Overrides};
use map::FillColorExpression;
use std::io;
use std::path::PathBuf;
use std::process;
use terminal::Terminal;
use tracing::{error, info};
use ui::spikes::SpikeFeed;
use ui::stats::GlobalStats;

#[derive(Parser)]
#[command(name = "moodatlas")]
#[command(version)]
#[command(about = "moodatlas: a terminal world map of country moods, with spike alerts and global stats", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ~/.config/moodatlas/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the mood API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Use the built-in sample data instead of the API
    #[arg(long, global = true)]
    mock: bool,

    /// Access token appended to a remote boundary URL
    #[arg(long, global = true)]
    map_token: Option<String>,

    /// Country outlines: GeoJSON file path or http(s) URL
    #[arg(long, global = true)]
    boundaries: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard (default)
    Dashboard,

    /// Render one frame to stdout with ANSI colors
    Snapshot {
        /// Frame width in columns
        #[arg(short = 'W', long, default_value = "120")]
        width: u16,

        /// Frame height in rows
        #[arg(short = 'H', long, default_value = "40")]
        height: u16,
    },

    /// Print the detail view of one country
    Country {
        /// ISO 3166-1 alpha-2 code, e.g. BR
        code: String,
    },

    /// Print the current mood spikes
    Spikes,

    /// Print aggregate statistics over all countries
    Stats,

    /// Print the map fill-color expression as JSON
    Expression,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        api_url: cli.api_url,
        use_mock: cli.mock,
        map_token: cli.map_token,
        boundaries: cli.boundaries,
        log_file: cli.log_file,
    };
    let config = Config::load(cli.config.as_deref(), &overrides);
    if let Err(e) = logging::init(&config.log) {
        eprintln!("cannot open log file: {}", e);
    }
    info!(api = %config.api.url, mock = config.api.use_mock, "starting");

    let api = api::connect(&config.api);

    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => {
            let mut term = Terminal::new(true)?;
            let (w, h) = term.size();
            let mut dashboard = Dashboard::new(api, &config, w, h);
            dashboard.run(&mut term)?;
        }
        Commands::Snapshot { width, height } => {
            let mut term = Terminal::offscreen(width.max(20), height.max(10));
            let mut dashboard = Dashboard::new(api, &config, width.max(20), height.max(10));
            dashboard.tick();
            dashboard.render(&mut term);
            term.print_to_stdout();
        }
        Commands::Country { code } => match api.fetch_country_detail(&code) {
            Ok(detail) => print!("{}", ui::panel::report(&detail)),
            Err(e) => fail(&e),
        },
        Commands::Spikes => match api.fetch_spikes() {
            Ok(list) => {
                let mut feed = SpikeFeed::new();
                feed.set(list.spikes);
                print!("{}", feed.report());
            }
            Err(e) => fail(&e),
        },
        Commands::Stats => match fetch_countries(api.as_ref()) {
            Ok(countries) => match GlobalStats::compute(&countries) {
                Some(stats) => print!("{}", stats.report()),
                None => println!("No countries reported"),
            },
            Err(e) => fail(&e),
        },
        Commands::Expression => match fetch_countries(api.as_ref()) {
            Ok(countries) => {
                let expr = FillColorExpression::from_countries(&countries).keyed_by(&config.map.code_property);
                match serde_json::to_string_pretty(&expr.to_json()) {
                    Ok(json) => println!("{}", json),
                    Err(e) => fail(&e),
                }
            }
            Err(e) => fail(&e),
        },
    }

    Ok(())
}

fn fetch_countries(api: &dyn MoodApi) -> Result<Vec<api::types::CountryMood>, api::ApiError> {
    api.fetch_global_mood().map(|g| g.countries)
}

/// Report a print-mode failure and exit non-zero
fn fail(e: &dyn std::error::Error) -> ! {
    error!(error = %e, "request failed");
    eprintln!("moodatlas: {}", e);
    process::exit(1);
}
