//! Podium CLI - load and inspect the Olympics results database

use clap::{Parser, Subcommand};
use podium::config::{self, PodiumConfig};
use podium::importer::{DEFAULT_BATCH_SIZE, DEFAULT_YEAR_RANGE, ImportOptions, Importer};
use podium::source::RowSource;
use podium::storage::SqliteStore;
use podium::ui::{self, Icons};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "podium")]
#[command(version)]
#[command(about = "CSV to SQLite loader for an Olympics results database")]
#[command(long_about = r#"
Podium turns the Olympic athlete events CSV into a normalized SQLite
database (countries, games, athletes, events, participations).

Example usage:
  podium init --database olympics.db
  podium import --csv athlete_events.csv --database olympics.db
  podium stats --database olympics.db
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a podium.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and recreate the database schema, discarding all data
    Init {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Import an athlete events CSV into the database
    Import {
        /// Path to the source CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// First year admitted by the filter
        #[arg(long)]
        from_year: Option<u16>,

        /// Last year admitted by the filter
        #[arg(long)]
        to_year: Option<u16>,

        /// Rows per commit checkpoint
        #[arg(long)]
        batch_size: Option<usize>,

        /// Recreate the schema before importing
        #[arg(long)]
        recreate: bool,
    },

    /// Show entity counts for the database
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Init { database } => {
            let db_path = config::resolve_database(database, &file_config);
            config::ensure_db_dir(&db_path)?;

            let store = SqliteStore::open(&db_path)?;
            store.recreate_schema()?;

            ui::status(Icons::TRASH, "Dropped", &format!("{:?}", db_path));
            ui::success("Schema recreated");
        }

        Commands::Import {
            csv,
            database,
            from_year,
            to_year,
            batch_size,
            recreate,
        } => {
            let db_path = config::resolve_database(database, &file_config);
            config::ensure_db_dir(&db_path)?;

            let csv_path = csv
                .or_else(|| file_config.csv.clone().map(PathBuf::from))
                .ok_or_else(|| {
                    anyhow::anyhow!("no CSV source given (use --csv or set csv in podium.toml)")
                })?;

            let from_year = from_year
                .or(file_config.from_year)
                .unwrap_or(*DEFAULT_YEAR_RANGE.start());
            let to_year = to_year
                .or(file_config.to_year)
                .unwrap_or(*DEFAULT_YEAR_RANGE.end());
            anyhow::ensure!(from_year <= to_year, "--from-year must not exceed --to-year");

            let batch_size = batch_size
                .or(file_config.batch_size)
                .unwrap_or(DEFAULT_BATCH_SIZE)
                .max(1);

            ui::header("Olympics results import");
            ui::status(Icons::FILE, "Source", &format!("{:?}", csv_path));
            ui::status(Icons::DATABASE, "Database", &format!("{:?}", db_path));
            ui::info("Years", &format!("{}-{}", from_year, to_year));
            ui::info("Batch size", &batch_size.to_string());

            let mut store = SqliteStore::open(&db_path)?;
            if recreate {
                store.recreate_schema()?;
                ui::success("Schema recreated");
            }

            // Header resolution happens here; missing columns abort before
            // any storage write
            let mut source = RowSource::from_path(&csv_path)?;

            let importer = Importer::new(ImportOptions {
                year_range: from_year..=to_year,
                batch_size,
            });
            let report = importer.run(&mut store, &mut source)?;

            ui::section("Run report");
            println!(
                "{}",
                ui::stats_table(&[
                    ("Source rows", report.total_rows.to_string()),
                    (
                        "Rows in range",
                        format!("{} ({}-{})", report.rows_in_range, from_year, to_year),
                    ),
                    ("Countries", report.countries.to_string()),
                    ("Games editions", report.games.to_string()),
                    ("Athletes", report.athletes.to_string()),
                    ("Events", report.events.to_string()),
                    ("Row errors", report.errors.to_string()),
                ])
            );

            ui::section("Database totals");
            println!("{}", store.stats()?);
        }

        Commands::Stats { database } => {
            let db_path = config::resolve_database(database, &file_config);
            let store = SqliteStore::open(&db_path)?;
            let stats = store.stats()?;

            ui::status(Icons::STATS, "Database", &format!("{:?}", db_path));
            println!(
                "{}",
                ui::stats_table(&[
                    ("Countries", stats.countries.to_string()),
                    ("Games editions", stats.games.to_string()),
                    ("Athletes", stats.athletes.to_string()),
                    ("Events", stats.events.to_string()),
                    ("Participations", stats.participations.to_string()),
                ])
            );
        }
    }

    Ok(())
}
