//! Command-line front end for the record store.
//!
//! Usage:
//!   pagestore create <db_path>
//!   pagestore insert <db_path> <data>
//!   pagestore select <db_path>
//!   pagestore stats <db_path> [--json]
//!
//! Each command opens (or creates) the file, performs one operation and
//! closes it. Set `RUST_LOG=pagestore=debug` to see page-level activity.

use clap::{Args, Parser, Subcommand};
use pagestore::{error::combine, Config, Database};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pagestore", version, about = "Embedded single-file record store")]
struct Cli {
    #[command(flatten)]
    open: OpenArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct OpenArgs {
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "JSON file with store settings (pageSize, cacheCapacity, syncOnWrite)"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Page size in bytes when creating a file")]
    page_size: Option<usize>,

    #[arg(long, global = true, help = "Page cache size (pages)")]
    cache_pages: Option<usize>,

    #[arg(long, global = true, help = "Sync after every page write")]
    sync: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new, empty database
    Create {
        #[arg(value_name = "DB")]
        path: PathBuf,
    },
    /// Insert a record into a database
    Insert {
        #[arg(value_name = "DB")]
        path: PathBuf,
        /// Record contents
        data: String,
    },
    /// Print every record in a database
    Select {
        #[arg(value_name = "DB")]
        path: PathBuf,
    },
    /// Show page and cache statistics
    Stats {
        #[arg(value_name = "DB")]
        path: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(args: &OpenArgs, path: &Path) -> Result<Config, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(file) => {
            let text = std::fs::read_to_string(file)?;
            serde_json::from_str::<Config>(&text)?
        }
        None => Config::new(path),
    };
    config.path = path.to_path_buf();
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if let Some(pages) = args.cache_pages {
        config.cache_capacity = pages;
    }
    if args.sync {
        config.sync_on_write = true;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Command::Create { path } => {
            let db = Database::create(load_config(&cli.open, path)?)?;
            db.close()?;
        }

        Command::Insert { path, data } => {
            let mut db = Database::open(load_config(&cli.open, path)?)?;
            let inserted = db.insert(data.as_bytes());
            combine(inserted, db.close())?;
        }

        Command::Select { path } => {
            let mut db = Database::open(load_config(&cli.open, path)?)?;
            let mut scanned = Ok(());
            for (i, record) in db.scan().enumerate() {
                match record {
                    Ok(record) => println!("{}: {}", i, String::from_utf8_lossy(&record)),
                    Err(err) => {
                        scanned = Err(err);
                        break;
                    }
                }
            }
            combine(scanned, db.close())?;
        }

        Command::Stats { path, json } => {
            let db = Database::open(load_config(&cli.open, path)?)?;
            let stats = db.stats();
            let closed = db.close();
            let stats = match stats {
                Ok(stats) => {
                    closed?;
                    stats
                }
                Err(err) => return Err(err.with_cleanup(closed).into()),
            };

            if *json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("page_size: {}", stats.page_size);
                println!("page_count: {}", stats.page_count);
                println!("cache_capacity: {}", stats.cache_capacity);
            }
        }
    }
    Ok(())
}
