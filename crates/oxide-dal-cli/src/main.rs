//! oxide-dal CLI
//!
//! Command-line tool for browsing and copying tables in any database file
//! with a registered provider.

mod print;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_dal_core::config::MODE;
use oxide_dal_core::{ConnectionParams, Database, OpenMode, ProviderRegistry, Statement};

/// Browse and copy tables through oxide-dal.
#[derive(Parser)]
#[command(name = "oxide-dal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database file; the provider is chosen from its extension.
    #[arg(short, long, env = "DATABASE_URL")]
    database: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tables with their ordinal.
    Tables,

    /// Print every row of a table.
    Show {
        /// Table name.
        table: String,

        /// Print JSON instead of an aligned table.
        #[arg(long)]
        json: bool,
    },

    /// Run a query and print its result.
    Query {
        /// Statement text.
        sql: String,

        /// Named parameter, bound as text (repeatable).
        #[arg(short, long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Print JSON instead of an aligned table.
        #[arg(long)]
        json: bool,
    },

    /// Run a command and print the affected row count.
    Exec {
        /// Statement text.
        sql: String,

        /// Named parameter, bound as text (repeatable).
        #[arg(short, long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Copy a table into another database file, creating it if needed.
    Copy {
        /// Source table name.
        table: String,

        /// Destination database file.
        #[arg(long)]
        to: PathBuf,

        /// Destination table name (defaults to the source name).
        #[arg(long = "as", value_name = "NAME")]
        target: Option<String>,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))
}

fn statement(sql: String, params: Vec<(String, String)>) -> Statement {
    params
        .into_iter()
        .fold(Statement::new(sql), |stmt, (name, value)| stmt.bind(name, value))
}

fn registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    oxide_dal_sqlite::register(&mut registry);
    oxide_dal_csv::register(&mut registry);
    registry
}

/// Opens a destination file, creating it if it does not exist yet.
fn open_target(registry: &ProviderRegistry, path: &Path) -> anyhow::Result<Database> {
    let params = registry.params_for_file(path)?;
    let connection_string = params
        .parsed()?
        .set(MODE, OpenMode::ReadWriteCreate.to_string());
    let params = ConnectionParams::new(params.provider(), connection_string.to_string());
    Ok(registry.open(&params)?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let registry = registry();
    let db = registry
        .open_file(&cli.database)
        .with_context(|| format!("cannot open {}", cli.database.display()))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Tables => {
            for (index, name) in db.list_tables()?.iter().enumerate() {
                writeln!(out, "{index}: {name}")?;
            }
        }

        Commands::Show { table, json } => {
            let data = db.read_table(&table)?;
            if json {
                print::write_json(&data, &mut out)?;
            } else {
                print::write_table(&data, &mut out)?;
            }
        }

        Commands::Query { sql, params, json } => {
            let data = db.execute_table(&statement(sql, params))?;
            if json {
                print::write_json(&data, &mut out)?;
            } else {
                print::write_table(&data, &mut out)?;
            }
        }

        Commands::Exec { sql, params } => {
            let affected = db.execute_non_query(&statement(sql, params))?;
            writeln!(out, "{affected}")?;
        }

        Commands::Copy { table, to, target } => {
            let data = db.read_table(&table)?;
            let destination = open_target(&registry, &to)
                .with_context(|| format!("cannot open {}", to.display()))?;
            let target = target.unwrap_or(table);
            let written = destination.write_table(&target, &data)?;
            info!(
                table = %target,
                rows = written,
                destination = %to.display(),
                "Copied table"
            );
        }
    }

    Ok(())
}
