use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use lifetax_cli::config::Config;
use lifetax_cli::report::{self, OutputFormat};
use lifetax_cli::{app, income_csv, logging};
use lifetax_core::{Jurisdiction, SavedIncomeData};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Lifetime Canadian income tax estimator.
///
/// Applies federal and provincial bracket tables, including the Ontario
/// surtax, to every year of an income history.
#[derive(Debug, Parser)]
#[command(name = "lifetax", version)]
struct Cli {
    /// TOML configuration file (defaults to `lifetax.toml` if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database connection string, e.g. `lifetax.db` or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Directory holding `federal.csv`, `provincial.csv` and `surtax.csv`.
    #[arg(long, global = true)]
    rates_dir: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate lifetime tax for an income history CSV (`year,income`).
    Calculate {
        #[arg(long)]
        income: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Save an income history and print the seed it can be loaded with.
    Save {
        #[arg(long)]
        income: PathBuf,
        /// Province or territory code, e.g. `ontario`, `bc`, `pei`.
        #[arg(long)]
        province: Option<String>,
    },
    /// Load a saved income history and calculate its lifetime tax.
    Load {
        seed: String,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// List jurisdictions with tabulated rates.
    Provinces,
    /// Delete saved income histories that have expired.
    Purge,
}

#[derive(Debug, clap::Args)]
struct RenderArgs {
    /// Province or territory code; overrides the saved or configured one.
    #[arg(long)]
    province: Option<String>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the result to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database.connection_string = db;
    }
    if let Some(dir) = cli.rates_dir {
        config.rates_dir = Some(dir);
    }

    logging::init_logging(cli.verbose, config.log_file.as_deref())?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Command::Calculate { income, render } => {
            let rates = app::load_rates(config.rates_dir.as_deref())?;
            let history = income_csv::load_from_file(&income, app::current_year())?;
            let jurisdiction =
                Jurisdiction::resolve(render.province.as_deref().unwrap_or(&config.default_province));

            let result = app::calculate(&rates, jurisdiction, &history)?;
            let text = report::render(
                &result,
                &history,
                jurisdiction,
                render.format.unwrap_or(config.format),
            )?;
            app::write_output(&text, render.output.as_deref())?;
        }
        Command::Save { income, province } => {
            let history = income_csv::load_from_file(&income, app::current_year())?;
            let jurisdiction =
                Jurisdiction::resolve(province.as_deref().unwrap_or(&config.default_province));

            let store = app::open_store(&config.database, config.retention_days).await?;
            let saved = store
                .save(&SavedIncomeData {
                    jurisdiction,
                    income: history,
                })
                .await?;
            println!("{}", saved.seed);
        }
        Command::Load { seed, render } => {
            let rates = app::load_rates(config.rates_dir.as_deref())?;
            let store = app::open_store(&config.database, config.retention_days).await?;
            let saved = store.load(&seed).await?;
            let jurisdiction = match render.province.as_deref() {
                Some(code) => Jurisdiction::resolve(code),
                None => saved.data.jurisdiction,
            };

            let result = app::calculate(&rates, jurisdiction, &saved.data.income)?;
            let text = report::render(
                &result,
                &saved.data.income,
                jurisdiction,
                render.format.unwrap_or(config.format),
            )?;
            app::write_output(&text, render.output.as_deref())?;
        }
        Command::Provinces => {
            let rates = app::load_rates(config.rates_dir.as_deref())?;
            print!("{}", app::provinces_table(&rates));
        }
        Command::Purge => {
            let store = app::open_store(&config.database, config.retention_days).await?;
            let removed = store.purge_expired().await?;
            println!("{removed} expired income histories removed");
        }
    }

    Ok(())
}
