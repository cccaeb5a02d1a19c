//! juicectl - Operator tool for the juice shop database
//!
//! Every subcommand is a one-shot procedure against Postgres:
//! - Schema setup and catalog seeding (`setup`, `seed`)
//! - Data checks (`verify`, `stock`)
//! - Account and order inspection (`admin-check`, `orders`)
//! - Audited stock changes (`stock-adjust`)
//!
//! Exit status is 0 on success and 1 on any error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use juicectl_core::config::{self, JuiceConfig};
use tracing::error;

mod commands;
mod tracing_setup;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "juicectl",
    author,
    version,
    about = "Schema setup, seeding, reports and repairs for the juice shop database",
    long_about = "Connects to the shop's Postgres database (DB_HOST, DB_PORT, DB_NAME, DB_USER, \
                  DB_PASSWORD or DATABASE_URL), runs one operation, and exits."
)]
struct Cli {
    /// Debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress spinners (for scripts and cron)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Read settings from this TOML file instead of ~/.juicectl/config.toml and ./juicectl.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create all tables and indexes (idempotent)
    Setup,
    /// Insert the product catalog, skipping products that already exist
    Seed(commands::seed::SeedArgs),
    /// Print product and size counts, a name-prefix report and zero-stock sizes
    Verify(commands::verify::VerifyArgs),
    /// Print stock status for every size of every active product
    Stock,
    /// Change a size's stock level and record it in stock history
    StockAdjust(commands::stock::StockAdjustArgs),
    /// Check the administrator account and repair its role
    AdminCheck(commands::admin::AdminCheckArgs),
    /// Print a user's orders with their line items as JSON
    Orders(commands::orders::OrdersArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    ui::init_quiet_mode(cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions(args) = &cli.command {
        return run_completions(args);
    }

    config::load_dotenv();
    let config = match &cli.config {
        Some(path) => JuiceConfig::load_path(path)?,
        None => JuiceConfig::load()?,
    };

    match cli.command {
        Commands::Setup => commands::run_setup(&config).await?,
        Commands::Seed(args) => commands::run_seed(args, &config).await?,
        Commands::Verify(args) => commands::run_verify(args, &config).await?,
        Commands::Stock => commands::run_stock(&config).await?,
        Commands::StockAdjust(args) => commands::run_stock_adjust(args, &config).await?,
        Commands::AdminCheck(args) => commands::run_admin_check(args, &config).await?,
        Commands::Orders(args) => commands::run_orders(args, &config).await?,
        Commands::Completions(_) => {}
    }
    Ok(())
}

fn run_completions(args: &CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
