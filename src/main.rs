use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

mod clipboard;
mod county;
mod extract;
mod fetch;
mod html;
mod lookup;
mod menu;
mod output;
mod record;
mod report;
mod settings;
mod telemetry;
mod util;

use output::config::OutputConfig;
use settings::Settings;

#[derive(Parser)]
#[command(name = "cad", about = "Appraisal district property lookup (FBCAD, HCAD)")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,
    /// Tax year to search (defaults to CAD_TAX_YEAR, then the current year)
    #[arg(global = true, long)]
    tax_year: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive county/address prompt (default)
    Menu,
    Lookup(lookup::LookupCmd),
    Extract(extract::ExtractCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);
    output::init(OutputConfig::resolve(cli.json));

    // initialize logging/tracing (stderr). Respect RUST_LOG and CAD_LOG_FORMAT
    telemetry::config::init_tracing();

    let mut settings = Settings::from_env()?;
    if let Some(year) = cli.tax_year.as_deref() {
        settings.tax_year = util::time::parse_tax_year(year)?;
    }

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => menu::run(&settings).await?,
        Commands::Lookup(args) => lookup::run(&settings, args).await?,
        Commands::Extract(args) => extract::run(&settings, args)?,
    }

    Ok(())
}
