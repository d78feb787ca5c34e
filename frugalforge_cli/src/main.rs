mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "frugalforge")]
#[command(about = "Build the FrugalForge addon datapacks from Wowhead and wago.tools")]
struct Cli {
    /// Summary format: table or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a profession's recipes into a profession pack and the item table
    ExportRecipes(commands::export_recipes::ExportRecipesArgs),
    /// Fill in vendor prices for items sold with unlimited stock
    BackfillVendorPrices(commands::backfill_vendor_prices::BackfillVendorPricesArgs),
    /// Render the addon's Lua data file from the datapacks
    ExportAddon(commands::export_addon::ExportAddonArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("frugalforge=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    match &cli.command {
        Commands::ExportRecipes(args) => commands::export_recipes::run(args, &format).await?,
        Commands::BackfillVendorPrices(args) => {
            commands::backfill_vendor_prices::run(args, &format).await?
        }
        Commands::ExportAddon(args) => commands::export_addon::run(args, &format)?,
    }

    Ok(())
}
