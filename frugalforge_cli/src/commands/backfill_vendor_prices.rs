//! The `backfill-vendor-prices` subcommand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use frugalforge_lib::{backfill_vendor_prices, store};

use crate::commands::{progress_bar, FetchArgs};
use crate::output::{self, OutputFormat};

/// Arguments for the `backfill-vendor-prices` subcommand.
#[derive(Args)]
pub struct BackfillVendorPricesArgs {
    /// Item table to update in place
    #[arg(long, default_value = "data/Anniversary/items.json")]
    pub items_json: PathBuf,

    /// Directory for cached item pages
    #[arg(long, default_value = ".wago-cache/wowhead-items")]
    pub cache_dir: PathBuf,

    /// Seconds to sleep after each network fetch
    #[arg(long, default_value = "0.0")]
    pub request_delay_seconds: f64,

    /// Maximum items to scan (0 = no limit)
    #[arg(long, default_value = "0")]
    pub max_items: usize,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

pub async fn run(args: &BackfillVendorPricesArgs, format: &OutputFormat) -> Result<()> {
    let client = args
        .fetch
        .cached_client(&args.cache_dir, args.request_delay_seconds)?;
    let mut items = store::load_items(&args.items_json)
        .with_context(|| format!("Failed to load {}", args.items_json.display()))?;

    let pb = progress_bar(0, "scanning items...");
    let summary = backfill_vendor_prices(&client, &mut items, args.max_items, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })
    .await;
    pb.finish_and_clear();
    let summary = summary.context("Backfill aborted; item table left unchanged")?;

    store::write_json(&args.items_json, &items)?;

    let mut rows = output::backfill_rows(&summary);
    rows.extend(output::fetch_rows(&client.stats()));
    output::print_summary(&rows, format);
    Ok(())
}
