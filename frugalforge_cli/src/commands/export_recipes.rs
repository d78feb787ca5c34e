//! The `export-recipes` subcommand: scrape one profession into its datapack.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use frugalforge_lib::{resolve_reagent_names, scrape_profession, store, NamePrecedence, Profession};

use crate::commands::{progress_bar, FetchArgs};
use crate::output::{self, OutputFormat};

/// Arguments for the `export-recipes` subcommand.
#[derive(Args)]
pub struct ExportRecipesArgs {
    /// SkillLine id of the profession (197 = Tailoring)
    #[arg(long, default_value = "197")]
    pub skill_line: u32,

    /// Profession name as printed in "Requires <name>" on spell pages
    #[arg(long, default_value = "Tailoring")]
    pub profession: String,

    /// Profession pack to write
    #[arg(long, default_value = "data/Anniversary/professions/tailoring.json")]
    pub out_profession_json: PathBuf,

    /// Item table to merge reagent names into
    #[arg(long, default_value = "data/Anniversary/items.json")]
    pub out_items_json: PathBuf,

    /// Directory for cached downloads
    #[arg(long, default_value = ".wago-cache")]
    pub cache_dir: PathBuf,

    /// Seconds to sleep after each network fetch
    #[arg(long, alias = "sleep-seconds", default_value = "1.0")]
    pub request_delay_seconds: f64,

    /// Maximum spell pages to visit (0 = no limit)
    #[arg(long, default_value = "0")]
    pub max_items: usize,

    /// Replace existing item names with the ones found on spell pages
    #[arg(long)]
    pub prefer_scraped_names: bool,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

pub async fn run(args: &ExportRecipesArgs, format: &OutputFormat) -> Result<()> {
    let client = args
        .fetch
        .cached_client(&args.cache_dir, args.request_delay_seconds)?;
    let profession = Profession::new(args.skill_line, args.profession.clone());

    let pb = progress_bar(0, "fetching spell pages...");
    let outcome = scrape_profession(&client, &profession, args.max_items, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })
    .await;
    pb.finish_and_clear();
    let outcome = outcome.with_context(|| format!("Export of {} aborted", profession.name))?;

    let precedence = if args.prefer_scraped_names {
        NamePrecedence::PreferIncoming
    } else {
        NamePrecedence::KeepExisting
    };
    let mut items = store::load_items_or_default(&args.out_items_json)?;
    let added =
        resolve_reagent_names(&mut items, &outcome.pack, &outcome.reagent_names, precedence)
            .with_context(|| {
                format!(
                    "Reagent names are incomplete; {} was not written",
                    args.out_profession_json.display()
                )
            })?;

    store::write_json(&args.out_profession_json, &outcome.pack)?;
    store::write_json(&args.out_items_json, &items)?;
    eprintln!(
        "Wrote {} ({} recipes)",
        args.out_profession_json.display(),
        outcome.pack.recipes.len()
    );
    eprintln!(
        "Wrote {} ({} items)",
        args.out_items_json.display(),
        items.len()
    );

    let mut rows = output::scrape_rows(&outcome.summary, added, items.len());
    rows.extend(output::fetch_rows(&client.stats()));
    output::print_summary(&rows, format);
    Ok(())
}
