//! The `export-addon` subcommand: datapacks in, Lua data file out.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use frugalforge_lib::{render_lua, store, AddonData, Producer};

use crate::output::{self, OutputFormat};

/// Arguments for the `export-addon` subcommand.
#[derive(Args)]
pub struct ExportAddonArgs {
    /// Datapack root holding professions/, items.json and producers.json
    #[arg(long, default_value = "data/Anniversary")]
    pub data_dir: PathBuf,

    /// Lua file to write
    #[arg(long, default_value = "addon/FrugalForge/FrugalForge_Data_Anniversary.lua")]
    pub out: PathBuf,

    /// Global variable the data table is assigned to
    #[arg(long, default_value = "FrugalForgeData_Anniversary")]
    pub global_name: String,
}

fn load_smelts(path: &Path) -> Result<Vec<Producer>> {
    if !path.exists() {
        tracing::warn!("{} not found; exporting without smelts", path.display());
        return Ok(Vec::new());
    }
    Ok(store::load_smelts(path)?)
}

pub fn run(args: &ExportAddonArgs, format: &OutputFormat) -> Result<()> {
    let professions_dir = args.data_dir.join("professions");
    let professions = store::load_packs(&professions_dir)
        .with_context(|| format!("Failed to load packs from {}", professions_dir.display()))?;
    let items = store::load_items(&args.data_dir.join("items.json"))?;
    let smelts = load_smelts(&args.data_dir.join("producers.json"))?;

    let data = AddonData::new(professions, smelts, &items);
    store::write_atomic(&args.out, &render_lua(&args.global_name, &data))?;
    eprintln!("Wrote {}", args.out.display());

    output::print_summary(&output::addon_rows(&data), format);
    Ok(())
}
