//! Library layer for FrugalForge: scraping, normalizing and exporting the
//! addon's crafting datapacks.
//!
//! Wraps the `wowhead_api` page client with a persistent cache and retry
//! policy, extracts recipe and vendor data from the fetched pages, and reads
//! and writes the JSON datapacks and the generated Lua data file.

pub mod assemble;
pub mod backfill;
pub mod cache;
pub mod client;
pub mod dataset;
pub mod difficulty;
pub mod error;
pub mod export;
pub mod extract;
pub mod recipes;
pub mod scan;
pub mod skill_line;
pub mod store;
pub mod vendor;

pub use wowhead_api;
pub use wowhead_api::{Resource, WAGO_BUILD};

pub use assemble::{resolve_reagent_names, slugify, AssembleError, PackBuilder};
pub use backfill::{backfill_vendor_prices, BackfillSummary};
pub use cache::{CacheError, DiskCache, MemoryCache, PageCache};
pub use client::{CachedClient, FetchError, FetchStatsSnapshot, RetryPolicy};
pub use dataset::{Item, ItemTable, NamePrecedence, ProfessionPack, Producer, Recipe};
pub use difficulty::{DifficultyBands, DifficultyError, RawDifficulty};
pub use error::ForgeError;
pub use export::{render_lua, AddonData};
pub use extract::{parse_spell_page, ExtractError, SpellPage};
pub use recipes::{scrape_profession, Profession, ScrapeOutcome, ScrapeSummary};
pub use scan::{extract_listview_data, find_matching_bracket, ScanError};
pub use skill_line::{spell_ids_for_skill_line, SkillLineError};
pub use store::StoreError;
pub use vendor::{is_vendor_item_from_xml, min_unlimited_money_cost, VendorSale};
