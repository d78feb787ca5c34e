use serde::Serialize;
use frugalforge_lib::{AddonData, BackfillSummary, FetchStatsSnapshot, ScrapeSummary};
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled, Serialize, Debug, PartialEq, Eq)]
pub struct SummaryRow {
    #[tabled(rename = "Metric")]
    #[serde(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Count")]
    #[serde(rename = "Count")]
    count: u64,
}

fn row(metric: impl Into<String>, count: impl TryInto<u64>) -> SummaryRow {
    SummaryRow {
        metric: metric.into(),
        count: count.try_into().unwrap_or(u64::MAX),
    }
}

// -- Row builders --

pub fn scrape_rows(
    summary: &ScrapeSummary,
    items_added: usize,
    items_total: usize,
) -> Vec<SummaryRow> {
    let mut rows = vec![
        row("Spells on skill line", summary.spells),
        row("Spell pages visited", summary.visited),
        row("Recipes parsed", summary.parsed),
    ];
    rows.extend(
        summary
            .skipped
            .iter()
            .map(|(reason, count)| row(format!("Skipped: {}", reason), *count)),
    );
    rows.push(row("Items added", items_added));
    rows.push(row("Items total", items_total));
    rows
}

pub fn backfill_rows(summary: &BackfillSummary) -> Vec<SummaryRow> {
    vec![
        row("Items scanned", summary.scanned),
        row("Vendor candidates", summary.vendor_candidates),
        row("Prices updated", summary.updated),
        row("Skipped (already priced)", summary.skipped_existing),
    ]
}

pub fn addon_rows(data: &AddonData) -> Vec<SummaryRow> {
    let recipes: usize = data.professions.iter().map(|p| p.recipes.len()).sum();
    vec![
        row("Professions", data.professions.len()),
        row("Recipes", recipes),
        row("Smelts", data.smelts.len()),
        row("Items", data.items.len()),
    ]
}

pub fn fetch_rows(stats: &FetchStatsSnapshot) -> Vec<SummaryRow> {
    vec![
        row("Cache hits", stats.cache_hits),
        row("Network requests", stats.network_fetches),
        row("Retries", stats.retries),
    ]
}

// -- Output --

pub fn print_summary(rows: &[SummaryRow], format: &OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Json => print_json(&rows),
    }
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
