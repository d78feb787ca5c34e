//! Vendor price backfill for the item table.

use wowhead_api::Resource;

use crate::cache::PageCache;
use crate::client::CachedClient;
use crate::dataset::ItemTable;
use crate::error::ForgeError;
use crate::scan::extract_listview_data;
use crate::vendor::{is_vendor_item_from_xml, min_unlimited_money_cost, VendorSale};

/// Items between progress log lines.
const PROGRESS_EVERY: usize = 100;

/// Listview on item pages that lists the vendors selling the item.
pub const SOLD_BY_LISTVIEW: &str = "sold-by";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub scanned: usize,
    pub vendor_candidates: usize,
    pub updated: usize,
    pub skipped_existing: usize,
}

/// Fills `vendorPriceCopper` for vendor-sold items that lack one.
///
/// Items are visited in id order. `max_items` caps how many are scanned
/// (0 = all). An item is only fetched as a full page when its XML render
/// marks it as vendor-sold. Items whose vendors all have limited stock or
/// non-copper costs are left unpriced. `on_progress(scanned, total)` is
/// called once per scanned item.
pub async fn backfill_vendor_prices<C, F>(
    client: &CachedClient<C>,
    items: &mut ItemTable,
    max_items: usize,
    mut on_progress: F,
) -> Result<BackfillSummary, ForgeError>
where
    C: PageCache,
    F: FnMut(usize, usize),
{
    let total = if max_items > 0 {
        items.len().min(max_items)
    } else {
        items.len()
    };
    let mut summary = BackfillSummary::default();

    for item in items.iter_mut() {
        if max_items > 0 && summary.scanned >= max_items {
            break;
        }
        summary.scanned += 1;

        if item.has_vendor_price() {
            summary.skipped_existing += 1;
        } else if let Some(price) = vendor_price(client, item.item_id, &mut summary).await? {
            tracing::debug!("{} ({}): {} copper", item.name, item.item_id, price);
            item.set_vendor_price(price);
            summary.updated += 1;
        }

        on_progress(summary.scanned, total);
        if summary.scanned % PROGRESS_EVERY == 0 {
            tracing::info!(
                "Scanned {} items; vendor candidates {}; updated {}",
                summary.scanned,
                summary.vendor_candidates,
                summary.updated
            );
        }
    }

    Ok(summary)
}

async fn vendor_price<C: PageCache>(
    client: &CachedClient<C>,
    item_id: u32,
    summary: &mut BackfillSummary,
) -> Result<Option<u64>, ForgeError> {
    let xml = client.fetch(&Resource::ItemXml(item_id)).await?;
    if !is_vendor_item_from_xml(&xml) {
        return Ok(None);
    }
    summary.vendor_candidates += 1;

    let html = client.fetch(&Resource::Item(item_id)).await?;
    let Some(rows) = extract_listview_data(&html, SOLD_BY_LISTVIEW) else {
        tracing::debug!("item {} has no usable {} listview", item_id, SOLD_BY_LISTVIEW);
        return Ok(None);
    };
    let sales: Vec<VendorSale> = rows.iter().map(VendorSale::from_listview).collect();
    Ok(min_unlimited_money_cost(&sales))
}
