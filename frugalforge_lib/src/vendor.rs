//! Vendor price resolution from `sold-by` listview records and item XML renders.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Stock value the renderer uses for vendors that never run out.
pub const UNLIMITED_STOCK: i64 = -1;

/// Source code the item XML uses for "sold by a vendor".
const VENDOR_SOURCE: u64 = 5;

/// One row of a `sold-by` listview.
///
/// `cost` keeps the raw JSON amounts so that booleans, floats and item
/// references can be told apart from plain copper amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorSale {
    pub stock: Option<i64>,
    pub cost: Vec<Vec<Value>>,
}

impl VendorSale {
    /// Builds a sale from a listview object. Missing or oddly shaped fields
    /// become `None` / an empty cost so the record is simply filtered out later.
    pub fn from_listview(obj: &Map<String, Value>) -> Self {
        let stock = obj.get("stock").and_then(Value::as_i64);
        let cost = match obj.get("cost") {
            Some(Value::Array(components)) => components
                .iter()
                .map(|component| match component {
                    Value::Array(amounts) => amounts.clone(),
                    // A bare amount is not a priced component.
                    _ => Vec::new(),
                })
                .collect(),
            _ => Vec::new(),
        };
        Self { stock, cost }
    }

    /// Copper price when this is an unlimited-stock, currency-only sale.
    pub fn unlimited_money_cost(&self) -> Option<u64> {
        if self.stock != Some(UNLIMITED_STOCK) {
            return None;
        }
        let [component] = self.cost.as_slice() else {
            return None;
        };
        let [amount] = component.as_slice() else {
            return None;
        };
        // Value::Bool never reaches as_u64, so `true` is not mistaken for 1.
        match amount {
            Value::Number(n) => n.as_u64().filter(|&copper| copper > 0),
            _ => None,
        }
    }
}

/// Cheapest unlimited-stock copper price among `sales`, if any qualifies.
pub fn min_unlimited_money_cost<'a, I>(sales: I) -> Option<u64>
where
    I: IntoIterator<Item = &'a VendorSale>,
{
    sales
        .into_iter()
        .filter_map(VendorSale::unlimited_money_cost)
        .min()
}

/// Whether an item XML render lists a vendor among the item's sources.
///
/// The render wraps a brace-less JSON object body in
/// `<json><![CDATA[...]]></json>`. Any structural problem means "no".
pub fn is_vendor_item_from_xml(xml: &str) -> bool {
    let Some(payload) = json_cdata(xml) else {
        return false;
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return false;
    }
    let obj: Value = match serde_json::from_str(&format!("{{{}}}", payload)) {
        Ok(obj) => obj,
        Err(e) => {
            tracing::debug!("item xml json payload is not valid: {}", e);
            return false;
        }
    };
    match obj.get("source") {
        Some(Value::Array(sources)) => sources.iter().any(|s| s.as_u64() == Some(VENDOR_SOURCE)),
        _ => false,
    }
}

fn json_cdata(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut in_json = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"json" => in_json = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"json" => in_json = false,
            Ok(Event::CData(e)) if in_json => {
                return String::from_utf8(e.into_inner().into_owned()).ok();
            }
            Ok(Event::Eof) => return None,
            Err(e) => {
                tracing::debug!(
                    "item xml parse error at position {}: {}",
                    reader.error_position(),
                    e
                );
                return None;
            }
            _ => {}
        }
    }
}
