//! Datapack records: items, recipes, profession packs and producers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::difficulty::DifficultyBands;

const VENDOR_PRICE_KEY: &str = "vendorPriceCopper";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawItem")]
pub struct Item {
    pub item_id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_price_copper: Option<u64>,
    /// Fields written by other tooling, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn new(item_id: u32, name: impl Into<String>) -> Self {
        Self {
            item_id,
            name: name.into(),
            vendor_price_copper: None,
            extra: Map::new(),
        }
    }

    /// Whether a positive vendor price is already recorded.
    pub fn has_vendor_price(&self) -> bool {
        self.vendor_price_copper.is_some_and(|p| p > 0)
    }

    /// Records a vendor price, replacing any unusable value read from disk.
    pub fn set_vendor_price(&mut self, copper: u64) {
        self.extra.remove(VENDOR_PRICE_KEY);
        self.vendor_price_copper = Some(copper);
    }
}

/// On-disk item shape. Only a positive integer counts as a vendor price; any
/// other value is kept verbatim in `extra` so the item still round-trips and
/// can be priced again.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    item_id: u32,
    name: String,
    #[serde(default)]
    vendor_price_copper: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawItem> for Item {
    fn from(raw: RawItem) -> Self {
        let mut extra = raw.extra;
        let vendor_price_copper = match raw.vendor_price_copper {
            None => None,
            Some(value) => match value.as_u64().filter(|&p| p > 0) {
                Some(price) => Some(price),
                None => {
                    extra.insert(VENDOR_PRICE_KEY.to_string(), value);
                    None
                }
            },
        };
        Self {
            item_id: raw.item_id,
            name: raw.name,
            vendor_price_copper,
            extra,
        }
    }
}

/// Which name survives when an item id is seen twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamePrecedence {
    /// First writer wins: a name already in the table is never replaced.
    #[default]
    KeepExisting,
    /// The incoming name replaces the stored one.
    PreferIncoming,
}

/// The global item table, always ordered by item id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemTable {
    items: BTreeMap<u32, Item>,
}

impl ItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item_id: u32) -> bool {
        self.items.contains_key(&item_id)
    }

    pub fn get(&self, item_id: u32) -> Option<&Item> {
        self.items.get(&item_id)
    }

    pub fn name(&self, item_id: u32) -> Option<&str> {
        self.items.get(&item_id).map(|item| item.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.items.values_mut()
    }

    /// Inserts an item, resolving an id clash with `precedence`.
    /// Returns `true` when the table changed.
    pub fn merge(&mut self, item: Item, precedence: NamePrecedence) -> bool {
        match self.items.get_mut(&item.item_id) {
            None => {
                self.items.insert(item.item_id, item);
                true
            }
            Some(existing) => match precedence {
                NamePrecedence::KeepExisting => false,
                NamePrecedence::PreferIncoming => {
                    if existing.name == item.name {
                        return false;
                    }
                    existing.name = item.name;
                    true
                }
            },
        }
    }

    /// Names for the table as a plain map.
    pub fn names(&self) -> BTreeMap<u32, String> {
        self.items
            .iter()
            .map(|(id, item)| (*id, item.name.clone()))
            .collect()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items.into_values().collect()
    }
}

impl FromIterator<Item> for ItemTable {
    /// Builds a table keeping the first occurrence of each id.
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut table = ItemTable::new();
        for item in iter {
            table.merge(item, NamePrecedence::KeepExisting);
        }
        table
    }
}

impl Serialize for ItemTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.values())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reagent {
    pub item_id: u32,
    pub qty: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub recipe_id: String,
    pub profession_id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creates_item_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creates_quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_by_trainer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_seconds: Option<u32>,
    #[serde(flatten)]
    pub bands: DifficultyBands,
    pub reagents: Vec<Reagent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionPack {
    pub profession_id: u32,
    pub profession_name: String,
    pub recipes: Vec<Recipe>,
}

impl ProfessionPack {
    /// Orders recipes by (minSkill, name); ties keep their relative order.
    pub fn sort_recipes(&mut self) {
        self.recipes.sort_by(|a, b| {
            a.bands
                .min_skill
                .cmp(&b.bands.min_skill)
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    /// Every distinct reagent item id referenced by the pack, ascending.
    pub fn reagent_item_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .recipes
            .iter()
            .flat_map(|r| r.reagents.iter().map(|g| g.item_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Kind tag of producers the addon export consumes.
pub const SMELT_KIND: &str = "Smelt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerOutput {
    pub item_id: u32,
    #[serde(default = "default_qty")]
    pub qty: u32,
}

fn default_qty() -> u32 {
    1
}

/// A non-recipe crafting process such as smelting ore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    pub kind: String,
    #[serde(default)]
    pub name: String,
    pub output: ProducerOutput,
    #[serde(default)]
    pub reagents: Vec<Reagent>,
}
