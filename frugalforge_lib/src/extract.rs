//! Field extractors for rendered spell pages.
//!
//! Each extractor is a standalone function over the raw page text returning
//! an explicit `Result`. A recipe is only built when every required field was
//! found; callers skip the whole page on any [`ExtractError`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::difficulty::RawDifficulty;

/// Heading that opens the reagents table on a spell page.
const REAGENTS_HEADING: &str = r#"id="icon-list-heading-reagents""#;
const TABLE_END: &str = "</table>";

static SPELL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)WH\.Gatherer\.addData\(6,\s*5,\s*\{"(?P<id>\d+)":\{"name_enus":"(?P<name>[^"]+)""#,
    )
    .expect("spell name pattern is valid")
});

static DIFFICULTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)Difficulty:\s*\[color=r1\](?P<r1>\d+)\[\\?/color\].*?",
        r"\[color=r2\](?P<r2>\d+)\[\\?/color\].*?",
        r"\[color=r3\](?P<r3>\d+)\[\\?/color\].*?",
        r"\[color=r4\](?P<r4>\d+)\[\\?/color\]",
    ))
    .expect("difficulty pattern is valid")
});

static REAGENT_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)data-icon-list-quantity="(?P<qty>\d+)".*?item=(?P<item_id>\d+)/"#)
        .expect("reagent row pattern is valid")
});

static ITEM_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"(?P<id>\d+)":\{"name_enus":"(?P<name>[^"]+)""#)
        .expect("item name pattern is valid")
});

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("page does not require {profession}")]
    NotProfessionPage { profession: String },
    #[error("spell name not found for spell {spell_id}")]
    MissingName { spell_id: u32 },
    #[error("difficulty tiers not found")]
    MissingDifficulty,
    #[error("reagents section not found")]
    MissingReagentsSection,
    #[error("no reagents parsed from reagents section")]
    NoReagentsParsed,
    #[error("reagent row with item {item_id} and quantity {qty} is not usable")]
    InvalidReagentRow { item_id: String, qty: String },
}

impl ExtractError {
    /// Short label used for skip counters.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotProfessionPage { .. } => "not a profession page",
            Self::MissingName { .. } => "missing name",
            Self::MissingDifficulty => "missing difficulty",
            Self::MissingReagentsSection => "missing reagents section",
            Self::NoReagentsParsed => "no reagents parsed",
            Self::InvalidReagentRow { .. } => "invalid reagent row",
        }
    }
}

/// A reagent row as printed on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReagentRow {
    pub item_id: u32,
    pub qty: u32,
}

/// Everything a recipe needs from one spell page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellPage {
    pub spell_id: u32,
    pub name: String,
    pub difficulty: RawDifficulty,
    pub reagents: Vec<ReagentRow>,
    /// Every item name visible anywhere on the page, keyed by item id.
    pub item_names: BTreeMap<u32, String>,
}

/// Fails unless the page states the profession as a requirement.
pub fn require_profession(html: &str, profession: &str) -> Result<(), ExtractError> {
    if html.contains(&format!("Requires {}", profession)) {
        Ok(())
    } else {
        Err(ExtractError::NotProfessionPage {
            profession: profession.to_string(),
        })
    }
}

/// The spell's display name. The first spell entry on the page must be `spell_id`.
pub fn extract_spell_name(html: &str, spell_id: u32) -> Result<String, ExtractError> {
    let missing = ExtractError::MissingName { spell_id };
    let caps = SPELL_NAME_RE.captures(html).ok_or_else(|| missing.clone())?;
    if caps["id"].parse::<u32>().ok() != Some(spell_id) {
        return Err(missing);
    }
    Ok(caps["name"].to_string())
}

/// The four colored difficulty thresholds.
pub fn extract_difficulty(html: &str) -> Result<RawDifficulty, ExtractError> {
    let caps = DIFFICULTY_RE
        .captures(html)
        .ok_or(ExtractError::MissingDifficulty)?;
    let mut values = [0u32; 4];
    for (slot, group) in values.iter_mut().zip(["r1", "r2", "r3", "r4"]) {
        *slot = caps[group]
            .parse()
            .map_err(|_| ExtractError::MissingDifficulty)?;
    }
    Ok(RawDifficulty(values))
}

/// Reagent rows, scanned only between the reagents heading and the end of its table.
/// One unusable row fails the whole section.
pub fn extract_reagents(html: &str) -> Result<Vec<ReagentRow>, ExtractError> {
    let start = html
        .find(REAGENTS_HEADING)
        .ok_or(ExtractError::MissingReagentsSection)?;
    let end = start
        + html[start..]
            .find(TABLE_END)
            .ok_or(ExtractError::MissingReagentsSection)?;
    let section = &html[start..end];

    let reagents = REAGENT_ROW_RE
        .captures_iter(section)
        .map(|cap| {
            let item_id = cap["item_id"].parse::<u32>().ok().filter(|&id| id > 0);
            let qty = cap["qty"].parse::<u32>().ok().filter(|&q| q >= 1);
            match (item_id, qty) {
                (Some(item_id), Some(qty)) => Ok(ReagentRow { item_id, qty }),
                _ => Err(ExtractError::InvalidReagentRow {
                    item_id: cap["item_id"].to_string(),
                    qty: cap["qty"].to_string(),
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    if reagents.is_empty() {
        return Err(ExtractError::NoReagentsParsed);
    }
    Ok(reagents)
}

/// Every `"id":{"name_enus":"..."` pair on the page. Later entries for the same id win.
pub fn harvest_item_names(html: &str) -> BTreeMap<u32, String> {
    ITEM_NAME_RE
        .captures_iter(html)
        .filter_map(|cap| Some((cap["id"].parse::<u32>().ok()?, cap["name"].to_string())))
        .collect()
}

/// Runs every extractor against a spell page.
pub fn parse_spell_page(
    spell_id: u32,
    profession: &str,
    html: &str,
) -> Result<SpellPage, ExtractError> {
    require_profession(html, profession)?;
    let name = extract_spell_name(html, spell_id)?;
    let difficulty = extract_difficulty(html)?;
    let reagents = extract_reagents(html)?;
    let item_names = harvest_item_names(html);

    Ok(SpellPage {
        spell_id,
        name,
        difficulty,
        reagents,
        item_names,
    })
}
