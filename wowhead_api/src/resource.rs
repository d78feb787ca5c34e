//! Remote resources addressable by numeric id.

use std::fmt;

/// Dataset build the SkillLineAbility export is pinned to.
pub const WAGO_BUILD: &str = "2.5.4.44833";

/// A single remote document the tooling knows how to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// The SkillLineAbility table exported as CSV for a dataset build.
    SkillLineAbilityCsv { build: String },
    /// A rendered spell page.
    Spell(u32),
    /// A rendered item page.
    Item(u32),
    /// The structured XML render of an item.
    ItemXml(u32),
}

impl Resource {
    /// SkillLineAbility export for the pinned build.
    pub fn skill_line_ability() -> Self {
        Self::SkillLineAbilityCsv {
            build: WAGO_BUILD.to_string(),
        }
    }

    /// Path and query relative to the site that serves this resource.
    pub fn path(&self) -> String {
        match self {
            Self::SkillLineAbilityCsv { build } => {
                format!("/db2/SkillLineAbility/csv?build={}", build)
            }
            Self::Spell(id) => format!("/tbc/spell={}", id),
            Self::Item(id) => format!("/tbc/item={}", id),
            Self::ItemXml(id) => format!("/tbc/item={}?xml", id),
        }
    }

    /// Whether the resource lives on the database export site rather than the page renderer.
    pub fn is_db_export(&self) -> bool {
        matches!(self, Self::SkillLineAbilityCsv { .. })
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkillLineAbilityCsv { build } => {
                write!(f, "SkillLineAbility csv (build {})", build)
            }
            Self::Spell(id) => write!(f, "spell {}", id),
            Self::Item(id) => write!(f, "item {}", id),
            Self::ItemXml(id) => write!(f, "item {} (xml)", id),
        }
    }
}
