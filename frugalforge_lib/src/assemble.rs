//! Turning parsed spell pages into a profession pack and reconciling item names.

use std::collections::{BTreeMap, HashMap};

use crate::dataset::{Item, ItemTable, NamePrecedence, ProfessionPack, Reagent, Recipe};
use crate::difficulty::DifficultyBands;
use crate::extract::SpellPage;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AssembleError {
    #[error("no recipes were parsed for {profession}")]
    NoRecipes { profession: String },
    #[error("missing {} reagent item names: {ids:?}", .ids.len())]
    UnresolvedReagents { ids: Vec<u32> },
}

/// Lowercase slug with every run of non-alphanumerics collapsed to `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "recipe".to_string()
    } else {
        slug
    }
}

/// Hands out recipe ids that are unique within one profession.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    used: HashMap<String, u32>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for `name`, suffixed with `spell_id` when the plain slug is taken.
    pub fn assign(&mut self, name: &str, spell_id: u32) -> String {
        let mut slug = slugify(name);
        if self.used.contains_key(&slug) {
            slug = format!("{}-{}", slug, spell_id);
        }
        self.used.insert(slug.clone(), spell_id);
        slug
    }
}

/// Accumulates recipes for one profession.
pub struct PackBuilder {
    profession_id: u32,
    profession_name: String,
    slugs: SlugRegistry,
    recipes: Vec<Recipe>,
    reagent_names: BTreeMap<u32, String>,
}

impl PackBuilder {
    pub fn new(profession_id: u32, profession_name: impl Into<String>) -> Self {
        Self {
            profession_id,
            profession_name: profession_name.into(),
            slugs: SlugRegistry::new(),
            recipes: Vec::new(),
            reagent_names: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Adds a parsed page. Names the page shows for its own reagents are kept
    /// for the item table; other harvested names are not.
    pub fn push(&mut self, page: SpellPage, bands: DifficultyBands) {
        let recipe_id = self.slugs.assign(&page.name, page.spell_id);
        for row in &page.reagents {
            if let Some(name) = page.item_names.get(&row.item_id) {
                self.reagent_names.insert(row.item_id, name.clone());
            }
        }
        self.recipes.push(Recipe {
            recipe_id,
            profession_id: self.profession_id,
            name: page.name,
            creates_item_id: None,
            creates_quantity: None,
            learned_by_trainer: None,
            cooldown_seconds: None,
            bands,
            reagents: page
                .reagents
                .iter()
                .map(|row| Reagent {
                    item_id: row.item_id,
                    qty: row.qty,
                })
                .collect(),
        });
    }

    /// The sorted pack plus the reagent names harvested along the way.
    pub fn finish(self) -> Result<(ProfessionPack, BTreeMap<u32, String>), AssembleError> {
        if self.recipes.is_empty() {
            return Err(AssembleError::NoRecipes {
                profession: self.profession_name,
            });
        }
        let mut pack = ProfessionPack {
            profession_id: self.profession_id,
            profession_name: self.profession_name,
            recipes: self.recipes,
        };
        pack.sort_recipes();
        Ok((pack, self.reagent_names))
    }
}

/// Ensures every reagent of `pack` has a name in `items`, filling gaps from
/// `harvested`. Fails without touching `items` if any reagent stays unnamed.
/// Returns the number of items added.
pub fn resolve_reagent_names(
    items: &mut ItemTable,
    pack: &ProfessionPack,
    harvested: &BTreeMap<u32, String>,
    precedence: NamePrecedence,
) -> Result<usize, AssembleError> {
    let mut additions = Vec::new();
    let mut missing = Vec::new();
    for item_id in pack.reagent_item_ids() {
        match harvested.get(&item_id) {
            Some(name) => additions.push(Item::new(item_id, name.clone())),
            None if items.contains(item_id) => {}
            None => missing.push(item_id),
        }
    }

    if !missing.is_empty() {
        return Err(AssembleError::UnresolvedReagents { ids: missing });
    }

    let mut added = 0;
    for item in additions {
        if items.merge(item, precedence) {
            added += 1;
        }
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::RawDifficulty;
    use crate::extract::ReagentRow;

    fn page(spell_id: u32, name: &str, min: u32, reagents: &[(u32, &str)]) -> SpellPage {
        SpellPage {
            spell_id,
            name: name.to_string(),
            difficulty: RawDifficulty([min, min + 10, min + 20, min + 30]),
            reagents: reagents
                .iter()
                .map(|(item_id, _)| ReagentRow {
                    item_id: *item_id,
                    qty: 1,
                })
                .collect(),
            item_names: reagents
                .iter()
                .map(|(id, n)| (*id, n.to_string()))
                .chain([(1, "Unrelated".to_string())])
                .collect(),
        }
    }

    fn push(builder: &mut PackBuilder, p: SpellPage) {
        let bands = p.difficulty.normalize().unwrap();
        builder.push(p, bands);
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Bolt of Linen Cloth"), "bolt-of-linen-cloth");
        assert_eq!(slugify("  Cenarion Herb Bag!! "), "cenarion-herb-bag");
        assert_eq!(slugify("Gloves of the Greatfather's"), "gloves-of-the-greatfather-s");
        assert_eq!(slugify("Spellfire Belt (Epic)"), "spellfire-belt-epic");
        assert_eq!(slugify("???"), "recipe");
        assert_eq!(slugify(""), "recipe");
    }

    #[test]
    fn colliding_slugs_get_spell_id() {
        let mut slugs = SlugRegistry::new();
        assert_eq!(slugs.assign("Red Linen Robe", 2389), "red-linen-robe");
        assert_eq!(slugs.assign("Red Linen Robe", 7623), "red-linen-robe-7623");
        assert_eq!(slugs.assign("Red  Linen Robe", 8000), "red-linen-robe-8000");
    }

    #[test]
    fn builder_sorts_and_keeps_reagent_names_only() {
        let mut builder = PackBuilder::new(197, "Tailoring");
        push(&mut builder, page(3915, "Brown Linen Shirt", 10, &[(2996, "Bolt of Linen Cloth")]));
        push(&mut builder, page(2963, "Bolt of Linen Cloth", 1, &[(2589, "Linen Cloth")]));

        let (pack, names) = builder.finish().unwrap();
        assert_eq!(pack.recipes[0].recipe_id, "bolt-of-linen-cloth");
        assert_eq!(pack.recipes[1].recipe_id, "brown-linen-shirt");
        assert_eq!(pack.recipes[0].bands.gray_at, 31);
        assert!(names.contains_key(&2589));
        assert!(!names.contains_key(&1));
    }

    #[test]
    fn empty_builder_fails() {
        let builder = PackBuilder::new(197, "Tailoring");
        assert_eq!(
            builder.finish().unwrap_err(),
            AssembleError::NoRecipes {
                profession: "Tailoring".into()
            }
        );
    }

    #[test]
    fn unresolved_reagents_abort_without_changes() {
        let mut builder = PackBuilder::new(197, "Tailoring");
        push(&mut builder, page(2963, "Bolt of Linen Cloth", 1, &[(2589, "Linen Cloth")]));
        let (mut pack, names) = builder.finish().unwrap();
        pack.recipes[0].reagents.push(Reagent { item_id: 4291, qty: 1 });

        let mut items = ItemTable::new();
        let err =
            resolve_reagent_names(&mut items, &pack, &names, NamePrecedence::KeepExisting)
                .unwrap_err();
        assert_eq!(err, AssembleError::UnresolvedReagents { ids: vec![4291] });
        assert!(items.is_empty());
    }

    #[test]
    fn existing_names_satisfy_references_and_win() {
        let mut builder = PackBuilder::new(197, "Tailoring");
        push(&mut builder, page(2963, "Bolt of Linen Cloth", 1, &[(2589, "Linen Cloth (new)")]));
        let (mut pack, names) = builder.finish().unwrap();
        pack.recipes[0].reagents.push(Reagent { item_id: 2320, qty: 1 });

        let mut items: ItemTable = vec![
            Item::new(2589, "Linen Cloth"),
            Item::new(2320, "Coarse Thread"),
        ]
        .into_iter()
        .collect();
        let added =
            resolve_reagent_names(&mut items, &pack, &names, NamePrecedence::KeepExisting).unwrap();
        assert_eq!(added, 0);
        assert_eq!(items.name(2589), Some("Linen Cloth"));
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let mut builder = PackBuilder::new(197, "Tailoring");
        push(&mut builder, page(2963, "Bolt of Linen Cloth", 1, &[(2589, "Linen Cloth")]));
        let (pack, names) = builder.finish().unwrap();

        let mut items = ItemTable::new();
        assert_eq!(
            resolve_reagent_names(&mut items, &pack, &names, NamePrecedence::KeepExisting),
            Ok(1)
        );
        let once = items.clone();
        assert_eq!(
            resolve_reagent_names(&mut items, &pack, &names, NamePrecedence::KeepExisting),
            Ok(0)
        );
        assert_eq!(items, once);
    }
}
