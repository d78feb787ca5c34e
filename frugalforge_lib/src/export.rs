//! Rendering of the addon's generated Lua data file.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::dataset::{ItemTable, ProfessionPack, Producer, Reagent, Recipe};

/// Everything the addon data file contains.
#[derive(Debug, Clone, Default)]
pub struct AddonData {
    pub professions: Vec<ProfessionPack>,
    pub smelts: Vec<Producer>,
    pub items: BTreeMap<u32, String>,
}

impl AddonData {
    pub fn new(professions: Vec<ProfessionPack>, smelts: Vec<Producer>, items: &ItemTable) -> Self {
        Self {
            professions,
            smelts,
            items: items.names(),
        }
    }
}

/// Quotes `value` as a Lua string literal. Non-ASCII text is written as raw
/// UTF-8; control characters use decimal escapes.
pub fn lua_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\{:03}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn push_reagents(lines: &mut Vec<String>, indent: &str, reagents: &[Reagent]) {
    for r in reagents {
        lines.push(format!(
            "{}{{ itemId = {}, qty = {} }},",
            indent, r.item_id, r.qty
        ));
    }
}

fn push_recipe(lines: &mut Vec<String>, r: &Recipe) {
    lines.push("        {".into());
    lines.push(format!("          recipeId = {},", lua_string(&r.recipe_id)));
    lines.push(format!("          professionId = {},", r.profession_id));
    lines.push(format!("          name = {},", lua_string(&r.name)));
    if let Some(id) = r.creates_item_id {
        lines.push(format!("          createsItemId = {},", id));
    }
    if let Some(qty) = r.creates_quantity {
        lines.push(format!("          createsQuantity = {},", qty));
    }
    if let Some(trainer) = r.learned_by_trainer {
        lines.push(format!("          learnedByTrainer = {},", trainer));
    }
    if let Some(cd) = r.cooldown_seconds.filter(|&cd| cd > 0) {
        lines.push(format!("          cooldownSeconds = {},", cd));
    }
    let b = &r.bands;
    lines.push(format!("          minSkill = {},", b.min_skill));
    lines.push(format!("          orangeUntil = {},", b.orange_until));
    lines.push(format!("          yellowUntil = {},", b.yellow_until));
    lines.push(format!("          greenUntil = {},", b.green_until));
    lines.push(format!("          grayAt = {},", b.gray_at));
    lines.push("          reagents = {".into());
    push_reagents(lines, "            ", &r.reagents);
    lines.push("          },".into());
    lines.push("        },".into());
}

/// Renders the data file assigning the three collections to `global_name`.
pub fn render_lua(global_name: &str, data: &AddonData) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("{} = {{", global_name));

    lines.push("  professions = {".into());
    for prof in &data.professions {
        lines.push("    {".into());
        lines.push(format!("      professionId = {},", prof.profession_id));
        lines.push(format!("      name = {},", lua_string(&prof.profession_name)));
        lines.push("      recipes = {".into());
        for r in &prof.recipes {
            push_recipe(&mut lines, r);
        }
        lines.push("      },".into());
        lines.push("    },".into());
    }
    lines.push("  },".into());

    lines.push("  smelts = {".into());
    for s in &data.smelts {
        lines.push(format!("    [{}] = {{", s.output.item_id));
        lines.push(format!("      name = {},", lua_string(&s.name)));
        lines.push(format!("      outputQty = {},", s.output.qty));
        lines.push("      reagents = {".into());
        push_reagents(&mut lines, "        ", &s.reagents);
        lines.push("      },".into());
        lines.push("    },".into());
    }
    lines.push("  },".into());

    lines.push("  items = {".into());
    for (item_id, name) in &data.items {
        lines.push(format!("    [{}] = {},", item_id, lua_string(name)));
    }
    lines.push("  }".into());
    lines.push("}".into());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Item, ProducerOutput};
    use crate::difficulty::DifficultyBands;

    fn bolt() -> Recipe {
        Recipe {
            recipe_id: "bolt-of-linen-cloth".into(),
            profession_id: 197,
            name: "Bolt of Linen Cloth".into(),
            creates_item_id: None,
            creates_quantity: None,
            learned_by_trainer: None,
            cooldown_seconds: None,
            bands: DifficultyBands {
                min_skill: 1,
                orange_until: 24,
                yellow_until: 36,
                green_until: 49,
                gray_at: 50,
            },
            reagents: vec![Reagent { item_id: 2589, qty: 2 }],
        }
    }

    fn sample() -> AddonData {
        let items: ItemTable = vec![Item::new(2996, "Bolt of Linen Cloth"), Item::new(2589, "Linen Cloth")]
            .into_iter()
            .collect();
        AddonData::new(
            vec![ProfessionPack {
                profession_id: 197,
                profession_name: "Tailoring".into(),
                recipes: vec![bolt()],
            }],
            vec![Producer {
                kind: "Smelt".into(),
                name: "Smelt Copper".into(),
                output: ProducerOutput { item_id: 2840, qty: 1 },
                reagents: vec![Reagent { item_id: 2770, qty: 1 }],
            }],
            &items,
        )
    }

    #[test]
    fn renders_full_document() {
        let lua = render_lua("FrugalForgeData_Anniversary", &sample());
        let expected = r#"FrugalForgeData_Anniversary = {
  professions = {
    {
      professionId = 197,
      name = "Tailoring",
      recipes = {
        {
          recipeId = "bolt-of-linen-cloth",
          professionId = 197,
          name = "Bolt of Linen Cloth",
          minSkill = 1,
          orangeUntil = 24,
          yellowUntil = 36,
          greenUntil = 49,
          grayAt = 50,
          reagents = {
            { itemId = 2589, qty = 2 },
          },
        },
      },
    },
  },
  smelts = {
    [2840] = {
      name = "Smelt Copper",
      outputQty = 1,
      reagents = {
        { itemId = 2770, qty = 1 },
      },
    },
  },
  items = {
    [2589] = "Linen Cloth",
    [2996] = "Bolt of Linen Cloth",
  }
}
"#;
        assert_eq!(lua, expected);
    }

    #[test]
    fn optional_recipe_fields_render_when_present() {
        let mut data = sample();
        let r = &mut data.professions[0].recipes[0];
        r.creates_item_id = Some(2996);
        r.creates_quantity = Some(1);
        r.learned_by_trainer = Some(true);
        r.cooldown_seconds = Some(0);
        let lua = render_lua("X", &data);
        assert!(lua.contains("          createsItemId = 2996,\n"));
        assert!(lua.contains("          learnedByTrainer = true,\n"));
        assert!(!lua.contains("cooldownSeconds"));

        data.professions[0].recipes[0].cooldown_seconds = Some(86400);
        assert!(render_lua("X", &data).contains("          cooldownSeconds = 86400,\n"));
    }

    #[test]
    fn strings_are_escaped_for_lua() {
        assert_eq!(lua_string(r#"Robe of "Power""#), r#""Robe of \"Power\"""#);
        assert_eq!(lua_string("a\\b"), r#""a\\b""#);
        assert_eq!(lua_string("line\nbreak"), r#""line\nbreak""#);
        assert_eq!(lua_string("bell\u{7}"), r#""bell\007""#);
        assert_eq!(lua_string("Éclat"), "\"Éclat\"");
    }

    #[test]
    fn empty_collections_still_render() {
        let lua = render_lua("Empty", &AddonData::default());
        assert_eq!(
            lua,
            "Empty = {\n  professions = {\n  },\n  smelts = {\n  },\n  items = {\n  }\n}\n"
        );
    }
}
