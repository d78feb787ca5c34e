//! Spell enumeration from the SkillLineAbility CSV export.

use std::collections::BTreeSet;

use serde::Deserialize;

const SKILL_LINE_COLUMN: &str = "SkillLine";
const SPELL_COLUMN: &str = "Spell";

#[derive(thiserror::Error, Debug)]
pub enum SkillLineError {
    #[error("unreadable SkillLineAbility header: {0}")]
    Csv(#[from] csv::Error),
    #[error("SkillLineAbility export has no {0} column")]
    MissingColumn(&'static str),
}

#[derive(Debug, Deserialize)]
struct SkillLineAbilityRow {
    #[serde(rename = "SkillLine")]
    skill_line: String,
    #[serde(rename = "Spell")]
    spell: String,
}

impl SkillLineAbilityRow {
    fn ids(&self) -> Option<(u32, u32)> {
        Some((
            self.skill_line.trim().parse().ok()?,
            self.spell.trim().parse().ok()?,
        ))
    }
}

/// Sorted, de-duplicated spell ids taught by `skill_line`.
///
/// Short, unreadable or unparseable rows are skipped; a missing header column fails.
pub fn spell_ids_for_skill_line(
    csv_text: &str,
    skill_line: u32,
) -> Result<Vec<u32>, SkillLineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();
    for column in [SKILL_LINE_COLUMN, SPELL_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(SkillLineError::MissingColumn(column));
        }
    }

    let mut spell_ids = BTreeSet::new();
    let mut malformed = 0usize;
    for record in reader.records() {
        let ids = record
            .ok()
            .and_then(|r| r.deserialize::<SkillLineAbilityRow>(Some(&headers)).ok())
            .and_then(|row| row.ids());
        let Some((line, spell)) = ids else {
            malformed += 1;
            continue;
        };
        if line == skill_line {
            spell_ids.insert(spell);
        }
    }

    if malformed > 0 {
        tracing::warn!("Skipped {} malformed SkillLineAbility rows", malformed);
    }
    Ok(spell_ids.into_iter().collect())
}
