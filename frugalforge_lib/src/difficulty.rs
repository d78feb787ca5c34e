//! Conversion of scraped difficulty tiers into the addon's color bands.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DifficultyError {
    #[error("difficulty values must be positive, got {0:?}")]
    NonPositive([u32; 4]),
    #[error("difficulty values are not non-decreasing: {0:?}")]
    NotMonotonic([u32; 4]),
}

/// Skill levels at which a recipe turns orange, yellow, green and gray,
/// exactly as the spell page prints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDifficulty(pub [u32; 4]);

/// Skill-level band boundaries used to color recipes.
///
/// Always satisfies `min_skill <= orange_until <= yellow_until <= green_until < gray_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyBands {
    pub min_skill: u32,
    pub orange_until: u32,
    pub yellow_until: u32,
    pub green_until: u32,
    pub gray_at: u32,
}

impl RawDifficulty {
    pub fn normalize(self) -> Result<DifficultyBands, DifficultyError> {
        let values = self.0;
        if values.iter().any(|&v| v == 0) {
            return Err(DifficultyError::NonPositive(values));
        }
        if values.windows(2).any(|w| w[0] > w[1]) {
            return Err(DifficultyError::NotMonotonic(values));
        }

        let [r1, r2, r3, r4] = values;
        let min_skill = r1;
        let orange_until = min_skill.max(r2 - 1);
        let yellow_until = orange_until.max(r3 - 1);
        let green_until = yellow_until.max(r4 - 1);
        let gray_at = (green_until + 1).max(r4);

        Ok(DifficultyBands {
            min_skill,
            orange_until,
            yellow_until,
            green_until,
            gray_at,
        })
    }
}

impl DifficultyBands {
    fn as_array(&self) -> [u32; 5] {
        [
            self.min_skill,
            self.orange_until,
            self.yellow_until,
            self.green_until,
            self.gray_at,
        ]
    }

    /// Whether the bands are ordered the way the addon expects.
    pub fn is_well_formed(&self) -> bool {
        let v = self.as_array();
        v[0] <= v[1] && v[1] <= v[2] && v[2] <= v[3] && v[3] < v[4]
    }
}
