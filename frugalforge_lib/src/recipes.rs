//! The profession scrape: skill-line enumeration, spell pages, one pack.

use std::collections::BTreeMap;

use wowhead_api::Resource;

use crate::assemble::PackBuilder;
use crate::cache::PageCache;
use crate::client::CachedClient;
use crate::dataset::ProfessionPack;
use crate::error::ForgeError;
use crate::extract::parse_spell_page;
use crate::skill_line::spell_ids_for_skill_line;

/// Pages between progress log lines.
const PROGRESS_EVERY: usize = 50;

/// The profession to scrape: its skill-line id and its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profession {
    pub skill_line: u32,
    pub name: String,
}

impl Profession {
    pub fn new(skill_line: u32, name: impl Into<String>) -> Self {
        Self {
            skill_line,
            name: name.into(),
        }
    }
}

/// Counters for one profession scrape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    /// Spell ids the skill line lists.
    pub spells: usize,
    /// Spell pages that were fetched (after the `max_spells` cap).
    pub visited: usize,
    /// Pages that became recipes.
    pub parsed: usize,
    /// Skipped pages, counted per reason.
    pub skipped: BTreeMap<&'static str, usize>,
}

impl ScrapeSummary {
    fn skip(&mut self, reason: &'static str) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// A finished scrape: the sorted pack and the reagent names seen on its pages.
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub pack: ProfessionPack,
    pub reagent_names: BTreeMap<u32, String>,
    pub summary: ScrapeSummary,
}

/// Scrapes every spell `profession` teaches into a profession pack.
///
/// `max_spells` caps the pages visited (0 = all). Pages missing a required
/// field or carrying an invalid difficulty are skipped and counted; fetch
/// failures and an empty result abort. `on_progress(done, total)` is called
/// after every page.
pub async fn scrape_profession<C, F>(
    client: &CachedClient<C>,
    profession: &Profession,
    max_spells: usize,
    mut on_progress: F,
) -> Result<ScrapeOutcome, ForgeError>
where
    C: PageCache,
    F: FnMut(usize, usize),
{
    let csv_text = client.fetch(&Resource::skill_line_ability()).await?;
    let mut spell_ids = spell_ids_for_skill_line(&csv_text, profession.skill_line)?;

    let mut summary = ScrapeSummary {
        spells: spell_ids.len(),
        ..ScrapeSummary::default()
    };
    if max_spells > 0 {
        spell_ids.truncate(max_spells);
    }
    let total = spell_ids.len();
    tracing::info!(
        "{}: {} spells on skill line {} ({} to visit)",
        profession.name,
        summary.spells,
        profession.skill_line,
        total
    );

    let mut builder = PackBuilder::new(profession.skill_line, profession.name.clone());
    for (idx, spell_id) in spell_ids.into_iter().enumerate() {
        let html = client.fetch(&Resource::Spell(spell_id)).await?;
        summary.visited += 1;

        match parse_spell_page(spell_id, &profession.name, &html) {
            Ok(page) => match page.difficulty.normalize() {
                Ok(bands) => {
                    builder.push(page, bands);
                    summary.parsed += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping spell {}: {}", spell_id, e);
                    summary.skip("invalid difficulty");
                }
            },
            Err(e) => {
                tracing::debug!("Skipping spell {}: {}", spell_id, e);
                summary.skip(e.reason());
            }
        }

        let done = idx + 1;
        on_progress(done, total);
        if done % PROGRESS_EVERY == 0 {
            tracing::info!("Processed {}/{} spell pages", done, total);
        }
    }

    let (pack, reagent_names) = builder.finish()?;
    tracing::info!(
        "{}: {} recipes, {} skipped",
        profession.name,
        summary.parsed,
        summary.skipped_total()
    );
    Ok(ScrapeOutcome {
        pack,
        reagent_names,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_reasons() {
        let mut summary = ScrapeSummary::default();
        summary.skip("missing name");
        summary.skip("missing name");
        summary.skip("invalid difficulty");
        assert_eq!(summary.skipped["missing name"], 2);
        assert_eq!(summary.skipped_total(), 3);
    }
}
