//! Section generators: pure functions from the classified region set to the
//! owned part of each target format.
//!
//! Output depends on inputs only. Every generator filters out disabled
//! regions and sorts what it emits by a stable key.

pub mod achievements;
pub mod events;
pub mod lore_books;
pub mod mob_leveling;
pub mod tab;

use serde_yaml::{Mapping, Value};

use crate::format::Format;
use crate::region::{OnboardingConfig, RegionRecord, RegionSet};

pub use lore_books::{LoreSettings, paginate};
pub use mob_leveling::{DifficultyLevel, MobLevelingSettings};
pub use tab::TabSection;

#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub regions: &'a RegionSet,
    pub onboarding: &'a OnboardingConfig,
    pub mob_leveling: &'a MobLevelingSettings,
    pub lore: &'a LoreSettings,
}

/// Generated payload for one format. Which document entries it replaces is
/// decided by the matching predicate in [`crate::ownership`].
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedSection {
    Achievements { commands: Mapping },
    ConditionalEvents { events: Mapping },
    Tab(TabSection),
    MobLeveling { rules: Vec<Value> },
    LoreBooks { books: Mapping },
}

impl OwnedSection {
    pub fn format(&self) -> Format {
        match self {
            Self::Achievements { .. } => Format::Achievements,
            Self::ConditionalEvents { .. } => Format::ConditionalEvents,
            Self::Tab(_) => Format::Tab,
            Self::MobLeveling { .. } => Format::MobLeveling,
            Self::LoreBooks { .. } => Format::LoreBooks,
        }
    }

    pub fn entry_count(&self) -> usize {
        match self {
            Self::Achievements { commands } => commands.len(),
            Self::ConditionalEvents { events } => events.len(),
            Self::Tab(section) => {
                2 + section.scoreboards.len() + section.conditions.len()
            }
            Self::MobLeveling { rules } => rules.len(),
            Self::LoreBooks { books } => books.len(),
        }
    }
}

pub fn generate(format: Format, ctx: &GenerationContext<'_>) -> OwnedSection {
    let section = match format {
        Format::Achievements => OwnedSection::Achievements {
            commands: achievements::generate(ctx),
        },
        Format::ConditionalEvents => OwnedSection::ConditionalEvents {
            events: events::generate(ctx),
        },
        Format::Tab => OwnedSection::Tab(tab::generate(ctx)),
        Format::MobLeveling => OwnedSection::MobLeveling {
            rules: mob_leveling::generate(ctx),
        },
        Format::LoreBooks => OwnedSection::LoreBooks {
            books: lore_books::generate(ctx),
        },
    };
    tracing::debug!(
        format = %format,
        entries = section.entry_count(),
        "generated owned section"
    );
    section
}

/// The region new players are onboarded into: the classified first-join
/// record, or failing that the active record matching the configured id.
pub fn start_region<'a>(
    regions: &'a RegionSet,
    onboarding: &OnboardingConfig,
) -> Option<&'a RegionRecord> {
    if let Some(record) = regions.first_join() {
        return Some(record);
    }
    let wanted = onboarding.start_region()?;
    regions.active().find(|r| r.id == wanted)
}

pub(crate) fn is_start(record: &RegionRecord, start: Option<&RegionRecord>) -> bool {
    start.is_some_and(|s| s.world == record.world && s.id == record.id)
}

/// Active records sorted by `key`; on duplicate keys the first record in
/// `(world, id)` order is kept and the rest are reported and dropped.
pub(crate) fn unique_by_key<'a, F>(
    regions: &'a RegionSet,
    what: &str,
    key: F,
) -> Vec<(String, &'a RegionRecord)>
where
    F: Fn(&RegionRecord) -> String,
{
    let mut keyed: Vec<(String, &RegionRecord)> = regions.active().map(|r| (key(r), r)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.dedup_by(|dup, kept| {
        let same = dup.0 == kept.0;
        if same {
            tracing::warn!(
                key = %dup.0,
                kept = %format!("{}/{}", kept.1.world, kept.1.id),
                dropped = %format!("{}/{}", dup.1.world, dup.1.id),
                "duplicate {what} key, keeping first region"
            );
        }
        same
    });
    keyed
}

/// Renders a coordinate the way players type them: `12` rather than `12.0`.
pub(crate) fn coord(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
