//! Injects a generated [`OwnedSection`] into an existing document.
//!
//! The result equals the input except inside the owned boundary of the
//! format. [`normalize`] adds the scaffolding and structural preconditions a
//! format needs; the diff gate runs the same function on its baseline.

use serde_yaml::{Mapping, Value};

use crate::core_api::CoreError;
use crate::document::{child_mapping_mut, child_sequence_mut, mapping, root_mapping, string_list};
use crate::format::Format;
use crate::generate::{OwnedSection, TabSection, mob_leveling, tab};
use crate::ownership::{
    self, ACHIEVEMENTS_SECTION, BOOKS_SECTION, CONDITIONS_SECTION, EVENTS_SECTION, FOOTER_KEY,
    HEADER_FOOTER_SECTION, HEADER_KEY, PRESETS_SECTION, RULES_SECTION, SCOREBOARD_SECTION,
    SCOREBOARDS_KEY,
};

fn header_footer_scaffold() -> Mapping {
    mapping([("enabled", Value::Bool(true))])
}

fn scoreboard_scaffold() -> Mapping {
    mapping([
        ("enabled", Value::Bool(true)),
        (SCOREBOARDS_KEY, Value::Mapping(Mapping::new())),
    ])
}

/// Inserts each `(key, value)` not already present, leaving existing
/// definitions alone.
fn insert_missing(target: &mut Mapping, entries: Vec<(String, Value)>) {
    for (key, value) in entries {
        if !target.contains_key(key.as_str()) {
            target.insert(Value::from(key), value);
        }
    }
}

/// Creates missing scaffolding and structural preconditions in place.
/// Present-but-mistyped blocks are `MissingStructure` errors.
pub fn normalize(format: Format, root: &mut Mapping) -> Result<(), CoreError> {
    match format {
        Format::Achievements => {
            if matches!(root.get(ACHIEVEMENTS_SECTION), None | Some(Value::Null)) {
                root.insert(
                    Value::from(ACHIEVEMENTS_SECTION),
                    Value::Mapping(Mapping::new()),
                );
            }
        }
        Format::ConditionalEvents => {
            child_mapping_mut(root, EVENTS_SECTION, Mapping::new)?;
        }
        Format::Tab => {
            child_mapping_mut(root, HEADER_FOOTER_SECTION, header_footer_scaffold)?;
            let scoreboard = child_mapping_mut(root, SCOREBOARD_SECTION, scoreboard_scaffold)?;
            // Owned wholesale, so a placeholder of any shape is replaced on merge.
            if matches!(scoreboard.get(SCOREBOARDS_KEY), None | Some(Value::Null)) {
                scoreboard.insert(Value::from(SCOREBOARDS_KEY), Value::Mapping(Mapping::new()));
            }
            let conditions = child_mapping_mut(root, CONDITIONS_SECTION, Mapping::new)?;
            insert_missing(conditions, tab::world_conditions());
        }
        Format::MobLeveling => {
            child_sequence_mut(root, RULES_SECTION)?;
            let presets = child_mapping_mut(root, PRESETS_SECTION, Mapping::new)?;
            insert_missing(presets, mob_leveling::reference_presets());
        }
        Format::LoreBooks => {
            child_mapping_mut(root, BOOKS_SECTION, Mapping::new)?;
        }
    }
    Ok(())
}

/// Returns a new document with `section` merged into `existing`.
///
/// Full-replacement entries keep their position. Filtered collections keep
/// their unowned members in order and receive the generated members after
/// them.
pub fn merge(existing: &Value, section: &OwnedSection) -> Result<Value, CoreError> {
    let format = section.format();
    let mut root = root_mapping(existing)?;
    normalize(format, &mut root)?;

    match section {
        OwnedSection::Achievements { commands } => {
            root.insert(
                Value::from(ACHIEVEMENTS_SECTION),
                Value::Mapping(commands.clone()),
            );
        }
        OwnedSection::ConditionalEvents { events } => {
            let target = child_mapping_mut(&mut root, EVENTS_SECTION, Mapping::new)?;
            target.retain(|k, v| !ownership::events_owns(k, v));
            target.extend(events.clone());
        }
        OwnedSection::Tab(tab) => merge_tab(&mut root, tab)?,
        OwnedSection::MobLeveling { rules } => {
            let target = child_sequence_mut(&mut root, RULES_SECTION)?;
            target.retain(|rule| !ownership::mob_rule_owns(rule));
            target.extend(rules.iter().cloned());
        }
        OwnedSection::LoreBooks { books } => {
            let target = child_mapping_mut(&mut root, BOOKS_SECTION, Mapping::new)?;
            target.retain(|k, v| !ownership::lore_owns(k, v));
            target.extend(books.clone());
        }
    }

    tracing::debug!(format = %format, "merged owned section");
    Ok(Value::Mapping(root))
}

fn merge_tab(root: &mut Mapping, tab: &TabSection) -> Result<(), CoreError> {
    let header_footer = child_mapping_mut(root, HEADER_FOOTER_SECTION, header_footer_scaffold)?;
    header_footer.insert(Value::from(HEADER_KEY), string_list(tab.header.iter().cloned()));
    header_footer.insert(Value::from(FOOTER_KEY), string_list(tab.footer.iter().cloned()));

    let scoreboard = child_mapping_mut(root, SCOREBOARD_SECTION, scoreboard_scaffold)?;
    scoreboard.insert(
        Value::from(SCOREBOARDS_KEY),
        Value::Mapping(tab.scoreboards.clone()),
    );

    let conditions = child_mapping_mut(root, CONDITIONS_SECTION, Mapping::new)?;
    conditions.retain(|k, v| !ownership::tab_condition_owns(k, v));
    conditions.extend(tab.conditions.clone());
    Ok(())
}
