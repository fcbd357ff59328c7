//! Ownership predicates, one per format.
//!
//! Each predicate answers, for any document of its format, whether an entry
//! belongs to the generator. The merge engine removes owned entries with
//! [`strip_owned`] before inserting fresh ones, and the diff gate strips the
//! same entries from both sides, so the two steps cannot disagree.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::core_api::CoreError;
use crate::document::kind_name;
use crate::format::Format;

pub const ACHIEVEMENTS_SECTION: &str = "Commands";

pub const EVENTS_SECTION: &str = "Events";
pub const FIRST_JOIN_EVENT: &str = "first_join";
pub const HEART_TIP_EVENT: &str = "region_heart_tip";
pub const DISCOVER_EVENT_SUFFIX: &str = "_discover_once";

pub const HEADER_FOOTER_SECTION: &str = "header-footer";
pub const HEADER_KEY: &str = "header";
pub const FOOTER_KEY: &str = "footer";
pub const SCOREBOARD_SECTION: &str = "scoreboard";
pub const SCOREBOARDS_KEY: &str = "scoreboards";
pub const CONDITIONS_SECTION: &str = "conditions";
pub const LEADERBOARD_CONDITIONS: [&str; 3] = ["top-explorer-1", "top-explorer-2", "top-explorer-3"];

pub const RULES_SECTION: &str = "custom-rules";
pub const PRESETS_SECTION: &str = "presets";
pub const RULE_PRESET_KEY: &str = "use-preset";
pub const RULE_CONDITIONS_KEY: &str = "conditions";
pub const RULE_REGION_FILTER_KEY: &str = "worldguard-regions";

pub const BOOKS_SECTION: &str = "books";
pub const LORE_BOOK_PREFIX: &str = "region-lore-";

static DIFFICULTY_PRESET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^difficulty-preset-(easy|normal|hard|severe|deadly)$")
        .expect("difficulty preset pattern is valid")
});

/// Top-level keys of an achievements document.
pub fn achievements_owns(key: &Value, _value: &Value) -> bool {
    key.as_str() == Some(ACHIEVEMENTS_SECTION)
}

/// Keys under `Events`.
pub fn events_owns(key: &Value, _value: &Value) -> bool {
    match key.as_str() {
        Some(name) => {
            name == FIRST_JOIN_EVENT
                || name == HEART_TIP_EVENT
                || name.ends_with(DISCOVER_EVENT_SUFFIX)
        }
        None => false,
    }
}

/// Keys under `header-footer`.
pub fn tab_header_footer_owns(key: &Value, _value: &Value) -> bool {
    matches!(key.as_str(), Some(HEADER_KEY) | Some(FOOTER_KEY))
}

/// Keys under `scoreboard`. The nested scoreboards map is owned wholesale.
pub fn tab_scoreboard_owns(key: &Value, _value: &Value) -> bool {
    key.as_str() == Some(SCOREBOARDS_KEY)
}

/// Keys under `conditions`.
pub fn tab_condition_owns(key: &Value, _value: &Value) -> bool {
    key.as_str()
        .is_some_and(|name| LEADERBOARD_CONDITIONS.contains(&name))
}

/// Elements of `custom-rules`. Ownership is structural: an array region
/// filter, or a single-region filter paired with a generated preset name.
pub fn mob_rule_owns(rule: &Value) -> bool {
    let Some(rule) = rule.as_mapping() else {
        return false;
    };
    let filter = rule
        .get(RULE_CONDITIONS_KEY)
        .and_then(Value::as_mapping)
        .and_then(|conditions| conditions.get(RULE_REGION_FILTER_KEY));
    match filter {
        Some(Value::Sequence(_)) => true,
        Some(Value::String(_)) => rule
            .get(RULE_PRESET_KEY)
            .and_then(Value::as_str)
            .is_some_and(|preset| DIFFICULTY_PRESET.is_match(preset)),
        _ => false,
    }
}

/// Keys under `books`.
pub fn lore_owns(key: &Value, _value: &Value) -> bool {
    key.as_str()
        .is_some_and(|name| name.starts_with(LORE_BOOK_PREFIX))
}

/// Removes every owned entry from a normalized document root.
pub fn strip_owned(format: Format, root: &mut Mapping) -> Result<(), CoreError> {
    match format {
        Format::Achievements => {
            root.retain(|k, v| !achievements_owns(k, v));
        }
        Format::ConditionalEvents => {
            if let Some(events) = nested_mapping(root, EVENTS_SECTION)? {
                events.retain(|k, v| !events_owns(k, v));
            }
        }
        Format::Tab => {
            if let Some(block) = nested_mapping(root, HEADER_FOOTER_SECTION)? {
                block.retain(|k, v| !tab_header_footer_owns(k, v));
            }
            if let Some(block) = nested_mapping(root, SCOREBOARD_SECTION)? {
                block.retain(|k, v| !tab_scoreboard_owns(k, v));
            }
            if let Some(block) = nested_mapping(root, CONDITIONS_SECTION)? {
                block.retain(|k, v| !tab_condition_owns(k, v));
            }
        }
        Format::MobLeveling => match root.get_mut(RULES_SECTION) {
            Some(Value::Sequence(rules)) => rules.retain(|rule| !mob_rule_owns(rule)),
            Some(Value::Null) | None => {}
            Some(other) => {
                return Err(CoreError::missing_structure(format!(
                    "'{RULES_SECTION}' must be a list, found {}",
                    kind_name(other)
                )));
            }
        },
        Format::LoreBooks => {
            if let Some(books) = nested_mapping(root, BOOKS_SECTION)? {
                books.retain(|k, v| !lore_owns(k, v));
            }
        }
    }
    Ok(())
}

fn nested_mapping<'a>(root: &'a mut Mapping, key: &str) -> Result<Option<&'a mut Mapping>, CoreError> {
    match root.get_mut(key) {
        Some(Value::Mapping(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(CoreError::missing_structure(format!(
            "'{key}' must be a mapping, found {}",
            kind_name(other)
        ))),
    }
}
