//! Identifier rules shared by every generator.
//!
//! Region ids are canonical lowercase snake_case. Everything a plugin config
//! shows a player or a console (achievement names, titles, book titles) is
//! derived from that id here, so two generators can never disagree on what a
//! region is called.

use crate::region::RegionKind;

pub const HEART_PREFIX: &str = "heart_of_";
pub const COMMAND_PREFIX: &str = "discover";

pub fn title_case(s: &str) -> String {
    s.split('_')
        .filter(|word| !word.is_empty())
        .enumerate()
        .map(|(index, word)| {
            if index > 0 && word.eq_ignore_ascii_case("of") {
                "of".to_string()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Console-facing identifier, e.g. `ebon_of_wither` -> `discoverEbonofWither`.
///
/// Heart regions capitalize every word, `of` included, so
/// `heart_of_warriotos` -> `discoverHeartOfWarriotos`.
pub fn command_id(region_id: &str) -> String {
    let heart = is_heart_id(region_id);
    let mut out = String::from(COMMAND_PREFIX);
    for (index, word) in region_id.split('_').filter(|w| !w.is_empty()).enumerate() {
        if !heart && index > 0 && word.eq_ignore_ascii_case("of") {
            out.push_str("of");
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// Player-facing title for a region.
///
/// Hearts are named after their parent region: the `heart_of_` prefix is
/// stripped, the remainder title-cased, and the result presented as
/// `Heart of <Parent>`.
pub fn display_title(region_id: &str, kind: RegionKind) -> String {
    match kind {
        RegionKind::Heart => match parent_region_id(region_id) {
            Some(parent) => heart_title(&title_case(parent)),
            None => title_case(region_id),
        },
        _ => title_case(region_id),
    }
}

pub fn heart_title(parent_display: &str) -> String {
    format!("Heart of {parent_display}")
}

pub fn is_heart_id(region_id: &str) -> bool {
    region_id.starts_with(HEART_PREFIX)
}

/// `heart_of_cherrybrook` -> `cherrybrook`. `None` for ids that are not hearts
/// or that carry nothing after the prefix.
pub fn parent_region_id(region_id: &str) -> Option<&str> {
    region_id
        .strip_prefix(HEART_PREFIX)
        .filter(|rest| !rest.is_empty())
}

/// Canonical form for ids coming from exports or operator input: trimmed,
/// lowercased, with runs of whitespace and `-` collapsed to one `_`.
pub fn normalize_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
            continue;
        }
        if pending_separator && !out.is_empty() {
            out.push('_');
        }
        pending_separator = false;
        out.extend(ch.to_lowercase());
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
