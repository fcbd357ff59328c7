use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::document::{mapping, string_list};
use crate::ownership::{RULE_CONDITIONS_KEY, RULE_PRESET_KEY, RULE_REGION_FILTER_KEY};
use crate::region::{RegionKind, World};

use super::GenerationContext;

pub const VILLAGES_RULE_NAME: &str = "Villages";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Normal,
    Hard,
    Severe,
    Deadly,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 5] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Normal,
        DifficultyLevel::Hard,
        DifficultyLevel::Severe,
        DifficultyLevel::Deadly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Severe => "severe",
            Self::Deadly => "deadly",
        }
    }

    pub fn preset_name(&self) -> String {
        format!("difficulty-preset-{}", self.as_str())
    }

    /// Mob level range applied by the preset.
    pub fn level_range(&self) -> (u32, u32) {
        match self {
            Self::Easy => (1, 10),
            Self::Normal => (5, 20),
            Self::Hard => (10, 30),
            Self::Severe => (20, 40),
            Self::Deadly => (30, 50),
        }
    }

    /// Parses an operator setting, falling back to the default on anything
    /// unrecognized.
    pub fn parse_or_default(raw: Option<&str>, context: &str) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match raw.parse() {
            Ok(level) => level,
            Err(_) => {
                let fallback = Self::default();
                tracing::warn!(
                    value = raw,
                    context,
                    fallback = fallback.as_str(),
                    "unrecognized difficulty, using default"
                );
                fallback
            }
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| {
                CoreError::new(
                    CoreErrorCode::InvalidInput,
                    format!("unknown difficulty '{s}', expected easy, normal, hard, severe or deadly"),
                )
            })
    }
}

/// Difficulty strategy stored in the profile. Values are kept as the
/// operator typed them and resolved at generation time. Region bands are
/// keyed by [`band_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobLevelingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village_band: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub region_bands: BTreeMap<String, String>,
}

impl MobLevelingSettings {
    pub fn village_level(&self) -> DifficultyLevel {
        DifficultyLevel::parse_or_default(self.village_band.as_deref(), "village band")
    }

    pub fn region_level(&self, world: World, region_id: &str) -> DifficultyLevel {
        let key = band_key(world, region_id);
        DifficultyLevel::parse_or_default(self.region_bands.get(&key).map(String::as_str), &key)
    }

    /// Stores an override for one record; a blank level removes it.
    pub fn set_region_band(&mut self, world: World, region_id: &str, level: &str) {
        let key = band_key(world, region_id);
        match level.trim() {
            "" => {
                self.region_bands.remove(&key);
            }
            level => {
                self.region_bands.insert(key, level.to_string());
            }
        }
    }
}

/// `<world>/<id>`, so equal ids in two worlds carry separate bands.
pub fn band_key(world: World, region_id: &str) -> String {
    format!("{}/{}", world.as_str(), region_id)
}

/// Reference definitions of the five presets the generated rules point at.
pub fn reference_presets() -> Vec<(String, Value)> {
    DifficultyLevel::ALL
        .iter()
        .map(|level| {
            let (min, max) = level.level_range();
            let mut name = level.as_str().to_string();
            name[..1].make_ascii_uppercase();
            let preset = mapping([
                ("name", Value::from(name)),
                (
                    "apply-settings",
                    Value::Mapping(mapping([
                        ("minLevel", Value::from(min)),
                        ("maxLevel", Value::from(max)),
                    ])),
                ),
            ]);
            (level.preset_name(), Value::Mapping(preset))
        })
        .collect()
}

fn rule(name: String, level: DifficultyLevel, filter: Value) -> Value {
    Value::Mapping(mapping([
        ("name", Value::from(name)),
        ("enabled", Value::Bool(true)),
        (RULE_PRESET_KEY, Value::from(level.preset_name())),
        (
            RULE_CONDITIONS_KEY,
            Value::Mapping(mapping([(RULE_REGION_FILTER_KEY, filter)])),
        ),
    ]))
}

/// Generated rules: the villages rule first, then one band rule per region
/// or heart sorted by region id.
pub fn generate(ctx: &GenerationContext<'_>) -> Vec<Value> {
    let mut rules = Vec::new();

    let mut villages: Vec<&str> = ctx
        .regions
        .active()
        .filter(|r| r.kind == RegionKind::Village)
        .map(|r| r.id.as_str())
        .collect();
    villages.sort_unstable();
    villages.dedup();
    if !villages.is_empty() {
        rules.push(rule(
            VILLAGES_RULE_NAME.to_string(),
            ctx.mob_leveling.village_level(),
            string_list(villages),
        ));
    }

    let mut bands: Vec<_> = ctx
        .regions
        .active()
        .filter(|r| matches!(r.kind, RegionKind::Region | RegionKind::Heart))
        .collect();
    bands.sort_by(|a, b| (&a.id, a.world).cmp(&(&b.id, b.world)));
    rules.extend(bands.into_iter().map(|record| {
        rule(
            format!("{} band", ctx.regions.display_name(record)),
            ctx.mob_leveling.region_level(record.world, &record.id),
            Value::from(record.id.as_str()),
        )
    }));

    rules
}
