//! Turns a WorldGuard region export into canonical [`RegionRecord`]s for one
//! world.

use serde_yaml::{Mapping, Value};

use crate::core_api::CoreError;
use crate::document::{kind_name, parse_document};
use crate::naming;
use crate::region::{
    Discover, DiscoverMethod, OnboardingConfig, RecipeId, RegionKind, RegionRecord, RegionSet,
    SpawnCenter, World,
};

pub const SPAWN_REGION_ID: &str = "spawn";
pub const GLOBAL_REGION_ID: &str = "__global__";
const VILLAGE_MARKER: &str = "village";

/// One region as read from the export, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRegion {
    pub id: String,
    pub shape: Option<String>,
    pub min: Option<(f64, f64)>,
    pub max: Option<(f64, f64)>,
    pub greeting: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedImport {
    pub world: World,
    pub records: Vec<RegionRecord>,
    pub spawn_center: Option<SpawnCenter>,
}

impl ClassifiedImport {
    /// Replaces the imported world in `existing`; every other world is kept.
    pub fn apply_to(&self, existing: &RegionSet) -> RegionSet {
        existing.with_world_replaced(self.world, self.records.clone())
    }
}

/// Reads the region map out of a WorldGuard `regions.yml`. Both the
/// `regions:`-wrapped layout and a bare id map are accepted.
pub fn parse_export(text: &str) -> Result<Vec<RawRegion>, CoreError> {
    let document = parse_document(text, None)?;
    let root = match &document {
        Value::Mapping(map) => map,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(CoreError::parse(format!(
                "region export root must be a mapping, found {}",
                kind_name(other)
            )));
        }
    };
    let regions = match root.get("regions") {
        Some(Value::Mapping(map)) => map,
        Some(Value::Null) => return Ok(Vec::new()),
        Some(other) => {
            return Err(CoreError::parse(format!(
                "'regions' must be a mapping, found {}",
                kind_name(other)
            )));
        }
        None => root,
    };

    let mut out = Vec::with_capacity(regions.len());
    for (key, value) in regions {
        let Some(raw_id) = scalar_key(key) else {
            return Err(CoreError::parse(format!(
                "region ids must be scalars, found {}",
                kind_name(key)
            )));
        };
        if raw_id.trim() == GLOBAL_REGION_ID {
            continue;
        }
        let body = match value {
            Value::Mapping(map) => map,
            other => {
                return Err(CoreError::parse(format!(
                    "region '{raw_id}' must be a mapping, found {}",
                    kind_name(other)
                )));
            }
        };
        out.push(RawRegion {
            id: naming::normalize_id(&raw_id),
            shape: body.get("type").and_then(Value::as_str).map(str::to_string),
            min: corner(body.get("min")),
            max: corner(body.get("max")),
            greeting: greeting(body),
        });
    }
    Ok(out)
}

fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn corner(value: Option<&Value>) -> Option<(f64, f64)> {
    let corner = value?.as_mapping()?;
    let x = corner.get("x").and_then(Value::as_f64)?;
    let z = corner.get("z").and_then(Value::as_f64)?;
    Some((x, z))
}

fn greeting(body: &Mapping) -> Option<String> {
    let flags = body.get("flags")?.as_mapping()?;
    ["greeting", "greeting-title"]
        .iter()
        .find_map(|key| flags.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Horizontal center of a cuboid spawn region.
pub fn spawn_center(region: &RawRegion) -> Option<SpawnCenter> {
    if region.shape.as_deref() != Some("cuboid") {
        return None;
    }
    let (min_x, min_z) = region.min?;
    let (max_x, max_z) = region.max?;
    Some(SpawnCenter {
        x: ((min_x + max_x) / 2.0).floor() as i64,
        z: ((min_z + max_z) / 2.0).floor() as i64,
    })
}

/// Applies the classification rules to one region; the first matching rule
/// wins. `first_join_available` is false when another world already owns the
/// first-join region.
pub fn classify_region(
    region: &RawRegion,
    world: World,
    start_region: Option<&str>,
    first_join_available: bool,
) -> RegionRecord {
    let (kind, method, recipe_id) = if region.id == SPAWN_REGION_ID {
        (RegionKind::System, DiscoverMethod::Disabled, None)
    } else if naming::is_heart_id(&region.id) {
        (
            RegionKind::Heart,
            DiscoverMethod::OnEnter,
            Some(RecipeId::heart_for(world)),
        )
    } else if start_region == Some(region.id.as_str()) && first_join_available {
        (
            RegionKind::Region,
            DiscoverMethod::FirstJoin,
            Some(RecipeId::region_for(world)),
        )
    } else {
        if start_region == Some(region.id.as_str()) {
            tracing::warn!(
                region = %region.id,
                world = %world,
                "start region already claimed by another world, classifying as a normal region"
            );
        }
        let is_village = region
            .greeting
            .as_deref()
            .is_some_and(|text| text.to_lowercase().contains(VILLAGE_MARKER));
        let kind = if is_village {
            RegionKind::Village
        } else {
            RegionKind::Region
        };
        (kind, DiscoverMethod::OnEnter, Some(RecipeId::region_for(world)))
    };

    RegionRecord {
        world,
        id: region.id.clone(),
        kind,
        discover: Discover {
            method,
            recipe_id,
            command_id_override: None,
            display_name_override: None,
        },
        description: None,
    }
}

/// Classifies an export for `world`. Operator overrides on records that
/// survive the re-import are carried over from `existing`.
pub fn classify_export(
    text: &str,
    world: World,
    onboarding: &OnboardingConfig,
    existing: &RegionSet,
) -> Result<ClassifiedImport, CoreError> {
    let raw = parse_export(text)?;
    let start = onboarding.start_region();
    let first_join_available = existing
        .first_join()
        .is_none_or(|record| record.world == world);

    let mut records: Vec<RegionRecord> = Vec::with_capacity(raw.len());
    let mut spawn = None;
    for region in &raw {
        if region.id.is_empty() {
            tracing::warn!("skipping region with an empty id");
            continue;
        }
        if records.iter().any(|r| r.id == region.id) {
            tracing::warn!(region = %region.id, world = %world, "duplicate region id after normalization, keeping first");
            continue;
        }
        if region.id == SPAWN_REGION_ID {
            spawn = spawn_center(region);
        }

        let mut record = classify_region(region, world, start.as_deref(), first_join_available);
        let previous = existing
            .get(world, &record.id)
            .filter(|previous| previous.has_operator_overrides());
        if let Some(previous) = previous {
            record.discover.command_id_override = previous.discover.command_id_override.clone();
            record.discover.display_name_override = previous.discover.display_name_override.clone();
            record.description = previous.description.clone();
        }
        records.push(record);
    }

    tracing::info!(
        world = %world,
        regions = records.len(),
        spawn_center = spawn.is_some(),
        "classified region export"
    );

    Ok(ClassifiedImport {
        world,
        records,
        spawn_center: spawn,
    })
}
