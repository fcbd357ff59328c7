use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::naming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum World {
    Overworld,
    Nether,
    End,
}

impl World {
    pub const ALL: [World; 3] = [World::Overworld, World::Nether, World::End];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overworld => "overworld",
            Self::Nether => "nether",
            Self::End => "end",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overworld => "Overworld",
            Self::Nether => "Nether",
            Self::End => "The End",
        }
    }

    /// Bukkit world folder name on a stock server.
    pub fn folder_name(&self) -> &'static str {
        match self {
            Self::Overworld => "world",
            Self::Nether => "world_nether",
            Self::End => "world_the_end",
        }
    }

    pub fn dimension(&self) -> &'static str {
        match self {
            Self::Overworld => "minecraft:overworld",
            Self::Nether => "minecraft:the_nether",
            Self::End => "minecraft:the_end",
        }
    }

    pub fn is_overworld(&self) -> bool {
        matches!(self, Self::Overworld)
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for World {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overworld" | "world" | "minecraft:overworld" => Ok(Self::Overworld),
            "nether" | "world_nether" | "the_nether" | "minecraft:the_nether" => Ok(Self::Nether),
            "end" | "the_end" | "world_the_end" | "minecraft:the_end" => Ok(Self::End),
            other => Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("unknown world '{other}', expected overworld, nether or end"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    System,
    Region,
    Village,
    Heart,
}

impl RegionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Region => "region",
            Self::Village => "village",
            Self::Heart => "heart",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverMethod {
    Disabled,
    OnEnter,
    FirstJoin,
}

impl DiscoverMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::OnEnter => "on_enter",
            Self::FirstJoin => "first_join",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeId {
    Region,
    NetherRegion,
    Heart,
    NetherHeart,
}

impl RecipeId {
    pub fn region_for(world: World) -> Self {
        if world.is_overworld() {
            Self::Region
        } else {
            Self::NetherRegion
        }
    }

    pub fn heart_for(world: World) -> Self {
        if world.is_overworld() {
            Self::Heart
        } else {
            Self::NetherHeart
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discover {
    pub method: DiscoverMethod,
    pub recipe_id: Option<RecipeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name_override: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRecord {
    pub world: World,
    pub id: String,
    pub kind: RegionKind,
    pub discover: Discover,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RegionRecord {
    pub fn is_active(&self) -> bool {
        self.discover.method != DiscoverMethod::Disabled
    }

    pub fn command_id(&self) -> String {
        match non_blank(self.discover.command_id_override.as_deref()) {
            Some(value) => value.to_string(),
            None => naming::command_id(&self.id),
        }
    }

    /// Whether this record's text variants come from the overworld column of
    /// the reward tables. The End shares the nether column.
    pub fn uses_overworld_variant(&self) -> bool {
        self.world.is_overworld()
    }

    pub fn has_operator_overrides(&self) -> bool {
        self.discover.command_id_override.is_some()
            || self.discover.display_name_override.is_some()
            || self.description.is_some()
    }
}

/// Operator edits applied on top of a classified record. `Some("")` clears a
/// field, `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionOverride {
    pub command_id: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnCenter {
    pub x: i64,
    pub z: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teleport {
    pub world: World,
    pub x: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
}

impl Default for Teleport {
    fn default() -> Self {
        Self {
            world: World::Overworld,
            x: 0.5,
            y: None,
            z: 0.5,
            yaw: None,
            pitch: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingConfig {
    #[serde(default)]
    pub start_region_id: String,
    #[serde(default)]
    pub teleport: Teleport,
}

impl OnboardingConfig {
    pub fn start_region(&self) -> Option<String> {
        let normalized = naming::normalize_id(&self.start_region_id);
        (!normalized.is_empty()).then_some(normalized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedSource {
    pub label: String,
    pub original_filename: String,
    pub imported_at_iso: String,
    pub file_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_center: Option<SpawnCenter>,
}

/// Immutable snapshot of every classified region in a profile, ordered by
/// `(world, id)`. Updates return a new set; nothing mutates a published one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RegionRecord>", into = "Vec<RegionRecord>")]
pub struct RegionSet {
    records: Vec<RegionRecord>,
}

impl From<Vec<RegionRecord>> for RegionSet {
    fn from(records: Vec<RegionRecord>) -> Self {
        Self::new(records)
    }
}

impl From<RegionSet> for Vec<RegionRecord> {
    fn from(set: RegionSet) -> Self {
        set.records
    }
}

impl RegionSet {
    /// Sorts by `(world, id)`; on a duplicate pair the later record wins.
    pub fn new(records: Vec<RegionRecord>) -> Self {
        let mut records = records;
        records.reverse();
        records.sort_by(|a, b| (a.world, &a.id).cmp(&(b.world, &b.id)));
        records.dedup_by(|dup, kept| dup.world == kept.world && dup.id == kept.id);
        Self { records }
    }

    pub fn records(&self) -> &[RegionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, world: World, id: &str) -> Option<&RegionRecord> {
        self.records
            .binary_search_by(|r| (r.world, r.id.as_str()).cmp(&(world, id)))
            .ok()
            .map(|index| &self.records[index])
    }

    pub fn in_world(&self, world: World) -> impl Iterator<Item = &RegionRecord> {
        self.records.iter().filter(move |r| r.world == world)
    }

    pub fn active(&self) -> impl Iterator<Item = &RegionRecord> {
        self.records.iter().filter(|r| r.is_active())
    }

    pub fn first_join(&self) -> Option<&RegionRecord> {
        self.records
            .iter()
            .find(|r| r.discover.method == DiscoverMethod::FirstJoin)
    }

    pub fn worlds(&self) -> Vec<World> {
        let mut worlds: Vec<World> = self.records.iter().map(|r| r.world).collect();
        worlds.dedup();
        worlds
    }

    /// Player-facing name, honoring overrides. A heart without its own
    /// override takes its parent's name (override included) when the parent
    /// exists in the same world.
    pub fn display_name(&self, record: &RegionRecord) -> String {
        if let Some(name) = non_blank(record.discover.display_name_override.as_deref()) {
            return name.to_string();
        }
        if record.kind == RegionKind::Heart {
            if let Some(parent_id) = naming::parent_region_id(&record.id) {
                let parent_name = match self.get(record.world, parent_id) {
                    Some(parent) => self.display_name(parent),
                    None => naming::title_case(parent_id),
                };
                return naming::heart_title(&parent_name);
            }
        }
        naming::display_title(&record.id, record.kind)
    }

    /// Replaces every record of `world` with `records`; other worlds are
    /// carried over untouched.
    pub fn with_world_replaced(&self, world: World, records: Vec<RegionRecord>) -> Self {
        let mut next: Vec<RegionRecord> = self
            .records
            .iter()
            .filter(|r| r.world != world)
            .cloned()
            .collect();
        next.extend(records.into_iter().map(|mut r| {
            r.world = world;
            r
        }));
        Self::new(next)
    }

    pub fn with_override(
        &self,
        world: World,
        id: &str,
        edit: &RegionOverride,
    ) -> Result<Self, CoreError> {
        let id = naming::normalize_id(id);
        if self.get(world, &id).is_none() {
            return Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("no region '{id}' in {world}"),
            ));
        }

        let records = self
            .records
            .iter()
            .map(|r| {
                if r.world != world || r.id != id {
                    return r.clone();
                }
                let mut r = r.clone();
                if let Some(value) = &edit.command_id {
                    r.discover.command_id_override = cleared_if_blank(value);
                }
                if let Some(value) = &edit.display_name {
                    r.discover.display_name_override = cleared_if_blank(value);
                }
                if let Some(value) = &edit.description {
                    r.description = cleared_if_blank(value);
                }
                r
            })
            .collect();

        Ok(Self { records })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn cleared_if_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
