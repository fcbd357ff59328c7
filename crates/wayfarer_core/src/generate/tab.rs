use serde_yaml::{Mapping, Value};

use crate::document::{mapping, string_list};
use crate::ownership::LEADERBOARD_CONDITIONS;
use crate::region::{RegionKind, RegionSet, World};

use super::GenerationContext;

/// Generated TAB content. The header and footer replace two keys of the
/// `header-footer` block; the scoreboards map and the leaderboard conditions
/// are owned as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct TabSection {
    pub header: Vec<String>,
    pub footer: Vec<String>,
    pub scoreboards: Mapping,
    pub conditions: Mapping,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldCounts {
    pub regions: usize,
    pub villages: usize,
    pub hearts: usize,
}

impl WorldCounts {
    pub fn total(&self) -> usize {
        self.regions + self.villages + self.hearts
    }

    fn add(&mut self, other: WorldCounts) {
        self.regions += other.regions;
        self.villages += other.villages;
        self.hearts += other.hearts;
    }
}

/// Qualifying records of one world, by kind.
pub fn counts(regions: &RegionSet, world: World) -> WorldCounts {
    let mut counts = WorldCounts::default();
    for record in regions.active().filter(|r| r.world == world) {
        match record.kind {
            RegionKind::Region => counts.regions += 1,
            RegionKind::Village => counts.villages += 1,
            RegionKind::Heart => counts.hearts += 1,
            RegionKind::System => {}
        }
    }
    counts
}

pub fn scoreboard_name(world: World) -> String {
    format!("explore-{world}")
}

/// Name of the static lookup condition that is true in `world`.
pub fn world_condition_name(world: World) -> String {
    format!("world-{world}")
}

/// The static lookup conditions the scoreboards' display conditions refer
/// to. Inserted by the merge step wherever they are missing.
pub fn world_conditions() -> Vec<(String, Value)> {
    World::ALL
        .iter()
        .map(|world| {
            let condition = mapping([
                (
                    "conditions",
                    string_list([format!("%world%={}", world.folder_name())]),
                ),
                ("type", Value::from("AND")),
            ]);
            (world_condition_name(*world), Value::Mapping(condition))
        })
        .collect()
}

fn scoreboard(world: World, counts: WorldCounts) -> Value {
    let mut lines = vec![
        "&7".to_string(),
        format!("&7Regions: &f{}", counts.regions),
    ];
    if counts.villages > 0 {
        lines.push(format!("&7Villages: &f{}", counts.villages));
    }
    if counts.hearts > 0 {
        lines.push(format!("&7Hearts: &f{}", counts.hearts));
    }
    lines.push("&7".to_string());
    lines.push(format!("&7Total to find: &f{}", counts.total()));

    Value::Mapping(mapping([
        ("title", Value::from(format!("&6&lExplore {}", world.label()))),
        ("display-condition", Value::from(world_condition_name(world))),
        ("lines", string_list(lines)),
    ]))
}

fn leaderboard_condition(rank: usize, total: usize) -> Value {
    let prefix = format!("%ajlb_lb_regions_discovered_{rank}_alltime");
    let mut condition = Mapping::new();
    condition.insert(
        Value::from("conditions"),
        string_list([format!("{prefix}_value%>0")]),
    );
    condition.insert(
        Value::Bool(true),
        Value::from(format!(
            "&6#{rank} &f{prefix}_name% &7({prefix}_value%/{total})"
        )),
    );
    condition.insert(Value::Bool(false), Value::from(format!("&8#{rank} ---")));
    Value::Mapping(condition)
}

pub fn generate(ctx: &GenerationContext<'_>) -> TabSection {
    let mut all = WorldCounts::default();
    let mut scoreboards = Mapping::new();
    for world in World::ALL {
        let per_world = counts(ctx.regions, world);
        if per_world.total() == 0 {
            continue;
        }
        all.add(per_world);
        scoreboards.insert(
            Value::from(scoreboard_name(world)),
            scoreboard(world, per_world),
        );
    }
    let total = all.total();

    let header = vec![
        "&6&lExplorer's Atlas".to_string(),
        format!(
            "&7Regions &f{} &8| &7Villages &f{} &8| &7Hearts &f{}",
            all.regions, all.villages, all.hearts
        ),
        "&7".to_string(),
    ];
    let footer = vec![
        "&7".to_string(),
        format!("&7{total} places wait to be discovered"),
        "&8/aach list to track your journey".to_string(),
    ];

    let conditions = LEADERBOARD_CONDITIONS
        .iter()
        .enumerate()
        .map(|(index, name)| (Value::from(*name), leaderboard_condition(index + 1, total)))
        .collect();

    TabSection {
        header,
        footer,
        scoreboards,
        conditions,
    }
}
