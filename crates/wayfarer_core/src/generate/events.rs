use serde_yaml::{Mapping, Value};

use crate::document::{SERVER_NAME_TOKEN, START_REGION_COMMAND_TOKEN, mapping, string_list};
use crate::ownership::{DISCOVER_EVENT_SUFFIX, FIRST_JOIN_EVENT, HEART_TIP_EVENT};
use crate::region::{RecipeId, RegionKind, RegionRecord, Teleport};

use super::{GenerationContext, coord, is_start, start_region};

/// Reward recipe for a discover-once event. The waits are literal seconds
/// between the grant, the counters and the crate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    pub counters: &'static [&'static str],
    pub crate_key: &'static str,
    pub wait_after_grant: u32,
    pub wait_after_counters: u32,
    pub subtitle: &'static str,
}

pub const REGION_RECIPE: Recipe = Recipe {
    counters: &["regions_discovered"],
    crate_key: "region",
    wait_after_grant: 1,
    wait_after_counters: 2,
    subtitle: "&7Region discovered",
};

pub const NETHER_REGION_RECIPE: Recipe = Recipe {
    counters: &["regions_discovered", "nether_regions_discovered"],
    crate_key: "nether_region",
    wait_after_grant: 1,
    wait_after_counters: 3,
    subtitle: "&cNether region discovered",
};

pub const HEART_RECIPE: Recipe = Recipe {
    counters: &["hearts_discovered"],
    crate_key: "heart",
    wait_after_grant: 2,
    wait_after_counters: 3,
    subtitle: "&dHeart found",
};

pub const NETHER_HEART_RECIPE: Recipe = Recipe {
    counters: &["hearts_discovered", "nether_hearts_discovered"],
    crate_key: "nether_heart",
    wait_after_grant: 2,
    wait_after_counters: 4,
    subtitle: "&5Nether heart found",
};

pub const VILLAGE_RECIPE: Recipe = Recipe {
    counters: &["villages_discovered"],
    crate_key: "village",
    wait_after_grant: 1,
    wait_after_counters: 2,
    subtitle: "&aVillage discovered",
};

pub fn recipe_for(record: &RegionRecord) -> Recipe {
    if record.kind == RegionKind::Village {
        return VILLAGE_RECIPE;
    }
    let recipe_id = match (record.discover.recipe_id, record.kind) {
        (Some(id), _) => id,
        (None, RegionKind::Heart) => RecipeId::heart_for(record.world),
        (None, _) => RecipeId::region_for(record.world),
    };
    match recipe_id {
        RecipeId::Region => REGION_RECIPE,
        RecipeId::NetherRegion => NETHER_REGION_RECIPE,
        RecipeId::Heart => HEART_RECIPE,
        RecipeId::NetherHeart => NETHER_HEART_RECIPE,
    }
}

pub fn discover_event_key(record: &RegionRecord) -> String {
    format!("{}_{}{DISCOVER_EVENT_SUFFIX}", record.world, record.id)
}

/// `execute in <dimension> run tp %player% x y z [yaw pitch]`; a missing y
/// keeps the player's current height.
pub fn teleport_command(teleport: &Teleport) -> String {
    let y = teleport.y.map(coord).unwrap_or_else(|| "~".to_string());
    let mut command = format!(
        "execute in {} run tp %player% {} {y} {}",
        teleport.world.dimension(),
        coord(teleport.x),
        coord(teleport.z)
    );
    if teleport.yaw.is_some() || teleport.pitch.is_some() {
        command.push_str(&format!(
            " {} {}",
            coord(teleport.yaw.unwrap_or(0.0)),
            coord(teleport.pitch.unwrap_or(0.0))
        ));
    }
    command
}

fn console(command: impl AsRef<str>) -> String {
    format!("console_command: {}", command.as_ref())
}

fn wait(seconds: u32) -> String {
    format!("wait: {seconds}")
}

fn event(kind: &str, conditions: Vec<String>, actions: Vec<String>) -> Mapping {
    let mut entries = vec![("type", Value::from(kind)), ("one_time", Value::Bool(true))];
    if !conditions.is_empty() {
        entries.push(("conditions", string_list(conditions)));
    }
    entries.push((
        "actions",
        Value::Mapping(mapping([("default", string_list(actions))])),
    ));
    mapping(entries)
}

fn first_join_event(ctx: &GenerationContext<'_>, start: Option<&RegionRecord>) -> Value {
    let mut actions = vec![
        console(teleport_command(&ctx.onboarding.teleport)),
        wait(1),
        format!("title: 20;60;20;&6Welcome to {SERVER_NAME_TOKEN};&7Your journey starts here"),
        wait(3),
        "message: &7Explore the world to discover regions, villages and hearts.".to_string(),
        "message: &7Track your progress with &f/aach list&7.".to_string(),
    ];
    if let Some(record) = start {
        let name = ctx.regions.display_name(record);
        actions.push(wait(2));
        actions.push(console(format!(
            "aach give {START_REGION_COMMAND_TOKEN} %player%"
        )));
        actions.push(format!("message: &6Your journey begins in {name}!"));
    }
    Value::Mapping(event("player_join", Vec::new(), actions))
}

fn heart_tip_event() -> Value {
    let mut tip = event(
        "wgevent",
        vec!["%region% startsWith heart_of_".to_string()],
        vec!["actionbar: &dYou sense the heart of this land nearby...".to_string()],
    );
    tip.insert(Value::from("one_time"), Value::Bool(false));
    tip.insert(Value::from("cooldown"), Value::from(600));
    Value::Mapping(tip)
}

fn discover_event(ctx: &GenerationContext<'_>, record: &RegionRecord) -> Value {
    let recipe = recipe_for(record);
    let name = ctx.regions.display_name(record);

    let mut actions = vec![
        console(format!("aach give {} %player%", record.command_id())),
        wait(recipe.wait_after_grant),
    ];
    actions.extend(
        recipe
            .counters
            .iter()
            .map(|counter| console(format!("scoreboard players add %player% {counter} 1"))),
    );
    actions.push(wait(recipe.wait_after_counters));
    actions.push(console(format!(
        "crates key give %player% {} 1",
        recipe.crate_key
    )));
    actions.push(format!("title: 10;70;20;&6{name};{}", recipe.subtitle));

    Value::Mapping(event(
        "wgevent",
        vec![
            format!("%region% == {}", record.id),
            format!("%player_world% == {}", record.world.folder_name()),
        ],
        actions,
    ))
}

/// The owned events: first join, the heart tip and one discover-once event
/// per qualifying region other than the start region, sorted by key.
pub fn generate(ctx: &GenerationContext<'_>) -> Mapping {
    let start = start_region(ctx.regions, ctx.onboarding);

    let mut keyed: Vec<(String, Value)> = vec![
        (FIRST_JOIN_EVENT.to_string(), first_join_event(ctx, start)),
        (HEART_TIP_EVENT.to_string(), heart_tip_event()),
    ];
    keyed.extend(
        ctx.regions
            .active()
            .filter(|record| !is_start(record, start))
            .map(|record| (discover_event_key(record), discover_event(ctx, record))),
    );
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    keyed
        .into_iter()
        .map(|(key, value)| (Value::from(key), value))
        .collect()
}
