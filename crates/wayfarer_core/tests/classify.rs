use std::fs;
use std::path::PathBuf;

use wayfarer_core::classify::{classify_export, parse_export};
use wayfarer_core::core_api::CoreErrorCode;
use wayfarer_core::region::{
    DiscoverMethod, OnboardingConfig, RecipeId, RegionKind, RegionOverride, RegionSet, SpawnCenter,
    World,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture(name: &str) -> String {
    let path = workspace_root().join("tests/fixtures").join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e))
}

fn onboarding(start: &str) -> OnboardingConfig {
    OnboardingConfig {
        start_region_id: start.to_string(),
        ..OnboardingConfig::default()
    }
}

#[test]
fn spawn_is_system_even_with_village_greeting() {
    let text = "spawn:\n  type: cuboid\n  flags:\n    greeting: Welcome to the Village of Spawnton\n";
    let import = classify_export(text, World::Overworld, &onboarding(""), &RegionSet::default())
        .expect("export should classify");

    let spawn = &import.records[0];
    assert_eq!(spawn.kind, RegionKind::System);
    assert_eq!(spawn.discover.method, DiscoverMethod::Disabled);
    assert_eq!(spawn.discover.recipe_id, None);
}

#[test]
fn village_greeting_marks_village() {
    let text = "oakridge:\n  type: poly2d\n  flags:\n    greeting: \"Welcome to the Village of Oakridge\"\n";
    let import = classify_export(text, World::Overworld, &onboarding(""), &RegionSet::default())
        .expect("export should classify");

    let record = &import.records[0];
    assert_eq!(record.kind, RegionKind::Village);
    assert_eq!(record.discover.method, DiscoverMethod::OnEnter);
    assert_eq!(record.discover.recipe_id, Some(RecipeId::Region));
}

#[test]
fn overworld_fixture_classifies_every_rule() {
    let import = classify_export(
        &fixture("regions_overworld.yml"),
        World::Overworld,
        &onboarding("Cherrybrook"),
        &RegionSet::default(),
    )
    .expect("fixture should classify");

    let set = import.apply_to(&RegionSet::default());
    assert_eq!(set.len(), 5, "__global__ is skipped");

    let spawn = set.get(World::Overworld, "spawn").expect("spawn record");
    assert_eq!(spawn.kind, RegionKind::System);

    let start = set.get(World::Overworld, "cherrybrook").expect("start record");
    assert_eq!(start.kind, RegionKind::Region, "first-join wins over the village rule");
    assert_eq!(start.discover.method, DiscoverMethod::FirstJoin);

    let pines = set
        .get(World::Overworld, "whispering_pines")
        .expect("normalized id");
    assert_eq!(pines.kind, RegionKind::Region);

    let heart = set
        .get(World::Overworld, "heart_of_whispering_pines")
        .expect("heart record");
    assert_eq!(heart.kind, RegionKind::Heart);
    assert_eq!(heart.discover.recipe_id, Some(RecipeId::Heart));

    assert_eq!(import.spawn_center, Some(SpawnCenter { x: 1, z: 15 }));
}

#[test]
fn nether_records_use_nether_recipes() {
    let import = classify_export(
        &fixture("regions_nether.yml"),
        World::Nether,
        &onboarding(""),
        &RegionSet::default(),
    )
    .expect("fixture should classify");

    let set = import.apply_to(&RegionSet::default());
    let region = set.get(World::Nether, "ashen_wastes").expect("region");
    assert_eq!(region.discover.recipe_id, Some(RecipeId::NetherRegion));
    let heart = set.get(World::Nether, "heart_of_ashen_wastes").expect("heart");
    assert_eq!(heart.discover.recipe_id, Some(RecipeId::NetherHeart));
    assert_eq!(import.spawn_center, None, "poly2d spawn has no center");
}

#[test]
fn first_join_is_claimed_by_one_world_only() {
    let overworld = classify_export(
        "hub:\n  type: cuboid\n",
        World::Overworld,
        &onboarding("hub"),
        &RegionSet::default(),
    )
    .expect("overworld should classify");
    let set = overworld.apply_to(&RegionSet::default());

    let nether = classify_export("hub:\n  type: cuboid\n", World::Nether, &onboarding("hub"), &set)
        .expect("nether should classify");
    let set = nether.apply_to(&set);

    let methods: Vec<DiscoverMethod> = set.records().iter().map(|r| r.discover.method).collect();
    assert_eq!(
        methods.iter().filter(|m| **m == DiscoverMethod::FirstJoin).count(),
        1
    );
    assert_eq!(
        set.get(World::Nether, "hub").expect("nether hub").discover.method,
        DiscoverMethod::OnEnter
    );
}

#[test]
fn reimport_replaces_one_world_and_keeps_overrides() {
    let base = classify_export(
        &fixture("regions_overworld.yml"),
        World::Overworld,
        &onboarding(""),
        &RegionSet::default(),
    )
    .expect("overworld should classify")
    .apply_to(&RegionSet::default());
    let base = classify_export(
        &fixture("regions_nether.yml"),
        World::Nether,
        &onboarding(""),
        &base,
    )
    .expect("nether should classify")
    .apply_to(&base);

    let edited = base
        .with_override(
            World::Overworld,
            "ebon_of_wither",
            &RegionOverride {
                display_name: Some("The Withered Ebon".to_string()),
                description: Some("Black trees and older things.".to_string()),
                ..RegionOverride::default()
            },
        )
        .expect("region exists");

    let reimport = "ebon_of_wither:\n  type: cuboid\nnew_frontier:\n  type: cuboid\n";
    let next = classify_export(reimport, World::Overworld, &onboarding(""), &edited)
        .expect("reimport should classify")
        .apply_to(&edited);

    assert_eq!(next.in_world(World::Overworld).count(), 2);
    assert_eq!(next.in_world(World::Nether).count(), 3);
    let ebon = next.get(World::Overworld, "ebon_of_wither").expect("kept");
    assert_eq!(
        ebon.discover.display_name_override.as_deref(),
        Some("The Withered Ebon")
    );
    assert_eq!(
        ebon.description.as_deref(),
        Some("Black trees and older things.")
    );
    assert!(next.get(World::Overworld, "cherrybrook").is_none());
}

#[test]
fn duplicate_normalized_ids_keep_the_first() {
    let text = "Old-Mill:\n  type: cuboid\n  flags:\n    greeting: a village\nold_mill:\n  type: cuboid\n";
    let import = classify_export(text, World::Overworld, &onboarding(""), &RegionSet::default())
        .expect("export should classify");
    assert_eq!(import.records.len(), 1);
    assert_eq!(import.records[0].kind, RegionKind::Village);
}

#[test]
fn malformed_exports_are_parse_errors() {
    let err = parse_export("- just\n- a list\n").expect_err("list root is rejected");
    assert_eq!(err.code, CoreErrorCode::Parse);

    let err = parse_export("regions:\n  broken: 42\n").expect_err("scalar region is rejected");
    assert_eq!(err.code, CoreErrorCode::Parse);
    assert!(err.message.contains("broken"));

    let err = parse_export("regions: [unclosed\n").expect_err("bad yaml is rejected");
    assert_eq!(err.code, CoreErrorCode::Parse);

    assert!(parse_export("").expect("empty export").is_empty());
}

#[test]
fn override_of_unknown_region_is_rejected() {
    let err = RegionSet::default()
        .with_override(World::End, "nowhere", &RegionOverride::default())
        .expect_err("unknown region");
    assert_eq!(err.code, CoreErrorCode::InvalidInput);
}
