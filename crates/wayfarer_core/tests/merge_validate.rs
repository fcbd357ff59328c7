use std::fs;
use std::path::PathBuf;

use serde_yaml::Value;
use wayfarer_core::core_api::{CoreErrorCode, Engine};
use wayfarer_core::diff::DifferenceKind;
use wayfarer_core::format::Format;
use wayfarer_core::profile::Profile;
use wayfarer_core::region::World;
use wayfarer_core::templates;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_profile() -> Profile {
    let engine = Engine::new();
    let mut profile = Profile::new("survival", "Survival Realm");
    profile.onboarding.start_region_id = "cherrybrook".to_string();
    for (world, name) in [
        (World::Overworld, "regions_overworld.yml"),
        (World::Nether, "regions_nether.yml"),
    ] {
        let path = workspace_root().join("tests/fixtures").join(name);
        let bytes = fs::read(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e));
        engine
            .import_regions(&mut profile, world, None, name, &bytes)
            .expect("fixture should import");
    }
    profile
}

fn parse(text: &str) -> Value {
    serde_yaml::from_str(text).expect("merged output should be YAML")
}

#[test]
fn achievements_merge_replaces_only_commands() {
    let engine = Engine::new();
    let profile = fixture_profile();
    let base = templates::achievements();

    let merged = engine
        .merge_text(&profile, Format::Achievements, base, None)
        .expect("bundled template should merge");
    assert!(merged.validation.valid);
    assert_eq!(merged.generated_entries, 6);

    let doc = parse(&merged.text);
    assert_eq!(doc["General"]["Language"], "en");
    assert_eq!(doc["Connections"]["1"]["Name"], "connections_1");
    assert!(doc["Commands"].get("exampleAch").is_none());
    assert_eq!(doc["Commands"]["discoverCherrybrook"]["Type"], "normal");

    let tampered = merged.text.replace("Language: en", "Language: de");
    assert_ne!(tampered, merged.text);
    let report = engine
        .validate_texts(Format::Achievements, base, &tampered)
        .expect("tampered text still parses");
    assert!(!report.valid);
    assert_eq!(report.differences.len(), 1);
    assert_eq!(report.differences[0].path, "General.Language");
    assert_eq!(
        report.differences[0].kind,
        DifferenceKind::ScalarMismatch {
            expected: "en".to_string(),
            found: "de".to_string(),
        }
    );
}

#[test]
fn merging_twice_is_a_fixed_point() {
    let engine = Engine::new();
    let profile = fixture_profile();
    for format in Format::ALL {
        let first = engine
            .merge_text(&profile, format, templates::bundled(format), None)
            .unwrap_or_else(|e| panic!("{format}: first merge failed: {e}"));
        let second = engine
            .merge_text(&profile, format, &first.text, None)
            .unwrap_or_else(|e| panic!("{format}: second merge failed: {e}"));
        assert_eq!(first.text, second.text, "{format}: merge is not idempotent");
    }
}

#[test]
fn operator_events_survive_in_place() {
    let engine = Engine::new();
    let profile = fixture_profile();
    let base = r#"
Config:
  debug_actions: true
Events:
  my_custom_event:
    type: player_command
    conditions:
      - "%command% == /spawn"
    actions:
      default:
        - "message: &7Back to spawn"
  overworld_ebon_of_wither_discover_once:
    type: wgevent
    actions:
      default:
        - "message: stale"
  rules_reminder:
    type: repetitive
    actions:
      default:
        - "message: Welcome to {{SERVER_NAME}}"
"#;

    let merged = engine
        .merge_text(&profile, Format::ConditionalEvents, base, None)
        .expect("base should merge");
    let doc = parse(&merged.text);
    assert_eq!(doc["Config"]["debug_actions"], Value::Bool(true));

    let events = doc["Events"].as_mapping().expect("events mapping");
    let keys: Vec<&str> = events.keys().filter_map(Value::as_str).collect();
    assert_eq!(keys[0], "my_custom_event");
    assert_eq!(keys[1], "rules_reminder");
    assert_eq!(keys.len(), 9);
    assert_eq!(
        doc["Events"]["my_custom_event"]["conditions"][0],
        "%command% == /spawn"
    );
    assert_eq!(
        doc["Events"]["rules_reminder"]["actions"]["default"][0],
        "message: Welcome to Survival Realm"
    );
    assert_ne!(
        doc["Events"]["overworld_ebon_of_wither_discover_once"]["actions"]["default"][0],
        "message: stale"
    );
    assert!(merged.text.contains("aach give discoverCherrybrook %player%"));
    assert!(!merged.text.contains("{{START_REGION_COMMAND}}"));
}

#[test]
fn tab_preconditions_are_inserted() {
    let engine = Engine::new();
    let profile = fixture_profile();
    let base = "header-footer:\n  enabled: false\nscoreboard:\n  enabled: true\n  toggle-command: /sb\n";

    let merged = engine
        .merge_text(&profile, Format::Tab, base, None)
        .expect("scaffolding should be added");
    let doc = parse(&merged.text);
    assert_eq!(doc["header-footer"]["enabled"], Value::Bool(false));
    assert_eq!(doc["header-footer"]["header"][0], "&6&lExplorer's Atlas");
    assert_eq!(doc["scoreboard"]["toggle-command"], "/sb");
    assert!(doc["scoreboard"]["scoreboards"].get("explore-overworld").is_some());
    assert_eq!(
        doc["conditions"]["world-overworld"]["conditions"][0],
        "%world%=world"
    );
    assert!(doc["conditions"].get("top-explorer-1").is_some());
}

#[test]
fn tab_operator_conditions_are_not_replaced() {
    let engine = Engine::new();
    let profile = fixture_profile();
    let base = "conditions:\n  world-nether:\n    conditions:\n      - '%world%=hell'\n    type: AND\n  vip:\n    conditions:\n      - '%group%=vip'\n";

    let merged = engine
        .merge_text(&profile, Format::Tab, base, None)
        .expect("base should merge");
    let doc = parse(&merged.text);
    assert_eq!(doc["conditions"]["world-nether"]["conditions"][0], "%world%=hell");
    assert_eq!(doc["conditions"]["vip"]["conditions"][0], "%group%=vip");
}

#[test]
fn tab_scoreboards_placeholder_of_any_shape_is_replaced() {
    let engine = Engine::new();
    let profile = fixture_profile();

    for base in [
        "scoreboard:\n  enabled: true\n  scoreboards: []\n",
        "scoreboard:\n  enabled: true\n  scoreboards: todo\n",
    ] {
        let merged = engine
            .merge_text(&profile, Format::Tab, base, None)
            .unwrap_or_else(|e| panic!("{base:?} should merge: {e}"));
        assert!(merged.validation.valid);

        let doc = parse(&merged.text);
        let scoreboards = doc["scoreboard"]["scoreboards"]
            .as_mapping()
            .expect("scoreboards should be regenerated as a mapping");
        assert!(scoreboards.contains_key("explore-overworld"));
        assert_eq!(doc["scoreboard"]["enabled"], true);
    }
}

#[test]
fn malformed_structure_is_rejected() {
    let engine = Engine::new();
    let profile = fixture_profile();

    let err = engine
        .merge_text(&profile, Format::Tab, "scoreboard:\n  - a\n  - b\n", None)
        .expect_err("scoreboard list is not a mapping");
    assert_eq!(err.code, CoreErrorCode::MissingStructure);

    let err = engine
        .merge_text(&profile, Format::Achievements, "- one\n- two\n", None)
        .expect_err("list root cannot host sections");
    assert_eq!(err.code, CoreErrorCode::MissingStructure);

    let err = engine
        .merge_text(&profile, Format::MobLeveling, "custom-rules: nope\n", None)
        .expect_err("rules must be a list");
    assert_eq!(err.code, CoreErrorCode::MissingStructure);

    let err = engine
        .merge_text(&profile, Format::LoreBooks, "books: [unclosed\n", None)
        .expect_err("bad yaml");
    assert_eq!(err.code, CoreErrorCode::Parse);
}

#[test]
fn mob_rules_keep_operator_rules_and_drop_stale_generated_ones() {
    let engine = Engine::new();
    let profile = fixture_profile();
    let base = r#"
custom-rules:
  - name: Nether is harsher
    conditions:
      worlds: world_nether
  - name: Arena
    use-preset: arena-preset
    conditions:
      worldguard-regions: my_arena
  - name: Old band
    use-preset: difficulty-preset-hard
    conditions:
      worldguard-regions: old_zone
"#;

    let merged = engine
        .merge_text(&profile, Format::MobLeveling, base, None)
        .expect("base should merge");
    let doc = parse(&merged.text);
    let rules = doc["custom-rules"].as_sequence().expect("rules list");
    let names: Vec<&str> = rules.iter().filter_map(|r| r["name"].as_str()).collect();

    assert_eq!(names[0], "Nether is harsher");
    assert_eq!(names[1], "Arena");
    assert!(!names.contains(&"Old band"));
    assert_eq!(rules.len(), 2 + 6);
    assert!(doc["presets"].get("difficulty-preset-deadly").is_some());
}

#[test]
fn validation_reports_unowned_changes_anywhere() {
    let engine = Engine::new();
    let base = templates::tab();
    let candidate = base
        .replace("toggle-command: /sb", "toggle-command: /board")
        .replace("  header:\n    - \"&6Placeholder\"", "  header:\n    - \"&6Anything\"");

    let report = engine
        .validate_texts(Format::Tab, base, &candidate)
        .expect("both parse");
    assert!(!report.valid);
    let paths: Vec<&str> = report.differences.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["scoreboard.toggle-command"]);
}

#[test]
fn single_region_gate_flags_a_mutated_base() {
    let engine = Engine::new();
    let mut profile = Profile::new("tiny", "Tiny");
    engine
        .import_regions(
            &mut profile,
            World::Overworld,
            None,
            "regions.yml",
            b"cherrybrook:\n  type: cuboid\n",
        )
        .expect("import");

    let base = templates::achievements();
    let merged = engine
        .merge_text(&profile, Format::Achievements, base, None)
        .expect("merge");
    let doc = parse(&merged.text);
    let commands = doc["Commands"].as_mapping().expect("commands");
    assert_eq!(commands.len(), 1);
    assert!(commands.get("discoverCherrybrook").is_some());

    let base_doc = parse(base);
    for key in ["General", "Connections"] {
        assert_eq!(doc[key], base_doc[key]);
    }

    let mutated_base = base.replace("Fireworks: true", "Fireworks: false");
    let report = engine
        .validate_texts(Format::Achievements, &mutated_base, &merged.text)
        .expect("both parse");
    assert!(!report.valid);
    let paths: Vec<&str> = report.differences.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["General.Fireworks"]);
}
