use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(name)
        .display()
        .to_string()
}

fn run_cli(profile_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wayfarer"))
        .arg("--profile-dir")
        .arg(profile_dir)
        .args(args)
        .env_remove("WAYFARER_PROFILE_DIR")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run wayfarer CLI")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn init_and_import(profile_dir: &Path) {
    let output = run_cli(
        profile_dir,
        &[
            "init",
            "survival",
            "--name",
            "Survival Realm",
            "--start-region",
            "cherrybrook",
            "--x",
            "-120.5",
            "--z",
            "64",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Saved profile survival to "));

    let overworld = fixture("regions_overworld.yml");
    let output = run_cli(
        profile_dir,
        &["import", "survival", &overworld, "--world", "overworld", "--json"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary = stdout_json(&output);
    assert_eq!(summary["world"], "overworld");
    assert_eq!(summary["regions"], 5);
    assert_eq!(summary["counts"]["first_join"], 1);
    assert_eq!(summary["spawn_center"]["x"], 1);
    assert_eq!(summary["spawn_center"]["z"], 15);

    let nether = fixture("regions_nether.yml");
    let output = run_cli(
        profile_dir,
        &["import", "survival", &nether, "--world", "nether", "--label", "nether-main"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Imported 3 region(s) into nether as 'nether-main'"));
}

#[test]
fn init_import_and_list_regions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let profiles = dir.path().join("profiles");
    init_and_import(&profiles);
    assert!(profiles.join("survival.json").is_file());

    let output = run_cli(&profiles, &["regions", "survival", "--json"]);
    assert!(output.status.success());
    let listing = stdout_json(&output);
    assert_eq!(listing["server_name"], "Survival Realm");
    assert_eq!(listing["spawn_center"]["x"], 1);
    assert_eq!(listing["spawn_center"]["z"], 15);

    let regions = listing["regions"].as_array().expect("regions array");
    assert_eq!(regions.len(), 8);
    assert_eq!(regions[0]["id"], "cherrybrook");
    assert_eq!(regions[0]["method"], "first_join");
    assert_eq!(regions[5]["world"], "nether");
}

#[test]
fn override_then_build_writes_all_targets() {
    let dir = tempfile::tempdir().expect("tempdir");
    let profiles = dir.path().join("profiles");
    init_and_import(&profiles);

    let output = run_cli(
        &profiles,
        &[
            "override",
            "survival",
            "overworld",
            "ebon_of_wither",
            "--display-name",
            "The Withered Ebon",
            "--description",
            "Black trees and older things.",
            "--difficulty",
            "hard",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Updated overworld/ebon_of_wither"
    );

    let out = dir.path().join("out");
    let defaults = dir.path().join("no-templates");
    let out_arg = out.display().to_string();
    let defaults_arg = defaults.display().to_string();
    let output = run_cli(
        &profiles,
        &[
            "build",
            "survival",
            "--out",
            &out_arg,
            "--defaults",
            &defaults_arg,
            "--json",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report = stdout_json(&output);
    assert_eq!(report["success"], Value::Bool(true));
    let targets = report["targets"].as_array().expect("targets");
    assert_eq!(targets.len(), 5);
    assert!(targets.iter().all(|t| t["status"] == "written"));

    let achievements: serde_yaml::Value = serde_yaml::from_str(
        &fs::read_to_string(out.join("achievements.yml")).expect("achievements"),
    )
    .expect("achievements yaml");
    assert_eq!(
        achievements["Commands"]["discoverEbonofWither"]["DisplayName"],
        "The Withered Ebon"
    );

    let events: serde_yaml::Value = serde_yaml::from_str(
        &fs::read_to_string(out.join("conditional-events.yml")).expect("events"),
    )
    .expect("events yaml");
    assert_eq!(
        events["Events"]["first_join"]["actions"]["default"][0],
        "console_command: execute in minecraft:overworld run tp %player% -120.5 ~ 64"
    );

    let lore = fs::read_to_string(out.join("lore-books.yml")).expect("lore");
    assert!(lore.contains("region-lore-overworld-ebon_of_wither"));

    let mobs = fs::read_to_string(out.join("mob-leveling.yml")).expect("mobs");
    assert!(mobs.contains("The Withered Ebon band"));
}

#[test]
fn verbose_build_text_lists_base_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let profiles = dir.path().join("profiles");
    init_and_import(&profiles);

    let out_arg = dir.path().join("out").display().to_string();
    let defaults = dir.path().join("no-templates");
    let defaults_arg = defaults.display().to_string();
    let args: [&str; 8] = [
        "build",
        "survival",
        "--out",
        &out_arg,
        "--defaults",
        &defaults_arg,
        "--format",
        "tab",
    ];

    let quiet = run_cli(&profiles, &args);
    assert!(quiet.status.success(), "{}", String::from_utf8_lossy(&quiet.stderr));
    assert!(!String::from_utf8_lossy(&quiet.stdout).contains("    base: "));

    let verbose_args: Vec<&str> = std::iter::once("-v").chain(args).collect();
    let verbose = run_cli(&profiles, &verbose_args);
    assert!(verbose.status.success(), "{}", String::from_utf8_lossy(&verbose.stderr));
    let stdout = String::from_utf8_lossy(&verbose.stdout);
    let expected = format!("    base: {}", defaults.join("tab.yml").display());
    assert!(stdout.contains(&expected), "{stdout}");
}

#[test]
fn validate_exits_nonzero_on_unowned_changes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let templates = dir.path().join("templates");
    let templates_arg = templates.display().to_string();
    let output = run_cli(dir.path(), &["templates", "--out", &templates_arg]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 5);

    let base = templates.join("tab.yml");
    let owned_only = dir.path().join("owned.yml");
    let unowned = dir.path().join("unowned.yml");
    let text = fs::read_to_string(&base).expect("tab template");
    fs::write(&owned_only, text.replace("&6Placeholder", "&6Changed")).expect("write");
    fs::write(&unowned, text.replace("toggle-command: /sb", "toggle-command: /x")).expect("write");

    let base_arg = base.display().to_string();
    let owned_arg = owned_only.display().to_string();
    let output = run_cli(dir.path(), &["validate", "--format", "tab", &base_arg, &owned_arg]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "tab: valid, only owned content differs\n"
    );

    let unowned_arg = unowned.display().to_string();
    let output = run_cli(
        dir.path(),
        &["validate", "--format", "tab", &base_arg, &unowned_arg, "--json"],
    );
    assert_eq!(output.status.code(), Some(1));
    let report = stdout_json(&output);
    assert_eq!(report["valid"], Value::Bool(false));
    assert_eq!(report["differences"][0]["path"], "scoreboard.toggle-command");
}

#[test]
fn errors_map_to_exit_codes() {
    let dir = tempfile::tempdir().expect("tempdir");

    let output = run_cli(dir.path(), &["build", "survival"]);
    assert_eq!(output.status.code(), Some(2), "missing --out is a usage error");

    let output = run_cli(dir.path(), &["regions", "ghost"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("wayfarer init"));

    init_and_import(dir.path());
    let output = run_cli(dir.path(), &["override", "survival", "end", "nowhere", "--description", "x"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: no region 'nowhere' in end"));

    let output = run_cli(dir.path(), &["init", "bad/id", "--name", "Bad"]);
    assert_eq!(output.status.code(), Some(2));
}
