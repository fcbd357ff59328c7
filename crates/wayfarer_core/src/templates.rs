//! Bundled base documents used when a profile has no custom base for a
//! format. Each one already carries the scaffolding its merge step expects.

use std::path::{Path, PathBuf};

use crate::core_api::CoreError;
use crate::document::write_atomically;
use crate::format::Format;

pub fn bundled(format: Format) -> &'static str {
    match format {
        Format::Achievements => achievements(),
        Format::ConditionalEvents => conditional_events(),
        Format::Tab => tab(),
        Format::MobLeveling => mob_leveling(),
        Format::LoreBooks => lore_books(),
    }
}

/// `~/.wayfarer/templates`, or a relative `templates` directory when no home
/// directory is known.
pub fn default_templates_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".wayfarer").join("templates"))
        .unwrap_or_else(|| PathBuf::from("templates"))
}

/// Writes every bundled template into `dir` under its default file name.
pub fn export_all(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let mut written = Vec::with_capacity(Format::ALL.len());
    for format in Format::ALL {
        let path = dir.join(format.default_file_name());
        write_atomically(&path, bundled(format))?;
        tracing::info!(format = %format, path = %path.display(), "exported template");
        written.push(path);
    }
    Ok(written)
}

/// Advanced Achievements `config.yml` excerpt with a placeholder `Commands`
/// category.
pub fn achievements() -> &'static str {
    r#"# Advanced Achievements
# The Commands category is regenerated from the region list on every build.
General:
  Language: en
  Chat-Notify: true
  Fireworks: true

Connections:
  '1':
    Goal: "Join the server for the first time"
    Message: "Welcome aboard, explorer!"
    Name: connections_1
    DisplayName: "First Steps"
    Type: normal

Commands:
  exampleAch:
    Goal: "Placeholder replaced on build"
    Message: "Placeholder replaced on build"
    Name: exampleAch
    DisplayName: "Example"
    Type: normal
"#
}

pub fn conditional_events() -> &'static str {
    r#"# ConditionalEvents
# first_join, region_heart_tip and *_discover_once events are regenerated.
Config:
  update_notification: true
  debug_actions: false
  register_commands_on_join: false

Messages:
  prefix: "&4[&bConditionalEvents&4] "

Events:
  rules_reminder:
    type: repetitive
    repetitive_time: 12000
    actions:
      default:
        - "message: &7Welcome to &6{{SERVER_NAME}}&7! Type &f/rules &7before you wander off."
  first_join:
    type: player_join
    one_time: true
    actions:
      default:
        - "message: &7Placeholder replaced on build"
"#
}

pub fn tab() -> &'static str {
    r#"# TAB
# header/footer lines, scoreboards and top-explorer-* conditions are regenerated.
header-footer:
  enabled: true
  header:
    - "&6Placeholder"
  footer:
    - "&7Placeholder"
  disable-condition: '%world%=disabledworld'

tablist-name-formatting:
  enabled: true
  anti-override: true

scoreboard:
  enabled: true
  toggle-command: /sb
  remember-toggle-choice: false
  scoreboards: {}

conditions:
  world-overworld:
    conditions:
      - '%world%=world'
    type: AND
  world-nether:
    conditions:
      - '%world%=world_nether'
    type: AND
  world-end:
    conditions:
      - '%world%=world_the_end'
    type: AND

placeholder-refresh-intervals:
  default-refresh-interval: 500
  '%server_uptime%': 1000
"#
}

/// LevelledMobs `rules.yml` excerpt.
pub fn mob_leveling() -> &'static str {
    r#"# LevelledMobs rules
# Rules filtering on worldguard-regions with a difficulty-preset-* preset are regenerated.
presets:
  difficulty-preset-easy:
    name: Easy
    apply-settings:
      minLevel: 1
      maxLevel: 10
  difficulty-preset-normal:
    name: Normal
    apply-settings:
      minLevel: 5
      maxLevel: 20
  difficulty-preset-hard:
    name: Hard
    apply-settings:
      minLevel: 10
      maxLevel: 30
  difficulty-preset-severe:
    name: Severe
    apply-settings:
      minLevel: 20
      maxLevel: 40
  difficulty-preset-deadly:
    name: Deadly
    apply-settings:
      minLevel: 30
      maxLevel: 50

default-rule:
  use-preset: difficulty-preset-normal
  conditions:
    worlds: '*'

custom-rules:
  - name: Nether is harsher
    enabled: true
    conditions:
      worlds: world_nether
    apply-settings:
      minLevel: 10
"#
}

pub fn lore_books() -> &'static str {
    r#"# Lore books
# region-lore-* books are regenerated from region descriptions.
settings:
  give-on-discover: true

books:
  server-handbook:
    title: "Server Handbook"
    author: "Staff"
    pages:
      - "Welcome, traveller. Every region you discover adds a page to your journal."
"#
}
