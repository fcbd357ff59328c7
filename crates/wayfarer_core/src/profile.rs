//! Server profiles: the classified region snapshot plus every operator
//! setting a build needs, stored as one JSON file per server id.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::document::write_atomically;
use crate::format::Format;
use crate::generate::{LoreSettings, MobLevelingSettings};
use crate::region::{ImportedSource, OnboardingConfig, RegionSet, SpawnCenter};

pub const PROFILE_VERSION: u32 = 1;

static SERVER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,63}$").expect("server id pattern is valid")
});

/// Per-format build settings. Relative outputs resolve against the build's
/// output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default = "default_version")]
    pub version: u32,
    pub server_id: String,
    pub server_name: String,
    #[serde(default)]
    pub regions: RegionSet,
    #[serde(default)]
    pub onboarding: OnboardingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_center: Option<SpawnCenter>,
    #[serde(default)]
    pub sources: Vec<ImportedSource>,
    #[serde(default)]
    pub mob_leveling: MobLevelingSettings,
    #[serde(default)]
    pub lore: LoreSettings,
    #[serde(default)]
    pub targets: BTreeMap<Format, TargetSettings>,
}

fn default_version() -> u32 {
    PROFILE_VERSION
}

impl Profile {
    pub fn new(server_id: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            version: PROFILE_VERSION,
            server_id: server_id.into(),
            server_name: server_name.into(),
            regions: RegionSet::default(),
            onboarding: OnboardingConfig::default(),
            spawn_center: None,
            sources: Vec::new(),
            mob_leveling: MobLevelingSettings::default(),
            lore: LoreSettings::default(),
            targets: BTreeMap::new(),
        }
    }

    /// Upserts provenance by label.
    pub fn record_source(&mut self, source: ImportedSource) {
        match self.sources.iter_mut().find(|s| s.label == source.label) {
            Some(existing) => *existing = source,
            None => self.sources.push(source),
        }
    }

    pub fn target(&self, format: Format) -> Option<&TargetSettings> {
        self.targets.get(&format)
    }
}

pub fn validate_server_id(server_id: &str) -> Result<(), CoreError> {
    if SERVER_ID.is_match(server_id) {
        Ok(())
    } else {
        Err(CoreError::new(
            CoreErrorCode::InvalidInput,
            format!(
                "invalid server id '{server_id}': use letters, digits, '.', '_' or '-' (max 64)"
            ),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/.wayfarer/profiles`, or `./profiles` when no home directory is known.
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(".wayfarer").join("profiles"))
            .unwrap_or_else(|| PathBuf::from("profiles"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, server_id: &str) -> Result<PathBuf, CoreError> {
        validate_server_id(server_id)?;
        Ok(self.root.join(format!("{server_id}.json")))
    }

    pub fn exists(&self, server_id: &str) -> bool {
        self.path_for(server_id).is_ok_and(|path| path.is_file())
    }

    pub fn load(&self, server_id: &str) -> Result<Profile, CoreError> {
        let path = self.path_for(server_id)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoreError::new(
                    CoreErrorCode::Profile,
                    format!("no profile for server '{server_id}'; run `wayfarer init` first"),
                )
                .with_path(&path));
            }
            Err(e) => return Err(CoreError::io(&path, &e)),
        };
        let profile: Profile = serde_json::from_str(&text).map_err(|e| {
            CoreError::new(CoreErrorCode::Profile, format!("malformed profile: {e}")).with_path(&path)
        })?;
        if profile.server_id != server_id {
            return Err(CoreError::new(
                CoreErrorCode::Profile,
                format!(
                    "profile file holds server '{}', expected '{server_id}'",
                    profile.server_id
                ),
            )
            .with_path(&path));
        }
        tracing::debug!(server_id, path = %path.display(), regions = profile.regions.len(), "loaded profile");
        Ok(profile)
    }

    pub fn save(&self, profile: &Profile) -> Result<PathBuf, CoreError> {
        let path = self.path_for(&profile.server_id)?;
        let json = serde_json::to_string_pretty(profile).map_err(|e| {
            CoreError::new(CoreErrorCode::Profile, format!("failed to encode profile: {e}"))
        })?;
        write_atomically(&path, &json)?;
        tracing::debug!(server_id = %profile.server_id, path = %path.display(), "saved profile");
        Ok(path)
    }

    /// Server ids with a profile on disk, sorted.
    pub fn list(&self) -> Result<Vec<String>, CoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::io(&self.root, &e)),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::io(&self.root, &e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if SERVER_ID.is_match(stem) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
