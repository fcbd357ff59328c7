use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::diff::ValidationReport;
use crate::document::ResolvedPath;
use crate::format::Format;
use crate::region::{SpawnCenter, World};

use super::error::CoreError;

/// What to build. An empty `formats` list means every format; `overrides`
/// take precedence over the profile's own custom bases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRequest {
    pub formats: Vec<Format>,
    pub output_dir: PathBuf,
    pub defaults_dir: Option<PathBuf>,
    pub overrides: BTreeMap<Format, PathBuf>,
}

impl BuildRequest {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Requested formats, de-duplicated in request order.
    pub fn selected_formats(&self) -> Vec<Format> {
        if self.formats.is_empty() {
            return Format::ALL.to_vec();
        }
        let mut out: Vec<Format> = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            if !out.contains(format) {
                out.push(*format);
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenTarget {
    pub bytes_written: usize,
    pub generated_entries: usize,
    pub validation: ValidationReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutcome {
    pub format: Format,
    pub base: ResolvedPath,
    pub output: PathBuf,
    pub result: Result<WrittenTarget, CoreError>,
}

impl FormatOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub server_id: String,
    pub outcomes: Vec<FormatOutcome>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(FormatOutcome::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FormatOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// A merged document that passed the diff gate but has not been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    pub format: Format,
    pub text: String,
    pub generated_entries: usize,
    pub validation: ValidationReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub system: usize,
    pub region: usize,
    pub village: usize,
    pub heart: usize,
    pub first_join: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub world: World,
    pub label: String,
    pub file_hash: String,
    pub regions: usize,
    pub counts: KindCounts,
    pub spawn_center: Option<SpawnCenter>,
}
