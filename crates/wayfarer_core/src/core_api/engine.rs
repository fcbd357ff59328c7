use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use sha2::{Digest, Sha256};

use crate::classify;
use crate::diff::{self, ValidationReport};
use crate::document::{
    ResolvedPath, SERVER_NAME_TOKEN, START_REGION_COMMAND_TOKEN, parse_document, render_document,
    substitute_tokens_in, write_atomically,
};
use crate::format::Format;
use crate::generate::{self, GenerationContext, OwnedSection};
use crate::merge;
use crate::profile::Profile;
use crate::region::{DiscoverMethod, ImportedSource, RegionKind, RegionOverride, World};
use crate::templates;

use super::error::CoreError;
use super::types::{
    BuildReport, BuildRequest, FormatOutcome, ImportSummary, KindCounts, MergedDocument,
    WrittenTarget,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Classifies a region export for `world` and replaces that world's
    /// records in the profile. Provenance and the spawn-center hint are
    /// recorded alongside.
    pub fn import_regions(
        &self,
        profile: &mut Profile,
        world: World,
        label: Option<&str>,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ImportSummary, CoreError> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            CoreError::parse(format!("region export is not valid UTF-8: {e}")).with_path(filename)
        })?;
        let classified =
            classify::classify_export(text, world, &profile.onboarding, &profile.regions)
                .map_err(|e| e.with_path(filename))?;

        let file_hash = format!("{:x}", Sha256::digest(bytes));
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(world.as_str())
            .to_string();

        profile.regions = classified.apply_to(&profile.regions);
        if classified.spawn_center.is_some() {
            profile.spawn_center = classified.spawn_center;
        }
        profile.record_source(ImportedSource {
            label: label.clone(),
            original_filename: filename.to_string(),
            imported_at_iso: chrono::Utc::now().to_rfc3339(),
            file_hash: file_hash.clone(),
            spawn_center: classified.spawn_center,
        });

        let mut counts = KindCounts::default();
        for record in &classified.records {
            match record.kind {
                RegionKind::System => counts.system += 1,
                RegionKind::Region => counts.region += 1,
                RegionKind::Village => counts.village += 1,
                RegionKind::Heart => counts.heart += 1,
            }
            if record.discover.method == DiscoverMethod::FirstJoin {
                counts.first_join += 1;
            }
        }

        tracing::info!(
            server_id = %profile.server_id,
            world = %world,
            label = %label,
            regions = classified.records.len(),
            "imported regions"
        );

        Ok(ImportSummary {
            world,
            label,
            file_hash,
            regions: classified.records.len(),
            counts,
            spawn_center: classified.spawn_center,
        })
    }

    /// Applies operator edits to one record. A difficulty, when given, is
    /// stored verbatim as the band override for this world's record only.
    pub fn override_region(
        &self,
        profile: &mut Profile,
        world: World,
        region_id: &str,
        edit: &RegionOverride,
        difficulty: Option<&str>,
    ) -> Result<(), CoreError> {
        profile.regions = profile.regions.with_override(world, region_id, edit)?;
        if let Some(level) = difficulty {
            let id = crate::naming::normalize_id(region_id);
            profile.mob_leveling.set_region_band(world, &id, level);
        }
        Ok(())
    }

    pub fn generate(&self, profile: &Profile, format: Format) -> OwnedSection {
        let ctx = GenerationContext {
            regions: &profile.regions,
            onboarding: &profile.onboarding,
            mob_leveling: &profile.mob_leveling,
            lore: &profile.lore,
        };
        generate::generate(format, &ctx)
    }

    /// Generate, merge, serialize and gate one document. Tokens are resolved
    /// only after the gate has passed.
    pub fn merge_text(
        &self,
        profile: &Profile,
        format: Format,
        base_text: &str,
        origin: Option<&Path>,
    ) -> Result<MergedDocument, CoreError> {
        let with_origin = |e: CoreError| match origin {
            Some(path) if e.path.is_none() => e.with_path(path),
            _ => e,
        };

        let base = parse_document(base_text, origin)?;
        let section = self.generate(profile, format);
        let merged = merge::merge(&base, &section).map_err(with_origin)?;
        let serialized = render_document(&merged)?;

        let validation = diff::validate(format, &base, &serialized).map_err(with_origin)?;
        if !validation.valid {
            return Err(with_origin(CoreError::ownership_violation(
                validation.differences,
            )));
        }

        let text = if format.substitutes_tokens() {
            self.resolve_tokens(profile, merged, serialized)?
        } else {
            serialized
        };

        Ok(MergedDocument {
            format,
            text,
            generated_entries: section.entry_count(),
            validation,
        })
    }

    /// Merged text for a resolved base, without writing anything.
    pub fn preview(
        &self,
        profile: &Profile,
        format: Format,
        base: &ResolvedPath,
    ) -> Result<MergedDocument, CoreError> {
        let text = base.load(format)?;
        self.merge_text(profile, format, &text, Some(base.path()))
    }

    /// Resolves placeholder tokens inside the merged document's strings and
    /// renders it again, so substituted values are quoted by the emitter.
    fn resolve_tokens(
        &self,
        profile: &Profile,
        mut merged: Value,
        serialized: String,
    ) -> Result<String, CoreError> {
        let start_command = generate::start_region(&profile.regions, &profile.onboarding)
            .map(|record| record.command_id());
        let mut tokens = vec![(SERVER_NAME_TOKEN, profile.server_name.as_str())];
        match &start_command {
            Some(command) => tokens.push((START_REGION_COMMAND_TOKEN, command.as_str())),
            None if serialized.contains(START_REGION_COMMAND_TOKEN) => {
                tracing::warn!(
                    server_id = %profile.server_id,
                    "no start region configured, leaving start region token unresolved"
                );
            }
            None => {}
        }
        if !tokens.iter().any(|(token, _)| serialized.contains(token)) {
            return Ok(serialized);
        }
        substitute_tokens_in(&mut merged, &tokens);
        render_document(&merged)
    }

    /// Runs every selected format in order. A failing format writes nothing
    /// and does not stop the others.
    pub fn build(&self, profile: &Profile, request: &BuildRequest) -> BuildReport {
        let defaults_dir = request
            .defaults_dir
            .clone()
            .unwrap_or_else(templates::default_templates_dir);

        let outcomes = request
            .selected_formats()
            .into_iter()
            .map(|format| {
                let target = profile.target(format);
                let custom = request
                    .overrides
                    .get(&format)
                    .map(PathBuf::as_path)
                    .or_else(|| target.and_then(|t| t.base.as_deref()));
                let base = ResolvedPath::resolve(format, custom, &defaults_dir);
                let output = request.output_dir.join(
                    target
                        .and_then(|t| t.output.clone())
                        .unwrap_or_else(|| PathBuf::from(format.default_file_name())),
                );

                let result = self.build_one(profile, format, &base, &output);
                match &result {
                    Ok(written) => tracing::info!(
                        format = %format,
                        output = %output.display(),
                        bytes = written.bytes_written,
                        entries = written.generated_entries,
                        "built target"
                    ),
                    Err(e) => tracing::error!(format = %format, error = %e, "target failed"),
                }

                FormatOutcome {
                    format,
                    base,
                    output,
                    result,
                }
            })
            .collect();

        BuildReport {
            server_id: profile.server_id.clone(),
            outcomes,
        }
    }

    fn build_one(
        &self,
        profile: &Profile,
        format: Format,
        base: &ResolvedPath,
        output: &Path,
    ) -> Result<WrittenTarget, CoreError> {
        let merged = self.preview(profile, format, base)?;
        write_atomically(output, &merged.text)?;
        Ok(WrittenTarget {
            bytes_written: merged.text.len(),
            generated_entries: merged.generated_entries,
            validation: merged.validation,
        })
    }

    /// The diff gate on its own: is `candidate` a legal rewrite of `base`?
    pub fn validate_texts(
        &self,
        format: Format,
        base_text: &str,
        candidate_text: &str,
    ) -> Result<ValidationReport, CoreError> {
        let base = parse_document(base_text, None)?;
        diff::validate(format, &base, candidate_text)
    }

    pub fn validate_file(
        &self,
        format: Format,
        base: &Path,
        candidate: &Path,
    ) -> Result<ValidationReport, CoreError> {
        let base_text = fs::read_to_string(base).map_err(|e| CoreError::io(base, &e))?;
        let candidate_text =
            fs::read_to_string(candidate).map_err(|e| CoreError::io(candidate, &e))?;
        let base_doc = parse_document(&base_text, Some(base))?;
        parse_document(&candidate_text, Some(candidate))?;
        diff::validate(format, &base_doc, &candidate_text)
    }
}
