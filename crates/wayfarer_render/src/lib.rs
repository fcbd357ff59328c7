use std::fmt::Write as _;

use wayfarer_core::core_api::{BuildReport, CoreError, FormatOutcome, ImportSummary};
use wayfarer_core::diff::{Difference, DifferenceKind, ValidationReport};
use wayfarer_core::document::ResolvedPath;
use wayfarer_core::profile::Profile;
use wayfarer_core::region::{RegionRecord, SpawnCenter};
use serde_json::{Map as JsonMap, Value as JsonValue};

const WORLD_COL_WIDTH: usize = 11;
const ID_COL_WIDTH: usize = 28;
const KIND_COL_WIDTH: usize = 9;
const METHOD_COL_WIDTH: usize = 12;
const COMMAND_COL_WIDTH: usize = 34;
const FORMAT_COL_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    pub verbose: bool,
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

pub fn render_build_json(report: &BuildReport, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => {
            let mut out = JsonMap::new();
            out.insert(
                "server_id".to_string(),
                JsonValue::String(report.server_id.clone()),
            );
            out.insert("success".to_string(), JsonValue::Bool(report.is_success()));
            out.insert(
                "targets".to_string(),
                JsonValue::Array(report.outcomes.iter().map(outcome_to_json).collect()),
            );
            JsonValue::Object(out)
        }
    }
}

pub fn render_validation_json(report: &ValidationReport, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => validation_to_json(report),
    }
}

pub fn render_regions_json(profile: &Profile, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => {
            let mut out = JsonMap::new();
            out.insert(
                "server_id".to_string(),
                JsonValue::String(profile.server_id.clone()),
            );
            out.insert(
                "server_name".to_string(),
                JsonValue::String(profile.server_name.clone()),
            );
            out.insert(
                "spawn_center".to_string(),
                spawn_center_json(profile.spawn_center),
            );
            out.insert(
                "regions".to_string(),
                JsonValue::Array(
                    profile
                        .regions
                        .records()
                        .iter()
                        .map(|record| region_to_json(profile, record))
                        .collect(),
                ),
            );
            JsonValue::Object(out)
        }
    }
}

pub fn render_import_json(summary: &ImportSummary, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => {
            let mut counts = JsonMap::new();
            counts.insert("system".to_string(), JsonValue::from(summary.counts.system));
            counts.insert("region".to_string(), JsonValue::from(summary.counts.region));
            counts.insert("village".to_string(), JsonValue::from(summary.counts.village));
            counts.insert("heart".to_string(), JsonValue::from(summary.counts.heart));
            counts.insert(
                "first_join".to_string(),
                JsonValue::from(summary.counts.first_join),
            );

            let mut out = JsonMap::new();
            out.insert(
                "world".to_string(),
                JsonValue::String(summary.world.to_string()),
            );
            out.insert("label".to_string(), JsonValue::String(summary.label.clone()));
            out.insert(
                "file_hash".to_string(),
                JsonValue::String(summary.file_hash.clone()),
            );
            out.insert("regions".to_string(), JsonValue::from(summary.regions));
            out.insert("counts".to_string(), JsonValue::Object(counts));
            out.insert(
                "spawn_center".to_string(),
                spawn_center_json(summary.spawn_center),
            );
            JsonValue::Object(out)
        }
    }
}

/// `{x, z}`, or null when no spawn hint is known.
fn spawn_center_json(center: Option<SpawnCenter>) -> JsonValue {
    match center {
        Some(center) => {
            let mut m = JsonMap::new();
            m.insert("x".to_string(), JsonValue::from(center.x));
            m.insert("z".to_string(), JsonValue::from(center.z));
            JsonValue::Object(m)
        }
        None => JsonValue::Null,
    }
}

pub fn error_to_json(error: &CoreError) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "code".to_string(),
        JsonValue::String(format!("{:?}", error.code)),
    );
    out.insert(
        "message".to_string(),
        JsonValue::String(error.message.clone()),
    );
    out.insert(
        "path".to_string(),
        match &error.path {
            Some(path) => JsonValue::String(path.display().to_string()),
            None => JsonValue::Null,
        },
    );
    out.insert(
        "differences".to_string(),
        JsonValue::Array(error.differences.iter().map(difference_to_json).collect()),
    );
    JsonValue::Object(out)
}

fn outcome_to_json(outcome: &FormatOutcome) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "format".to_string(),
        JsonValue::String(outcome.format.to_string()),
    );
    out.insert("base".to_string(), base_to_json(&outcome.base));
    out.insert(
        "output".to_string(),
        JsonValue::String(outcome.output.display().to_string()),
    );
    match &outcome.result {
        Ok(written) => {
            out.insert("status".to_string(), JsonValue::String("written".to_string()));
            out.insert(
                "bytes_written".to_string(),
                JsonValue::from(written.bytes_written),
            );
            out.insert(
                "generated_entries".to_string(),
                JsonValue::from(written.generated_entries),
            );
            out.insert(
                "validation".to_string(),
                validation_to_json(&written.validation),
            );
        }
        Err(error) => {
            out.insert("status".to_string(), JsonValue::String("failed".to_string()));
            out.insert("error".to_string(), error_to_json(error));
        }
    }
    JsonValue::Object(out)
}

fn base_to_json(base: &ResolvedPath) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "source".to_string(),
        JsonValue::String(if base.is_custom() { "custom" } else { "default" }.to_string()),
    );
    m.insert(
        "path".to_string(),
        JsonValue::String(base.path().display().to_string()),
    );
    JsonValue::Object(m)
}

fn validation_to_json(report: &ValidationReport) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "format".to_string(),
        JsonValue::String(report.format.to_string()),
    );
    out.insert("valid".to_string(), JsonValue::Bool(report.valid));
    out.insert(
        "differences".to_string(),
        JsonValue::Array(report.differences.iter().map(difference_to_json).collect()),
    );
    JsonValue::Object(out)
}

fn difference_to_json(difference: &Difference) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "path".to_string(),
        JsonValue::String(difference.path.clone()),
    );
    m.insert(
        "kind".to_string(),
        JsonValue::String(difference_kind_name(&difference.kind).to_string()),
    );
    match &difference.kind {
        DifferenceKind::MissingKey | DifferenceKind::ExtraKey => {}
        DifferenceKind::TypeMismatch { expected, found }
        | DifferenceKind::ScalarMismatch { expected, found } => {
            m.insert("expected".to_string(), JsonValue::String(expected.clone()));
            m.insert("found".to_string(), JsonValue::String(found.clone()));
        }
        DifferenceKind::LengthMismatch { expected, found } => {
            m.insert("expected".to_string(), JsonValue::from(*expected));
            m.insert("found".to_string(), JsonValue::from(*found));
        }
    }
    JsonValue::Object(m)
}

fn region_to_json(profile: &Profile, record: &RegionRecord) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "world".to_string(),
        JsonValue::String(record.world.to_string()),
    );
    m.insert("id".to_string(), JsonValue::String(record.id.clone()));
    m.insert(
        "kind".to_string(),
        JsonValue::String(record.kind.as_str().to_string()),
    );
    m.insert(
        "method".to_string(),
        JsonValue::String(record.discover.method.as_str().to_string()),
    );
    m.insert(
        "command_id".to_string(),
        JsonValue::String(record.command_id()),
    );
    m.insert(
        "display_name".to_string(),
        JsonValue::String(profile.regions.display_name(record)),
    );
    m.insert(
        "description".to_string(),
        match &record.description {
            Some(text) => JsonValue::String(text.clone()),
            None => JsonValue::Null,
        },
    );
    JsonValue::Object(m)
}

fn difference_kind_name(kind: &DifferenceKind) -> &'static str {
    match kind {
        DifferenceKind::MissingKey => "missing_key",
        DifferenceKind::ExtraKey => "extra_key",
        DifferenceKind::TypeMismatch { .. } => "type_mismatch",
        DifferenceKind::LengthMismatch { .. } => "length_mismatch",
        DifferenceKind::ScalarMismatch { .. } => "scalar_mismatch",
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub fn render_build_text(report: &BuildReport, options: TextRenderOptions) -> String {
    let mut out = String::new();
    writeln!(&mut out, "Build for {}", report.server_id).expect("writing to String cannot fail");
    for outcome in &report.outcomes {
        let source = if outcome.base.is_custom() {
            "custom"
        } else {
            "default"
        };
        match &outcome.result {
            Ok(written) => {
                writeln!(
                    &mut out,
                    "  {:<width$}ok      {} ({} entries, {} bytes, {source} base)",
                    outcome.format.as_str(),
                    outcome.output.display(),
                    written.generated_entries,
                    written.bytes_written,
                    width = FORMAT_COL_WIDTH
                )
                .expect("writing to String cannot fail");
                if options.verbose {
                    writeln!(&mut out, "    base: {}", outcome.base.path().display())
                        .expect("writing to String cannot fail");
                }
            }
            Err(error) => {
                writeln!(
                    &mut out,
                    "  {:<width$}FAILED  {}",
                    outcome.format.as_str(),
                    error.message,
                    width = FORMAT_COL_WIDTH
                )
                .expect("writing to String cannot fail");
                write_differences(&mut out, &error.differences, "    ");
            }
        }
    }
    let failed = report.failures().count();
    writeln!(
        &mut out,
        "{} of {} targets written",
        report.outcomes.len() - failed,
        report.outcomes.len()
    )
    .expect("writing to String cannot fail");
    out
}

pub fn render_validation_text(report: &ValidationReport) -> String {
    let mut out = String::new();
    if report.valid {
        writeln!(
            &mut out,
            "{}: valid, only owned content differs",
            report.format
        )
        .expect("writing to String cannot fail");
    } else {
        writeln!(
            &mut out,
            "{}: INVALID, {} unowned difference(s)",
            report.format,
            report.differences.len()
        )
        .expect("writing to String cannot fail");
        write_differences(&mut out, &report.differences, "  ");
    }
    out
}

pub fn render_regions_text(profile: &Profile) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "{} ({}), {} region(s)",
        profile.server_name,
        profile.server_id,
        profile.regions.len()
    )
    .expect("writing to String cannot fail");
    if profile.regions.is_empty() {
        writeln!(&mut out, "  none imported").expect("writing to String cannot fail");
        return out;
    }
    writeln!(
        &mut out,
        "{:<w$}{:<i$}{:<k$}{:<m$}{:<c$}{}",
        "WORLD",
        "ID",
        "KIND",
        "DISCOVER",
        "COMMAND",
        "NAME",
        w = WORLD_COL_WIDTH,
        i = ID_COL_WIDTH,
        k = KIND_COL_WIDTH,
        m = METHOD_COL_WIDTH,
        c = COMMAND_COL_WIDTH
    )
    .expect("writing to String cannot fail");
    for record in profile.regions.records() {
        writeln!(
            &mut out,
            "{:<w$}{:<i$}{:<k$}{:<m$}{:<c$}{}",
            record.world.as_str(),
            record.id,
            record.kind.as_str(),
            record.discover.method.as_str(),
            record.command_id(),
            profile.regions.display_name(record),
            w = WORLD_COL_WIDTH,
            i = ID_COL_WIDTH,
            k = KIND_COL_WIDTH,
            m = METHOD_COL_WIDTH,
            c = COMMAND_COL_WIDTH
        )
        .expect("writing to String cannot fail");
    }
    out
}

pub fn render_import_text(summary: &ImportSummary) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "Imported {} region(s) into {} as '{}'",
        summary.regions, summary.world, summary.label
    )
    .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "  regions {}, villages {}, hearts {}, system {}, first join {}",
        summary.counts.region,
        summary.counts.village,
        summary.counts.heart,
        summary.counts.system,
        summary.counts.first_join
    )
    .expect("writing to String cannot fail");
    if let Some(center) = summary.spawn_center {
        writeln!(&mut out, "  spawn center x={} z={}", center.x, center.z)
            .expect("writing to String cannot fail");
    }
    writeln!(&mut out, "  sha256 {}", summary.file_hash).expect("writing to String cannot fail");
    out
}

fn write_differences(out: &mut String, differences: &[Difference], indent: &str) {
    for difference in differences {
        let detail = match &difference.kind {
            DifferenceKind::MissingKey => "missing".to_string(),
            DifferenceKind::ExtraKey => "unexpected".to_string(),
            DifferenceKind::TypeMismatch { expected, found } => {
                format!("type {expected} -> {found}")
            }
            DifferenceKind::LengthMismatch { expected, found } => {
                format!("length {expected} -> {found}")
            }
            DifferenceKind::ScalarMismatch { expected, found } => {
                format!("value {expected:?} -> {found:?}")
            }
        };
        writeln!(out, "{indent}{}: {detail}", difference.path)
            .expect("writing to String cannot fail");
    }
}
