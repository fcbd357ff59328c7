//! The diff gate: proves a merged document differs from its base only inside
//! the owned boundary of its format.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::core_api::CoreError;
use crate::document::{kind_name, parse_document, root_mapping, scalar_text};
use crate::format::Format;
use crate::merge;
use crate::ownership;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DifferenceKind {
    MissingKey,
    ExtraKey,
    TypeMismatch { expected: String, found: String },
    LengthMismatch { expected: usize, found: usize },
    ScalarMismatch { expected: String, found: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    pub path: String,
    #[serde(flatten)]
    pub kind: DifferenceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub format: Format,
    pub valid: bool,
    pub differences: Vec<Difference>,
}

/// Validates the serialized output of a merge against the document it was
/// merged into. Both sides are normalized and stripped of owned content the
/// same way before comparison.
pub fn validate(
    format: Format,
    original: &Value,
    serialized: &str,
) -> Result<ValidationReport, CoreError> {
    let produced = parse_document(serialized, None)?;
    let baseline = comparable(format, original)?;
    let candidate = comparable(format, &produced)?;
    let differences = diff_mappings(&baseline, &candidate);

    Ok(ValidationReport {
        format,
        valid: differences.is_empty(),
        differences,
    })
}

/// The operator-owned remainder of a document: scaffolding inserted, owned
/// entries removed.
pub fn comparable(format: Format, document: &Value) -> Result<Mapping, CoreError> {
    let mut root = root_mapping(document)?;
    merge::normalize(format, &mut root)?;
    ownership::strip_owned(format, &mut root)?;
    Ok(root)
}

pub fn diff_mappings(expected: &Mapping, found: &Mapping) -> Vec<Difference> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    walk_mapping(&mut path, expected, found, &mut out);
    out
}

pub fn diff_values(expected: &Value, found: &Value) -> Vec<Difference> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    walk(&mut path, expected, found, &mut out);
    out
}

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(usize),
}

fn render_path(path: &[Segment]) -> String {
    if path.is_empty() {
        return "$".to_string();
    }
    let mut out = String::new();
    for segment in path {
        match segment {
            Segment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            Segment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

fn push(out: &mut Vec<Difference>, path: &[Segment], kind: DifferenceKind) {
    out.push(Difference {
        path: render_path(path),
        kind,
    });
}

fn walk(path: &mut Vec<Segment>, expected: &Value, found: &Value, out: &mut Vec<Difference>) {
    match (expected, found) {
        (Value::Mapping(a), Value::Mapping(b)) => walk_mapping(path, a, b, out),
        (Value::Sequence(a), Value::Sequence(b)) => {
            if a.len() != b.len() {
                push(
                    out,
                    path,
                    DifferenceKind::LengthMismatch {
                        expected: a.len(),
                        found: b.len(),
                    },
                );
            }
            for (index, (x, y)) in a.iter().zip(b.iter()).enumerate() {
                path.push(Segment::Index(index));
                walk(path, x, y, out);
                path.pop();
            }
        }
        (Value::Tagged(a), Value::Tagged(b)) => {
            if a.tag != b.tag {
                push(
                    out,
                    path,
                    DifferenceKind::ScalarMismatch {
                        expected: a.tag.to_string(),
                        found: b.tag.to_string(),
                    },
                );
            } else {
                walk(path, &a.value, &b.value, out);
            }
        }
        (a, b) if kind_name(a) != kind_name(b) => push(
            out,
            path,
            DifferenceKind::TypeMismatch {
                expected: kind_name(a).to_string(),
                found: kind_name(b).to_string(),
            },
        ),
        (a, b) => {
            if a != b {
                push(
                    out,
                    path,
                    DifferenceKind::ScalarMismatch {
                        expected: scalar_text(a),
                        found: scalar_text(b),
                    },
                );
            }
        }
    }
}

fn walk_mapping(
    path: &mut Vec<Segment>,
    expected: &Mapping,
    found: &Mapping,
    out: &mut Vec<Difference>,
) {
    for (key, value) in expected {
        path.push(Segment::Key(scalar_text(key)));
        match found.get(key) {
            Some(other) => walk(path, value, other, out),
            None => push(out, path, DifferenceKind::MissingKey),
        }
        path.pop();
    }
    for (key, _) in found {
        if !expected.contains_key(key) {
            path.push(Segment::Key(scalar_text(key)));
            push(out, path, DifferenceKind::ExtraKey);
            path.pop();
        }
    }
}
