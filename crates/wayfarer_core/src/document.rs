//! YAML document plumbing shared by the merge engine and the diff gate.
//!
//! Documents are held as `serde_yaml::Value`: an exhaustive sum of scalars,
//! sequences and insertion-ordered mappings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::core_api::CoreError;
use crate::format::Format;
use crate::templates;

pub const SERVER_NAME_TOKEN: &str = "{{SERVER_NAME}}";
pub const START_REGION_COMMAND_TOKEN: &str = "{{START_REGION_COMMAND}}";

/// Where a target's base document comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "source", content = "path")]
pub enum ResolvedPath {
    Default(PathBuf),
    Custom(PathBuf),
}

impl ResolvedPath {
    pub fn resolve(format: Format, custom: Option<&Path>, defaults_dir: &Path) -> Self {
        match custom {
            Some(path) => Self::Custom(path.to_path_buf()),
            None => Self::Default(defaults_dir.join(format.default_file_name())),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Default(path) | Self::Custom(path) => path,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Reads the base text. A custom file must exist; a default that has not
    /// been exported to disk falls back to the bundled template.
    pub fn load(&self, format: Format) -> Result<String, CoreError> {
        match self {
            Self::Custom(path) => fs::read_to_string(path).map_err(|e| CoreError::io(path, &e)),
            Self::Default(path) => match fs::read_to_string(path) {
                Ok(text) => Ok(text),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Ok(templates::bundled(format).to_string())
                }
                Err(e) => Err(CoreError::io(path, &e)),
            },
        }
    }
}

pub fn parse_document(text: &str, origin: Option<&Path>) -> Result<Value, CoreError> {
    serde_yaml::from_str::<Value>(text).map_err(|e| {
        let err = CoreError::parse(format!("malformed YAML: {e}"));
        match origin {
            Some(path) => err.with_path(path),
            None => err,
        }
    })
}

pub fn render_document(value: &Value) -> Result<String, CoreError> {
    serde_yaml::to_string(value).map_err(|e| CoreError::parse(format!("failed to render YAML: {e}")))
}

/// The document root as a mapping. An empty document is an empty mapping;
/// any other non-mapping root cannot host owned sections.
pub fn root_mapping(value: &Value) -> Result<Mapping, CoreError> {
    match value {
        Value::Mapping(map) => Ok(map.clone()),
        Value::Null => Ok(Mapping::new()),
        other => Err(CoreError::missing_structure(format!(
            "document root must be a mapping, found {}",
            kind_name(other)
        ))),
    }
}

/// Borrows `parent[key]` as a mapping, creating it from `scaffold` when the
/// key is absent or explicitly empty.
pub fn child_mapping_mut<'a>(
    parent: &'a mut Mapping,
    key: &str,
    scaffold: impl FnOnce() -> Mapping,
) -> Result<&'a mut Mapping, CoreError> {
    match parent.get(key) {
        None | Some(Value::Null) => {
            parent.insert(Value::from(key), Value::Mapping(scaffold()));
        }
        Some(Value::Mapping(_)) => {}
        Some(other) => {
            return Err(CoreError::missing_structure(format!(
                "'{key}' must be a mapping, found {}",
                kind_name(other)
            )));
        }
    }
    match parent.get_mut(key) {
        Some(Value::Mapping(map)) => Ok(map),
        _ => Err(CoreError::missing_structure(format!(
            "'{key}' could not be created"
        ))),
    }
}

/// Sequence counterpart of [`child_mapping_mut`].
pub fn child_sequence_mut<'a>(
    parent: &'a mut Mapping,
    key: &str,
) -> Result<&'a mut Vec<Value>, CoreError> {
    match parent.get(key) {
        None | Some(Value::Null) => {
            parent.insert(Value::from(key), Value::Sequence(Vec::new()));
        }
        Some(Value::Sequence(_)) => {}
        Some(other) => {
            return Err(CoreError::missing_structure(format!(
                "'{key}' must be a list, found {}",
                kind_name(other)
            )));
        }
    }
    match parent.get_mut(key) {
        Some(Value::Sequence(seq)) => Ok(seq),
        _ => Err(CoreError::missing_structure(format!(
            "'{key}' could not be created"
        ))),
    }
}

pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

/// Short text form of a scalar, used in difference reports and key paths.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "~".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, scalar_text(&tagged.value)),
        Value::Sequence(seq) => format!("[{} items]", seq.len()),
        Value::Mapping(map) => format!("{{{} keys}}", map.len()),
    }
}

/// Builds a mapping from string keys, preserving the given order.
pub fn mapping<I, K>(entries: I) -> Mapping
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    entries
        .into_iter()
        .map(|(k, v)| (Value::String(k.into()), v))
        .collect()
}

pub fn string_list<I, S>(items: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Sequence(items.into_iter().map(|s| Value::String(s.into())).collect())
}

/// Literal replacement of placeholder tokens in one string.
pub fn substitute_tokens(text: &str, tokens: &[(&str, &str)]) -> String {
    tokens
        .iter()
        .fold(text.to_string(), |acc, (token, value)| acc.replace(token, value))
}

/// Applies [`substitute_tokens`] to every string scalar and string key of a
/// document. Re-rendering the result lets the emitter quote substituted
/// values itself.
pub fn substitute_tokens_in(value: &mut Value, tokens: &[(&str, &str)]) {
    match value {
        Value::String(s) => {
            if tokens.iter().any(|(token, _)| s.contains(token)) {
                *s = substitute_tokens(s, tokens);
            }
        }
        Value::Sequence(seq) => {
            for item in seq {
                substitute_tokens_in(item, tokens);
            }
        }
        Value::Mapping(map) => {
            let entries = std::mem::take(map);
            *map = entries
                .into_iter()
                .map(|(mut k, mut v)| {
                    substitute_tokens_in(&mut k, tokens);
                    substitute_tokens_in(&mut v, tokens);
                    (k, v)
                })
                .collect();
        }
        Value::Tagged(tagged) => substitute_tokens_in(&mut tagged.value, tokens),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Writes through a sibling temp file so a failed write never leaves a
/// truncated target behind.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, &e))?;
    }
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents).map_err(|e| CoreError::io(&tmp, &e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        CoreError::io(path, &e)
    })
}
