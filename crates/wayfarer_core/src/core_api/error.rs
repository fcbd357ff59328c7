use std::path::{Path, PathBuf};

use crate::diff::Difference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Parse,
    MissingStructure,
    OwnershipViolation,
    /// Reserved: the classifier resolves every region deterministically today.
    ClassificationAmbiguity,
    Profile,
    InvalidInput,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
    pub path: Option<PathBuf>,
    pub differences: Vec<Difference>,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
            differences: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.message = format!("{}: {}", path.display(), self.message);
        self.path = Some(path.to_path_buf());
        self
    }

    pub fn io(path: impl AsRef<Path>, err: &std::io::Error) -> Self {
        Self::new(CoreErrorCode::Io, err.to_string()).with_path(path)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::Parse, message)
    }

    pub fn missing_structure(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::MissingStructure, message)
    }

    pub fn ownership_violation(differences: Vec<Difference>) -> Self {
        let message = format!(
            "{} unowned difference(s): {}",
            differences.len(),
            differences
                .iter()
                .map(|d| d.path.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Self {
            code: CoreErrorCode::OwnershipViolation,
            message,
            path: None,
            differences,
        }
    }
}
