//! TemplateSource trait for abstracting template loading.
//!
//! Template resolution only needs to ask "does this relative path exist?"
//! and "give me its text", so the same lookup table works against the
//! filesystem or a pre-populated in-memory set.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for template loading operations.
#[derive(Error, Debug, Clone)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Failed to load template '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("Template '{0}' is not valid UTF-8")]
    InvalidEncoding(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::Io(err.to_string())
    }
}

/// Shared template text (reference-counted).
pub type SharedTemplateData = Arc<str>;

/// A trait for loading document templates from various sources.
///
/// Paths are always relative and use `/` as separator, e.g.
/// `invoices/commercial/en.html`.
///
/// # Implementations
///
/// - `FilesystemTemplateSource` (tradedoc-resource): a templates directory
/// - `InMemoryTemplateSource`: pre-populated memory (tests, embedded sets)
pub trait TemplateSource: Send + Sync + Debug {
    /// Load a template by its relative path.
    fn load(&self, path: &str) -> Result<SharedTemplateData, TemplateError>;

    /// Check if a template exists.
    fn exists(&self, path: &str) -> bool;

    /// Get the base path used for resolving relative templates.
    ///
    /// Returns `None` if the source doesn't use path-based resolution.
    fn base_path(&self) -> Option<&str> {
        None
    }

    /// Returns a human-readable name for this source (for logging).
    fn name(&self) -> &'static str;
}

/// An in-memory template source.
#[derive(Debug, Default)]
pub struct InMemoryTemplateSource {
    templates: RwLock<HashMap<String, SharedTemplateData>>,
}

impl InMemoryTemplateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template under the given relative path.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::LoadFailed` if the internal lock is poisoned.
    pub fn add(&self, path: impl Into<String>, text: &str) -> Result<(), TemplateError> {
        let path_string = path.into();
        let mut templates = self
            .templates
            .write()
            .map_err(|_| TemplateError::LoadFailed {
                path: path_string.clone(),
                message: "template store lock poisoned".to_string(),
            })?;
        templates.insert(path_string, Arc::from(text));
        Ok(())
    }

    /// Builder-style variant of [`add`](Self::add) for fixtures.
    pub fn with(self, path: impl Into<String>, text: &str) -> Result<Self, TemplateError> {
        self.add(path, text)?;
        Ok(self)
    }

    /// Remove a template. Returns `None` if the lock is poisoned or the
    /// template doesn't exist.
    pub fn remove(&self, path: &str) -> Option<SharedTemplateData> {
        self.templates.write().ok()?.remove(path)
    }

    /// Clear all templates. Does nothing if the lock is poisoned.
    pub fn clear(&self) {
        if let Ok(mut templates) = self.templates.write() {
            templates.clear();
        }
    }

    /// Number of templates in the store; 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.templates.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Returns `true` if the lock is poisoned.
    pub fn is_empty(&self) -> bool {
        self.templates.read().map(|t| t.is_empty()).unwrap_or(true)
    }
}

impl TemplateSource for InMemoryTemplateSource {
    fn load(&self, path: &str) -> Result<SharedTemplateData, TemplateError> {
        let templates = self
            .templates
            .read()
            .map_err(|_| TemplateError::LoadFailed {
                path: path.to_string(),
                message: "template store lock poisoned".to_string(),
            })?;
        templates
            .get(path)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.templates
            .read()
            .map(|t| t.contains_key(path))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryTemplateSource"
    }
}
