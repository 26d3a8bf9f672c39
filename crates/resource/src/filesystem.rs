//! Filesystem-based template source.
//!
//! Templates are resolved relative to a templates root. Resolved paths must
//! stay inside that root, so a doc_code table entry can never reach outside
//! the templates directory.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tradedoc_traits::{SharedTemplateData, TemplateError, TemplateSource};

/// A template source backed by a directory tree such as
/// `templates/invoices/commercial/en.html`.
#[derive(Debug)]
pub struct FilesystemTemplateSource {
    root: PathBuf,
    /// Canonicalized root for containment checks
    canonical_root: Option<PathBuf>,
}

impl FilesystemTemplateSource {
    /// Creates a source rooted at `root`. The root may not exist yet; in that
    /// case every lookup simply reports "not found".
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let canonical_root = root.canonicalize().ok();
        Self {
            root,
            canonical_root,
        }
    }

    /// Returns the templates root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the absolute location a relative template path maps to, if it
    /// stays inside the root.
    pub fn full_path(&self, path: &str) -> Option<PathBuf> {
        self.resolve_path_safe(path)
    }

    fn resolve_path_safe(&self, path: &str) -> Option<PathBuf> {
        if Path::new(path).is_absolute() {
            return None;
        }

        let full_path = self.root.join(path);

        if let Ok(canonical) = full_path.canonicalize()
            && let Some(ref root) = self.canonical_root
        {
            return canonical.starts_with(root).then_some(canonical);
        }

        // Not on disk (yet): reject any parent-dir component outright.
        if Path::new(path)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return None;
        }

        Some(full_path)
    }
}

impl TemplateSource for FilesystemTemplateSource {
    fn load(&self, path: &str) -> Result<SharedTemplateData, TemplateError> {
        let full_path = self
            .resolve_path_safe(path)
            .ok_or_else(|| TemplateError::NotFound(format!("{} (outside templates root)", path)))?;

        let bytes = std::fs::read(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TemplateError::NotFound(path.to_string())
            } else {
                TemplateError::LoadFailed {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let text =
            String::from_utf8(bytes).map_err(|_| TemplateError::InvalidEncoding(path.to_string()))?;
        Ok(Arc::from(text))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve_path_safe(path)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    fn base_path(&self) -> Option<&str> {
        self.root.to_str()
    }

    fn name(&self) -> &'static str {
        "FilesystemTemplateSource"
    }
}
