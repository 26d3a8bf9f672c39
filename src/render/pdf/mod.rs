//! HTML → PDF conversion.
//!
//! Engines are tried in preference order until one succeeds:
//!
//! - [`ExternalEngine`]: Chromium headless, wkhtmltopdf or WeasyPrint,
//!   found on `PATH` and run as child processes
//! - [`BuiltinEngine`]: writes the document text with `lopdf`; always available

mod builtin;
mod external;

pub use builtin::{BuiltinEngine, html_to_text};
pub use external::{ExternalEngine, find_program, find_program_in};

use crate::error::PipelineError;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

static HEAD_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<head(\s[^>]*)?>").expect("static regex"));
static URL_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+://").expect("static regex"));

/// A component that turns an HTML string into a PDF file.
pub trait PdfEngine: Send + Sync + fmt::Debug {
    fn kind(&self) -> EngineKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn is_available(&self) -> bool;

    /// Writes `html` as a PDF to `out`. Relative resources resolve against `base_url`.
    fn render(&self, html: &str, out: &Path, base_url: Option<&str>) -> Result<(), PipelineError>;
}

/// The known PDF engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Chromium,
    Wkhtmltopdf,
    Weasyprint,
    Builtin,
}

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::Chromium,
        EngineKind::Wkhtmltopdf,
        EngineKind::Weasyprint,
        EngineKind::Builtin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Chromium => "chromium",
            EngineKind::Wkhtmltopdf => "wkhtmltopdf",
            EngineKind::Weasyprint => "weasyprint",
            EngineKind::Builtin => "builtin",
        }
    }

    /// `prefer` first, then the others in their default order.
    pub fn order(prefer: EngineKind) -> Vec<EngineKind> {
        let mut order = vec![prefer];
        order.extend(Self::ALL.into_iter().filter(|k| *k != prefer));
        order
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" | "playwright" => Ok(EngineKind::Chromium),
            "wkhtmltopdf" => Ok(EngineKind::Wkhtmltopdf),
            "weasyprint" => Ok(EngineKind::Weasyprint),
            "builtin" | "lopdf" => Ok(EngineKind::Builtin),
            other => Err(PipelineError::Config(format!("unknown PDF engine '{}'", other))),
        }
    }
}

/// Turns a directory path into a `file://` URL; URLs pass through.
pub fn ensure_file_url(base: &str) -> String {
    let base = base.trim();
    if URL_SCHEME.is_match(base) {
        return base.trim_end_matches('/').to_string();
    }
    let path = Path::new(base);
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut s = abs.to_string_lossy().replace('\\', "/");
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    format!("file://{}", s.trim_end_matches('/'))
}

/// Adds `<base href="…/">` right after `<head>`, or wraps a fragment in a
/// minimal document.
pub fn inject_base_tag(html: &str, base_url: Option<&str>) -> String {
    let Some(base) = base_url.filter(|b| !b.trim().is_empty()) else {
        return html.to_string();
    };
    let tag = format!("<base href=\"{}/\">", ensure_file_url(base));

    match HEAD_OPEN.find(html) {
        Some(m) => {
            let mut out = String::with_capacity(html.len() + tag.len() + 1);
            out.push_str(&html[..m.end()]);
            out.push_str(&tag);
            out.push('\n');
            out.push_str(&html[m.end()..]);
            out
        }
        None => format!(
            "<!doctype html><html><head><meta charset=\"utf-8\">{}</head><body>{}</body></html>",
            tag, html
        ),
    }
}

/// One engine tried during [`PdfRenderer::render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfAttempt {
    pub engine: EngineKind,
    /// `None` when the engine succeeded.
    pub error: Option<String>,
}

/// A successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfOutcome {
    pub engine: EngineKind,
    pub path: PathBuf,
    pub attempts: Vec<PdfAttempt>,
}

/// Availability of each engine on this machine.
pub fn detect_engines(engines: &[Box<dyn PdfEngine>]) -> Vec<(EngineKind, bool)> {
    engines.iter().map(|e| (e.kind(), e.is_available())).collect()
}

/// The default engine set: the three external programs and the built-in writer.
pub fn default_engines() -> Vec<Box<dyn PdfEngine>> {
    vec![
        Box::new(ExternalEngine::chromium()),
        Box::new(ExternalEngine::wkhtmltopdf()),
        Box::new(ExternalEngine::weasyprint()),
        Box::new(BuiltinEngine::default()),
    ]
}

/// Tries a set of engines in preference order.
#[derive(Debug)]
pub struct PdfRenderer {
    engines: Vec<Box<dyn PdfEngine>>,
    prefer: EngineKind,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new(default_engines(), EngineKind::default())
    }
}

impl PdfRenderer {
    pub fn new(engines: Vec<Box<dyn PdfEngine>>, prefer: EngineKind) -> Self {
        Self { engines, prefer }
    }

    pub fn prefer(&self) -> EngineKind {
        self.prefer
    }

    pub fn engines(&self) -> &[Box<dyn PdfEngine>] {
        &self.engines
    }

    /// Renders `html` to `out`, returning the engine that succeeded.
    ///
    /// Fails with every attempt listed when no engine succeeds.
    pub fn render(&self, html: &str, out: &Path, base_url: Option<&str>) -> Result<PdfOutcome, PipelineError> {
        if html.trim().is_empty() {
            return Err(PipelineError::PdfRender("HTML must be a non-empty string".into()));
        }
        if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut attempts = Vec::new();
        for kind in EngineKind::order(self.prefer) {
            let Some(engine) = self.engines.iter().find(|e| e.kind() == kind) else {
                continue;
            };
            if !engine.is_available() {
                debug!("PDF engine {} is not available", kind);
                attempts.push(PdfAttempt {
                    engine: kind,
                    error: Some("not available".into()),
                });
                continue;
            }

            match engine.render(html, out, base_url) {
                Ok(()) => {
                    info!("PDF written by {} to {}", kind, out.display());
                    attempts.push(PdfAttempt { engine: kind, error: None });
                    return Ok(PdfOutcome {
                        engine: kind,
                        path: out.to_path_buf(),
                        attempts,
                    });
                }
                Err(e) => {
                    warn!("PDF engine {} failed: {}", kind, e);
                    attempts.push(PdfAttempt {
                        engine: kind,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let summary = attempts
            .iter()
            .map(|a| format!("{}: {}", a.engine, a.error.as_deref().unwrap_or("ok")))
            .collect::<Vec<_>>()
            .join("; ");
        Err(PipelineError::PdfRender(format!(
            "no PDF engine succeeded for {} [{}]",
            out.display(),
            summary
        )))
    }
}

/// Renders with the default engines, trying `prefer` first.
pub fn render_html_to_pdf(
    html: &str,
    out: &Path,
    base_url: Option<&str>,
    prefer: EngineKind,
) -> Result<PdfOutcome, PipelineError> {
    PdfRenderer::new(default_engines(), prefer).render(html, out, base_url)
}
