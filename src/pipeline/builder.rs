// src/pipeline/builder.rs
use super::config::Settings;
use super::orchestrator::DocumentPipeline;
use crate::builders::BuilderRouter;
use crate::error::PipelineError;
use crate::ledger::{JsonFileLedgerStore, Ledger, LedgerStore};
use crate::render::html::HtmlRenderer;
use crate::render::pdf::{EngineKind, PdfEngine, PdfRenderer, default_engines};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tradedoc_resource::FilesystemTemplateSource;
use tradedoc_traits::TemplateSource;

/// A builder for creating a `DocumentPipeline`.
pub struct PipelineBuilder {
    source: Option<Arc<dyn TemplateSource>>,
    output_root: PathBuf,
    ledger: Option<Ledger>,
    transaction_prefix: Option<String>,
    engines: Option<Vec<Box<dyn PdfEngine>>>,
    prefer: EngineKind,
    html_only: bool,
    router: BuilderRouter,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            source: None,
            output_root: PathBuf::from("documents/output"),
            ledger: None,
            transaction_prefix: None,
            engines: None,
            prefer: EngineKind::default(),
            html_only: false,
            router: BuilderRouter::default(),
        }
    }
}

impl PipelineBuilder {
    /// Creates a new `PipelineBuilder` with the default builder rules and PDF engines.
    pub fn new() -> Self {
        Default::default()
    }

    /// Configures templates, output root, JSON ledger and PDF options from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let prefix = settings.numbering.transaction_prefix.trim();
        let mut builder = Self::new()
            .with_templates_dir(&settings.paths.templates)
            .with_output_root(&settings.paths.output)
            .with_ledger_store(Arc::new(JsonFileLedgerStore::new(&settings.paths.ledger)))
            .with_pdf_preference(settings.pdf.prefer)
            .with_html_only(settings.pdf.html_only);
        if !prefix.is_empty() {
            builder = builder.with_transaction_prefix(prefix);
        }
        builder
    }

    /// Loads templates from a directory tree (`invoices/commercial/en.html`, ...).
    pub fn with_templates_dir<P: AsRef<Path>>(self, path: P) -> Self {
        self.with_template_source(Arc::new(FilesystemTemplateSource::new(path)))
    }

    /// Loads templates through any `TemplateSource`.
    pub fn with_template_source(mut self, source: Arc<dyn TemplateSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Root folder for `{YYYY}/{MM}/` output.
    pub fn with_output_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_root = path.as_ref().to_path_buf();
        self
    }

    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_ledger_store(self, store: Arc<dyn LedgerStore>) -> Self {
        self.with_ledger(Ledger::new(store))
    }

    /// Stored in the ledger when the pipeline is built.
    pub fn with_transaction_prefix(mut self, prefix: &str) -> Self {
        self.transaction_prefix = Some(prefix.to_string());
        self
    }

    /// Replaces the default engine set.
    pub fn with_pdf_engines(mut self, engines: Vec<Box<dyn PdfEngine>>) -> Self {
        self.engines = Some(engines);
        self
    }

    pub fn with_pdf_preference(mut self, prefer: EngineKind) -> Self {
        self.prefer = prefer;
        self
    }

    pub fn with_html_only(mut self, html_only: bool) -> Self {
        self.html_only = html_only;
        self
    }

    pub fn with_router(mut self, router: BuilderRouter) -> Self {
        self.router = router;
        self
    }

    /// Consumes the builder and creates the `DocumentPipeline`.
    pub fn build(self) -> Result<DocumentPipeline, PipelineError> {
        let source = self.source.ok_or_else(|| {
            PipelineError::Config(
                "No template source has been configured. Use `with_templates_dir` or `with_template_source`."
                    .to_string(),
            )
        })?;
        fs::create_dir_all(&self.output_root)?;

        let ledger = self.ledger.unwrap_or_else(|| {
            info!("No ledger configured. Using an in-memory ledger.");
            Ledger::in_memory()
        });
        if let Some(prefix) = &self.transaction_prefix
            && ledger.state()?.transaction_prefix != *prefix
        {
            ledger.set_prefix(prefix)?;
        }

        info!(
            "Pipeline ready: templates from {}, output to {}, PDF prefers {}{}",
            source.name(),
            self.output_root.display(),
            self.prefer,
            if self.html_only { " (HTML only)" } else { "" }
        );

        Ok(DocumentPipeline::new(
            self.router,
            HtmlRenderer::new(source),
            PdfRenderer::new(self.engines.unwrap_or_else(default_engines), self.prefer),
            ledger,
            self.output_root,
            self.html_only,
        ))
    }
}
