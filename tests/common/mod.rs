#![allow(dead_code)]

pub mod fixtures;
pub mod pdf_assertions;

use lopdf::Document as LopdfDocument;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tradedoc::render::pdf::{BuiltinEngine, PdfEngine};
use tradedoc::{DocumentPipeline, EngineKind, JsonFileLedgerStore, PipelineBuilder, PipelineError};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// The templates shipped with the crate.
pub fn templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// A scratch workspace with an output root and a JSON ledger.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self { dir: tempfile::tempdir()? })
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.dir.path().join("ledger.json")
    }

    /// Pipeline over the shipped templates that only writes HTML.
    pub fn html_pipeline(&self) -> Result<DocumentPipeline, PipelineError> {
        self.builder().with_html_only(true).build()
    }

    /// Pipeline whose only PDF engine is the built-in lopdf writer.
    pub fn builtin_pdf_pipeline(&self) -> Result<DocumentPipeline, PipelineError> {
        let engines: Vec<Box<dyn PdfEngine>> = vec![Box::new(BuiltinEngine::default())];
        self.builder()
            .with_pdf_engines(engines)
            .with_pdf_preference(EngineKind::Builtin)
            .build()
    }

    pub fn builder(&self) -> PipelineBuilder {
        PipelineBuilder::new()
            .with_templates_dir(templates_dir())
            .with_output_root(self.output())
            .with_ledger_store(Arc::new(JsonFileLedgerStore::new(self.ledger_path())))
    }
}

pub fn load_pdf(path: &Path) -> Result<LopdfDocument, Box<dyn std::error::Error>> {
    Ok(LopdfDocument::load(path)?)
}
