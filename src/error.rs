// src/error.rs
//! Error types for every document generation operation.

use thiserror::Error;
use tradedoc_traits::TemplateError;

/// The main error enum for all high-level operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Template not found for {doc_code} [{lang}]: {detail}")]
    TemplateNotFound {
        doc_code: String,
        lang: String,
        detail: String,
    },

    #[error("Template source error: {0}")]
    Template(#[from] TemplateError),

    #[error("No builder rule matched for doc_code '{0}'")]
    BuilderNotFound(String),

    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),

    #[error("HTML rendering failed: {0}")]
    HtmlRender(String),

    #[error("PDF rendering failed: {0}")]
    PdfRender(String),

    #[error("Numbering error: {0}")]
    Numbering(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("No document type mapping for '{doc_code}' (known: {known})")]
    UnknownDocumentType { doc_code: String, known: String },
}

impl From<handlebars::RenderError> for PipelineError {
    fn from(e: handlebars::RenderError) -> Self {
        PipelineError::HtmlRender(e.to_string())
    }
}

impl From<handlebars::TemplateError> for PipelineError {
    fn from(e: handlebars::TemplateError) -> Self {
        PipelineError::HtmlRender(e.to_string())
    }
}

impl From<lopdf::Error> for PipelineError {
    fn from(e: lopdf::Error) -> Self {
        PipelineError::PdfRender(e.to_string())
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(e: toml::de::Error) -> Self {
        PipelineError::Config(e.to_string())
    }
}
