//! Trade document generation.
//!
//! A document is produced by resolving a template for its doc_code and
//! language, building a context from a [`Transaction`], rendering HTML with
//! Handlebars and converting it to PDF. Output paths, document numbers and
//! the record of what was generated are handled by [`storage`],
//! [`numbering`] and [`ledger`].

pub mod builders;
pub mod error;
pub mod language;
pub mod ledger;
pub mod model;
pub mod numbering;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod storage;
pub mod tafqit;

pub use builders::{BuilderRouter, Context, ContextBuilder};
pub use error::PipelineError;
pub use language::{Language, LocalizedText};
pub use ledger::{InMemoryLedgerStore, JsonFileLedgerStore, Ledger, LedgerStore};
pub use model::Transaction;
pub use pipeline::{DocumentPipeline, DocumentRequest, PipelineBuilder, RenderResult, Settings};
pub use registry::{TemplateSpec, resolve_template};
pub use render::pdf::{EngineKind, render_html_to_pdf};
pub use tafqit::tafqit;
pub use tradedoc_traits::{InMemoryTemplateSource, TemplateError, TemplateSource};
