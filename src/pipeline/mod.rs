//! Document generation pipeline.
//!
//! - [`PipelineBuilder`]: fluent builder, usually fed from [`Settings`]
//! - [`DocumentPipeline`]: context → HTML → PDF → ledger for one request
//!
//! # Example
//!
//! ```ignore
//! use tradedoc::{DocumentRequest, Language, PipelineBuilder, Transaction};
//!
//! let pipeline = PipelineBuilder::new()
//!     .with_templates_dir("templates")
//!     .with_output_root("documents/output")
//!     .build()?;
//!
//! let tx = Transaction::from_json(&std::fs::read_to_string("tx.json")?)?;
//! let result = pipeline.render_document(DocumentRequest::new(tx, "invoice.commercial", Language::En))?;
//! println!("{}", result.out_html.display());
//! ```

mod builder;
pub mod config;
mod orchestrator;

pub use builder::PipelineBuilder;
pub use config::Settings;
pub use orchestrator::{DocumentPipeline, DocumentRequest, RenderResult};
