// src/render/mod.rs
//! Rendering: Handlebars templates to HTML, HTML to PDF.

pub mod html;
pub mod pdf;

pub use html::HtmlRenderer;
pub use pdf::{EngineKind, PdfEngine, PdfOutcome, PdfRenderer, render_html_to_pdf};
