use crate::builders::{BuilderRouter, Context};
use crate::error::PipelineError;
use crate::language::Language;
use crate::ledger::{Ledger, NewDocument, PersistedDocument};
use crate::model::Transaction;
use crate::numbering::prefix_for_doc_code;
use crate::render::html::HtmlRenderer;
use crate::render::pdf::{EngineKind, PdfRenderer};
use crate::storage::output_paths;
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

/// One document to render.
#[derive(Debug, Clone)]
pub struct DocumentRequest {
    pub transaction: Transaction,
    pub doc_code: String,
    pub lang: Language,
    /// Overrides the pipeline's html-only default when set.
    pub html_only: Option<bool>,
    pub explicit_doc_no: Option<String>,
    /// Dates the output folder and the doc group; today when unset.
    pub date: Option<NaiveDate>,
}

impl DocumentRequest {
    pub fn new(transaction: Transaction, doc_code: impl Into<String>, lang: Language) -> Self {
        Self {
            transaction,
            doc_code: doc_code.into(),
            lang,
            html_only: None,
            explicit_doc_no: None,
            date: None,
        }
    }

    pub fn with_html_only(mut self, html_only: bool) -> Self {
        self.html_only = Some(html_only);
        self
    }

    pub fn with_doc_no(mut self, doc_no: impl Into<String>) -> Self {
        self.explicit_doc_no = Some(doc_no.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// What [`DocumentPipeline::render_document`] produced.
#[derive(Debug, Clone, Serialize)]
pub struct RenderResult {
    pub doc_code: String,
    pub lang: Language,
    pub doc_no: String,
    pub out_html: PathBuf,
    /// `None` when PDF output was skipped or every engine failed.
    pub out_pdf: Option<PathBuf>,
    pub pdf_engine: Option<EngineKind>,
    pub persisted: PersistedDocument,
}

/// Builds a context, renders HTML and PDF, writes the files and records
/// the document in the ledger.
#[derive(Debug)]
pub struct DocumentPipeline {
    router: BuilderRouter,
    html: HtmlRenderer,
    pdf: PdfRenderer,
    ledger: Ledger,
    output_root: PathBuf,
    html_only: bool,
}

impl DocumentPipeline {
    pub fn new(
        router: BuilderRouter,
        html: HtmlRenderer,
        pdf: PdfRenderer,
        ledger: Ledger,
        output_root: PathBuf,
        html_only: bool,
    ) -> Self {
        Self {
            router,
            html,
            pdf,
            ledger,
            output_root,
            html_only,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn html_renderer(&self) -> &HtmlRenderer {
        &self.html
    }

    pub fn pdf_renderer(&self) -> &PdfRenderer {
        &self.pdf
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// The template context for a document, with the numbering fields filled in.
    pub fn build_context(
        &self,
        tx: &Transaction,
        doc_code: &str,
        lang: Language,
        doc_no: &str,
    ) -> Result<Context, PipelineError> {
        let mut ctx = self.router.build(tx, doc_code, lang)?;
        debug!(
            "Context built for {} [{}]: {}",
            doc_code,
            lang,
            ctx.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
        );
        ctx.insert("transaction_no".into(), json!(tx.transaction_no.trim()));
        ctx.insert("doc_no".into(), json!(doc_no));
        ctx.entry("invoice_no").or_insert_with(|| json!(doc_no));
        Ok(ctx)
    }

    /// Renders one document end to end.
    ///
    /// A PDF failure is logged and leaves the HTML as the stored file; every
    /// other failure aborts before the ledger is touched.
    pub fn render_document(&self, request: DocumentRequest) -> Result<RenderResult, PipelineError> {
        let DocumentRequest {
            transaction,
            doc_code,
            lang,
            html_only,
            explicit_doc_no,
            date,
        } = request;

        let tx_no = transaction.transaction_no.trim().to_string();
        if tx_no.is_empty() {
            return Err(PipelineError::InvalidTransaction("transaction number is empty".into()));
        }
        info!("Rendering {} [{}] for transaction {}", doc_code, lang, tx_no);

        let prefix = prefix_for_doc_code(&doc_code);
        let doc_no = match explicit_doc_no.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => {
                info!("Using explicit doc_no {}", explicit);
                explicit.to_string()
            }
            _ => format!("{}-{}", prefix, tx_no),
        };

        let ctx = self.build_context(&transaction, &doc_code, lang, &doc_no)?;
        let html = self.html.render(&doc_code, lang, &ctx)?;

        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let paths = output_paths(&self.output_root, &prefix, &tx_no, lang, date)?;
        fs::write(&paths.html, &html)?;
        info!("HTML written to {}", paths.html.display());

        let mut out_pdf = None;
        let mut pdf_engine = None;
        if !html_only.unwrap_or(self.html_only) {
            let base_url = paths.html.parent().map(|p| p.to_string_lossy().into_owned());
            match self.pdf.render(&html, &paths.pdf, base_url.as_deref()) {
                Ok(outcome) => {
                    pdf_engine = Some(outcome.engine);
                    out_pdf = Some(outcome.path);
                }
                Err(e) => warn!("PDF generation failed, keeping HTML only: {}", e),
            }
        }

        let stored = out_pdf.as_ref().unwrap_or(&paths.html);
        let totals = ctx.get("totals").cloned().unwrap_or(Value::Null);
        let persisted = self.ledger.record_rendered(NewDocument {
            transaction_no: tx_no.clone(),
            doc_code: doc_code.clone(),
            lang: lang.code().to_string(),
            file_path: stored.to_string_lossy().into_owned(),
            totals,
            data: Value::Object(ctx),
            document_no: Some(doc_no.clone()),
            date,
        })?;
        info!(
            "Document {} stored as {} ({}, group {})",
            doc_no,
            stored.display(),
            persisted.document_type_code,
            persisted.group_id
        );

        Ok(RenderResult {
            doc_code,
            lang,
            doc_no,
            out_html: paths.html,
            out_pdf,
            pdf_engine,
            persisted,
        })
    }
}
