//! Template lookup: `(doc_code, language)` → template path.
//!
//! Each doc_code maps to a folder under the templates root holding one file
//! per language (`en.html`, `ar.html`, `tr.html`). Missing language files
//! fall back to English; the proforma invoice can borrow the commercial
//! invoice templates.

use crate::error::PipelineError;
use crate::language::Language;
use log::debug;
use serde_json::{Map, Value};
use tradedoc_traits::TemplateSource;

/// doc_code → template folder.
pub const DOC_CODES: &[(&str, &str)] = &[
    ("invoice.normal", "invoices/normal"),
    ("invoice.commercial", "invoices/commercial"),
    ("invoice.proforma", "invoices/proforma"),
    // generic Syrian invoice resolves to the transit layout
    ("invoice.syrian", "invoices/syrian/transit"),
    ("invoice.syrian.transit", "invoices/syrian/transit"),
    ("invoice.syrian.intermediary", "invoices/syrian/intermediary"),
    ("invoice.syrian.entry", "invoices/syrian/entry"),
    ("invoice.foreign.commercial", "invoices/commercial"),
    ("packing_list.export.simple", "packing_list/export/simple"),
    ("packing_list.export.with_dates", "packing_list/export/with_dates"),
    ("packing_list.export.with_line_id", "packing_list/export/with_line_id"),
    ("cmr", "cmr"),
    ("form_a", "form_a"),
    ("form.a", "form_a"),
];

/// Documents that exist only as an English template (international forms).
const ENGLISH_ONLY_DOCS: &[&str] = &["cmr"];

const PROFORMA: &str = "invoice.proforma";
const COMMERCIAL: &str = "invoice.commercial";

/// The outcome of a template lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSpec {
    pub doc_code: String,
    /// The language that was requested, not necessarily the file's language.
    pub lang: Language,
    /// Path relative to the templates root, `/`-separated.
    pub path: String,
    /// Values merged over the builder context before rendering.
    pub extra: Option<Map<String, Value>>,
}

/// Returns the template folder for a doc_code.
pub fn template_folder(doc_code: &str) -> Option<&'static str> {
    DOC_CODES
        .iter()
        .find(|(code, _)| *code == doc_code)
        .map(|(_, folder)| *folder)
}

pub fn is_known_doc_code(doc_code: &str) -> bool {
    template_folder(doc_code).is_some()
}

pub fn proforma_title(lang: Language) -> &'static str {
    match lang {
        Language::En => "PROFORMA INVOICE",
        Language::Tr => "ÖN FATURA",
        Language::Ar => "فاتورة أولية",
    }
}

fn proforma_extra(lang: Language) -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("title".into(), Value::String(proforma_title(lang).into()));
    extra
}

fn join(folder: &str, file: &str) -> String {
    format!("{}/{}", folder, file)
}

/// Resolves the template for `doc_code` in `lang`.
///
/// Order: English-only documents → direct hit → proforma borrows commercial
/// → English fallback → `TemplateNotFound`.
pub fn resolve_template(
    source: &dyn TemplateSource,
    doc_code: &str,
    lang: Language,
) -> Result<TemplateSpec, PipelineError> {
    let not_found = |detail: String| PipelineError::TemplateNotFound {
        doc_code: doc_code.to_string(),
        lang: lang.to_string(),
        detail,
    };

    let folder = template_folder(doc_code)
        .ok_or_else(|| not_found(format!("unknown doc_code '{}'", doc_code)))?;

    let spec = |path: String, extra: Option<Map<String, Value>>| TemplateSpec {
        doc_code: doc_code.to_string(),
        lang,
        path,
        extra,
    };

    if ENGLISH_ONLY_DOCS.contains(&doc_code) {
        let path = join(folder, Language::En.template_file());
        if source.exists(&path) {
            debug!("{} is English-only, using {}", doc_code, path);
            return Ok(spec(path, None));
        }
        return Err(not_found(format!("English-only template missing → {}", path)));
    }

    let is_proforma = doc_code == PROFORMA;
    let direct = join(folder, lang.template_file());
    if source.exists(&direct) {
        return Ok(spec(direct, is_proforma.then(|| proforma_extra(lang))));
    }

    if is_proforma
        && let Some(commercial) = template_folder(COMMERCIAL)
    {
        let borrowed = join(commercial, lang.template_file());
        if source.exists(&borrowed) {
            debug!("proforma template missing, borrowing {}", borrowed);
            return Ok(spec(borrowed, Some(proforma_extra(lang))));
        }
    }

    let english = join(folder, Language::En.template_file());
    if source.exists(&english) {
        debug!("{} [{}] missing, falling back to {}", doc_code, lang, english);
        return Ok(spec(english, is_proforma.then(|| proforma_extra(Language::En))));
    }

    Err(not_found(format!("no template at {}", direct)))
}
