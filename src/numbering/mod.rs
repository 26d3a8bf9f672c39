//! Document prefixes, document names and transaction-number helpers.
//!
//! The stateful parts live elsewhere: [`SequenceCounter`] keeps per-group
//! counters in memory and [`crate::ledger::Ledger`] allocates transaction
//! numbers against persisted state.

mod counter;

pub use counter::{SequenceCode, SequenceCounter};

use once_cell::sync::Lazy;
use regex::Regex;

/// doc_code → file/document-number prefix.
pub const DOC_PREFIXES: &[(&str, &str)] = &[
    ("invoice", "INV"),
    ("invoice.normal", "INV"),
    ("invoice.commercial", "INV-COM"),
    ("invoice.foreign.commercial", "INV-COM"),
    ("invoice.proforma", "INV-PRO"),
    ("invoice.syrian.entry", "INV-SE"),
    ("invoice.syrian.transit", "INV-ST"),
    ("invoice.syrian.intermediary", "INV-SI"),
    ("packing_list", "PKL"),
    ("packing_list.export.simple", "PKL"),
    ("packing_list.export.with_dates", "PKL"),
    ("packing_list.export.with_line_id", "PKL"),
    ("certificate_of_origin", "COO"),
    ("form_a", "FORMA"),
    ("form.a", "FORMA"),
    ("cmr", "CMR"),
];

static LETTER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{1,2}[-_]?").expect("static regex"));

fn known_prefix(doc_code: &str) -> Option<&'static str> {
    DOC_PREFIXES
        .iter()
        .find(|(code, _)| *code == doc_code)
        .map(|(_, prefix)| *prefix)
}

fn truncate_upper(s: &str, max: usize) -> String {
    s.to_uppercase().chars().take(max).collect()
}

/// Prefix used in document numbers and file names.
///
/// Unknown codes use their last dot segment, uppercased, at most 6 chars.
pub fn prefix_for_doc_code(doc_code: &str) -> String {
    known_prefix(doc_code).map(str::to_string).unwrap_or_else(|| {
        let last = doc_code.rsplit('.').next().unwrap_or(doc_code);
        truncate_upper(last, 6)
    })
}

/// Trims, drops spaces and turns `/` into `-`.
pub fn clean_transaction_no(transaction_no: &str) -> String {
    transaction_no.trim().replace(' ', "").replace('/', "-")
}

/// `{PREFIX}-{transaction}-{LANG}.{ext}`, e.g. `INV-COM-260006-AR.pdf`.
///
/// Unknown doc types use the first 6 characters of the uppercased type.
pub fn generate_document_name(doc_type: &str, transaction_no: &str, language: &str, extension: &str) -> String {
    let prefix = known_prefix(doc_type)
        .map(str::to_string)
        .unwrap_or_else(|| truncate_upper(doc_type, 6));
    format!(
        "{}-{}-{}.{}",
        prefix,
        clean_transaction_no(transaction_no),
        language.to_uppercase(),
        extension
    )
}

/// `documents/output/{year}/{MM}/{transaction}/`.
pub fn generate_document_folder(transaction_no: &str, year: i32, month: u32) -> String {
    format!(
        "documents/output/{}/{:02}/{}/",
        year,
        month,
        clean_transaction_no(transaction_no)
    )
}

/// All digits of `transaction_no` read as one number.
pub fn extract_numeric_part(transaction_no: &str) -> Option<u64> {
    let digits: String = transaction_no.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

pub fn format_transaction_number(number: u64, prefix: &str) -> String {
    format!("{}{}", prefix, number)
}

/// True for auto-style numbers: an optional 1–2 letter prefix (with an
/// optional `-`/`_`) followed by at least four digits.
pub fn is_numeric_transaction(transaction_no: &str) -> bool {
    let upper = transaction_no.to_uppercase();
    let rest = LETTER_PREFIX.replace(&upper, "");
    rest.len() >= 4 && rest.chars().all(|c| c.is_ascii_digit())
}
