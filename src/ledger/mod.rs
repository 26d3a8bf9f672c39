//! Persisted numbering and document records.
//!
//! The ledger remembers which transaction numbers exist, the last number
//! handed out, and every generated document grouped under its doc_no.

mod store;

pub use store::{InMemoryLedgerStore, JsonFileLedgerStore, LedgerStore};

use crate::error::PipelineError;
use crate::numbering::{extract_numeric_part, format_transaction_number};
use chrono::{Datelike, Local, NaiveDate};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Probes made when looking for a free transaction number.
const MAX_PROBES: u64 = 200;

/// Longer digit runs are not auto-generated numbers.
const MAX_AUTO_DIGITS: usize = 9;

static DOC_NO_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\\/]").expect("static regex"));

/// doc_code → document type code stored with each record.
pub const DOCUMENT_TYPE_CODES: &[(&str, &str)] = &[
    ("invoice.foreign.commercial", "INV_EXT"),
    ("invoice.commercial", "INV_EXT"),
    ("invoice.normal", "INV_NORMAL"),
    ("invoice.proforma", "INV_PROFORMA"),
    ("invoice.syrian.intermediary", "INV_SYR_INTERM"),
    ("invoice.syrian.transit", "INV_SYR_TRANS"),
    ("invoice.syrian.entry", "invoice.syrian.entry"),
    ("invoice.syrian", "INV_SY"),
    ("packing_list.export.simple", "PL_EXPORT_SIMPLE"),
    ("packing_list.export.with_dates", "PL_EXPORT_WITH_DATES"),
    ("packing_list.export.with_line_id", "PL_EXPORT_WITH_LINE_ID"),
    ("cmr", "cmr"),
    ("form_a", "form_a"),
    ("form.a", "form_a"),
];

fn lookup_type_code(doc_code: &str) -> Option<&'static str> {
    DOCUMENT_TYPE_CODES
        .iter()
        .find(|(code, _)| *code == doc_code)
        .map(|(_, t)| *t)
}

/// Maps a doc_code to its document type code.
///
/// A trailing language segment (`invoice.normal.ar`) is ignored.
pub fn document_type_code(doc_code: &str) -> Result<&'static str, PipelineError> {
    if let Some(code) = lookup_type_code(doc_code) {
        return Ok(code);
    }
    if let Some((base, suffix)) = doc_code.rsplit_once('.')
        && matches!(suffix, "ar" | "en" | "tr")
        && let Some(code) = lookup_type_code(base)
    {
        return Ok(code);
    }

    let mut known: Vec<&str> = DOCUMENT_TYPE_CODES.iter().map(|(c, _)| *c).collect();
    known.sort_unstable();
    Err(PipelineError::UnknownDocumentType {
        doc_code: doc_code.to_string(),
        known: known.join(", "),
    })
}

/// A set of documents sharing one doc_no.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocGroup {
    pub id: u64,
    pub transaction_no: String,
    pub doc_no: String,
    pub year: i32,
    pub month: u32,
    pub seq: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub group_id: u64,
    pub document_type_code: String,
    pub language: String,
    pub status: String,
    pub file_path: String,
    #[serde(default)]
    pub totals: Value,
    #[serde(default)]
    pub data: Value,
}

/// Everything the ledger persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    #[serde(default)]
    pub transaction_prefix: String,
    #[serde(default)]
    pub last_number: u64,
    #[serde(default)]
    pub transaction_numbers: BTreeSet<String>,
    #[serde(default)]
    pub groups: Vec<DocGroup>,
    #[serde(default)]
    pub documents: Vec<DocumentRecord>,
}

impl LedgerState {
    /// The counter value of an auto-generated transaction number.
    ///
    /// Manual numbers (containing `/`, `-` or a space) yield `None`, the
    /// configured prefix is stripped and only digit runs of up to nine
    /// characters count.
    pub fn auto_number(&self, transaction_no: &str) -> Option<u64> {
        if transaction_no.contains(['/', '-', ' ']) {
            return None;
        }
        let prefix = self.transaction_prefix.as_str();
        let body = if prefix.is_empty() {
            transaction_no
        } else {
            transaction_no.strip_prefix(prefix).unwrap_or(transaction_no)
        };
        let digits: String = body.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() || digits.len() > MAX_AUTO_DIGITS {
            return None;
        }
        digits.parse::<u64>().ok()
    }

    /// Highest auto-generated number among the known transactions.
    pub fn max_numeric_transaction(&self) -> u64 {
        self.transaction_numbers
            .iter()
            .filter_map(|tx| self.auto_number(tx))
            .max()
            .unwrap_or(0)
    }

    fn next_group_id(&self) -> u64 {
        self.groups.iter().map(|g| g.id).max().unwrap_or(0) + 1
    }

    fn next_seq(&self, year: i32, month: u32) -> u32 {
        self.groups
            .iter()
            .filter(|g| g.year == year && g.month == month)
            .map(|g| g.seq)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Returns the group for `(transaction_no, doc_no)`, creating it if needed.
    fn ensure_group(&mut self, transaction_no: &str, doc_no: &str, date: NaiveDate) -> DocGroup {
        if let Some(group) = self
            .groups
            .iter()
            .rev()
            .find(|g| g.transaction_no == transaction_no && g.doc_no == doc_no)
        {
            return group.clone();
        }

        let group = DocGroup {
            id: self.next_group_id(),
            transaction_no: transaction_no.to_string(),
            doc_no: doc_no.to_string(),
            year: date.year(),
            month: date.month(),
            seq: self.next_seq(date.year(), date.month()),
        };
        debug!("New doc group {} (seq {}) for {}", group.doc_no, group.seq, transaction_no);
        self.groups.push(group.clone());
        group
    }

    fn record_document(&mut self, doc: &NewDocument, type_code: &'static str) -> PersistedDocument {
        let doc_no = match doc.document_no.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => explicit.to_string(),
            _ => group_doc_no(&crate::numbering::prefix_for_doc_code(&doc.doc_code), &doc.transaction_no),
        };
        let group = self.ensure_group(&doc.transaction_no, &doc_no, doc.date);
        let record = DocumentRecord {
            group_id: group.id,
            document_type_code: type_code.to_string(),
            language: doc.lang.clone(),
            status: "ready".to_string(),
            file_path: doc.file_path.clone(),
            totals: doc.totals.clone(),
            data: doc.data.clone(),
        };

        match self.documents.iter_mut().find(|r| {
            r.group_id == group.id && r.document_type_code == type_code && r.language == doc.lang
        }) {
            Some(existing) => *existing = record,
            None => self.documents.push(record),
        }

        PersistedDocument {
            group_id: group.id,
            document_no: group.doc_no,
            document_type_code: type_code.to_string(),
            seq: group.seq,
        }
    }
}

/// `{prefix}-{transaction}` with path separators replaced by `-`.
pub fn group_doc_no(prefix: &str, transaction_no: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        DOC_NO_SEPARATORS.replace_all(transaction_no.trim(), "-")
    )
}

/// Input for [`Ledger::persist_document`].
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub transaction_no: String,
    pub doc_code: String,
    pub lang: String,
    pub file_path: String,
    pub totals: Value,
    pub data: Value,
    /// Used as-is when set; otherwise derived from the doc_code prefix.
    pub document_no: Option<String>,
    pub date: NaiveDate,
}

/// What [`Ledger::persist_document`] recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedDocument {
    pub group_id: u64,
    pub document_no: String,
    pub document_type_code: String,
    pub seq: u32,
}

/// Numbering and document bookkeeping over a [`LedgerStore`].
///
/// Every operation loads the current state, applies its change and saves.
#[derive(Debug, Clone)]
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryLedgerStore::new()))
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub fn state(&self) -> Result<LedgerState, PipelineError> {
        self.store.load()
    }

    fn update<T>(&self, f: impl FnOnce(&mut LedgerState) -> T) -> Result<T, PipelineError> {
        let mut state = self.store.load()?;
        let out = f(&mut state);
        self.store.save(&state)?;
        Ok(out)
    }

    pub fn set_prefix(&self, prefix: &str) -> Result<(), PipelineError> {
        self.update(|s| s.transaction_prefix = prefix.to_string())
    }

    /// Allocates the next free transaction number and records it as the last one.
    ///
    /// Starts after the larger of the stored last number and the highest
    /// existing number, so numbers freed at the top are handed out again
    /// and the counter never moves backwards.
    pub fn next_transaction_number(&self) -> Result<String, PipelineError> {
        let mut state = self.store.load()?;
        let prefix = state.transaction_prefix.clone();
        let last = state.last_number.max(state.max_numeric_transaction());

        let mut number = last + 1;
        for _ in 0..MAX_PROBES {
            let candidate = format_transaction_number(number, &prefix);
            if !state.transaction_numbers.contains(&candidate) {
                break;
            }
            number += 1;
        }

        state.last_number = number;
        self.store.save(&state)?;
        let tx_no = format_transaction_number(number, &prefix);
        info!("Allocated transaction number {}", tx_no);
        Ok(tx_no)
    }

    /// Like [`Self::next_transaction_number`], but a store failure yields a
    /// timestamp number `T{YYYYmmddHHMMSS}` instead of an error.
    pub fn next_transaction_number_or_fallback(&self) -> String {
        self.next_transaction_number().unwrap_or_else(|e| {
            let fallback = format!("T{}", Local::now().format("%Y%m%d%H%M%S"));
            warn!("Numbering failed ({}), using fallback {}", e, fallback);
            fallback
        })
    }

    /// Resets the last number to the highest existing one and returns it.
    pub fn sync_last_number(&self) -> Result<u64, PipelineError> {
        self.update(|s| {
            s.last_number = s.max_numeric_transaction();
            s.last_number
        })
    }

    /// Raises the last number when a manually entered number is higher.
    pub fn validate_and_update_last_number(&self, transaction_no: &str) -> Result<bool, PipelineError> {
        let Some(number) = extract_numeric_part(transaction_no) else {
            return Ok(false);
        };
        self.update(|s| {
            if number > s.last_number {
                s.last_number = number;
                true
            } else {
                false
            }
        })
    }

    /// Records a transaction number as used. Returns false if it already was.
    pub fn register_transaction(&self, transaction_no: &str) -> Result<bool, PipelineError> {
        let tx = transaction_no.trim();
        if tx.is_empty() {
            return Err(PipelineError::Numbering("empty transaction number".into()));
        }
        self.update(|s| s.transaction_numbers.insert(tx.to_string()))
    }

    /// Forgets a transaction number and re-syncs the last number.
    pub fn remove_transaction(&self, transaction_no: &str) -> Result<bool, PipelineError> {
        self.update(|s| {
            let removed = s.transaction_numbers.remove(transaction_no.trim());
            if removed {
                s.last_number = s.max_numeric_transaction();
            }
            removed
        })
    }

    /// Returns `{prefix}-{transaction}`, creating its group on first use.
    pub fn allocate_group_doc_no(
        &self,
        transaction_no: &str,
        prefix: &str,
        date: NaiveDate,
    ) -> Result<String, PipelineError> {
        let doc_no = group_doc_no(prefix, transaction_no);
        self.update(|s| s.ensure_group(transaction_no, &doc_no, date).doc_no)
    }

    /// Inserts or replaces the record for (group, document type, language).
    pub fn persist_document(&self, doc: NewDocument) -> Result<PersistedDocument, PipelineError> {
        let type_code = document_type_code(&doc.doc_code)?;
        self.update(|s| s.record_document(&doc, type_code))
    }

    /// Registers the transaction of a rendered document and stores its
    /// record in a single load/save.
    ///
    /// A newly registered auto-style number raises the last number; manual
    /// numbers leave the counter alone.
    pub fn record_rendered(&self, doc: NewDocument) -> Result<PersistedDocument, PipelineError> {
        let tx = doc.transaction_no.trim().to_string();
        if tx.is_empty() {
            return Err(PipelineError::Numbering("empty transaction number".into()));
        }
        let type_code = document_type_code(&doc.doc_code)?;
        self.update(|s| {
            if s.transaction_numbers.insert(tx.clone())
                && let Some(number) = s.auto_number(&tx)
                && number > s.last_number
            {
                debug!("Last number raised to {} by {}", number, tx);
                s.last_number = number;
            }
            s.record_document(&doc, type_code)
        })
    }

    /// Records stored under a doc_no.
    pub fn documents_for(&self, doc_no: &str) -> Result<Vec<DocumentRecord>, PipelineError> {
        let state = self.store.load()?;
        let ids: Vec<u64> = state
            .groups
            .iter()
            .filter(|g| g.doc_no == doc_no)
            .map(|g| g.id)
            .collect();
        Ok(state
            .documents
            .into_iter()
            .filter(|d| ids.contains(&d.group_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_with(numbers: &[&str], last: u64) -> Ledger {
        let mut state = LedgerState::default();
        state.last_number = last;
        state.transaction_numbers = numbers.iter().map(|s| s.to_string()).collect();
        Ledger::new(Arc::new(InMemoryLedgerStore::with_state(state)))
    }

    #[test]
    fn next_number_follows_highest_existing() {
        let ledger = ledger_with(&["260001", "260003", "260006"], 0);
        assert_eq!(ledger.next_transaction_number().unwrap(), "260007");
        assert_eq!(ledger.state().unwrap().last_number, 260007);
    }

    #[test]
    fn next_number_never_moves_backwards() {
        let ledger = ledger_with(&["260006"], 260009);
        assert_eq!(ledger.next_transaction_number().unwrap(), "260010");
    }

    #[test]
    fn probing_stops_after_two_hundred_candidates() {
        // ten-digit numbers are not counted as auto numbers, so only the probe skips them
        let last = 1_000_000_000;
        let taken: Vec<String> = (last + 1..=last + 201).map(|n| n.to_string()).collect();
        let refs: Vec<&str> = taken.iter().map(String::as_str).collect();

        let ledger = ledger_with(&refs[..199], last);
        assert_eq!(ledger.next_transaction_number().unwrap(), "1000000200");

        let ledger = ledger_with(&refs, last);
        assert_eq!(ledger.next_transaction_number().unwrap(), "1000000201");
        assert!(ledger.state().unwrap().transaction_numbers.contains("1000000201"));
    }

    #[test]
    fn auto_number_skips_manual_and_long_numbers() {
        let mut state = LedgerState::default();
        state.transaction_prefix = "TX".into();
        assert_eq!(state.auto_number("TX260006"), Some(260006));
        assert_eq!(state.auto_number("2026/0042"), None);
        assert_eq!(state.auto_number("26-27"), None);
        assert_eq!(state.auto_number("1234567890"), None);
        assert_eq!(state.auto_number("ABC"), None);
    }

    #[test]
    fn next_number_skips_taken_numbers() {
        let ledger = ledger_with(&["260006", "260008", "260009"], 260007);
        assert_eq!(ledger.next_transaction_number().unwrap(), "260010");
    }

    #[test]
    fn manual_numbers_are_ignored_for_max() {
        let ledger = ledger_with(&["26/27", "INV-999999", "1234567890", "100"], 0);
        assert_eq!(ledger.state().unwrap().max_numeric_transaction(), 100);
    }

    #[test]
    fn prefix_is_stripped_and_applied() {
        let ledger = ledger_with(&["T0041", "T0042"], 0);
        ledger.set_prefix("T").unwrap();
        assert_eq!(ledger.next_transaction_number().unwrap(), "T43");
    }

    #[test]
    fn sync_after_removal_reuses_freed_numbers() {
        let ledger = ledger_with(&["260001", "260003", "260006"], 260009);
        assert_eq!(ledger.sync_last_number().unwrap(), 260006);
        assert_eq!(ledger.next_transaction_number().unwrap(), "260007");

        ledger.register_transaction("260007").unwrap();
        assert!(ledger.remove_transaction("260007").unwrap());
        assert_eq!(ledger.state().unwrap().last_number, 260006);
    }

    #[test]
    fn manual_number_raises_last_number() {
        let ledger = ledger_with(&[], 100);
        assert!(ledger.validate_and_update_last_number("T-250").unwrap());
        assert!(!ledger.validate_and_update_last_number("90").unwrap());
        assert!(!ledger.validate_and_update_last_number("ABC").unwrap());
        assert_eq!(ledger.state().unwrap().last_number, 250);
    }

    #[test]
    fn register_rejects_blank_numbers() {
        let ledger = Ledger::in_memory();
        assert!(ledger.register_transaction("260001").unwrap());
        assert!(!ledger.register_transaction(" 260001 ").unwrap());
        assert!(matches!(
            ledger.register_transaction("  "),
            Err(PipelineError::Numbering(_))
        ));
    }

    #[test]
    fn type_codes_strip_language_suffix() {
        assert_eq!(document_type_code("invoice.commercial").unwrap(), "INV_EXT");
        assert_eq!(document_type_code("invoice.normal.ar").unwrap(), "INV_NORMAL");
        assert_eq!(document_type_code("form.a").unwrap(), "form_a");

        let err = document_type_code("invoice.unknown").unwrap_err();
        match err {
            PipelineError::UnknownDocumentType { known, .. } => assert!(known.contains("cmr")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn group_doc_no_is_reused() {
        let ledger = Ledger::in_memory();
        let date = day(2026, 3, 14);
        let a = ledger.allocate_group_doc_no("26/27", "PKL", date).unwrap();
        let b = ledger.allocate_group_doc_no("26/27", "PKL", date).unwrap();
        ledger.allocate_group_doc_no("260006", "INV-COM", date).unwrap();

        assert_eq!(a, "PKL-26-27");
        assert_eq!(a, b);
        let state = ledger.state().unwrap();
        assert_eq!(state.groups.len(), 2);
        assert_eq!(state.groups[1].seq, 2);
    }

    #[test]
    fn persist_upserts_by_type_and_language() {
        let ledger = Ledger::in_memory();
        let doc = NewDocument {
            transaction_no: "260006".into(),
            doc_code: "invoice.commercial".into(),
            lang: "ar".into(),
            file_path: "out/INV-COM-260006-AR.pdf".into(),
            totals: json!({"total_value": "100.000"}),
            data: json!({}),
            document_no: None,
            date: day(2026, 3, 14),
        };

        let first = ledger.persist_document(doc.clone()).unwrap();
        assert_eq!(first.document_no, "INV-COM-260006");
        assert_eq!(first.document_type_code, "INV_EXT");
        assert_eq!(first.seq, 1);

        let second = ledger
            .persist_document(NewDocument {
                file_path: "out/INV-COM-260006-AR-v2.pdf".into(),
                ..doc.clone()
            })
            .unwrap();
        assert_eq!(second.group_id, first.group_id);

        ledger
            .persist_document(NewDocument {
                lang: "en".into(),
                ..doc
            })
            .unwrap();

        let records = ledger.documents_for("INV-COM-260006").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file_path, "out/INV-COM-260006-AR-v2.pdf");
        assert_eq!(records[0].status, "ready");
    }

    #[test]
    fn explicit_document_no_wins() {
        let ledger = Ledger::in_memory();
        let saved = ledger
            .persist_document(NewDocument {
                transaction_no: "260006".into(),
                doc_code: "cmr".into(),
                lang: "en".into(),
                file_path: "cmr.pdf".into(),
                totals: Value::Null,
                data: Value::Null,
                document_no: Some(" CMR-202603-0001 ".into()),
                date: day(2026, 3, 14),
            })
            .unwrap();
        assert_eq!(saved.document_no, "CMR-202603-0001");
    }
}
