//! Output locations for generated documents.
//!
//! The current layout keeps one folder per month:
//!
//! ```text
//! {root}/{YYYY}/{MM}/INV-COM-260006-AR.html
//! {root}/{YYYY}/{MM}/INV-COM-260006-AR.pdf
//! {root}/{YYYY}/{MM}/INV-COM-260006-AR-v2.pdf   <- regenerated
//! ```
//!
//! [`StorageLayout`] also provides the older per-transaction tree.

use crate::language::Language;
use chrono::{Datelike, NaiveDate};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Highest `-vN` suffix tried before giving up.
const MAX_VERSION: u32 = 199;

static UNSAFE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/\\\s]+").expect("static regex"));
static DOC_NO_PERIOD: Lazy<Regex> = Lazy::new(|| Regex::new(r"-([0-9]{6})-").expect("static regex"));

/// Makes a transaction number safe for a file or folder name.
pub fn sanitize_transaction_no(transaction_no: &str) -> String {
    let safe = UNSAFE_RUN.replace_all(transaction_no.trim(), "-");
    if safe.is_empty() {
        "UNKNOWN".to_string()
    } else {
        safe.into_owned()
    }
}

/// HTML and PDF paths for one rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub html: PathBuf,
    pub pdf: PathBuf,
}

/// Builds the output paths under `{root}/{YYYY}/{MM}/`, creating the folder.
///
/// If either file of the pair already exists, the first free `-vN` suffix
/// (N = 2..=199) is used. When every suffix is taken the base name is
/// returned and will be overwritten.
pub fn output_paths(
    root: &Path,
    prefix: &str,
    transaction_no: &str,
    lang: Language,
    date: NaiveDate,
) -> io::Result<OutputPaths> {
    let folder = root
        .join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()));
    fs::create_dir_all(&folder)?;

    let base_stem = format!(
        "{}-{}-{}",
        prefix,
        sanitize_transaction_no(transaction_no),
        lang.upper()
    );
    let pair = |stem: &str| OutputPaths {
        html: folder.join(format!("{}.html", stem)),
        pdf: folder.join(format!("{}.pdf", stem)),
    };
    let is_free = |p: &OutputPaths| !p.html.exists() && !p.pdf.exists();

    let base = pair(&base_stem);
    if is_free(&base) {
        return Ok(base);
    }

    for v in 2..=MAX_VERSION {
        let candidate = pair(&format!("{}-v{}", base_stem, v));
        if is_free(&candidate) {
            return Ok(candidate);
        }
    }

    warn!("All versions of {} are taken, overwriting the base name", base_stem);
    Ok(base)
}

/// Per-transaction storage tree:
/// `{root}/{YYYY}/{MM}/{transaction}/{doc_no}/{lang}/{doc_type}.{ext}`.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn build(
        &self,
        year: i32,
        month: u32,
        transaction_no: &str,
        doc_no: &str,
        language: &str,
        doc_type: &str,
        ext: &str,
    ) -> io::Result<PathBuf> {
        let out_dir = self
            .root
            .join(year.to_string())
            .join(format!("{:02}", month))
            .join(sanitize_transaction_no(transaction_no))
            .join(doc_no)
            .join(language.to_lowercase());
        fs::create_dir_all(&out_dir)?;
        Ok(out_dir.join(format!("{}.{}", doc_type.to_lowercase(), ext)))
    }

    /// Path dated by `date` (usually today).
    pub fn build_output_path(
        &self,
        transaction_no: &str,
        doc_no: &str,
        language: &str,
        doc_type: &str,
        ext: &str,
        date: NaiveDate,
    ) -> io::Result<PathBuf> {
        self.build(date.year(), date.month(), transaction_no, doc_no, language, doc_type, ext)
    }

    /// Path dated by the `YYYYMM` part of a `PREFIX-YYYYMM-####` doc_no,
    /// falling back to `fallback_date` when the doc_no has no such part.
    pub fn build_output_path_from_doc_no(
        &self,
        transaction_no: &str,
        doc_no: &str,
        language: &str,
        doc_type: &str,
        ext: &str,
        fallback_date: NaiveDate,
    ) -> io::Result<PathBuf> {
        let (year, month) = period_from_doc_no(doc_no)
            .unwrap_or((fallback_date.year(), fallback_date.month()));
        self.build(year, month, transaction_no, doc_no, language, doc_type, ext)
    }
}

/// Year and month encoded in a `PREFIX-YYYYMM-####` document number.
pub fn period_from_doc_no(doc_no: &str) -> Option<(i32, u32)> {
    let caps = DOC_NO_PERIOD.captures(doc_no)?;
    let yyyymm = caps.get(1)?.as_str();
    let year = yyyymm[..4].parse().ok()?;
    let month: u32 = yyyymm[4..].parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sanitizes_transaction_numbers() {
        for (input, expected) in [
            ("T0001", "T0001"),
            ("260006", "260006"),
            ("26/27", "26-27"),
            ("INV/2026", "INV-2026"),
            ("A\\B", "A-B"),
            ("A B", "A-B"),
            ("a//b", "a-b"),
        ] {
            assert_eq!(sanitize_transaction_no(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn empty_transaction_is_unknown() {
        assert_eq!(sanitize_transaction_no(""), "UNKNOWN");
        assert_eq!(sanitize_transaction_no("   "), "UNKNOWN");
    }

    #[test]
    fn output_paths_use_month_folder() {
        let dir = tempdir().unwrap();
        let paths = output_paths(dir.path(), "INV-COM", "260006", Language::Ar, day(2026, 3, 14)).unwrap();

        assert_eq!(paths.html, dir.path().join("2026/03/INV-COM-260006-AR.html"));
        assert_eq!(paths.pdf, dir.path().join("2026/03/INV-COM-260006-AR.pdf"));
        assert!(dir.path().join("2026/03").is_dir());
    }

    #[test]
    fn existing_output_gets_a_version_suffix() {
        let dir = tempdir().unwrap();
        let date = day(2026, 3, 14);
        let first = output_paths(dir.path(), "PKL", "26/27", Language::En, date).unwrap();
        fs::write(&first.pdf, b"%PDF").unwrap();

        let second = output_paths(dir.path(), "PKL", "26/27", Language::En, date).unwrap();
        assert!(second.html.ends_with("PKL-26-27-EN-v2.html"));

        fs::write(&second.html, b"<html>").unwrap();
        let third = output_paths(dir.path(), "PKL", "26/27", Language::En, date).unwrap();
        assert!(third.pdf.ends_with("PKL-26-27-EN-v3.pdf"));
    }

    #[test]
    fn last_version_is_v199_then_base_is_reused() {
        let dir = tempdir().unwrap();
        let date = day(2026, 3, 14);
        let base = output_paths(dir.path(), "CMR", "260006", Language::En, date).unwrap();
        fs::write(&base.html, b"<html>").unwrap();
        for v in 2..MAX_VERSION {
            let taken = dir.path().join(format!("2026/03/CMR-260006-EN-v{}.pdf", v));
            fs::write(taken, b"%PDF").unwrap();
        }

        let last = output_paths(dir.path(), "CMR", "260006", Language::En, date).unwrap();
        assert!(last.html.ends_with("CMR-260006-EN-v199.html"));
        fs::write(&last.html, b"<html>").unwrap();

        let overflow = output_paths(dir.path(), "CMR", "260006", Language::En, date).unwrap();
        assert_eq!(overflow, base);
    }

    #[test]
    fn layout_builds_transaction_tree() {
        let dir = tempdir().unwrap();
        let layout = StorageLayout::new(dir.path()).unwrap();
        let path = layout
            .build_output_path("26/27", "INV-202602-0002", "AR", "Document", "pdf", day(2026, 2, 3))
            .unwrap();

        assert_eq!(
            path,
            dir.path().join("2026/02/26-27/INV-202602-0002/ar/document.pdf")
        );
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn layout_reads_period_from_doc_no() {
        let dir = tempdir().unwrap();
        let layout = StorageLayout::new(dir.path()).unwrap();
        let path = layout
            .build_output_path_from_doc_no("T0001", "INV-202511-0007", "en", "invoice", "html", day(2026, 3, 1))
            .unwrap();
        assert!(path.starts_with(dir.path().join("2025/11")));
    }

    #[test]
    fn layout_falls_back_to_given_date() {
        let dir = tempdir().unwrap();
        let layout = StorageLayout::new(dir.path()).unwrap();
        let path = layout
            .build_output_path_from_doc_no("T0001", "INV-COM-T0001", "en", "invoice", "pdf", day(2026, 3, 1))
            .unwrap();
        assert!(path.starts_with(dir.path().join("2026/03")));
    }

    #[test]
    fn period_rejects_bad_month() {
        assert_eq!(period_from_doc_no("INV-202613-0001"), None);
        assert_eq!(period_from_doc_no("PKL-202604-0001"), Some((2026, 4)));
    }
}
