use super::DOC_PREFIXES;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

/// A code handed out by [`SequenceCounter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCode {
    /// `{PREFIX}-{YYYYMM}-{seq:04}`
    pub code: String,
    pub year: i32,
    pub month: u32,
    pub seq: u32,
}

/// Monotonic counters, one per `(family, year, month)` group.
///
/// Every month starts again at 1 for each document family.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    counters: HashMap<(String, i32, u32), u32>,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a group so the next code continues after `last_seq`.
    pub fn seed(&mut self, family: &str, year: i32, month: u32, last_seq: u32) {
        let entry = self
            .counters
            .entry((family.to_string(), year, month))
            .or_insert(0);
        *entry = (*entry).max(last_seq);
    }

    /// Hands out the next code for `family` in the month of `date`.
    pub fn next_code(&mut self, family: &str, date: NaiveDate) -> SequenceCode {
        let (year, month) = (date.year(), date.month());
        let seq = self
            .counters
            .entry((family.to_string(), year, month))
            .or_insert(0);
        *seq += 1;

        let prefix = DOC_PREFIXES
            .iter()
            .find(|(code, _)| *code == family)
            .map(|(_, p)| p.to_string())
            .unwrap_or_else(|| family.to_uppercase());

        SequenceCode {
            code: format!("{}-{}{:02}-{:04}", prefix, year, month, *seq),
            year,
            month,
            seq: *seq,
        }
    }

    /// Last sequence handed out for a group, 0 if none.
    pub fn current(&self, family: &str, year: i32, month: u32) -> u32 {
        self.counters
            .get(&(family.to_string(), year, month))
            .copied()
            .unwrap_or(0)
    }
}
