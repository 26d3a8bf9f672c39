//! Document languages and localized text.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A language a document can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    En,
    Tr,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Ar, Language::En, Language::Tr];

    /// Lowercase code, as used in template file names.
    pub fn code(self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::En => "en",
            Language::Tr => "tr",
        }
    }

    /// Uppercase code, as used in output file names.
    pub fn upper(self) -> &'static str {
        match self {
            Language::Ar => "AR",
            Language::En => "EN",
            Language::Tr => "TR",
        }
    }

    /// Template file name inside a doc_code folder.
    pub fn template_file(self) -> &'static str {
        match self {
            Language::Ar => "ar.html",
            Language::En => "en.html",
            Language::Tr => "tr.html",
        }
    }

    pub fn is_rtl(self) -> bool {
        self == Language::Ar
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ar" => Ok(Language::Ar),
            "en" => Ok(Language::En),
            "tr" => Ok(Language::Tr),
            _ => Err(PipelineError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Text available in several languages.
///
/// Lookups fall back en → ar → tr, then to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<Language, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same text for every language (codes, plate numbers, ...).
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self(Language::ALL.iter().map(|l| (*l, text.clone())).collect())
    }

    pub fn with(mut self, lang: Language, text: impl Into<String>) -> Self {
        self.0.insert(lang, text.into());
        self
    }

    pub fn get(&self, lang: Language) -> &str {
        [lang, Language::En, Language::Ar, Language::Tr]
            .iter()
            .filter_map(|l| self.0.get(l))
            .find(|s| !s.trim().is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|s| s.trim().is_empty())
    }
}
