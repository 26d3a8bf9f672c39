//! Context builders: turn a [`Transaction`] into the JSON context a
//! document template renders.
//!
//! - [`InvoiceBuilder`]: commercial, normal, proforma, foreign and Syrian invoices
//! - [`PackingListBuilder`]: export packing lists (simple, with dates, with line ids)
//! - [`CmrBuilder`]: CMR consignment notes
//! - [`FormABuilder`]: GSP Form A certificates of origin
//!
//! [`BuilderRouter`] picks the builder for a doc_code by longest prefix.

pub mod consignment;
pub mod invoice;
pub mod packing_list;

pub use consignment::{CmrBuilder, FormABuilder};
pub use invoice::{InvoiceBuilder, InvoiceVariant};
pub use packing_list::PackingListBuilder;

use crate::error::PipelineError;
use crate::language::{Language, LocalizedText};
use crate::model::{Party, Transaction};
use chrono::NaiveDate;
use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Map, Value};

/// A JSON object handed to the template engine.
pub type Context = Map<String, Value>;

/// A trait for components that build a template context from a transaction.
pub trait ContextBuilder {
    fn name(&self) -> &'static str;

    fn build(&self, tx: &Transaction, doc_code: &str, lang: Language) -> Result<Context, PipelineError>;
}

/// An enum for static dispatch of `ContextBuilder` implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builder {
    Invoice(InvoiceBuilder),
    PackingList(PackingListBuilder),
    Cmr(CmrBuilder),
    FormA(FormABuilder),
}

impl ContextBuilder for Builder {
    fn name(&self) -> &'static str {
        match self {
            Builder::Invoice(b) => b.name(),
            Builder::PackingList(b) => b.name(),
            Builder::Cmr(b) => b.name(),
            Builder::FormA(b) => b.name(),
        }
    }

    fn build(&self, tx: &Transaction, doc_code: &str, lang: Language) -> Result<Context, PipelineError> {
        match self {
            Builder::Invoice(b) => b.build(tx, doc_code, lang),
            Builder::PackingList(b) => b.build(tx, doc_code, lang),
            Builder::Cmr(b) => b.build(tx, doc_code, lang),
            Builder::FormA(b) => b.build(tx, doc_code, lang),
        }
    }
}

/// Routes doc_codes to builders; the longest matching prefix wins.
#[derive(Debug, Clone)]
pub struct BuilderRouter {
    rules: Vec<(String, Builder)>,
}

impl Default for BuilderRouter {
    fn default() -> Self {
        use InvoiceVariant::*;
        let invoice = |v| Builder::Invoice(InvoiceBuilder::new(v));

        let mut router = Self { rules: Vec::new() };
        router
            .add_rule("invoice.syrian.entry", invoice(SyrianEntry))
            .add_rule("invoice.syrian.intermediary", invoice(SyrianTransit))
            .add_rule("invoice.syrian.transit", invoice(SyrianTransit))
            .add_rule("invoice.foreign.", invoice(Foreign))
            .add_rule("invoice.syrian.", invoice(Standard))
            .add_rule("invoice.normal", invoice(Standard))
            .add_rule("invoice.commercial", invoice(Standard))
            .add_rule("invoice.proforma", invoice(Proforma))
            .add_rule("packing_list.", Builder::PackingList(PackingListBuilder))
            .add_rule("cmr", Builder::Cmr(CmrBuilder))
            .add_rule("form_a", Builder::FormA(FormABuilder))
            .add_rule("form.a", Builder::FormA(FormABuilder));
        router
    }
}

impl BuilderRouter {
    /// A router with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds or replaces the builder for `prefix`.
    pub fn add_rule(&mut self, prefix: &str, builder: Builder) -> &mut Self {
        self.rules.retain(|(p, _)| p != prefix);
        self.rules.push((prefix.to_string(), builder));
        self
    }

    /// Returns the matched prefix and its builder.
    pub fn resolve(&self, doc_code: &str) -> Result<(&str, Builder), PipelineError> {
        self.rules
            .iter()
            .filter(|(prefix, _)| !doc_code.is_empty() && doc_code.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, builder)| (prefix.as_str(), *builder))
            .ok_or_else(|| PipelineError::BuilderNotFound(doc_code.to_string()))
    }

    pub fn build(&self, tx: &Transaction, doc_code: &str, lang: Language) -> Result<Context, PipelineError> {
        let (prefix, builder) = self.resolve(doc_code)?;
        debug!("doc_code '{}' matched rule '{}' → {}", doc_code, prefix, builder.name());
        builder.build(tx, doc_code, lang)
    }
}

// Shared context helpers.

pub(crate) fn text(t: &LocalizedText, lang: Language) -> Value {
    Value::String(t.get(lang).to_string())
}

pub(crate) fn opt_text(s: &Option<String>) -> Value {
    Value::String(s.as_deref().unwrap_or_default().trim().to_string())
}

pub(crate) fn date_value(d: Option<NaiveDate>) -> Value {
    match d {
        Some(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        None => Value::String(String::new()),
    }
}

/// Quantities and weights, without trailing zeros.
pub(crate) fn number(d: Decimal) -> Value {
    Value::String(d.normalize().to_string())
}

/// Money with three decimal places.
pub(crate) fn money(d: Decimal) -> Value {
    Value::String(format!("{:.3}", round_money(d)))
}

pub(crate) fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}

/// Party block with localized name, address and country.
pub(crate) fn party(p: Option<&Party>, lang: Language) -> Value {
    let Some(p) = p else {
        return json!({ "name": "", "address": "", "addr": "" });
    };
    let address = p.address.get(lang);
    json!({
        "name": p.name.get(lang),
        "address": address,
        "addr": address,
        "city": opt_text(&p.city),
        "country": p.country.get(lang),
        "phone": opt_text(&p.phone),
        "email": opt_text(&p.email),
        "website": opt_text(&p.website),
        "tax_id": opt_text(&p.tax_id),
        "registration_number": opt_text(&p.registration_number),
        "bank_info": opt_text(&p.bank_info),
        "vat_no": opt_text(&p.tax_id),
        "cr_no": opt_text(&p.registration_number),
    })
}

/// Running totals over item lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Totals {
    pub qty: Decimal,
    pub net: Decimal,
    pub gross: Decimal,
    pub value: Decimal,
}

impl Totals {
    pub fn add(&mut self, qty: Decimal, net: Decimal, gross: Decimal, value: Decimal) {
        self.qty += qty;
        self.net += net;
        self.gross += gross;
        self.value += value;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_wins() {
        let router = BuilderRouter::default();
        let (prefix, builder) = router.resolve("invoice.syrian.entry.ar").unwrap();
        assert_eq!(prefix, "invoice.syrian.entry");
        assert_eq!(builder, Builder::Invoice(InvoiceBuilder::new(InvoiceVariant::SyrianEntry)));

        let (prefix, _) = router.resolve("invoice.syrian.other").unwrap();
        assert_eq!(prefix, "invoice.syrian.");

        let (_, builder) = router.resolve("packing_list.export.with_dates").unwrap();
        assert_eq!(builder.name(), "packing_list");
    }

    #[test]
    fn unmatched_code_is_builder_not_found() {
        let router = BuilderRouter::default();
        for code in ["", "waybill", "invoice", "invoice.syrian"] {
            assert!(
                matches!(router.resolve(code), Err(PipelineError::BuilderNotFound(_))),
                "code {:?}",
                code
            );
        }
    }

    #[test]
    fn add_rule_replaces_existing_prefix() {
        let mut router = BuilderRouter::empty();
        router.add_rule("cmr", Builder::FormA(FormABuilder));
        router.add_rule("cmr", Builder::Cmr(CmrBuilder));
        assert_eq!(router.resolve("cmr").unwrap().1, Builder::Cmr(CmrBuilder));
    }

    #[test]
    fn money_rounds_to_three_places() {
        assert_eq!(money(Decimal::new(12345, 4)), json!("1.235"));
        assert_eq!(money(Decimal::from(6210)), json!("6210.000"));
        assert_eq!(number(Decimal::new(55000, 4)), json!("5.5"));
    }

    #[test]
    fn missing_party_is_blank() {
        let p = party(None, Language::En);
        assert_eq!(p["name"], "");
        assert_eq!(p["addr"], "");
    }
}
