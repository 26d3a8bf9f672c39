use super::{Context, ContextBuilder, Totals, date_value, number, opt_text, party, text};
use crate::error::PipelineError;
use crate::language::Language;
use crate::model::Transaction;
use crate::tafqit::number_to_words;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Value, json};

const SIMPLE: &str = "packing_list.export.simple";
const WITH_DATES: &str = "packing_list.export.with_dates";
const WITH_LINE_ID: &str = "packing_list.export.with_line_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackingListBuilder;

fn weight_word(lang: Language) -> &'static str {
    match lang {
        Language::Ar => "كيلوغرام",
        Language::En => "kilograms",
        Language::Tr => "kilogram",
    }
}

fn and_word(lang: Language) -> &'static str {
    match lang {
        Language::Ar => "و",
        Language::En => "and",
        Language::Tr => "ve",
    }
}

/// Spells a quantity rounded to a whole number, followed by `unit`.
pub fn spell_quantity(value: Decimal, lang: Language, unit: &str) -> String {
    let whole = value
        .abs()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(0);
    let words = number_to_words(whole, lang);
    if unit.is_empty() {
        words
    } else {
        format!("{} {}", words, unit)
    }
}

impl ContextBuilder for PackingListBuilder {
    fn name(&self) -> &'static str {
        "packing_list"
    }

    fn build(&self, tx: &Transaction, doc_code: &str, lang: Language) -> Result<Context, PipelineError> {
        let code = doc_code.trim();
        if ![SIMPLE, WITH_DATES, WITH_LINE_ID].contains(&code) {
            return Err(PipelineError::BuilderNotFound(format!(
                "unsupported packing list '{}'",
                doc_code
            )));
        }
        let with_dates = code == WITH_DATES;
        let with_line_id = code == WITH_LINE_ID;
        let ship = &tx.shipment;

        let mut totals = Totals::default();
        let mut packs: Vec<String> = Vec::new();
        let rows: Vec<Value> = tx
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                totals.add(item.quantity, item.net_kg, item.gross_kg, Decimal::ZERO);
                let pack = item.packaging.get(lang).to_string();
                if !pack.is_empty() && !packs.contains(&pack) {
                    packs.push(pack.clone());
                }
                let line_id = item.line_id.unwrap_or(idx as u64 + 1);
                json!({
                    "line_no": idx + 1,
                    "line_id": line_id,
                    "container_no": opt_text(&ship.transport_ref),
                    "description": text(&item.description, lang),
                    "hs_code": opt_text(&item.hs_code),
                    "quantity": number(item.quantity),
                    "unit": opt_text(&item.unit),
                    "gross_kg": number(item.gross_kg),
                    "net_kg": number(item.net_kg),
                    "packaging_type": pack,
                    "batch_no": opt_text(&item.batch_no),
                    "mfg_date": date_value(item.mfg_date),
                    "exp_date": date_value(item.exp_date),
                })
            })
            .collect();

        let qty_unit = packs.join(&format!(" {} ", and_word(lang)));

        let mut ctx = Context::new();
        ctx.insert(
            "doc".into(),
            json!({
                "code": code,
                "lang": lang.code(),
                "with_dates": with_dates,
                "with_line_id": with_line_id,
            }),
        );
        ctx.insert(
            "transaction".into(),
            json!({
                "no": tx.transaction_no,
                "issue_date": date_value(Some(tx.date)),
            }),
        );
        ctx.insert("exporter".into(), party(Some(&tx.exporter), lang));
        ctx.insert("importer".into(), party(tx.importer.as_ref(), lang));
        ctx.insert("consignee".into(), party(tx.consignee(), lang));
        ctx.insert("delivery_method".into(), text(&ship.delivery_method, lang));
        ctx.insert("country_of_origin".into(), text(&ship.origin_country, lang));
        ctx.insert("destination_country".into(), text(&ship.destination_country, lang));
        ctx.insert("port_of_loading".into(), text(&ship.loading_place, lang));
        ctx.insert("port_of_discharge".into(), text(&ship.delivery_place, lang));
        ctx.insert(
            "transport".into(),
            json!({
                "type": opt_text(&ship.transport_type),
                "ref": opt_text(&ship.transport_ref),
            }),
        );
        ctx.insert("notes".into(), opt_text(&tx.notes));
        ctx.insert("rows".into(), Value::Array(rows));
        ctx.insert(
            "totals".into(),
            json!({
                "quantity": number(totals.qty),
                "gross_kg": number(totals.gross),
                "net_kg": number(totals.net),
            }),
        );
        ctx.insert("tafqit_qty".into(), json!(spell_quantity(totals.qty, lang, &qty_unit)));
        ctx.insert(
            "tafqit_gross".into(),
            json!(spell_quantity(totals.gross, lang, weight_word(lang))),
        );
        ctx.insert(
            "tafqit_net".into(),
            json!(spell_quantity(totals.net, lang, weight_word(lang))),
        );

        if with_dates
            && let Some(notes) = tx.notes.as_deref().map(str::trim)
            && !notes.is_empty()
        {
            ctx.insert("brands_note".into(), json!(notes));
        }

        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::fixtures::transaction;

    fn build(code: &str) -> Result<Context, PipelineError> {
        PackingListBuilder.build(&transaction(), code, Language::En)
    }

    #[test]
    fn simple_list_has_rows_and_totals() {
        let ctx = build(SIMPLE).unwrap();
        let rows = ctx["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["line_no"], 1);
        assert_eq!(rows[0]["container_no"], "TRK-77");
        assert_eq!(ctx["totals"]["gross_kg"], "25625.5");
        assert_eq!(ctx["doc"]["with_dates"], false);
        assert!(rows[0].get("unit_price").is_none());
        assert!(!ctx.contains_key("brands_note"));
    }

    #[test]
    fn with_dates_adds_brands_note() {
        let ctx = build(WITH_DATES).unwrap();
        assert_eq!(ctx["doc"]["with_dates"], true);
        assert_eq!(ctx["rows"][0]["mfg_date"], "2026-01-01");
        assert_eq!(ctx["rows"][1]["exp_date"], "");
        assert_eq!(ctx["brands_note"], "Handle with care");
    }

    #[test]
    fn line_ids_default_to_position() {
        let ctx = build(WITH_LINE_ID).unwrap();
        assert_eq!(ctx["doc"]["with_line_id"], true);
        assert_eq!(ctx["rows"][0]["line_id"], 1);
        assert_eq!(ctx["rows"][1]["line_id"], 77);
    }

    #[test]
    fn quantities_in_words() {
        let ctx = build(SIMPLE).unwrap();
        // 25.5 rounds to 26
        assert_eq!(ctx["tafqit_qty"], "twenty six Bag");
        assert_eq!(ctx["tafqit_net"], "twenty five thousand five hundred kilograms");
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(matches!(
            build("packing_list.import"),
            Err(PipelineError::BuilderNotFound(_))
        ));
    }
}
