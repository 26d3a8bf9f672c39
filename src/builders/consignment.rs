//! CMR consignment notes and Form A certificates of origin.
//!
//! Both carry a `_warnings` list naming fields that are missing from the
//! transaction. Templates do not print it.

use super::{Context, ContextBuilder, Totals, date_value, money, number, opt_text, party, round_money, text};
use crate::error::PipelineError;
use crate::language::Language;
use crate::model::Transaction;
use rust_decimal::Decimal;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmrBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormABuilder;

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

fn cmr_warnings(carrier: &Value, truck_plate: &str, loading: &str, delivery: &str, items: &[Value]) -> Vec<&'static str> {
    let mut w = Vec::new();
    if carrier["name"].as_str().is_none_or(|n| n.trim().is_empty()) {
        w.push("carrier_missing");
    }
    if truck_plate.is_empty() {
        w.push("truck_plate_missing");
    }
    if loading.is_empty() {
        w.push("loading_place_missing");
    }
    if delivery.is_empty() {
        w.push("delivery_place_missing");
    }
    if items.is_empty() {
        w.push("no_items");
    }
    w
}

impl ContextBuilder for CmrBuilder {
    fn name(&self) -> &'static str {
        "cmr"
    }

    fn build(&self, tx: &Transaction, _doc_code: &str, lang: Language) -> Result<Context, PipelineError> {
        let ship = &tx.shipment;
        let origin = ship.origin_country.get(lang);
        let destination = ship.destination_country.get(lang);
        // places default to the countries
        let loading = non_empty(ship.loading_place.get(lang)).unwrap_or(origin).to_string();
        let delivery = non_empty(ship.delivery_place.get(lang)).unwrap_or(destination).to_string();
        let truck_plate = ship.truck_plate.as_deref().unwrap_or_default().trim().to_string();
        let carrier = party(tx.carrier.as_ref(), lang);

        let mut totals = Totals::default();
        let items: Vec<Value> = tx
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                totals.add(item.quantity, item.net_kg, item.gross_kg, Decimal::ZERO);
                json!({
                    "n": idx + 1,
                    "code": opt_text(&item.code),
                    "hs_code": opt_text(&item.hs_code),
                    "description": text(&item.description, lang),
                    "packaging": text(&item.packaging, lang),
                    "qty": number(item.quantity),
                    "gross": number(item.gross_kg),
                    "net": number(item.net_kg),
                    "notes": opt_text(&item.notes),
                })
            })
            .collect();

        let attached = ship
            .attached_documents
            .as_deref()
            .and_then(non_empty)
            .or_else(|| tx.notes.as_deref().and_then(non_empty))
            .unwrap_or_default();

        let warnings = cmr_warnings(&carrier, &truck_plate, &loading, &delivery, &items);

        let mut ctx = Context::new();
        ctx.insert("cmr_no".into(), json!(tx.transaction_no));
        ctx.insert("date".into(), date_value(Some(tx.effective_date())));
        ctx.insert("trx_date".into(), date_value(Some(tx.date)));
        ctx.insert("shipment_date".into(), date_value(ship.shipment_date));
        ctx.insert("sender".into(), party(Some(&tx.exporter), lang));
        ctx.insert("consignee".into(), party(tx.consignee(), lang));
        ctx.insert("delivery_place".into(), json!(delivery));
        ctx.insert("dest_country".into(), json!(destination));
        ctx.insert("loading_place".into(), json!(loading));
        ctx.insert("origin_country".into(), json!(origin));
        ctx.insert("attached_documents".into(), json!(attached));
        ctx.insert("transport_ref".into(), opt_text(&ship.transport_ref));
        ctx.insert("carrier".into(), carrier);
        ctx.insert("truck_plate".into(), json!(truck_plate));
        ctx.insert("driver_name".into(), opt_text(&ship.driver_name));
        ctx.insert("items".into(), Value::Array(items));
        ctx.insert(
            "totals".into(),
            json!({
                "qty": number(totals.qty),
                "gross": number(totals.gross),
                "net": number(totals.net),
            }),
        );
        ctx.insert("_warnings".into(), json!(warnings));
        Ok(ctx)
    }
}

impl ContextBuilder for FormABuilder {
    fn name(&self) -> &'static str {
        "form_a"
    }

    fn build(&self, tx: &Transaction, _doc_code: &str, lang: Language) -> Result<Context, PipelineError> {
        let ship = &tx.shipment;
        let origin = ship.origin_country.get(lang).trim().to_string();
        let destination = ship.destination_country.get(lang);
        let certificate_no = tx.certificate_no.as_deref().unwrap_or_default().trim();
        let authority = tx.issuing_authority.as_deref().unwrap_or_default().trim();
        let transport_ref = ship.transport_ref.as_deref().unwrap_or_default().trim();

        let mut totals = Totals::default();
        let items: Vec<Value> = tx
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let price = item.unit_price.unwrap_or(Decimal::ZERO);
                let amount = round_money(item.quantity * price);
                totals.add(item.quantity, item.net_kg, item.gross_kg, amount);
                let item_origin = non_empty(item.origin.get(lang)).unwrap_or(origin.as_str());
                json!({
                    "n": idx + 1,
                    "hs_code": opt_text(&item.hs_code),
                    "description": text(&item.description, lang),
                    "packaging": text(&item.packaging, lang),
                    "qty": number(item.quantity),
                    "gross": number(item.gross_kg),
                    "net": number(item.net_kg),
                    "unit_price": money(price),
                    "amount": money(amount),
                    "origin": item_origin,
                })
            })
            .collect();

        let loading = ship.loading_place.get(lang);
        let delivery = ship.delivery_place.get(lang);
        let transport_info = match (non_empty(loading), non_empty(delivery), ship.transport_type.as_deref().and_then(non_empty)) {
            (Some(l), Some(d), _) => format!("{} → {}", l, d),
            (_, _, Some(kind)) => format!("{} - {}", kind, transport_ref),
            _ => transport_ref.to_string(),
        };

        let mut warnings = Vec::new();
        if certificate_no.is_empty() {
            warnings.push("certificate_no_missing");
        }
        if authority.is_empty() {
            warnings.push("issuing_authority_missing");
        }
        if origin.is_empty() {
            warnings.push("origin_country_missing");
        }
        if items.is_empty() {
            warnings.push("no_items");
        }

        let mut ctx = Context::new();
        ctx.insert(
            "certificate_no".into(),
            json!(non_empty(certificate_no).unwrap_or(tx.transaction_no.as_str())),
        );
        ctx.insert("reference_no".into(), json!(tx.transaction_no));
        ctx.insert("date".into(), date_value(Some(tx.effective_date())));
        ctx.insert("trx_date".into(), date_value(Some(tx.date)));
        ctx.insert("exporter".into(), party(Some(&tx.exporter), lang));
        ctx.insert("consignee".into(), party(tx.consignee(), lang));
        ctx.insert("origin_country".into(), json!(origin));
        ctx.insert("dest_country".into(), json!(destination));
        ctx.insert("transport_info".into(), json!(transport_info));
        ctx.insert("delivery_method".into(), text(&ship.delivery_method, lang));
        ctx.insert("transport_ref".into(), json!(transport_ref));
        ctx.insert("items".into(), Value::Array(items));
        ctx.insert(
            "totals".into(),
            json!({
                "qty": number(totals.qty),
                "gross": number(totals.gross),
                "net": number(totals.net),
                "value": money(totals.value),
            }),
        );
        ctx.insert("currency_code".into(), json!(ship.currency.code.trim().to_uppercase()));
        ctx.insert("invoice_no".into(), json!(tx.transaction_no));
        ctx.insert("issuing_authority".into(), json!(authority));
        ctx.insert("_warnings".into(), json!(warnings));
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::fixtures::transaction;
    use crate::language::LocalizedText;

    #[test]
    fn complete_cmr_has_no_warnings() {
        let ctx = CmrBuilder.build(&transaction(), "cmr", Language::En).unwrap();
        assert_eq!(ctx["_warnings"], json!([]));
        assert_eq!(ctx["sender"]["name"], "Anatolia Grain Ltd");
        assert_eq!(ctx["carrier"]["name"], "Silk Road Haulage");
        assert_eq!(ctx["loading_place"], "Mersin");
        assert_eq!(ctx["attached_documents"], "Handle with care");
        assert_eq!(ctx["totals"]["net"], "25500");
        assert_eq!(ctx["items"][0]["code"], "WHT-01");
    }

    #[test]
    fn cmr_places_fall_back_to_countries() {
        let mut tx = transaction();
        tx.shipment.loading_place = LocalizedText::default();
        tx.shipment.delivery_place = LocalizedText::default();
        let ctx = CmrBuilder.build(&tx, "cmr", Language::En).unwrap();
        assert_eq!(ctx["loading_place"], "Turkey");
        assert_eq!(ctx["delivery_place"], "Syria");
    }

    #[test]
    fn cmr_warns_about_missing_fields() {
        let mut tx = transaction();
        tx.carrier = None;
        tx.shipment.truck_plate = None;
        tx.shipment.loading_place = LocalizedText::default();
        tx.shipment.origin_country = LocalizedText::default();
        tx.items.clear();

        let ctx = CmrBuilder.build(&tx, "cmr", Language::En).unwrap();
        assert_eq!(
            ctx["_warnings"],
            json!(["carrier_missing", "truck_plate_missing", "loading_place_missing", "no_items"])
        );
    }

    #[test]
    fn form_a_defaults_certificate_to_transaction() {
        let ctx = FormABuilder.build(&transaction(), "form_a", Language::En).unwrap();
        assert_eq!(ctx["certificate_no"], "260006");
        assert_eq!(ctx["transport_info"], "Mersin → Damascus");
        assert_eq!(ctx["items"][1]["origin"], "Turkey");
        assert_eq!(ctx["totals"]["value"], "7309.995");
        assert_eq!(
            ctx["_warnings"],
            json!(["certificate_no_missing", "issuing_authority_missing"])
        );
    }

    #[test]
    fn form_a_transport_info_without_places() {
        let mut tx = transaction();
        tx.certificate_no = Some("GSP-42".into());
        tx.issuing_authority = Some("Mersin Chamber of Commerce".into());
        tx.shipment.delivery_place = LocalizedText::default();

        let ctx = FormABuilder.build(&tx, "form.a", Language::En).unwrap();
        assert_eq!(ctx["certificate_no"], "GSP-42");
        assert_eq!(ctx["transport_info"], "truck - TRK-77");
        assert_eq!(ctx["_warnings"], json!([]));
    }
}
