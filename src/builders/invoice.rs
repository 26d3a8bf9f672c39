use super::{Context, ContextBuilder, Totals, date_value, money, number, opt_text, party, round_money, text};
use crate::error::PipelineError;
use crate::language::Language;
use crate::model::Transaction;
use crate::registry::proforma_title;
use crate::tafqit::tafqit;
use serde_json::{Value, json};

/// Which invoice layout the context is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceVariant {
    /// Commercial, normal and generic Syrian invoices.
    Standard,
    Proforma,
    /// Foreign commercial invoices; adds `issue_date`, bank details and flat aliases.
    Foreign,
    /// Syrian transit and intermediary invoices.
    SyrianTransit,
    /// Syrian entry invoice; adds per-language amounts in words.
    SyrianEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceBuilder {
    variant: InvoiceVariant,
}

impl InvoiceBuilder {
    pub fn new(variant: InvoiceVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> InvoiceVariant {
        self.variant
    }
}

fn entry_title(lang: Language) -> &'static str {
    match lang {
        Language::Ar => "فاتورة",
        Language::En => "Invoice",
        Language::Tr => "Fatura",
    }
}

impl ContextBuilder for InvoiceBuilder {
    fn name(&self) -> &'static str {
        "invoice"
    }

    fn build(&self, tx: &Transaction, _doc_code: &str, lang: Language) -> Result<Context, PipelineError> {
        if tx.items.is_empty() {
            return Err(PipelineError::InvalidTransaction(format!(
                "transaction {} has no items",
                tx.transaction_no
            )));
        }

        let currency_code = tx.shipment.currency.code.trim().to_uppercase();
        let mut totals = Totals::default();
        let mut items = Vec::with_capacity(tx.items.len());
        let mut pricing_type = None;

        for (idx, item) in tx.items.iter().enumerate() {
            let no = item.line_id.unwrap_or(idx as u64 + 1);
            let price = item.unit_price.ok_or_else(|| {
                PipelineError::InvalidTransaction(format!("line {} has no unit price", no))
            })?;
            let amount = round_money(item.quantity * price);
            totals.add(item.quantity, item.net_kg, item.gross_kg, amount);
            if pricing_type.is_none() {
                pricing_type = item.pricing_type.as_ref();
            }

            items.push(json!({
                "no": no,
                "code": opt_text(&item.code),
                "hs_code": opt_text(&item.hs_code),
                "description": text(&item.description, lang),
                "packaging": text(&item.packaging, lang),
                "qty": number(item.quantity),
                "unit": opt_text(&item.unit),
                "net_kg": number(item.net_kg),
                "gross_kg": number(item.gross_kg),
                "unit_price": money(price),
                "amount": money(amount),
                "origin": text(&item.origin, lang),
            }));
        }

        let amount_in_words = tafqit(totals.value, &currency_code, lang);
        let ship = &tx.shipment;
        let origin = ship.origin_country.get(lang);
        let destination = ship.destination_country.get(lang);
        let delivery_method = ship.delivery_method.get(lang);

        let mut ctx = Context::new();
        ctx.insert("title".into(), Value::Null);
        ctx.insert("invoice_no".into(), json!(tx.transaction_no));
        ctx.insert("date".into(), date_value(Some(tx.date)));
        ctx.insert("exporter".into(), party(Some(&tx.exporter), lang));
        ctx.insert("consignee".into(), party(tx.consignee(), lang));
        ctx.insert("importer".into(), party(tx.importer.as_ref(), lang));
        ctx.insert("client".into(), party(tx.client.as_ref(), lang));
        ctx.insert(
            "shipment".into(),
            json!({
                "delivery_method": delivery_method,
                "transport_type": opt_text(&ship.transport_type),
                "transport_ref": opt_text(&ship.transport_ref),
                "origin_country": origin,
                "destination": destination,
                "destination_country": destination,
                "currency": currency_code,
            }),
        );
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
        ctx.insert("amount_in_words".into(), json!(amount_in_words));
        ctx.insert(
            "pricing_type".into(),
            json!({
                "code": pricing_type.map(|p| p.code.clone()).unwrap_or_default(),
                "name": pricing_type.map(|p| p.name.get(lang).to_string()).unwrap_or_default(),
            }),
        );
        ctx.insert(
            "currency".into(),
            json!({ "code": currency_code, "name": ship.currency.name.get(lang) }),
        );
        ctx.insert("notes".into(), opt_text(&tx.notes));

        match self.variant {
            InvoiceVariant::Standard => {}
            InvoiceVariant::Proforma => {
                ctx.insert("title".into(), json!(proforma_title(lang)));
            }
            InvoiceVariant::Foreign | InvoiceVariant::SyrianTransit => {
                ctx.insert("issue_date".into(), date_value(Some(tx.date)));
                insert_aliases(&mut ctx, tx, lang, &currency_code, &totals, &amount_in_words);
            }
            InvoiceVariant::SyrianEntry => {
                ctx.insert("title".into(), json!(entry_title(lang)));
                insert_aliases(&mut ctx, tx, lang, &currency_code, &totals, &amount_in_words);
                for l in Language::ALL {
                    ctx.insert(
                        format!("tafqit_total_value_{}", l.code()),
                        json!(tafqit(totals.value, &currency_code, l)),
                    );
                }
            }
        }

        Ok(ctx)
    }
}

/// Flat aliases the foreign and Syrian layouts read.
fn insert_aliases(
    ctx: &mut Context,
    tx: &Transaction,
    lang: Language,
    currency_code: &str,
    totals: &Totals,
    amount_in_words: &str,
) {
    let ship = &tx.shipment;
    let origin = ship.origin_country.get(lang);
    ctx.insert("delivery_method".into(), text(&ship.delivery_method, lang));
    ctx.insert("origin_country".into(), json!(origin));
    ctx.insert("country_of_origin".into(), json!(origin));
    ctx.insert("destination_country".into(), text(&ship.destination_country, lang));
    ctx.insert("cur".into(), json!(currency_code));
    ctx.insert("totals_in_words".into(), json!(amount_in_words));
    ctx.insert(
        "transport".into(),
        json!({
            "type": opt_text(&ship.transport_type),
            "ref": opt_text(&ship.transport_ref),
            "delivery_method": ship.delivery_method.get(lang),
        }),
    );
    ctx.insert("bank_info".into(), opt_text(&tx.exporter.bank_info));

    if let Some(Value::Object(t)) = ctx.get_mut("totals") {
        let value = money(totals.value);
        t.insert("total".into(), value.clone());
        t.insert("subtotal".into(), value.clone());
        t.insert("total_value".into(), value);
        t.insert("total_qty".into(), number(totals.qty));
        t.insert("total_gross".into(), number(totals.gross));
        t.insert("total_net".into(), number(totals.net));
    }
}
