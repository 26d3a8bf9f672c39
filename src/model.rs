//! Transaction data fed into the context builders.
//!
//! The transaction arrives fully resolved (party names, country names,
//! currency code) and is usually deserialized from JSON.

use crate::language::LocalizedText;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub address: LocalizedText,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: LocalizedText,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub bank_info: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    #[serde(default)]
    pub name: LocalizedText,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingType {
    pub code: String,
    #[serde(default)]
    pub name: LocalizedText,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Shipment {
    #[serde(default)]
    pub delivery_method: LocalizedText,
    #[serde(default)]
    pub transport_type: Option<String>,
    #[serde(default)]
    pub transport_ref: Option<String>,
    #[serde(default)]
    pub origin_country: LocalizedText,
    #[serde(default)]
    pub destination_country: LocalizedText,
    #[serde(default)]
    pub loading_place: LocalizedText,
    #[serde(default)]
    pub delivery_place: LocalizedText,
    #[serde(default)]
    pub shipment_date: Option<NaiveDate>,
    #[serde(default)]
    pub truck_plate: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub attached_documents: Option<String>,
    pub currency: Currency,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    /// Stable line identifier; defaults to the 1-based position.
    #[serde(default)]
    pub line_id: Option<u64>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub hs_code: Option<String>,
    pub description: LocalizedText,
    #[serde(default)]
    pub packaging: LocalizedText,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub net_kg: Decimal,
    #[serde(default)]
    pub gross_kg: Decimal,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub pricing_type: Option<PricingType>,
    #[serde(default)]
    pub batch_no: Option<String>,
    #[serde(default)]
    pub mfg_date: Option<NaiveDate>,
    #[serde(default)]
    pub exp_date: Option<NaiveDate>,
    #[serde(default)]
    pub origin: LocalizedText,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_no: String,
    pub date: NaiveDate,
    pub exporter: Party,
    #[serde(default)]
    pub importer: Option<Party>,
    #[serde(default)]
    pub client: Option<Party>,
    #[serde(default)]
    pub carrier: Option<Party>,
    pub shipment: Shipment,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub certificate_no: Option<String>,
    #[serde(default)]
    pub issuing_authority: Option<String>,
}

impl Transaction {
    /// The party goods are shipped to: the client, else the importer.
    pub fn consignee(&self) -> Option<&Party> {
        self.client.as_ref().or(self.importer.as_ref())
    }

    /// Shipment date when set, otherwise the transaction date.
    pub fn effective_date(&self) -> NaiveDate {
        self.shipment.shipment_date.unwrap_or(self.date)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
