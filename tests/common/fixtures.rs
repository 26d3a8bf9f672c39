use serde_json::{Value, json};
use tradedoc::Transaction;

/// A two-line grain shipment from Mersin to Damascus.
pub fn transaction_json() -> Value {
    json!({
        "transaction_no": "260006",
        "date": "2026-03-14",
        "exporter": {
            "name": {"en": "Anatolia Grain Ltd", "ar": "شركة الأناضول للحبوب", "tr": "Anadolu Tahıl Ltd"},
            "address": {"en": "Mersin Free Zone", "tr": "Mersin Serbest Bölgesi"},
            "country": {"en": "Turkey", "tr": "Türkiye", "ar": "تركيا"},
            "tax_id": "TR-0099",
            "bank_info": "IBAN TR00 0001"
        },
        "importer": {
            "name": {"en": "Levant Foods", "ar": "أغذية الشام"},
            "address": {"en": "Damascus"},
            "country": {"en": "Syria", "ar": "سوريا"}
        },
        "carrier": {"name": {"en": "Silk Road Haulage"}},
        "shipment": {
            "delivery_method": {"en": "CIF", "ar": "سيف"},
            "transport_type": "truck",
            "transport_ref": "TRK-77",
            "origin_country": {"en": "Turkey", "ar": "تركيا", "tr": "Türkiye"},
            "destination_country": {"en": "Syria", "ar": "سوريا", "tr": "Suriye"},
            "loading_place": {"en": "Mersin"},
            "delivery_place": {"en": "Damascus"},
            "truck_plate": "33 ABC 123",
            "driver_name": "Mehmet",
            "currency": {"code": "USD", "name": {"en": "US Dollar"}}
        },
        "items": [
            {
                "code": "WHT-01",
                "hs_code": "1001.99",
                "description": {"en": "Wheat", "ar": "قمح", "tr": "Buğday"},
                "packaging": {"en": "Bag"},
                "quantity": "20",
                "unit": "TON",
                "net_kg": "20000",
                "gross_kg": "20100",
                "unit_price": "310.5",
                "batch_no": "B-1",
                "mfg_date": "2026-01-01",
                "exp_date": "2027-01-01"
            },
            {
                "line_id": 77,
                "hs_code": "1005.90",
                "description": {"en": "Corn", "ar": "ذرة"},
                "packaging": {"en": "Bag"},
                "quantity": "5.5",
                "unit": "TON",
                "net_kg": "5500",
                "gross_kg": "5525.5",
                "unit_price": "199.999"
            }
        ],
        "notes": "Handle with care"
    })
}

pub fn transaction() -> Transaction {
    serde_json::from_value(transaction_json()).expect("fixture transaction")
}
