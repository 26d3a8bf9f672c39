mod common;

use chrono::NaiveDate;
use common::fixtures::transaction;
use common::pdf_assertions::{extract_font_names, extract_text};
use common::{TestResult, Workspace, load_pdf};
use std::fs;
use tradedoc::{DocumentRequest, EngineKind, Language, PipelineError};

fn march() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 20).unwrap()
}

fn request(doc_code: &str, lang: Language) -> DocumentRequest {
    DocumentRequest::new(transaction(), doc_code, lang).with_date(march())
}

#[test]
fn commercial_invoice_html() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.html_pipeline()?;
    let result = pipeline.render_document(request("invoice.commercial", Language::En))?;

    assert_eq!(result.doc_no, "INV-COM-260006");
    assert_eq!(result.out_html, ws.output().join("2026/03/INV-COM-260006-EN.html"));
    assert!(result.out_pdf.is_none());

    let html = fs::read_to_string(&result.out_html)?;
    assert!(html.contains("<h1>COMMERCIAL INVOICE</h1>"));
    assert!(html.contains("Anatolia Grain Ltd"));
    assert!(html.contains("Levant Foods"));
    assert!(html.contains("310.50"));
    assert!(!html.contains("{{"));
    Ok(())
}

#[test]
fn proforma_uses_commercial_layout_with_its_own_title() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.html_pipeline()?;

    let en = pipeline.render_document(request("invoice.proforma", Language::En))?;
    assert!(en.out_html.ends_with("INV-PRO-260006-EN.html"));
    let html = fs::read_to_string(&en.out_html)?;
    assert!(html.contains("<h1>PROFORMA INVOICE</h1>"));
    assert!(!html.contains("<h1>COMMERCIAL INVOICE</h1>"));

    let tr = pipeline.render_document(request("invoice.proforma", Language::Tr))?;
    assert!(fs::read_to_string(&tr.out_html)?.contains("ÖN FATURA"));
    Ok(())
}

#[test]
fn arabic_packing_list_falls_back_to_english_layout() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.html_pipeline()?;
    let result = pipeline.render_document(request("packing_list.export.simple", Language::Ar))?;

    assert!(result.out_html.ends_with("PKL-260006-AR.html"));
    let html = fs::read_to_string(&result.out_html)?;
    assert!(html.contains("PACKING LIST"));
    assert!(html.contains("قمح"));
    Ok(())
}

#[test]
fn cmr_is_always_english() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.html_pipeline()?;
    let result = pipeline.render_document(request("cmr", Language::Tr))?;

    assert!(result.out_html.ends_with("CMR-260006-TR.html"));
    let html = fs::read_to_string(&result.out_html)?;
    assert!(html.contains("International Consignment Note"));
    assert!(html.contains("Silk Road Haulage"));
    assert!(html.contains("33 ABC 123"));
    Ok(())
}

#[test]
fn every_document_type_renders_in_every_language() -> TestResult {
    let codes = [
        "invoice.normal",
        "invoice.commercial",
        "invoice.proforma",
        "invoice.syrian.transit",
        "invoice.syrian.intermediary",
        "invoice.syrian.entry",
        "invoice.foreign.commercial",
        "packing_list.export.simple",
        "packing_list.export.with_dates",
        "packing_list.export.with_line_id",
        "cmr",
        "form_a",
        "form.a",
    ];
    let ws = Workspace::new()?;
    let pipeline = ws.html_pipeline()?;

    for code in codes {
        for lang in Language::ALL {
            let result = pipeline.render_document(request(code, lang))?;
            let html = fs::read_to_string(&result.out_html)?;
            assert!(html.starts_with("<!doctype html>"), "{} [{}]", code, lang);
            assert!(!html.contains("{{"), "{} [{}] left a placeholder", code, lang);
        }
    }
    Ok(())
}

#[test]
fn syrian_entry_prints_amount_in_arabic_words() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.html_pipeline()?;
    let result = pipeline.render_document(request("invoice.syrian.entry", Language::Ar))?;

    assert!(result.out_html.ends_with("INV-SE-260006-AR.html"));
    let html = fs::read_to_string(&result.out_html)?;
    assert!(html.contains("dir=\"rtl\""));
    assert!(html.contains("دولار"));
    Ok(())
}

#[test]
fn builtin_engine_writes_pdf() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.builtin_pdf_pipeline()?;
    let result = pipeline.render_document(request("packing_list.export.simple", Language::En))?;

    let pdf_path = result.out_pdf.clone().expect("pdf written");
    assert_eq!(result.pdf_engine, Some(EngineKind::Builtin));
    assert_eq!(pdf_path, ws.output().join("2026/03/PKL-260006-EN.pdf"));
    assert!(result.out_html.is_file());

    let doc = load_pdf(&pdf_path)?;
    let text = extract_text(&doc);
    assert!(text.contains("PACKING LIST"));
    assert!(text.contains("Anatolia Grain Ltd"));
    assert_eq!(extract_font_names(&doc), vec!["Helvetica".to_string()]);

    let docs = pipeline.ledger().documents_for("PKL-260006")?;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].file_path, pdf_path.to_string_lossy());
    assert_eq!(docs[0].document_type_code, "PL_EXPORT_SIMPLE");
    Ok(())
}

#[test]
fn pdf_failure_keeps_html() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.builder().with_pdf_engines(Vec::new()).build()?;
    let result = pipeline.render_document(request("cmr", Language::En))?;

    assert!(result.out_pdf.is_none());
    assert!(result.pdf_engine.is_none());
    assert!(result.out_html.is_file());
    let docs = pipeline.ledger().documents_for("CMR-260006")?;
    assert_eq!(docs[0].file_path, result.out_html.to_string_lossy());
    Ok(())
}

#[test]
fn second_render_gets_a_version_suffix() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.html_pipeline()?;
    let first = pipeline.render_document(request("form_a", Language::En))?;
    let second = pipeline.render_document(request("form.a", Language::En))?;

    assert!(first.out_html.ends_with("FORMA-260006-EN.html"));
    assert!(second.out_html.ends_with("FORMA-260006-EN-v2.html"));
    // same group, type and language: one record
    assert_eq!(pipeline.ledger().documents_for("FORMA-260006")?.len(), 1);
    Ok(())
}

#[test]
fn ledger_file_is_shared_between_pipelines() -> TestResult {
    let ws = Workspace::new()?;
    ws.html_pipeline()?
        .render_document(request("invoice.commercial", Language::Ar))?;

    let later = ws.html_pipeline()?;
    let docs = later.ledger().documents_for("INV-COM-260006")?;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].language, "ar");
    assert_eq!(docs[0].document_type_code, "INV_EXT");
    assert_eq!(docs[0].data["doc_no"], "INV-COM-260006");
    assert_eq!(later.ledger().next_transaction_number()?, "260007");
    Ok(())
}

#[test]
fn unknown_document_code_writes_nothing() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.html_pipeline()?;
    let err = pipeline
        .render_document(request("waybill", Language::En))
        .unwrap_err();

    assert!(matches!(err, PipelineError::BuilderNotFound(_)));
    assert!(!ws.output().join("2026").exists());
    assert!(!ws.ledger_path().exists());
    Ok(())
}

#[test]
fn invoice_without_prices_is_rejected() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.html_pipeline()?;
    let mut tx = transaction();
    tx.items[1].unit_price = None;

    let err = pipeline
        .render_document(DocumentRequest::new(tx.clone(), "invoice.commercial", Language::En))
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidTransaction(_)));

    // packing lists carry no prices
    pipeline.render_document(DocumentRequest::new(tx, "packing_list.export.with_line_id", Language::En).with_date(march()))?;
    Ok(())
}

#[test]
fn manual_transaction_number_does_not_advance_auto_numbering() -> TestResult {
    let ws = Workspace::new()?;
    let pipeline = ws.html_pipeline()?;
    pipeline.render_document(request("cmr", Language::En))?;

    let mut manual = transaction();
    manual.transaction_no = "26/0099".into();
    let result = pipeline.render_document(DocumentRequest::new(manual, "cmr", Language::En).with_date(march()))?;
    assert!(result.out_html.ends_with("CMR-26-0099-EN.html"));

    let ledger = pipeline.ledger();
    assert!(ledger.state()?.transaction_numbers.contains("26/0099"));
    assert_eq!(ledger.next_transaction_number()?, "260007");
    Ok(())
}
