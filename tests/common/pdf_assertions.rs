use lopdf::Document as LopdfDocument;
use lopdf::content::Content;

/// Text shown by `Tj` operators, page by page, one entry per line.
pub fn extract_lines(doc: &LopdfDocument) -> Vec<String> {
    let mut lines = Vec::new();
    for (_page_num, page_id) in doc.get_pages() {
        let Ok(bytes) = doc.get_page_content(page_id) else {
            continue;
        };
        let Ok(content) = Content::decode(&bytes) else {
            continue;
        };
        for op in content.operations {
            if op.operator == "Tj"
                && let Some(Ok(s)) = op.operands.first().map(|o| o.as_str())
            {
                lines.push(String::from_utf8_lossy(s).into_owned());
            }
        }
    }
    lines
}

/// All text joined with newlines.
pub fn extract_text(doc: &LopdfDocument) -> String {
    extract_lines(doc).join("\n")
}

/// BaseFont names referenced from page resources.
pub fn extract_font_names(doc: &LopdfDocument) -> Vec<String> {
    let mut fonts = std::collections::BTreeSet::new();
    for (_page_num, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        let Ok(resources) = page.get(b"Resources").and_then(|r| resolve_dict(doc, r)) else {
            continue;
        };
        let Ok(font_dict) = resources.get(b"Font").and_then(|f| resolve_dict(doc, f)) else {
            continue;
        };
        for (_name, font) in font_dict.iter() {
            if let Ok(font) = resolve_dict(doc, font)
                && let Ok(base) = font.get(b"BaseFont").and_then(|b| b.as_name())
            {
                fonts.insert(String::from_utf8_lossy(base).into_owned());
            }
        }
    }
    fonts.into_iter().collect()
}

fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a lopdf::Object) -> lopdf::Result<&'a lopdf::Dictionary> {
    match obj.as_reference() {
        Ok(id) => doc.get_dictionary(id),
        Err(_) => obj.as_dict(),
    }
}
