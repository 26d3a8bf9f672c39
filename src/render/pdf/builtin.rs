use super::{EngineKind, PdfEngine};
use crate::error::PipelineError;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const A4_WIDTH: f32 = 595.0;
const A4_HEIGHT: f32 = 842.0;

static DROPPED: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?is)<head\b.*?</head\s*>", r"(?is)<style\b.*?</style\s*>", r"(?is)<script\b.*?</script\s*>", r"(?s)<!--.*?-->"]
        .iter()
        .map(|p| Regex::new(p).expect("static regex"))
        .collect()
});
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|tr|h[1-6]|li|table|section|header|footer|ul|ol|thead|tbody)\s*>")
        .expect("static regex")
});
static CELL_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</t[dh]\s*>").expect("static regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static NUMERIC_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("static regex"));

fn decode_entities(s: &str) -> String {
    let s = NUMERIC_ENTITY.replace_all(s, |caps: &Captures| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse().ok(),
        };
        code.and_then(char::from_u32).map(String::from).unwrap_or_default()
    });
    s.replace("&nbsp;", " ")
        .replace("&middot;", "·")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Reduces an HTML document to its visible text, one line per block.
pub fn html_to_text(html: &str) -> Vec<String> {
    let mut s = html.to_string();
    for re in DROPPED.iter() {
        s = re.replace_all(&s, "").into_owned();
    }
    let s = LINE_BREAK.replace_all(&s, "\n");
    let s = CELL_END.replace_all(&s, "  ");
    let s = TAG.replace_all(&s, "");
    let s = decode_entities(&s);

    let mut lines: Vec<String> = Vec::new();
    for raw in s.lines() {
        let line = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() && lines.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Breaks `line` into pieces of at most `width` characters at spaces.
fn wrap(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split(' ') {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            out.push(head);
        }
        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if needed > width && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Encodes text for a WinAnsi (CP1252) Type1 font; other characters become `?`.
fn encode_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => match c {
                '€' => 0x80,
                '…' => 0x85,
                '‘' => 0x91,
                '’' => 0x92,
                '“' => 0x93,
                '”' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '\t' => b' ',
                _ => b'?',
            },
        })
        .collect()
}

/// Writes the visible text of the HTML on A4 pages in Helvetica.
///
/// Layout and styling are dropped and only WinAnsi characters survive, so
/// this is a last resort for when no HTML engine is installed.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinEngine {
    pub font_size: f32,
    pub margin: f32,
}

impl Default for BuiltinEngine {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            margin: 50.0,
        }
    }
}

impl BuiltinEngine {
    fn leading(&self) -> f32 {
        self.font_size * 1.4
    }

    fn chars_per_line(&self) -> usize {
        (((A4_WIDTH - 2.0 * self.margin) / (self.font_size * 0.5)) as usize).max(10)
    }

    fn lines_per_page(&self) -> usize {
        (((A4_HEIGHT - 2.0 * self.margin) / self.leading()) as usize).max(1)
    }

    /// Builds the PDF document for `html`.
    pub fn build_document(&self, html: &str) -> Result<Document, PipelineError> {
        let width = self.chars_per_line();
        let lines: Vec<String> = html_to_text(html)
            .iter()
            .flat_map(|l| wrap(l, width))
            .collect();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        let per_page = self.lines_per_page();
        let chunks: Vec<&[String]> = if lines.is_empty() {
            vec![&[]]
        } else {
            lines.chunks(per_page).collect()
        };

        for chunk in chunks {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), self.font_size.into()]),
                Operation::new("TL", vec![self.leading().into()]),
                Operation::new(
                    "Td",
                    vec![self.margin.into(), (A4_HEIGHT - self.margin - self.font_size).into()],
                ),
            ];
            for line in chunk {
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
                ));
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.0.into(), 0.0.into(), A4_WIDTH.into(), A4_HEIGHT.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::from(*id)).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let info_id = doc.add_object(dictionary! { "Producer" => Object::string_literal("tradedoc") });
        doc.trailer.set("Info", info_id);
        Ok(doc)
    }
}

impl PdfEngine for BuiltinEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Builtin
    }

    fn is_available(&self) -> bool {
        true
    }

    fn render(&self, html: &str, out: &Path, _base_url: Option<&str>) -> Result<(), PipelineError> {
        let mut doc = self.build_document(html)?;
        let mut writer = BufWriter::new(File::create(out)?);
        doc.save_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
