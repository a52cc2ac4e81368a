//! Structural extraction of resolution records
//!
//! Every resolution on the portal is rendered through one fixed Domino
//! template; the selector table below addresses that template by position.
//! A selector that no longer matches yields an empty field rather than an
//! error; schema drift degrades silently, and only undecodable bytes are a
//! hard failure.

use crate::error::{Error, Result};
use crate::types::{Author, Resolution};
use scraper::{ElementRef, Html, Selector};

// The original template nests everything under a single cell marked with
// this class. html5ever inserts tbody between table and tr, so positional
// paths go through it even though the source markup carries none.
const RESOLUTION_NUMBER: FieldSpec = FieldSpec {
    css: "td.CuerpoResol > table:nth-of-type(1) > tbody > tr:nth-of-type(1) > td:nth-of-type(1) > b:nth-of-type(2) > font",
    mode: TextMode::Shallow,
    normalize: false,
};
const FILE_ID: FieldSpec = FieldSpec {
    css: "td.CuerpoResol > table:nth-of-type(1) > tbody > tr:nth-of-type(1) > td:nth-of-type(2) > div > b",
    mode: TextMode::Deep,
    normalize: false,
};
const APPROVAL_DATE: FieldSpec = FieldSpec {
    css: "td.CuerpoResol > table:nth-of-type(1) > tbody > tr:nth-of-type(2) > td:nth-of-type(2) > div > b",
    mode: TextMode::Deep,
    normalize: false,
};
const CATEGORY: FieldSpec = FieldSpec {
    css: "td.CuerpoResol > table:nth-of-type(1) > tbody > tr:nth-of-type(2) > td:nth-of-type(1) > b:nth-of-type(1) > font",
    mode: TextMode::Shallow,
    normalize: true,
};
const SUBCATEGORY: FieldSpec = FieldSpec {
    css: "td.CuerpoResol > b:nth-of-type(1)",
    mode: TextMode::Deep,
    normalize: true,
};
const SUMMARY: FieldSpec = FieldSpec {
    css: "td.CuerpoResol > b:nth-of-type(2)",
    mode: TextMode::Deep,
    normalize: true,
};
const CONTENT: FieldSpec = FieldSpec {
    css: "td.CuerpoResol > table:nth-of-type(3) > tbody > tr:nth-of-type(1)",
    mode: TextMode::Deep,
    normalize: true,
};

// Signature rows: everything at or after the second row of the content table
const AUTHOR_ROWS: &str = "td.CuerpoResol > table:nth-of-type(3) > tbody > tr:nth-of-type(n+2)";
const AUTHOR_FONT: &str = "font";

/// How text is gathered from a matched element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TextMode {
    /// Direct text-node children only
    Shallow,
    /// Every descendant text node
    Deep,
}

/// One entry of the field table: where a field's text lives and how to treat it
struct FieldSpec {
    css: &'static str,
    mode: TextMode,
    normalize: bool,
}

/// A [`FieldSpec`] with its selector compiled
struct CompiledField {
    selector: Selector,
    mode: TextMode,
    normalize: bool,
}

impl CompiledField {
    fn compile(spec: &FieldSpec) -> Result<Self> {
        Ok(Self {
            selector: compile(spec.css)?,
            mode: spec.mode,
            normalize: spec.normalize,
        })
    }

    /// Concatenate the text of every match, in document order
    fn read(&self, doc: &Html) -> String {
        let mut out = String::new();
        for element in doc.select(&self.selector) {
            match self.mode {
                TextMode::Shallow => out.push_str(&shallow_text(element)),
                TextMode::Deep => {
                    for text in element.text() {
                        out.push_str(text);
                    }
                }
            }
        }
        if self.normalize {
            normalize_whitespace(&out)
        } else {
            out
        }
    }
}

/// Record extractor over the portal's fixed document template
pub struct Extractor {
    resolution_number: CompiledField,
    file_id: CompiledField,
    approval_date: CompiledField,
    category: CompiledField,
    subcategory: CompiledField,
    summary: CompiledField,
    content: CompiledField,
    author_rows: Selector,
    author_font: Selector,
}

impl Extractor {
    /// Compile the selector table
    pub fn new() -> Result<Self> {
        Ok(Self {
            resolution_number: CompiledField::compile(&RESOLUTION_NUMBER)?,
            file_id: CompiledField::compile(&FILE_ID)?,
            approval_date: CompiledField::compile(&APPROVAL_DATE)?,
            category: CompiledField::compile(&CATEGORY)?,
            subcategory: CompiledField::compile(&SUBCATEGORY)?,
            summary: CompiledField::compile(&SUMMARY)?,
            content: CompiledField::compile(&CONTENT)?,
            author_rows: compile(AUTHOR_ROWS)?,
            author_font: compile(AUTHOR_FONT)?,
        })
    }

    /// Extract one resolution record from a fetched document
    ///
    /// Returns [`Error::Parse`] only for bytes that are not valid UTF-8; a
    /// document the lenient HTML parser accepts always produces a record,
    /// with empty strings for anything the selectors fail to find.
    pub fn extract(
        &self,
        url: &str,
        bytes: &[u8],
        date: &str,
        include_html: bool,
    ) -> Result<Resolution> {
        let text = decode_document(url, bytes)?;
        let doc = Html::parse_document(text);

        Ok(Resolution {
            approval_date: self.approval_date.read(&doc),
            authors: self.authors(&doc),
            category: self.category.read(&doc),
            content: self.content.read(&doc),
            date: date.to_string(),
            file_id: self.file_id.read(&doc),
            html: include_html.then(|| doc.root_element().html()),
            resolution_number: self.resolution_number.read(&doc),
            subcategory: self.subcategory.read(&doc),
            summary: self.summary.read(&doc),
            url: url.to_string(),
        })
    }

    /// Extract the signature rows
    ///
    /// Rows whose full rendered text is blank are skipped (the template pads
    /// the table with empty rows). For the rest, the name comes from the
    /// first font descendant and the job title from all subsequent ones; the
    /// trailing "," and ".-" the portal always emits are removed by blindly
    /// dropping the last one and two characters respectively.
    fn authors(&self, doc: &Html) -> Vec<Author> {
        let mut authors = Vec::new();
        for row in doc.select(&self.author_rows) {
            if row.text().all(|t| t.trim().is_empty()) {
                continue;
            }

            let mut fonts = row.select(&self.author_font);
            let name = fonts.next().map(shallow_text).unwrap_or_default();
            let mut job_title = String::new();
            for font in fonts {
                job_title.push_str(&shallow_text(font));
            }

            authors.push(Author {
                job_title: drop_last_chars(job_title.trim(), 2).to_string(),
                name: drop_last_chars(name.trim(), 1).to_string(),
            });
        }
        authors
    }
}

/// Compile a CSS selector, surfacing failures as [`Error::Selector`]
pub(crate) fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Decode fetched bytes, surfacing invalid UTF-8 as [`Error::Parse`]
pub(crate) fn decode_document<'a>(url: &str, bytes: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| Error::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Concatenate the direct text-node children of an element
fn shallow_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
    out
}

/// Collapse every run of whitespace to a single space and trim the ends
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop the last `n` characters, saturating at the empty string
///
/// Character-aware, not byte-aware: author names end in non-ASCII often
/// enough that byte slicing would split a code point.
fn drop_last_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return s;
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &s[..idx],
        None => "",
    }
}
