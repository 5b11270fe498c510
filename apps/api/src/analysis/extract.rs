//! Resume text extraction from uploaded bytes.
//!
//! The filename extension picks the decoder. Unknown extensions try PDF first and
//! fall back to lossy UTF-8, so a mislabeled plain-text upload still works.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to extract PDF text: {0}")]
    Pdf(String),

    #[error("failed to open DOCX archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to read DOCX body: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse DOCX XML: {0}")]
    Xml(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
    Unknown,
}

impl DocumentKind {
    pub fn from_filename(filename: Option<&str>) -> Self {
        let name = filename.unwrap_or("").to_lowercase();
        if name.ends_with(".pdf") {
            DocumentKind::Pdf
        } else if name.ends_with(".docx") || name.ends_with(".doc") {
            // legacy .doc is not a zip; the archive error says so
            DocumentKind::Docx
        } else if name.ends_with(".txt") {
            DocumentKind::Text
        } else {
            DocumentKind::Unknown
        }
    }
}

pub fn extract_text(bytes: &[u8], filename: Option<&str>) -> Result<String, ExtractError> {
    match DocumentKind::from_filename(filename) {
        DocumentKind::Pdf => extract_pdf_text(bytes),
        DocumentKind::Docx => extract_docx_text(bytes),
        DocumentKind::Text => Ok(extract_plain_text(bytes)),
        DocumentKind::Unknown => {
            Ok(extract_pdf_text(bytes).unwrap_or_else(|_| extract_plain_text(bytes)))
        }
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn extract_plain_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Concatenates `<w:t>` runs; paragraphs end with a newline, tabs and breaks are kept.
fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCX_BODY)?.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text_node = true;
                }
            }
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_node {
                    let value = e.unescape().map_err(|err| ExtractError::Xml(err.to_string()))?;
                    output.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = false,
                b"w:p" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(ExtractError::Xml(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(output.trim().to_string())
}
