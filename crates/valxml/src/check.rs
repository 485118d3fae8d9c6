//! Well-formedness check for produced documents.
//!
//! This is the hand-off point to downstream XML tooling: a document that
//! passes [`check_well_formed`] parses with a standard reader.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{XmlError, XmlResult};

/// Check that `xml` is a well-formed document with a single root element.
///
/// # Errors
///
/// Returns [`XmlError::QuickXml`] for syntax errors reported by the reader
/// (including mismatched end tags) and [`XmlError::Malformed`] for unclosed
/// elements, missing or repeated root elements and text outside the root.
pub fn check_well_formed(xml: &str) -> XmlResult<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut open: Vec<String> = Vec::new();
    let mut roots = 0_usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if open.is_empty() {
                    roots += 1;
                }
                open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Empty(_) if open.is_empty() => roots += 1,
            Event::Text(t) if open.is_empty() => {
                if !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(XmlError::Malformed(
                        "text outside the root element".to_owned(),
                    ));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, nested content.
            _ => {}
        }
        if roots > 1 {
            return Err(XmlError::Malformed("more than one root element".to_owned()));
        }
    }

    if let Some(name) = open.pop() {
        return Err(XmlError::Malformed(format!("unclosed element <{name}>")));
    }
    if roots == 0 {
        return Err(XmlError::Malformed("missing root element".to_owned()));
    }
    Ok(())
}
