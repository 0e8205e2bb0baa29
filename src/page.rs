//! Embedded-markup template source
//!
//! Hosting pages carry template blocks as ordinary elements, typically a
//! hidden `div` or a `<script type="text/template">`, with the template
//! syntax entity-escaped so the browser leaves it alone. [`PageDocument`]
//! parses the page once and indexes the inner markup of every element that
//! carries an `id` attribute; [`PageDocument::fragment`] hands that markup
//! back with entities decoded and surrounding whitespace trimmed, ready for a
//! template engine.

use std::collections::HashMap;

use html5gum::{StartTag, Token, Tokenizer};

/// Elements that cannot have content; an id on one yields an empty fragment
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content the tokenizer hands through without entity
/// decoding, so re-serialization must not escape it again
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// An in-flight capture of one element's inner markup
struct Capture {
    id: String,
    /// Open descendant elements, counting the captured element itself
    depth: usize,
    buffer: String,
}

/// An HTML page indexed by element id.
///
/// Parsing happens once, up front; lookups are map reads. The first element
/// with a given id wins, matching `getElementById` behavior.
#[derive(Debug, Default)]
pub struct PageDocument {
    fragments: HashMap<String, String>,
}

impl PageDocument {
    /// Parse a page and index every element that has an `id` attribute.
    ///
    /// The tokenizer recovers from malformed markup instead of failing, so
    /// parsing always succeeds; elements left open at end of input are
    /// treated as closed there.
    pub fn parse(html: &str) -> Self {
        let mut fragments: HashMap<String, String> = HashMap::new();
        let mut captures: Vec<Capture> = Vec::new();
        // Name of the raw-text element currently open, if any
        let mut raw_text: Option<String> = None;

        for token in Tokenizer::new(html).infallible() {
            match token {
                Token::StartTag(tag) => {
                    let name = String::from_utf8_lossy(&tag.name.0).into_owned();
                    let void =
                        tag.self_closing || VOID_ELEMENTS.contains(&name.as_str());
                    let serialized = serialize_start_tag(&name, &tag);
                    for capture in &mut captures {
                        capture.buffer.push_str(&serialized);
                        if !void {
                            capture.depth += 1;
                        }
                    }
                    if !void && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                        raw_text = Some(name);
                    }
                    if let Some(id) = attribute(&tag, b"id") {
                        let taken = id.is_empty()
                            || fragments.contains_key(&id)
                            || captures.iter().any(|c| c.id == id);
                        if !taken {
                            if void {
                                fragments.insert(id, String::new());
                            } else {
                                captures.push(Capture {
                                    id,
                                    depth: 1,
                                    buffer: String::new(),
                                });
                            }
                        }
                    }
                }
                Token::EndTag(tag) => {
                    let name = String::from_utf8_lossy(&tag.name.0).into_owned();
                    if raw_text.as_deref() == Some(name.as_str()) {
                        raw_text = None;
                    }
                    let closing = format!("</{name}>");
                    let mut index = 0;
                    while index < captures.len() {
                        if captures[index].depth == 1 {
                            let finished = captures.remove(index);
                            fragments.insert(finished.id, finished.buffer);
                        } else {
                            captures[index].depth -= 1;
                            captures[index].buffer.push_str(&closing);
                            index += 1;
                        }
                    }
                }
                Token::String(text) => {
                    let text = String::from_utf8_lossy(&text.0);
                    let serialized = if raw_text.is_some() {
                        text.into_owned()
                    } else {
                        html_escape::encode_text(text.as_ref()).into_owned()
                    };
                    for capture in &mut captures {
                        capture.buffer.push_str(&serialized);
                    }
                }
                Token::Comment(comment) => {
                    let comment = String::from_utf8_lossy(&comment.0);
                    for capture in &mut captures {
                        capture.buffer.push_str("<!--");
                        capture.buffer.push_str(comment.as_ref());
                        capture.buffer.push_str("-->");
                    }
                }
                _ => {}
            }
        }

        // Unterminated elements close at end of input
        for capture in captures {
            fragments.entry(capture.id).or_insert(capture.buffer);
        }

        Self { fragments }
    }

    /// Inner markup of the element with the given id, entity-decoded and
    /// trimmed. `None` when no such element exists.
    pub fn fragment(&self, id: &str) -> Option<String> {
        self.fragments
            .get(id)
            .map(|raw| html_escape::decode_html_entities(raw).trim().to_string())
    }

    /// Whether an element with the given id exists
    pub fn contains(&self, id: &str) -> bool {
        self.fragments.contains_key(id)
    }

    /// Number of indexed elements
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the page had no id-carrying elements
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

fn serialize_start_tag(name: &str, tag: &StartTag) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(name);
    for (key, value) in &tag.attributes {
        let key = String::from_utf8_lossy(&key.0);
        let value = String::from_utf8_lossy(&value.0);
        out.push(' ');
        out.push_str(key.as_ref());
        out.push_str("=\"");
        out.push_str(html_escape::encode_double_quoted_attribute(value.as_ref()).as_ref());
        out.push('"');
    }
    if tag.self_closing {
        out.push_str(" /");
    }
    out.push('>');
    out
}

fn attribute(tag: &StartTag, name: &[u8]) -> Option<String> {
    tag.attributes
        .iter()
        .find(|(key, _)| key.0 == name)
        .map(|(_, value)| String::from_utf8_lossy(&value.0).into_owned())
}
