//! Owned, namespace-resolved element tree built from a quick-xml event stream.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName, ResolveResult};

use crate::core::DteError;

/// An XML element with its resolved namespace, local name, leading text and
/// child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Namespace URI the element's prefix resolves to, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local name without prefix.
    pub fn local_name(&self) -> &str {
        &self.name
    }

    /// Text before the first child element (unescaped, untrimmed).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Whether the element is `{namespace}name`.
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// First child element named `{namespace}name`.
    pub fn child(&self, namespace: &str, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(namespace, name))
    }

    /// All child elements named `{namespace}name`, in document order.
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(namespace, name))
    }

    /// Follow a path of child names, taking the first match at each step.
    pub fn find_path(&self, namespace: &str, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |node, name| node.child(namespace, name))
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// Pre-order iterator returned by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A parsed, well-formed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTree {
    root: Element,
}

impl XmlTree {
    /// Parse a byte buffer into an element tree.
    ///
    /// The encoding declared in the prolog is honoured; UTF-16 input (with a
    /// byte order mark or a UTF-16 declaration) is transcoded first. Fails
    /// with [`DteError::MalformedXml`] for anything that is not a single
    /// well-formed root element.
    pub fn parse(xml: &[u8]) -> Result<Self, DteError> {
        match transcode_utf16(xml)? {
            Some(utf8) => Self::parse_events(utf8.as_bytes()),
            None => Self::parse_events(xml),
        }
    }

    fn parse_events(xml: &[u8]) -> Result<Self, DteError> {
        let mut reader = NsReader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut started = false;

        loop {
            // Resolve to an owned namespace right away so the reader is free
            // again before the event is handled.
            let read = reader
                .read_resolved_event()
                .map(|(ns, event)| (resolve_namespace(ns), event));
            let (namespace, event) = match read {
                Ok(pair) => pair,
                Err(e) => {
                    return Err(DteError::MalformedXml(format!(
                        "{e} (at byte {})",
                        reader.buffer_position()
                    )));
                }
            };

            match event {
                Event::Decl(_) if started => {
                    return Err(malformed_at(
                        &reader,
                        "XML declaration not at start of document",
                    ));
                }
                Event::Eof => break,
                _ => started = true,
            }

            match event {
                Event::Start(e) => {
                    let element = open_element(&reader, namespace?, &e)?;
                    if stack.is_empty() && root.is_some() {
                        return Err(malformed_at(&reader, "more than one root element"));
                    }
                    stack.push(element);
                }
                Event::Empty(e) => {
                    let element = open_element(&reader, namespace?, &e)?;
                    close_element(&reader, &mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| malformed_at(&reader, "unexpected end tag"))?;
                    close_element(&reader, &mut stack, &mut root, element)?;
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(malformed)?;
                    push_text(&reader, &mut stack, &text)?;
                }
                Event::CData(c) => {
                    let text = reader.decoder().decode(&c).map_err(malformed)?;
                    push_text(&reader, &mut stack, &text)?;
                }
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(DteError::MalformedXml(format!(
                "unexpected end of input: element <{}> is not closed",
                open.name
            )));
        }
        root.map(|root| Self { root })
            .ok_or_else(|| DteError::MalformedXml("no root element found".into()))
    }

    /// The document element.
    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn malformed(e: impl std::fmt::Display) -> DteError {
    DteError::MalformedXml(e.to_string())
}

fn malformed_at<R>(reader: &NsReader<R>, message: &str) -> DteError {
    DteError::MalformedXml(format!("{message} (at byte {})", reader.buffer_position()))
}

fn resolve_namespace(ns: ResolveResult<'_>) -> Result<Option<String>, DteError> {
    match ns {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(DteError::MalformedXml(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn open_element<R>(
    reader: &NsReader<R>,
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> Result<Element, DteError> {
    let name = decode_name(reader, start.name())?;
    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        decode_name(reader, attr.key)?;
        let reserved = attr.key.prefix().is_some_and(|p| p.as_ref() == b"xml");
        if !reserved && attr.key.as_namespace_binding().is_none() {
            if let (ResolveResult::Unknown(prefix), _) = reader.resolve_attribute(attr.key) {
                return Err(DteError::MalformedXml(format!(
                    "unbound namespace prefix '{}' on attribute",
                    String::from_utf8_lossy(&prefix)
                )));
            }
        }
        if attr.value.contains(&b'<') {
            return Err(malformed_at(reader, "'<' in attribute value"));
        }
        attr.decode_and_unescape_value(reader.decoder())
            .map_err(malformed)?;
    }
    Ok(Element {
        namespace,
        name,
        text: String::new(),
        children: Vec::new(),
    })
}

/// Decode a qualified name, check it is a valid XML name and return its
/// local part.
fn decode_name<R>(reader: &NsReader<R>, qname: QName<'_>) -> Result<String, DteError> {
    let decoder = reader.decoder();
    let full = decoder.decode(qname.as_ref()).map_err(malformed)?;
    if !is_xml_name(&full) {
        return Err(malformed_at(reader, &format!("invalid name '{full}'")));
    }
    Ok(decoder
        .decode(qname.local_name().as_ref())
        .map_err(malformed)?
        .into_owned())
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.' | '\u{B7}'))
}

/// Re-encode UTF-16 input as UTF-8, or `None` when the input is not UTF-16.
///
/// The byte-oriented reader only understands ASCII-compatible encodings, so
/// UTF-16 is decoded up front and its declaration rewritten to UTF-8.
fn transcode_utf16(xml: &[u8]) -> Result<Option<String>, DteError> {
    let (encoding, skip): (&'static Encoding, usize) = match Encoding::for_bom(xml) {
        Some((enc, bom)) if enc == UTF_16LE || enc == UTF_16BE => (enc, bom),
        Some(_) => return Ok(None),
        None => match xml {
            [0x3C, 0x00, 0x3F, 0x00, ..] => (UTF_16LE, 0),
            [0x00, 0x3C, 0x00, 0x3F, ..] => (UTF_16BE, 0),
            _ => return Ok(None),
        },
    };
    let text = encoding
        .decode_without_bom_handling_and_without_replacement(&xml[skip..])
        .ok_or_else(|| {
            DteError::MalformedXml(format!("cannot decode input as {}", encoding.name()))
        })?;
    Ok(Some(declare_utf8(text)))
}

/// Replace the value of the `encoding` pseudo-attribute in the XML
/// declaration with `UTF-8`.
fn declare_utf8(text: Cow<'_, str>) -> String {
    let text = text.into_owned();
    let Some(end) = text.find("?>").filter(|_| text.starts_with("<?xml")) else {
        return text;
    };
    let decl = &text[..end];
    let Some(at) = decl.find("encoding") else {
        return text;
    };
    let Some((open, quote)) = decl[at..].char_indices().find(|&(_, c)| c == '"' || c == '\'') else {
        return text;
    };
    let value_start = at + open + 1;
    let Some(len) = decl[value_start..].find(quote) else {
        return text;
    };
    format!("{}UTF-8{}", &text[..value_start], &text[value_start + len..])
}

fn close_element<R>(
    reader: &NsReader<R>,
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DteError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed_at(reader, "more than one root element")),
    }
    Ok(())
}

fn push_text<R>(reader: &NsReader<R>, stack: &mut [Element], text: &str) -> Result<(), DteError> {
    match stack.last_mut() {
        // Only text before the first child belongs to the element itself.
        Some(parent) if parent.children.is_empty() => parent.text.push_str(text),
        Some(_) => {}
        None if text.trim().is_empty() => {}
        None => return Err(malformed_at(reader, "text outside the root element")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://www.sii.cl/SiiDte";

    fn parse(xml: &str) -> Result<XmlTree, DteError> {
        XmlTree::parse(xml.as_bytes())
    }

    #[test]
    fn resolves_default_namespace() {
        let tree = parse(r#"<DTE xmlns="http://www.sii.cl/SiiDte"><Documento/></DTE>"#).unwrap();
        let root = tree.root();
        assert!(root.is(NS, "DTE"));
        assert!(root.child(NS, "Documento").is_some());
    }

    #[test]
    fn resolves_prefixed_namespace() {
        let tree =
            parse(r#"<s:DTE xmlns:s="http://www.sii.cl/SiiDte"><s:Documento/></s:DTE>"#).unwrap();
        assert_eq!(tree.root().local_name(), "DTE");
        assert_eq!(tree.root().namespace(), Some(NS));
    }

    #[test]
    fn unqualified_elements_have_no_namespace() {
        let tree = parse("<DTE><Documento/></DTE>").unwrap();
        assert_eq!(tree.root().namespace(), None);
        assert!(tree.root().child(NS, "Documento").is_none());
    }

    #[test]
    fn text_is_unescaped_and_kept_before_first_child() {
        let tree = parse("<a>  A &amp; B <b>inner</b> tail</a>").unwrap();
        assert_eq!(tree.root().text(), "  A & B ");
        assert_eq!(tree.root().children()[0].text(), "inner");
    }

    #[test]
    fn cdata_is_text() {
        let tree = parse("<a><![CDATA[x < y]]></a>").unwrap();
        assert_eq!(tree.root().text(), "x < y");
    }

    #[test]
    fn descendants_in_document_order() {
        let tree = parse("<r><a><b/><c/></a><d/></r>").unwrap();
        let names: Vec<&str> = tree.root().descendants().map(Element::local_name).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn find_path_takes_first_match() {
        let tree = parse(
            r#"<r xmlns="http://www.sii.cl/SiiDte"><a><b>1</b></a><a><b>2</b></a></r>"#,
        )
        .unwrap();
        let b = tree.root().find_path(NS, &["a", "b"]).unwrap();
        assert_eq!(b.text(), "1");
        assert!(tree.root().find_path(NS, &["a", "x"]).is_none());
    }

    #[test]
    fn latin1_declared_encoding() {
        let mut xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>".to_vec();
        xml.extend_from_slice(&[b'C', b'a', 0xF1, b'a']);
        xml.extend_from_slice(b"</a>");
        let tree = XmlTree::parse(&xml).unwrap();
        assert_eq!(tree.root().text(), "Caña");
    }

    fn utf16le(xml: &str, bom: bool) -> Vec<u8> {
        let mut bytes = if bom { vec![0xFF, 0xFE] } else { Vec::new() };
        for unit in xml.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn utf16le_with_bom() {
        let tree = XmlTree::parse(&utf16le("<Documento>Caña</Documento>", true)).unwrap();
        assert_eq!(tree.root().local_name(), "Documento");
        assert_eq!(tree.root().text(), "Caña");
    }

    #[test]
    fn utf16le_declared_without_bom() {
        let xml = r#"<?xml version="1.0" encoding="UTF-16"?><DTE xmlns="http://www.sii.cl/SiiDte"><Documento/></DTE>"#;
        let tree = XmlTree::parse(&utf16le(xml, false)).unwrap();
        assert!(tree.root().child(NS, "Documento").is_some());
    }

    #[test]
    fn utf16be_with_bom() {
        let mut xml = vec![0xFE, 0xFF];
        for unit in "<a>ñ</a>".encode_utf16() {
            xml.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(XmlTree::parse(&xml).unwrap().root().text(), "ñ");
    }

    #[test]
    fn declaration_rewritten_to_utf8() {
        let decl = declare_utf8(Cow::Borrowed(r#"<?xml version='1.0' encoding='utf-16'?><a/>"#));
        assert_eq!(decl, r#"<?xml version='1.0' encoding='UTF-8'?><a/>"#);
        assert_eq!(declare_utf8(Cow::Borrowed("<a/>")), "<a/>");
    }

    #[test]
    fn rejects_mismatched_end_tag() {
        assert!(matches!(parse("<a><b></a>"), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_unclosed_element() {
        assert!(matches!(parse("<a><b></b>"), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse(""), Err(DteError::MalformedXml(_))));
        assert!(matches!(parse("   "), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_second_root() {
        assert!(matches!(parse("<a/><b/>"), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_text_after_root() {
        assert!(matches!(parse("<a/>junk"), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_unbound_prefix() {
        assert!(matches!(parse("<x:a/>"), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_unbound_attribute_prefix() {
        assert!(matches!(parse(r#"<a x:y="1"/>"#), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn accepts_bound_and_reserved_attribute_prefixes() {
        let xml = r#"<a xmlns:x="urn:x" x:y="1" xml:lang="es"/>"#;
        assert!(parse(xml).is_ok());
    }

    #[test]
    fn rejects_lt_in_attribute_value() {
        assert!(matches!(parse(r#"<a b="x<y"/>"#), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_invalid_element_name() {
        assert!(matches!(parse("<1Documento/>"), Err(DteError::MalformedXml(_))));
        assert!(matches!(parse("<a><-b/></a>"), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_invalid_attribute_name() {
        assert!(matches!(parse(r#"<a 9b="1"/>"#), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_invalid_utf8_in_attribute_value() {
        let xml = b"<a b=\"\xFF\xFE\"/>";
        assert!(matches!(XmlTree::parse(xml), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_text_before_declaration() {
        let xml = r#"junk<?xml version="1.0"?><a/>"#;
        assert!(matches!(parse(xml), Err(DteError::MalformedXml(_))));
        let xml = r#" <?xml version="1.0"?><a/>"#;
        assert!(matches!(parse(xml), Err(DteError::MalformedXml(_))));
    }

    #[test]
    fn rejects_non_xml() {
        assert!(parse("this is not xml").is_err());
    }
}
