//! Field extraction from a single `Documento` element.

use super::SII_NS;
use super::tree::Element;
use crate::core::{Document, LineItem, Numeric, coerce_field, non_blank};

/// Build a [`Document`] from a `Documento` element.
///
/// Never fails: missing elements and blank text become `None`, numeric text
/// that cannot be coerced is kept verbatim.
pub fn extract(doc: &Element) -> Document {
    let id_doc = doc.find_path(SII_NS, &["Encabezado", "IdDoc"]);

    Document {
        doc_type: int_field(id_doc, "TipoDTE"),
        folio: int_field(id_doc, "Folio"),
        lines: doc
            .children_named(SII_NS, "Detalle")
            .map(extract_line)
            .collect(),
    }
}

fn extract_line(det: &Element) -> LineItem {
    let code = det.child(SII_NS, "CdgItem");

    LineItem {
        line_number: int_field(Some(det), "NroLinDet"),
        code_type: text_field(code, "TpoCodigo"),
        code_value: text_field(code, "VlrCodigo"),
        name: text_field(Some(det), "NmbItem"),
        description: text_field(Some(det), "DscItem"),
        quantity: int_field(Some(det), "QtyItem"),
        price: int_field(Some(det), "PrcItem"),
        amount: int_field(Some(det), "MontoItem"),
    }
}

/// Trimmed text of the `name` child, or `None` when the parent, the child or
/// its text is missing.
fn text_field(parent: Option<&Element>, name: &str) -> Option<String> {
    parent
        .and_then(|p| p.child(SII_NS, name))
        .and_then(|e| non_blank(e.text()))
        .map(str::to_string)
}

fn int_field(parent: Option<&Element>, name: &str) -> Option<Numeric> {
    coerce_field(
        parent
            .and_then(|p| p.child(SII_NS, name))
            .map(Element::text),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::XmlTree;

    fn extract_root(xml: &str) -> Document {
        let tree = XmlTree::parse(xml.as_bytes()).unwrap();
        extract(tree.root())
    }

    #[test]
    fn missing_encabezado_gives_absent_header() {
        let doc = extract_root(
            r#"<Documento xmlns="http://www.sii.cl/SiiDte">
                 <Detalle><NroLinDet>1</NroLinDet></Detalle>
               </Documento>"#,
        );
        assert_eq!(doc.doc_type, None);
        assert_eq!(doc.folio, None);
        assert_eq!(doc.lines.len(), 1);
    }

    #[test]
    fn missing_iddoc_gives_absent_header() {
        let doc = extract_root(
            r#"<Documento xmlns="http://www.sii.cl/SiiDte"><Encabezado/></Documento>"#,
        );
        assert_eq!(doc.doc_type, None);
        assert_eq!(doc.folio, None);
        assert!(doc.lines.is_empty());
    }

    #[test]
    fn missing_cdgitem_gives_absent_codes() {
        let doc = extract_root(
            r#"<Documento xmlns="http://www.sii.cl/SiiDte">
                 <Detalle><NmbItem>Tornillo</NmbItem></Detalle>
               </Documento>"#,
        );
        let line = &doc.lines[0];
        assert_eq!(line.code_type, None);
        assert_eq!(line.code_value, None);
        assert_eq!(line.name.as_deref(), Some("Tornillo"));
    }

    #[test]
    fn first_cdgitem_wins() {
        let doc = extract_root(
            r#"<Documento xmlns="http://www.sii.cl/SiiDte"><Detalle>
                 <CdgItem><TpoCodigo>INT1</TpoCodigo><VlrCodigo>A-1</VlrCodigo></CdgItem>
                 <CdgItem><TpoCodigo>EAN13</TpoCodigo><VlrCodigo>7801234567890</VlrCodigo></CdgItem>
               </Detalle></Documento>"#,
        );
        assert_eq!(doc.lines[0].code_type.as_deref(), Some("INT1"));
        assert_eq!(doc.lines[0].code_value.as_deref(), Some("A-1"));
    }

    #[test]
    fn nested_detalle_is_not_a_line() {
        let doc = extract_root(
            r#"<Documento xmlns="http://www.sii.cl/SiiDte">
                 <Otro><Detalle><NroLinDet>9</NroLinDet></Detalle></Otro>
               </Documento>"#,
        );
        assert!(doc.lines.is_empty());
    }
}
