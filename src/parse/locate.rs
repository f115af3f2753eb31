//! Finding `Documento` elements in the shapes SII feeds arrive in.

use serde::{Deserialize, Serialize};

use super::SII_NS;
use super::tree::{Element, XmlTree};

/// How the `Documento` elements were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentShape {
    /// `Documento` children of a `DTE` wrapper (e.g. inside `EnvioDTE/SetDTE`).
    Enveloped,
    /// `Documento` descendants without a `DTE` parent.
    Bare,
    /// The root element is itself the document.
    RootIsDocument,
    /// No document found.
    Empty,
}

/// Result of [`locate`]: the matched nodes and the shape that matched.
#[derive(Debug, Clone)]
pub struct Located<'a> {
    pub shape: DocumentShape,
    pub nodes: Vec<&'a Element>,
}

type Matcher = for<'a> fn(&'a Element) -> Vec<&'a Element>;

/// Matchers in priority order; the first one returning nodes wins.
const MATCHERS: [(DocumentShape, Matcher); 3] = [
    (DocumentShape::Enveloped, enveloped),
    (DocumentShape::Bare, bare),
    (DocumentShape::RootIsDocument, root_is_document),
];

/// Locate the `Documento` elements of a parsed tree.
///
/// Never fails: a tree without documents yields [`DocumentShape::Empty`] and
/// no nodes.
pub fn locate(tree: &XmlTree) -> Located<'_> {
    let root = tree.root();
    for (shape, matcher) in MATCHERS {
        let nodes = matcher(root);
        if !nodes.is_empty() {
            tracing::debug!(?shape, count = nodes.len(), "located documents");
            return Located { shape, nodes };
        }
    }
    tracing::debug!(root = root.local_name(), "no documents located");
    Located {
        shape: DocumentShape::Empty,
        nodes: Vec::new(),
    }
}

fn enveloped(root: &Element) -> Vec<&Element> {
    root.descendants()
        .filter(|e| e.is(SII_NS, "DTE"))
        .flat_map(|dte| dte.children_named(SII_NS, "Documento"))
        .collect()
}

fn bare(root: &Element) -> Vec<&Element> {
    root.descendants()
        .filter(|e| e.is(SII_NS, "Documento"))
        .collect()
}

fn root_is_document(root: &Element) -> Vec<&Element> {
    if root.local_name().ends_with("Documento") {
        vec![root]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_of(xml: &str) -> (DocumentShape, usize) {
        let tree = XmlTree::parse(xml.as_bytes()).unwrap();
        let located = locate(&tree);
        (located.shape, located.nodes.len())
    }

    #[test]
    fn root_dte_falls_through_to_bare() {
        // The root is never its own descendant, so a bare <DTE> root is found
        // by the descendant search.
        let xml = r#"<DTE xmlns="http://www.sii.cl/SiiDte"><Documento/></DTE>"#;
        assert_eq!(shape_of(xml), (DocumentShape::Bare, 1));
    }

    #[test]
    fn root_suffix_match() {
        let xml = r#"<ExportDocumento xmlns="http://www.sii.cl/SiiDte"/>"#;
        assert_eq!(shape_of(xml), (DocumentShape::RootIsDocument, 1));
    }

    #[test]
    fn foreign_namespace_is_ignored() {
        let xml = r#"<r xmlns="urn:other"><DTE><Documento/></DTE></r>"#;
        assert_eq!(shape_of(xml), (DocumentShape::Empty, 0));
    }
}
