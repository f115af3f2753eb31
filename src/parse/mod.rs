//! Reading SII DTE XML into the [`Document`](crate::core::Document) model.
//!
//! Parsing happens in three steps:
//!
//! 1. [`XmlTree::parse`] checks well-formedness and builds an element tree
//!    with resolved namespaces.
//! 2. [`locate`] finds the `Documento` elements, trying the enveloped shape
//!    (`DTE/Documento`), then any `Documento` descendant, then the root itself.
//! 3. [`extract`] reads header identifiers and `Detalle` lines from each node.
//!
//! [`parse_documents`] runs all three.
//!
//! # Example
//!
//! ```
//! use sii_dte::parse::parse_documents;
//!
//! let xml = br#"<EnvioDTE xmlns="http://www.sii.cl/SiiDte"><SetDTE><DTE><Documento>
//!   <Encabezado><IdDoc><TipoDTE>33</TipoDTE><Folio>123</Folio></IdDoc></Encabezado>
//!   <Detalle><NroLinDet>1</NroLinDet><NmbItem>Servicio</NmbItem></Detalle>
//! </Documento></DTE></SetDTE></EnvioDTE>"#;
//!
//! let docs = parse_documents(xml).unwrap();
//! assert_eq!(docs.len(), 1);
//! assert_eq!(docs[0].lines[0].name.as_deref(), Some("Servicio"));
//! ```

mod extract;
mod locate;
mod tree;

pub use extract::extract;
pub use locate::{DocumentShape, Located, locate};
pub use tree::{Descendants, Element, XmlTree};

use crate::core::{Document, DteError};

/// SII DTE namespace URI.
pub const SII_NS: &str = "http://www.sii.cl/SiiDte";

/// Parse a byte buffer and extract every document it contains.
///
/// Returns an empty vector when the XML is well-formed but holds no
/// `Documento`. Fails only with [`DteError::MalformedXml`].
pub fn parse_documents(xml: &[u8]) -> Result<Vec<Document>, DteError> {
    let tree = XmlTree::parse(xml)?;
    let located = locate(&tree);
    Ok(located.nodes.into_iter().map(extract).collect())
}
