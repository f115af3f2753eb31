use serde::{Deserialize, Serialize};
use std::fmt;

/// `Documento`: one electronic tax document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// `Encabezado/IdDoc/TipoDTE`: document type code.
    #[serde(rename = "TipoDTE")]
    pub doc_type: Option<Numeric>,
    /// `Encabezado/IdDoc/Folio`: document number assigned by the issuer.
    #[serde(rename = "Folio")]
    pub folio: Option<Numeric>,
    /// `Detalle`: line items in document order.
    #[serde(rename = "Detalle")]
    pub lines: Vec<LineItem>,
}

impl Document {
    /// Known SII document type, if `TipoDTE` is a recognised integer code.
    pub fn kind(&self) -> Option<DteKind> {
        self.doc_type
            .as_ref()
            .and_then(Numeric::as_int)
            .and_then(|code| u16::try_from(code).ok())
            .and_then(DteKind::from_code)
    }
}

/// `Detalle`: one invoice line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// `NroLinDet`: line number.
    #[serde(rename = "NroLinDet")]
    pub line_number: Option<Numeric>,
    /// `CdgItem/TpoCodigo`: item code type (e.g. "INT1", "EAN13").
    #[serde(rename = "TpoCodigo")]
    pub code_type: Option<String>,
    /// `CdgItem/VlrCodigo`: item code value.
    #[serde(rename = "VlrCodigo")]
    pub code_value: Option<String>,
    /// `NmbItem`: item name.
    #[serde(rename = "NmbItem")]
    pub name: Option<String>,
    /// `DscItem`: item description.
    #[serde(rename = "DscItem")]
    pub description: Option<String>,
    /// `QtyItem`: quantity.
    #[serde(rename = "QtyItem")]
    pub quantity: Option<Numeric>,
    /// `PrcItem`: unit price.
    #[serde(rename = "PrcItem")]
    pub price: Option<Numeric>,
    /// `MontoItem`: line amount.
    #[serde(rename = "MontoItem")]
    pub amount: Option<Numeric>,
}

/// A numeric field after lenient coercion.
///
/// Text that cannot be read as a number is kept verbatim so the value stays
/// readable in exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    /// Parsed integer (fractional input is truncated toward zero).
    Int(i64),
    /// Trimmed source text that is not a number.
    Raw(String),
}

impl Numeric {
    /// The integer value, if coercion succeeded.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Raw(_) => None,
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Numeric {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// One exported line: a [`LineItem`] with its parent document's identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Folio of the parent document.
    #[serde(rename = "Folio")]
    pub folio: Option<Numeric>,
    /// Document type code of the parent document.
    #[serde(rename = "TipoDTE")]
    pub doc_type: Option<Numeric>,
    /// The line item itself; its fields serialize inline.
    #[serde(flatten)]
    pub line: LineItem,
}

impl Row {
    /// Flatten a document into one row per line item, in line order.
    pub fn from_document(doc: &Document) -> impl Iterator<Item = Row> + '_ {
        doc.lines.iter().map(|line| Row {
            folio: doc.folio.clone(),
            doc_type: doc.doc_type.clone(),
            line: line.clone(),
        })
    }

    /// Flatten a sequence of documents, keeping document then line order.
    pub fn from_documents(docs: &[Document]) -> Vec<Row> {
        docs.iter().flat_map(Row::from_document).collect()
    }
}

/// SII document type codes (`TipoDTE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DteKind {
    /// 33 — Factura electrónica.
    Factura,
    /// 34 — Factura no afecta o exenta electrónica.
    FacturaExenta,
    /// 39 — Boleta electrónica.
    Boleta,
    /// 41 — Boleta exenta electrónica.
    BoletaExenta,
    /// 43 — Liquidación factura electrónica.
    LiquidacionFactura,
    /// 46 — Factura de compra electrónica.
    FacturaCompra,
    /// 52 — Guía de despacho electrónica.
    GuiaDespacho,
    /// 56 — Nota de débito electrónica.
    NotaDebito,
    /// 61 — Nota de crédito electrónica.
    NotaCredito,
    /// 110 — Factura de exportación electrónica.
    FacturaExportacion,
    /// 111 — Nota de débito de exportación electrónica.
    NotaDebitoExportacion,
    /// 112 — Nota de crédito de exportación electrónica.
    NotaCreditoExportacion,
}

impl DteKind {
    /// SII numeric code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Factura => 33,
            Self::FacturaExenta => 34,
            Self::Boleta => 39,
            Self::BoletaExenta => 41,
            Self::LiquidacionFactura => 43,
            Self::FacturaCompra => 46,
            Self::GuiaDespacho => 52,
            Self::NotaDebito => 56,
            Self::NotaCredito => 61,
            Self::FacturaExportacion => 110,
            Self::NotaDebitoExportacion => 111,
            Self::NotaCreditoExportacion => 112,
        }
    }

    /// Parse from SII numeric code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            33 => Some(Self::Factura),
            34 => Some(Self::FacturaExenta),
            39 => Some(Self::Boleta),
            41 => Some(Self::BoletaExenta),
            43 => Some(Self::LiquidacionFactura),
            46 => Some(Self::FacturaCompra),
            52 => Some(Self::GuiaDespacho),
            56 => Some(Self::NotaDebito),
            61 => Some(Self::NotaCredito),
            110 => Some(Self::FacturaExportacion),
            111 => Some(Self::NotaDebitoExportacion),
            112 => Some(Self::NotaCreditoExportacion),
            _ => None,
        }
    }

    /// Spanish label as used on printed documents.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Factura => "Factura electrónica",
            Self::FacturaExenta => "Factura exenta electrónica",
            Self::Boleta => "Boleta electrónica",
            Self::BoletaExenta => "Boleta exenta electrónica",
            Self::LiquidacionFactura => "Liquidación factura electrónica",
            Self::FacturaCompra => "Factura de compra electrónica",
            Self::GuiaDespacho => "Guía de despacho electrónica",
            Self::NotaDebito => "Nota de débito electrónica",
            Self::NotaCredito => "Nota de crédito electrónica",
            Self::FacturaExportacion => "Factura de exportación electrónica",
            Self::NotaDebitoExportacion => "Nota de débito de exportación electrónica",
            Self::NotaCreditoExportacion => "Nota de crédito de exportación electrónica",
        }
    }
}
