//! CSV rendering of exported rows.
//!
//! Fields are quoted only when they contain the delimiter, a double quote or
//! a line break. Absent values are empty fields.

use serde::{Deserialize, Serialize};

use crate::core::{Numeric, Row};

/// Column headers in output order.
pub const COLUMNS: [&str; 10] = [
    "Folio",
    "TipoDTE",
    "NroLinDet",
    "TpoCodigo",
    "VlrCodigo",
    "NmbItem",
    "DscItem",
    "QtyItem",
    "PrcItem",
    "MontoItem",
];

/// Line terminator used between records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Configuration for CSV output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Field separator.
    pub delimiter: char,
    /// Record terminator.
    pub line_ending: LineEnding,
    /// Prefix the output with a UTF-8 byte order mark (helps spreadsheet
    /// applications detect the encoding of accented item names).
    pub utf8_bom: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            line_ending: LineEnding::Lf,
            utf8_bom: false,
        }
    }
}

/// Render rows as CSV with a single header line.
pub fn rows_to_csv<'a, I>(rows: I, config: &CsvConfig) -> String
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut out = String::new();
    if config.utf8_bom {
        out.push('\u{FEFF}');
    }
    write_record(&mut out, COLUMNS.iter().map(|c| Some(*c)), config);
    for row in rows {
        write_row(&mut out, row, config);
    }
    out
}

fn write_row(out: &mut String, row: &Row, config: &CsvConfig) {
    let line = &row.line;
    let numeric = |v: &Option<Numeric>| v.as_ref().map(Numeric::to_string);
    let fields = [
        numeric(&row.folio),
        numeric(&row.doc_type),
        numeric(&line.line_number),
        line.code_type.clone(),
        line.code_value.clone(),
        line.name.clone(),
        line.description.clone(),
        numeric(&line.quantity),
        numeric(&line.price),
        numeric(&line.amount),
    ];
    write_record(out, fields.iter().map(|f| f.as_deref()), config);
}

fn write_record<'a>(
    out: &mut String,
    fields: impl Iterator<Item = Option<&'a str>>,
    config: &CsvConfig,
) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(config.delimiter);
        }
        if let Some(value) = field {
            csv_field(out, value, config.delimiter);
        }
    }
    out.push_str(config.line_ending.as_str());
}

fn csv_field(out: &mut String, value: &str, delimiter: char) {
    let needs_quotes = value
        .chars()
        .any(|ch| ch == delimiter || ch == '"' || ch == '\n' || ch == '\r');
    if !needs_quotes {
        out.push_str(value);
        return;
    }
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}
