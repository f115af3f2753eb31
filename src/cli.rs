//! Command-line interface: `sii-dte convert` and `sii-dte inspect`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::{Document, DteError, Numeric, Row};
use crate::export::{self, COLUMNS, CsvConfig, LineEnding, SourceFile};
use crate::parse::parse_documents;

/// Extract line items from SII EnvioDTE XML files into CSV.
#[derive(Parser)]
#[command(name = "sii-dte")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert XML files to CSV (one per file, plus optional merged CSV and ZIP).
    Convert {
        /// Input XML files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory for the per-file CSVs (default: current directory)
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Also write all rows into one merged CSV
        #[arg(long, value_name = "FILE")]
        merged: Option<PathBuf>,

        /// Also write a ZIP archive with the per-file CSVs
        #[arg(long, value_name = "FILE")]
        zip: Option<PathBuf>,

        /// Field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,

        /// Use CRLF line endings
        #[arg(long)]
        crlf: bool,

        /// Prefix CSV output with a UTF-8 byte order mark
        #[arg(long)]
        bom: bool,
    },
    /// Show the rows extracted from one XML file.
    Inspect {
        /// Input XML file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = InspectFormat::Table)]
        format: InspectFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InspectFormat {
    Table,
    Json,
}

/// Run the CLI.
pub fn run() -> Result<(), DteError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            files,
            out_dir,
            merged,
            zip,
            delimiter,
            crlf,
            bom,
        } => {
            let config = CsvConfig {
                delimiter,
                line_ending: if crlf { LineEnding::CrLf } else { LineEnding::Lf },
                utf8_bom: bom,
            };
            let outputs = Outputs {
                out_dir: out_dir.unwrap_or_else(|| PathBuf::from(".")),
                merged,
                zip,
            };
            convert_command(&files, &outputs, &config)
        }
        Commands::Inspect { file, format } => inspect_command(&file, format),
    }
}

struct Outputs {
    out_dir: PathBuf,
    merged: Option<PathBuf>,
    zip: Option<PathBuf>,
}

fn convert_command(
    paths: &[PathBuf],
    outputs: &Outputs,
    config: &CsvConfig,
) -> Result<(), DteError> {
    let mut sources = Vec::with_capacity(paths.len());
    let mut unreadable = 0usize;
    for path in paths {
        match std::fs::read(path) {
            Ok(bytes) => sources.push(SourceFile::new(display_name(path), bytes)),
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                unreadable += 1;
            }
        }
    }
    if sources.is_empty() {
        return Err(DteError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no input file could be read",
        )));
    }

    let outcome = export::convert_batch(&sources);
    for failure in &outcome.failures {
        eprintln!("{failure}");
    }

    if !outputs.out_dir.is_dir() {
        std::fs::create_dir_all(&outputs.out_dir)?;
    }
    for (name, csv) in outcome.per_file_csv(config) {
        let path = outputs.out_dir.join(&name);
        std::fs::write(&path, csv)?;
        tracing::info!(path = %path.display(), "wrote CSV");
    }

    if let Some(path) = &outputs.merged {
        std::fs::write(path, outcome.merged_csv(config))?;
        eprintln!("Merged CSV written to {}", path.display());
    }

    if let Some(path) = &outputs.zip {
        std::fs::write(path, export::to_zip(&outcome, config)?)?;
        eprintln!("ZIP archive written to {}", path.display());
    }

    eprintln!(
        "Converted {} file(s), {} row(s); {} failed",
        outcome.converted.len(),
        outcome.row_count(),
        outcome.failures.len() + unreadable
    );
    Ok(())
}

fn inspect_command(path: &Path, format: InspectFormat) -> Result<(), DteError> {
    let bytes = std::fs::read(path)?;
    let documents = parse_documents(&bytes)?;

    match format {
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&documents)
                .map_err(|e| DteError::Json(e.to_string()))?;
            println!("{json}");
        }
        InspectFormat::Table => {
            print!("{}", document_summary(&documents));
            print!("{}", format_table(&Row::from_documents(&documents)));
        }
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One `# <kind> <folio> (<n> lines)` line per document, then a blank line.
fn document_summary(documents: &[Document]) -> String {
    if documents.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for doc in documents {
        let kind = match (doc.kind(), &doc.doc_type) {
            (Some(kind), _) => kind.label().to_string(),
            (None, Some(code)) => format!("TipoDTE {code}"),
            (None, None) => "Documento".to_string(),
        };
        let folio = doc.folio.as_ref().map(ToString::to_string).unwrap_or_default();
        out.push_str(&format!("# {kind} {folio} ({} lines)\n", doc.lines.len()));
    }
    out.push('\n');
    out
}

/// Render rows as a left-aligned text table, absent values shown as blanks.
fn format_table(rows: &[Row]) -> String {
    let cells: Vec<[String; 10]> = rows.iter().map(row_cells).collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = COLUMNS.map(String::from);
    for line in std::iter::once(&header).chain(&cells) {
        let padded: Vec<String> = line
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn row_cells(row: &Row) -> [String; 10] {
    let num = |v: &Option<Numeric>| v.as_ref().map(ToString::to_string).unwrap_or_default();
    let text = |v: &Option<String>| v.clone().unwrap_or_default().replace('\n', " ");
    let line = &row.line;
    [
        num(&row.folio),
        num(&row.doc_type),
        num(&line.line_number),
        text(&line.code_type),
        text(&line.code_value),
        text(&line.name),
        text(&line.description),
        num(&line.quantity),
        num(&line.price),
        num(&line.amount),
    ]
}
