use sii_dte::export::{CsvConfig, LineEnding, SourceFile, convert_batch, to_zip};

fn factura(folio: u32, item: &str, amount: u32) -> String {
    format!(
        r#"<DTE xmlns="http://www.sii.cl/SiiDte" version="1.0"><Documento>
  <Encabezado><IdDoc><TipoDTE>33</TipoDTE><Folio>{folio}</Folio></IdDoc></Encabezado>
  <Detalle><NroLinDet>1</NroLinDet><NmbItem>{item}</NmbItem><MontoItem>{amount}</MontoItem></Detalle>
</Documento></DTE>"#
    )
}

fn main() {
    let files = vec![
        SourceFile::new("dte_1001.xml", factura(1001, "Arriendo oficina", 450000)),
        SourceFile::new("dte_roto.xml", "<DTE><Documento>"),
        SourceFile::new("dte_1002.xml", factura(1002, "Gastos comunes", 85000)),
    ];

    let outcome = convert_batch(&files);
    for failure in &outcome.failures {
        println!("Failed: {failure}");
    }

    // ── Merged CSV ───────────────────────────────────────────────────
    let config = CsvConfig {
        delimiter: ';',
        line_ending: LineEnding::CrLf,
        utf8_bom: true,
    };
    println!("\n=== Merged CSV ===");
    print!("{}", outcome.merged_csv(&config).trim_start_matches('\u{FEFF}'));

    // ── Per-file CSVs and ZIP ────────────────────────────────────────
    println!("\n=== Per-file ===");
    for (name, csv) in outcome.per_file_csv(&config) {
        println!("  {name}: {} bytes", csv.len());
    }
    match to_zip(&outcome, &config) {
        Ok(bytes) => println!("  archive: {} bytes", bytes.len()),
        Err(e) => println!("  archive failed: {e}"),
    }
}
