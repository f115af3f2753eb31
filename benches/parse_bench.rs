use criterion::{Criterion, black_box, criterion_group, criterion_main};

use sii_dte::Row;
use sii_dte::export::{CsvConfig, SourceFile, convert_batch, rows_to_csv};
use sii_dte::parse::{XmlTree, locate, parse_documents};

/// `EnvioDTE` with `docs` facturas of `lines` line items each.
fn build_envio(docs: usize, lines: usize) -> Vec<u8> {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<EnvioDTE xmlns="http://www.sii.cl/SiiDte" version="1.0"><SetDTE ID="SetDoc">
<Caratula version="1.0"><RutEmisor>76123456-7</RutEmisor><RutEnvia>11111111-1</RutEnvia></Caratula>"#,
    );
    for d in 1..=docs {
        xml.push_str(&format!(
            r#"<DTE version="1.0"><Documento ID="F{d}T33"><Encabezado><IdDoc>
<TipoDTE>33</TipoDTE><Folio>{d}</Folio><FchEmis>2024-06-15</FchEmis></IdDoc>
<Emisor><RUTEmisor>76123456-7</RUTEmisor><RznSoc>Bench SpA</RznSoc></Emisor></Encabezado>"#
        ));
        for l in 1..=lines {
            xml.push_str(&format!(
                "<Detalle><NroLinDet>{l}</NroLinDet><CdgItem><TpoCodigo>INT1</TpoCodigo>\
                 <VlrCodigo>SKU-{l:04}</VlrCodigo></CdgItem><NmbItem>Item {l}</NmbItem>\
                 <DscItem>Descripcion del item {l}</DscItem><QtyItem>2</QtyItem>\
                 <PrcItem>9990</PrcItem><MontoItem>19980</MontoItem></Detalle>"
            ));
        }
        xml.push_str("<TED version=\"1.0\"><DD><RE>76123456-7</RE></DD></TED></Documento></DTE>");
    }
    xml.push_str("</SetDTE></EnvioDTE>");
    xml.into_bytes()
}

fn bench_parse_small(c: &mut Criterion) {
    let xml = build_envio(1, 10);
    c.bench_function("parse_1_doc_10_lines", |b| {
        b.iter(|| black_box(parse_documents(black_box(&xml))));
    });
}

fn bench_parse_large(c: &mut Criterion) {
    let xml = build_envio(100, 50);
    c.bench_function("parse_100_docs_50_lines", |b| {
        b.iter(|| black_box(parse_documents(black_box(&xml))));
    });
}

fn bench_tree_and_locate(c: &mut Criterion) {
    let xml = build_envio(100, 50);
    let tree = XmlTree::parse(&xml).unwrap();
    c.bench_function("tree_parse_100_docs", |b| {
        b.iter(|| black_box(XmlTree::parse(black_box(&xml))));
    });
    c.bench_function("locate_100_docs", |b| {
        b.iter(|| black_box(locate(black_box(&tree)).nodes.len()));
    });
}

fn bench_csv_export(c: &mut Criterion) {
    let docs = parse_documents(&build_envio(100, 50)).unwrap();
    let rows = Row::from_documents(&docs);
    let config = CsvConfig::default();
    c.bench_function("csv_5000_rows", |b| {
        b.iter(|| black_box(rows_to_csv(black_box(&rows), &config)));
    });
}

fn bench_batch(c: &mut Criterion) {
    let files: Vec<SourceFile> = (0..20)
        .map(|i| SourceFile::new(format!("envio_{i}.xml"), build_envio(5, 20)))
        .collect();
    let config = CsvConfig::default();
    c.bench_function("batch_20_files_merged", |b| {
        b.iter(|| black_box(convert_batch(black_box(&files)).merged_csv(&config)));
    });
}

criterion_group!(
    benches,
    bench_parse_small,
    bench_parse_large,
    bench_tree_and_locate,
    bench_csv_export,
    bench_batch,
);
criterion_main!(benches);
