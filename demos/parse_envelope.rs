use sii_dte::parse::{XmlTree, extract, locate};

const ENVIO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<EnvioDTE xmlns="http://www.sii.cl/SiiDte" version="1.0">
  <SetDTE ID="SetDoc">
    <Caratula version="1.0"><RutEmisor>76123456-7</RutEmisor></Caratula>
    <DTE version="1.0">
      <Documento ID="F501T33">
        <Encabezado>
          <IdDoc><TipoDTE>33</TipoDTE><Folio>501</Folio></IdDoc>
        </Encabezado>
        <Detalle>
          <NroLinDet>1</NroLinDet>
          <CdgItem><TpoCodigo>INT1</TpoCodigo><VlrCodigo>CEM-25</VlrCodigo></CdgItem>
          <NmbItem>Cemento 25 kg</NmbItem>
          <QtyItem>40</QtyItem>
          <PrcItem>5490</PrcItem>
          <MontoItem>219600</MontoItem>
        </Detalle>
        <Detalle>
          <NroLinDet>2</NroLinDet>
          <NmbItem>Despacho</NmbItem>
          <QtyItem>1.0</QtyItem>
          <PrcItem>por confirmar</PrcItem>
        </Detalle>
      </Documento>
    </DTE>
  </SetDTE>
</EnvioDTE>"#;

fn main() {
    // ── 1. Parse and locate ──────────────────────────────────────────
    let tree = match XmlTree::parse(ENVIO.as_bytes()) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    let located = locate(&tree);
    println!("Shape: {:?}, {} document(s)", located.shape, located.nodes.len());

    // ── 2. Extract ───────────────────────────────────────────────────
    for node in located.nodes {
        let doc = extract(node);
        let kind = doc.kind().map(|k| k.label()).unwrap_or("Documento");
        let folio = doc.folio.as_ref().map(ToString::to_string).unwrap_or_default();
        println!("\n{kind} N° {folio}");
        for line in &doc.lines {
            println!(
                "  #{:<3} {:<20} qty={:<6} price={}",
                line.line_number.as_ref().map(ToString::to_string).unwrap_or_default(),
                line.name.as_deref().unwrap_or("-"),
                line.quantity.as_ref().map(ToString::to_string).unwrap_or_default(),
                line.price.as_ref().map(ToString::to_string).unwrap_or_default(),
            );
        }
    }

    // ── 3. Malformed input ───────────────────────────────────────────
    println!("\n=== Malformed input ===");
    match XmlTree::parse(b"<EnvioDTE><SetDTE></EnvioDTE>") {
        Ok(_) => println!("  unexpectedly parsed"),
        Err(e) => println!("  {e}"),
    }
}
