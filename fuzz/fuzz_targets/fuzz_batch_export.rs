#![no_main]

use libfuzzer_sys::fuzz_target;
use sii_dte::export::{CsvConfig, SourceFile, convert_batch};

fuzz_target!(|data: &[u8]| {
    // Split the input into up to three files to exercise failure isolation.
    let files: Vec<SourceFile> = data
        .splitn(3, |b| *b == 0)
        .enumerate()
        .map(|(i, chunk)| SourceFile::new(format!("f{i}.xml"), chunk))
        .collect();
    let outcome = convert_batch(&files);
    assert_eq!(outcome.converted.len() + outcome.failures.len(), files.len());
    let _ = outcome.merged_csv(&CsvConfig::default());
    let _ = sii_dte::export::to_zip(&outcome, &CsvConfig::default());
});
