//! Fuzz target for CSV schema generation.
//!
//! Arbitrary bytes written to a `.csv` file must produce either a schema or
//! a file-scoped error, and every bonus column must carry the bonus prefix.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rodeo::{Parser, PredictorRegistry, SchemaOptions};
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let Ok(mut temp_file) = tempfile::Builder::new().suffix(".csv").tempfile() else {
        return;
    };
    if temp_file.write_all(data).is_err() {
        return;
    }

    let options = SchemaOptions::default();
    match rodeo::generate::extract_schema(
        temp_file.path(),
        &Parser::new(),
        &PredictorRegistry::new(),
        &options,
    ) {
        Ok(schema) => {
            for column in &schema.bonus {
                assert!(column.name.starts_with(&options.bonus_prefix));
            }
        }
        Err(e) => assert!(e.is_file_scoped()),
    }
});
