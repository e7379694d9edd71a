//! Example: Catalog a directory tree with Rodeo.
//!
//! Usage:
//!   cargo run --example catalog -- <directory>

use std::env;
use std::path::Path;

use rodeo::Rodeo;

fn main() -> rodeo::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example catalog -- <directory>");
        std::process::exit(1);
    }

    let root = Path::new(&args[1]);
    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Rodeo Catalog: {}", root.display());
    println!("{}", separator);

    let rodeo = Rodeo::new();
    let catalog = rodeo.wrangle(root)?;

    for table in catalog.tables() {
        println!();
        println!("{}", table.descriptor().create_command());
        if let Some(predictor) = catalog.predictor_for(&table.name) {
            println!("-- enriched by: {}", predictor);
        }
    }

    if !catalog.skipped.is_empty() {
        println!();
        println!("Skipped:");
        for skipped in &catalog.skipped {
            println!("  {} ({})", skipped.path.display(), skipped.reason);
        }
    }

    Ok(())
}
