//! Wrangle command - catalog a directory tree.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use rodeo::{Catalog, Rodeo, TableKind};

pub fn run(
    root: PathBuf,
    json_output: bool,
    out: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !root.exists() {
        return Err(format!("Directory not found: {}", root.display()).into());
    }

    let rodeo = Rodeo::new();
    let catalog = rodeo.wrangle(&root)?;

    let rendered = if json_output {
        serde_json::to_string_pretty(&catalog)?
    } else {
        render_ddl(&catalog, verbose)
    };

    match &out {
        Some(path) => {
            fs::write(path, &rendered)?;
            eprintln!(
                "{} {} tables to {}",
                "Wrote".green().bold(),
                catalog.len(),
                path.display()
            );
        }
        None => println!("{}", rendered),
    }

    if !catalog.skipped.is_empty() {
        eprintln!();
        eprintln!(
            "{} {} file(s):",
            "Skipped".yellow().bold(),
            catalog.skipped.len()
        );
        for skipped in &catalog.skipped {
            eprintln!(
                "  {} {}",
                skipped.path.display().to_string().white(),
                skipped.reason.dimmed()
            );
        }
    }

    Ok(())
}

/// One CREATE command per table, directory tables first.
fn render_ddl(catalog: &Catalog, verbose: bool) -> String {
    let mut out = String::new();
    for table in catalog.tables() {
        if verbose {
            let owner = catalog
                .predictor_for(&table.name)
                .map(|p| p.to_string())
                .unwrap_or_else(|| "none".to_string());
            out.push_str(&format!(
                "-- {} ({}), predictor: {}\n",
                table.source().display(),
                match table.kind {
                    TableKind::Directory => "directory",
                    TableKind::Standalone => "standalone",
                },
                owner
            ));
        }
        out.push_str(&table.descriptor().create_command());
        out.push_str("\n\n");
    }
    out.trim_end().to_string()
}
