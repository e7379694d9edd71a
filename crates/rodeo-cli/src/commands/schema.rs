//! Schema command - generate the schema of one structured file.

use std::path::PathBuf;

use colored::Colorize;
use rodeo::Rodeo;

pub fn run(file: PathBuf, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let rodeo = Rodeo::new();
    let schema = rodeo.generate_schema(&file)?;

    println!("{} {}", "Schema for".cyan().bold(), file.display().to_string().white());
    println!();

    println!("{}", "Primary columns:".yellow().bold());
    for (column, source) in schema.primary.iter().zip(&schema.primary_sources) {
        if verbose {
            println!("  {:<30} {:<8} (column {})", column.name, column.column_type, source + 1);
        } else {
            println!("  {:<30} {}", column.name, column.column_type);
        }
    }

    if schema.bonus.is_empty() {
        println!();
        println!("{}", "No bonus columns.".dimmed());
        return Ok(());
    }

    println!();
    println!("{}", "Bonus columns:".yellow().bold());
    for column in &schema.bonus {
        let owner = schema
            .bonus_sources
            .get(&column.name)
            .map(|s| s.predictor.to_string())
            .unwrap_or_default();
        println!(
            "  {:<30} {:<8} {}",
            column.name,
            column.column_type,
            format!("[{}]", owner).green()
        );
    }

    Ok(())
}
