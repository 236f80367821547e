mod commands;
mod logging;
mod progress;

use std::path::Path;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use inventory_audit_core::{report, AppConfig, AuditEngine, AuditSummary, Error};
use progress::CliReporter;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let mut config = match inventory_audit_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    if let Some(db) = args.db {
        config.database_path = db;
    }

    let outcome = match args.command {
        Some(Commands::Scan { root, export }) => run_scan(&config, &root, export),
        Some(Commands::Report) => run_report(&config),
        Some(Commands::Summary) => run_summary(&config),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_scan(config: &AppConfig, root: &Path, export: bool) -> anyhow::Result<()> {
    let engine = AuditEngine::new(config.clone());
    let reporter = CliReporter::new();

    let result = match engine.scan(root, &reporter) {
        Ok(result) => result,
        Err(Error::RootNotFound(path)) => {
            eprintln!("{} {}", "Root directory not found:".red(), path.display());
            process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    println!();
    info!(
        "Crawled {} in {}",
        result.root.display(),
        format!("{:.2}s", result.crawl_duration.as_secs_f64()).green(),
    );
    info!(
        "{} stored, {} unreadable, {} skipped, {} directories abandoned",
        format!("{}", result.stats.stored).green(),
        format!("{}", result.stats.unreadable).yellow(),
        format!("{}", result.stats.skipped()).yellow(),
        format!("{}", result.stats.directories_abandoned).yellow(),
    );
    print_summary(&result.summary);

    if export {
        let db = engine.open_store()?;
        export_csv(&db, config)?;
    }

    Ok(())
}

fn run_report(config: &AppConfig) -> anyhow::Result<()> {
    let db = AuditEngine::new(config.clone())
        .open_store()
        .with_context(|| format!("opening {}", config.database_path))?;
    export_csv(&db, config)
}

fn run_summary(config: &AppConfig) -> anyhow::Result<()> {
    let db = AuditEngine::new(config.clone())
        .open_store()
        .with_context(|| format!("opening {}", config.database_path))?;
    let summary = AuditSummary::collect(&db)?;
    print_summary(&summary);
    Ok(())
}

fn export_csv(db: &inventory_audit_core::Database, config: &AppConfig) -> anyhow::Result<()> {
    match report::export_inventory_csv(db, Path::new(&config.report_dir))? {
        Some(path) => println!("Inventory exported to {}", path.display().to_string().cyan()),
        None => println!("{}", "No inventory data to export".yellow()),
    }
    Ok(())
}

fn print_summary(summary: &AuditSummary) {
    println!();
    println!("{}", "Audit summary".bold());
    println!("  Files inventoried:   {}", summary.total_entries);
    println!(
        "  Trash:               {} files, {}",
        format!("{}", summary.trash.count).red(),
        format_bytes(summary.trash.total_bytes).red(),
    );
    println!(
        "  Duplicate groups:    {}, {} wasted",
        format!("{}", summary.duplicate_groups).red(),
        format_bytes(summary.duplicate_wasted_bytes).red(),
    );
    println!(
        "  Reclaimable:         {}",
        format_bytes(summary.reclaimable.total()).green().bold(),
    );

    if !summary.top_duplicates.is_empty() {
        println!();
        println!("{}", "Largest duplicate groups".bold());
        for group in &summary.top_duplicates {
            println!(
                "  {} x{} ({} wasted)",
                &group.content_hash[..group.content_hash.len().min(12)],
                group.file_count,
                format_bytes(group.wasted_bytes),
            );
            for path in &group.paths {
                println!("      {}", path.dimmed());
            }
        }
    }
}

fn format_bytes(bytes: i64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_scan_subcommand_parses() {
        let cli = Cli::parse_from(["inventory-audit", "--db", "x.sqlite", "scan", "/data", "--export"]);
        assert_eq!(cli.db.as_deref(), Some("x.sqlite"));
        match cli.command {
            Some(Commands::Scan { root, export }) => {
                assert_eq!(root, Path::new("/data"));
                assert!(export);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
