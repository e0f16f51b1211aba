// ordfix/src/commands/snapshot.rs
//
// USE CASE: Build the registry snapshot from a sheet export.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use ordfix_core::application::{SnapshotSettings, build_snapshot};
use ordfix_core::infrastructure::config::{load_sheet_values, save_snapshot};

pub fn execute(project_dir: PathBuf, values: PathBuf, out: Option<PathBuf>) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir);
    let target = out.unwrap_or_else(|| project_dir.join(&config.registry));

    println!("📥 Reading sheet export {}", values.display());
    let rows = load_sheet_values(&values)
        .with_context(|| format!("Failed to read sheet export {:?}", values))?;
    let data_rows = rows.len().saturating_sub(1);

    let snapshot = build_snapshot(&rows, &SnapshotSettings::from(&config), Local::now());
    let skipped = data_rows.saturating_sub(snapshot.orders.len());
    if skipped > 0 {
        println!("   ⚠️  {} row(s) without order number ignored", skipped);
    }

    save_snapshot(&target, &snapshot)
        .with_context(|| format!("Failed to write snapshot {:?}", target))?;

    let stats = &snapshot.statistics;
    println!("📝 {} order(s) written to {}", stats.total_orders, target.display());
    if !stats.agency_codes.is_empty() {
        println!("🏢 Agencies: {}", stats.agency_codes.join(", "));
    }
    println!("💼 Position codes: {} unique", stats.position_codes.len());
    Ok(())
}
