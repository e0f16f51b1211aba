// ordfix/src/commands/validate.rs
//
// USE CASE: Check the registry snapshot before a batch runs against it.

use std::path::PathBuf;

use anyhow::Context;
use ordfix_core::application::{ValidationSettings, validate_snapshot};
use ordfix_core::infrastructure::config::load_raw_snapshot;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir);
    let registry_path = project_dir.join(&config.registry);

    println!("🔍 Validating {}", registry_path.display());
    let raw = load_raw_snapshot(&registry_path)
        .with_context(|| format!("Failed to load snapshot {:?}", registry_path))?;

    let report = validate_snapshot(&raw, &ValidationSettings::from(&config));

    for warning in &report.warnings {
        println!("   ⚠️  {}", warning);
    }
    for error in &report.errors {
        println!("   ❌ {}", error);
    }

    let summary = &report.summary;
    let quality = &report.quality;
    println!("\n📊 Orders: {} | Rules: {}", summary.orders, summary.rules);
    println!(
        "   Agency codes: {} | Position codes: {} | Socio categories: {}",
        summary.agency_codes, summary.position_codes, summary.socio_categories
    );
    println!("📈 Data quality:");
    println!("   - With position code: {}/{}", quality.with_position_code, summary.orders);
    println!("   - With cost center:   {}/{}", quality.with_cost_center, summary.orders);
    println!("   - With start date:    {}/{}", quality.with_start_date, summary.orders);
    if !report.agency_codes.is_empty() {
        println!("🏢 Agencies: {}", report.agency_codes.join(", "));
    }

    if !report.is_valid() {
        eprintln!("\n❌ FAILURE. {} error(s) in snapshot.", report.errors.len());
        std::process::exit(1);
    }

    println!("\n✨ Snapshot is valid");
    Ok(())
}
