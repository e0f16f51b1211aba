// ordfix/src/commands/inspect.rs
//
// USE CASE: Look into the registry snapshot (metadata + statistics, or one order).

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use ordfix_core::domain::order::{OrderRecord, SourceField};
use ordfix_core::infrastructure::config::load_snapshot;

const ORDER_FIELDS: [SourceField; 12] = [
    SourceField::OrderId,
    SourceField::Client,
    SourceField::AgencyCode,
    SourceField::PositionCode,
    SourceField::SocioCategory,
    SourceField::PositionCoefficient,
    SourceField::CostCenterName,
    SourceField::CostCenterPrefix,
    SourceField::Siret,
    SourceField::SiteName,
    SourceField::StartDate,
    SourceField::EndDate,
];

pub fn execute(project_dir: PathBuf, order: Option<String>) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir);
    let registry_path = project_dir.join(&config.registry);

    let snapshot = load_snapshot(&registry_path, &config.excluded_site)
        .with_context(|| format!("Failed to load snapshot {:?}", registry_path))?;
    let registry = snapshot.registry();

    if let Some(order_id) = order {
        let Some(record) = registry.lookup(&order_id) else {
            anyhow::bail!("❌ Order {} not found in {}", order_id, registry_path.display());
        };
        println!("\n🔍 Order {}", record.order_id);
        println!("{}", order_table(record));
        return Ok(());
    }

    let meta = &snapshot.metadata;
    println!("\n🔍 Registry: {}", registry_path.display());
    println!(
        "   Client: {} | Version: {} | Updated: {}",
        meta.client.as_deref().unwrap_or("-"),
        meta.version.as_deref().unwrap_or("-"),
        meta.last_updated.as_deref().unwrap_or("-")
    );
    println!(
        "   Orders: {} | Rules shipped: {}",
        registry.len(),
        snapshot.rules.len()
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Agency", "Orders"]);
    for (agency, count) in registry.agencies() {
        table.add_row(vec![agency, count.to_string()]);
    }
    println!("{table}");

    let stats = &snapshot.statistics;
    println!("💼 Position codes: {}", stats.position_codes.join(", "));
    println!("👥 Socio categories: {}", stats.socio_categories.join(", "));
    Ok(())
}

fn order_table(record: &OrderRecord) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Field", "Value"]);
    for field in ORDER_FIELDS {
        table.add_row(vec![
            field.to_string(),
            record.value(field).unwrap_or("-").to_string(),
        ]);
    }
    table.add_row(vec!["site_flag".to_string(), record.site_flag.to_string()]);
    table
}
