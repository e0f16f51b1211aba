// ordfix/src/commands/rules.rs
//
// USE CASE: Show which rules a correction run would apply.

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use ordfix_core::application::resolve_rules;
use ordfix_core::domain::order::Snapshot;
use ordfix_core::infrastructure::config::load_snapshot;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir);
    let registry_path = project_dir.join(&config.registry);

    // Without a snapshot the table still resolves from config or built-ins.
    let snapshot = if registry_path.exists() {
        load_snapshot(&registry_path, &config.excluded_site)
            .with_context(|| format!("Failed to load snapshot {:?}", registry_path))?
    } else {
        println!("   ⚠️  No snapshot at {}", registry_path.display());
        Snapshot::default()
    };

    let (rules, origin) = resolve_rules(&config, &snapshot).context("Invalid rule table")?;
    println!("\n📋 {} rule(s) from {} (missing field: {})", rules.len(), origin, config.missing_field);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rule", "Target", "Source", "Condition", "Insert"]);
    for rule in rules.iter() {
        table.add_row(vec![
            rule.name.clone(),
            rule.target.to_string(),
            rule.source_field.to_string(),
            rule.condition.to_string(),
            rule.insert.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
