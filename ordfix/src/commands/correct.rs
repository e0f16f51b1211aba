// ordfix/src/commands/correct.rs
//
// USE CASE: Correct a batch of XML order documents.

use std::path::PathBuf;

use anyhow::Context;
use ordfix_core::application::{CorrectionOptions, ProcessedDocument, run_correction};
use ordfix_core::domain::correction::DocumentState;
use ordfix_core::infrastructure::FsDocumentSink;
use ordfix_core::infrastructure::config::JsonSnapshotSource;
use ordfix_core::infrastructure::fs::{discover_xml_files, read_documents};
use tracing::debug;

pub fn execute(
    project_dir: PathBuf,
    inputs: Vec<PathBuf>,
    agency: Option<String>,
    dry_run: bool,
    strict: bool,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Config
    let config = super::load_config(&project_dir);
    let registry_path = project_dir.join(&config.registry);
    let output_dir = project_dir.join(&config.output_dir);

    // B. Inputs (never the output directory itself)
    println!("📂 Collecting documents...");
    let files = discover_xml_files(&inputs, Some(&output_dir))
        .with_context(|| format!("Failed to collect input documents from {:?}", inputs))?;
    debug!(files = ?files, "Inputs collected");
    let documents = read_documents(&files).context("Failed to read input documents")?;
    println!("   {} document(s) found", documents.len());

    // C. Run (Application Layer)
    println!("📚 Registry: {}", registry_path.display());
    let snapshot_source = JsonSnapshotSource::new(&registry_path, &config.excluded_site);
    let sink = FsDocumentSink::new(&output_dir);
    let options = CorrectionOptions { agency, dry_run };

    let report = run_correction(&config, &snapshot_source, &sink, &documents, &options)
        .with_context(|| format!("Correction failed for project {:?}", project_dir))?;
    println!("📋 Rules: {} from {}", report.rules.len(), report.rules_origin);

    // D. Per-document lines
    for doc in &report.batch.documents {
        println!("{}", describe(doc));
    }

    let summary = &report.batch.summary;
    println!("\n📊 {}", summary);
    if dry_run {
        println!("🧪 Dry run: nothing written");
    } else {
        println!(
            "💾 Outputs in {} (report: {})",
            output_dir.display(),
            config.report_file
        );
    }

    if strict && summary.documents_skipped() > 0 {
        eprintln!(
            "\n❌ FAILURE. {} document(s) not corrected.",
            summary.documents_skipped()
        );
        std::process::exit(1);
    }

    println!("\n✨ Done in {:.2?}", start.elapsed());
    Ok(())
}

fn describe(doc: &ProcessedDocument) -> String {
    let order = doc.order_id.as_deref().unwrap_or("-");
    match doc.state {
        DocumentState::Corrected => {
            let warnings: usize = doc.log.iter().map(|e| e.outcome.warnings().len()).sum();
            let applied = doc.log.iter().filter(|e| e.outcome.is_applied()).count();
            format!(
                "   ✅ {} [{}] {} rule(s) applied{} -> {}",
                doc.id,
                order,
                applied,
                if warnings > 0 {
                    format!(", ⚠️  {} warning(s)", warnings)
                } else {
                    String::new()
                },
                doc.output_file.as_deref().unwrap_or("-")
            )
        }
        state => {
            let detail = doc
                .log
                .iter()
                .rev()
                .find_map(|e| e.detail.as_deref())
                .unwrap_or_default();
            format!("   ⏭️  {} [{}] {}: {}", doc.id, order, state, detail)
        }
    }
}
