// ordfix-core/src/application/correct.rs

use chrono::Local;
use serde::Serialize;
use std::fmt;
use tracing::{info, instrument, warn};

use crate::application::batch::{BatchOrchestrator, BatchReport};
use crate::domain::correction::{DocumentState, LogEntry, RuleApplicator, SkipReason};
use crate::domain::document::{OutputNames, SourceDocument, output_file_name};
use crate::domain::error::DomainError;
use crate::domain::order::Snapshot;
use crate::domain::project::CorrectorConfig;
use crate::domain::rules::RuleTable;
use crate::error::CorrectorError;
use crate::ports::{DocumentSink, SnapshotSource};

/// Where the active rule table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOrigin {
    Config,
    Snapshot,
    Builtin,
}

impl fmt::Display for RuleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Config => "project configuration",
            Self::Snapshot => "registry snapshot",
            Self::Builtin => "built-in table",
        };
        write!(f, "{}", s)
    }
}

/// Configured rules win over the snapshot's, which win over the built-in
/// table.
pub fn resolve_rules(
    config: &CorrectorConfig,
    snapshot: &Snapshot,
) -> Result<(RuleTable, RuleOrigin), DomainError> {
    if !config.rules.is_empty() {
        return Ok((RuleTable::new(config.rules.clone())?, RuleOrigin::Config));
    }
    if !snapshot.rules.is_empty() {
        return Ok((RuleTable::new(snapshot.rules.clone())?, RuleOrigin::Snapshot));
    }
    Ok((RuleTable::default(), RuleOrigin::Builtin))
}

#[derive(Debug, Clone, Default)]
pub struct CorrectionOptions {
    pub agency: Option<String>,
    /// Process and report without writing anything.
    pub dry_run: bool,
}

/// JSON correction report written next to the corrected documents.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionReport {
    pub generated_at: String,
    pub client: String,
    pub rules_origin: RuleOrigin,
    pub rules: Vec<String>,
    pub dry_run: bool,
    #[serde(flatten)]
    pub batch: BatchReport,
}

#[instrument(skip_all, fields(documents = documents.len(), dry_run = options.dry_run))]
pub fn run_correction<S, K>(
    config: &CorrectorConfig,
    snapshot_source: &S,
    sink: &K,
    documents: &[SourceDocument],
    options: &CorrectionOptions,
) -> Result<CorrectionReport, CorrectorError>
where
    S: SnapshotSource,
    K: DocumentSink,
{
    // 1. Reference data
    let snapshot = snapshot_source.load()?;
    let registry = snapshot.registry();
    let (rules, rules_origin) = resolve_rules(config, &snapshot)?;
    let locator = config.locator()?;
    info!(
        orders = registry.len(),
        rules = rules.len(),
        origin = %rules_origin,
        "Reference data ready"
    );

    // 2. Batch (pure, in memory)
    let batch = BatchOrchestrator::new(
        &registry,
        &rules,
        &locator,
        RuleApplicator::new(config.missing_field),
    )
    .with_agency_filter(options.agency.clone());
    let mut report = batch.process(documents);

    // 3. Outputs. Inputs are never overwritten, and a failed write only
    // affects its own document.
    let mut names = OutputNames::new(&config.output_suffix, [config.report_file.clone()]);
    let mut write_failures = 0;
    for processed in report.documents.iter_mut() {
        let Some(output) = processed.output.take() else {
            continue;
        };
        let name = names.claim(&processed.id);
        if name != output_file_name(&processed.id, &config.output_suffix) {
            warn!(document = %processed.id, output = %name, "Output name already taken in this batch");
        }

        if !options.dry_run
            && let Err(e) = sink.write(&name, output.as_bytes())
        {
            warn!(document = %processed.id, output = %name, error = %e, "Output could not be written");
            processed.state = DocumentState::WriteFailure;
            processed.log.push(LogEntry::for_document(
                &processed.id,
                SkipReason::WriteFailure,
                e.to_string(),
            ));
            write_failures += 1;
            continue;
        }

        processed.output = Some(output);
        processed.output_file = Some(name);
    }
    if write_failures > 0 {
        report.recount();
    }

    let report = CorrectionReport {
        generated_at: Local::now().to_rfc3339(),
        client: config.client.clone(),
        rules_origin,
        rules: rules.names().into_iter().map(str::to_string).collect(),
        dry_run: options.dry_run,
        batch: report,
    };

    if !options.dry_run {
        let json = serde_json::to_vec_pretty(&report)?;
        sink.write(&config.report_file, &json)?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::correction::RuleOutcome;
    use crate::domain::order::OrderRecord;
    use crate::domain::rules::{CorrectionRule, TargetPath};
    use crate::domain::order::SourceField;
    use anyhow::Result;
    use std::sync::{Arc, Mutex};

    struct StaticSnapshot(Snapshot);

    impl SnapshotSource for StaticSnapshot {
        fn load(&self) -> Result<Snapshot, CorrectorError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default, Clone)]
    struct MemorySink {
        files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    }

    impl MemorySink {
        fn names(&self) -> Vec<String> {
            self.files
                .lock()
                .map(|f| f.iter().map(|(n, _)| n.clone()).collect())
                .unwrap_or_default()
        }
    }

    impl DocumentSink for MemorySink {
        fn write(&self, file_name: &str, content: &[u8]) -> Result<(), CorrectorError> {
            self.files
                .lock()
                .map_err(|e| CorrectorError::SinkUnavailable(e.to_string()))?
                .push((file_name.to_string(), content.to_vec()));
            Ok(())
        }
    }

    /// Refuses one file name, accepts everything else.
    struct RefusingSink {
        refused: &'static str,
        inner: MemorySink,
    }

    impl DocumentSink for RefusingSink {
        fn write(&self, file_name: &str, content: &[u8]) -> Result<(), CorrectorError> {
            if file_name == self.refused {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.write(file_name, content)
        }
    }

    fn snapshot() -> Snapshot {
        let mut record = OrderRecord::new("FU70001236");
        record.position_code = Some("OUV-123".into());
        Snapshot {
            orders: vec![record],
            ..Snapshot::default()
        }
    }

    fn documents() -> Vec<SourceDocument> {
        vec![
            SourceDocument::new(
                "order_FU70001236.xml",
                "<Order><ReferenceInformation><OrderId><IdValue>FU70001236</IdValue></OrderId></ReferenceInformation></Order>",
            ),
            SourceDocument::new("order_FU70000000.xml", "<Order/>"),
        ]
    }

    #[test]
    fn test_writes_outputs_and_report() -> Result<()> {
        let config = CorrectorConfig {
            output_suffix: "_THALES_corrected".to_string(),
            ..CorrectorConfig::default()
        };
        let sink = MemorySink::default();

        let report = run_correction(
            &config,
            &StaticSnapshot(snapshot()),
            &sink,
            &documents(),
            &CorrectionOptions::default(),
        )?;

        assert_eq!(report.rules_origin, RuleOrigin::Builtin);
        assert_eq!(report.batch.summary.corrected, 1);
        assert_eq!(report.batch.documents[1].state, DocumentState::Unmatched);
        assert_eq!(
            sink.names(),
            vec!["order_FU70001236_THALES_corrected.xml", "correction_report.json"]
        );
        assert_eq!(
            report.batch.documents[0].output_file.as_deref(),
            Some("order_FU70001236_THALES_corrected.xml")
        );
        Ok(())
    }

    #[test]
    fn test_dry_run_writes_nothing() -> Result<()> {
        let sink = MemorySink::default();
        let options = CorrectionOptions {
            dry_run: true,
            ..CorrectionOptions::default()
        };

        let report = run_correction(
            &CorrectorConfig::default(),
            &StaticSnapshot(snapshot()),
            &sink,
            &documents(),
            &options,
        )?;

        assert!(sink.names().is_empty());
        assert_eq!(report.batch.summary.corrected, 1);
        Ok(())
    }

    #[test]
    fn test_rule_precedence() -> Result<()> {
        let snapshot_rule = CorrectionRule::new(
            "from_snapshot",
            TargetPath::parse("OrderId/IdValue")?,
            SourceField::OrderId,
        );
        let config_rule = CorrectionRule::new(
            "from_config",
            TargetPath::parse("CustomerJobCode")?,
            SourceField::OrderId,
        );

        let mut snapshot = snapshot();
        let mut config = CorrectorConfig::default();
        assert_eq!(resolve_rules(&config, &snapshot)?.1, RuleOrigin::Builtin);

        snapshot.rules = vec![snapshot_rule];
        let (table, origin) = resolve_rules(&config, &snapshot)?;
        assert_eq!(origin, RuleOrigin::Snapshot);
        assert_eq!(table.names(), vec!["from_snapshot"]);

        config.rules = vec![config_rule];
        let (table, origin) = resolve_rules(&config, &snapshot)?;
        assert_eq!(origin, RuleOrigin::Config);
        assert_eq!(table.names(), vec!["from_config"]);
        Ok(())
    }

    fn order_document(id: &str, order_id: &str) -> SourceDocument {
        SourceDocument::new(
            id,
            format!("<Order><ReferenceInformation><OrderId><IdValue>{order_id}</IdValue></OrderId></ReferenceInformation></Order>"),
        )
    }

    fn two_orders() -> Snapshot {
        let mut first = OrderRecord::new("FU70001236");
        first.position_code = Some("OUV-123".into());
        let mut second = OrderRecord::new("FU70004512");
        second.position_code = Some("ETAM-9".into());
        Snapshot {
            orders: vec![first, second],
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_same_file_name_from_two_folders_keeps_both_outputs() -> Result<()> {
        let config = CorrectorConfig {
            output_suffix: "_THALES_corrected".to_string(),
            ..CorrectorConfig::default()
        };
        let sink = MemorySink::default();
        let documents = vec![
            order_document("order.xml", "FU70001236"),
            order_document("order.xml", "FU70004512"),
        ];

        let report = run_correction(
            &config,
            &StaticSnapshot(two_orders()),
            &sink,
            &documents,
            &CorrectionOptions::default(),
        )?;

        assert_eq!(report.batch.summary.corrected, 2);
        let outputs: Vec<_> = report
            .batch
            .documents
            .iter()
            .map(|d| d.output_file.as_deref())
            .collect();
        assert_eq!(
            outputs,
            vec![
                Some("order_THALES_corrected.xml"),
                Some("order_THALES_corrected_2.xml")
            ]
        );
        assert_eq!(
            sink.names(),
            vec![
                "order_THALES_corrected.xml",
                "order_THALES_corrected_2.xml",
                "correction_report.json"
            ]
        );
        Ok(())
    }

    #[test]
    fn test_failed_write_only_affects_its_document() -> Result<()> {
        let inner = MemorySink::default();
        let sink = RefusingSink {
            refused: "a_corrected.xml",
            inner: inner.clone(),
        };
        let documents = vec![
            order_document("a.xml", "FU70001236"),
            order_document("b.xml", "FU70004512"),
        ];

        let report = run_correction(
            &CorrectorConfig::default(),
            &StaticSnapshot(two_orders()),
            &sink,
            &documents,
            &CorrectionOptions::default(),
        )?;

        let failed = &report.batch.documents[0];
        assert_eq!(failed.state, DocumentState::WriteFailure);
        assert_eq!(failed.output_file, None);
        assert!(matches!(
            failed.log.last().map(|e| &e.outcome),
            Some(RuleOutcome::Skipped { reason: SkipReason::WriteFailure })
        ));
        assert_eq!(report.batch.documents[1].state, DocumentState::Corrected);

        let summary = &report.batch.summary;
        assert_eq!(summary.corrected, 1);
        assert_eq!(summary.write_failures, 1);
        assert_eq!(summary.documents_skipped(), 1);

        // The rest of the batch and the report still land.
        assert_eq!(inner.names(), vec!["b_corrected.xml", "correction_report.json"]);
        Ok(())
    }
}
