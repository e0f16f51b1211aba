// ordfix-core/src/application/batch.rs

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::correction::{
    BatchSummary, DocumentState, LogEntry, RuleApplicator, SkipReason,
};
use crate::domain::document::{OrderIdLocator, SourceDocument};
use crate::domain::order::OrderRegistry;
use crate::domain::rules::RuleTable;
use crate::infrastructure::xml::{parse_document, render_document};

/// Result of running one document through the batch.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub id: String,
    pub state: DocumentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Output file name, set once the output has been written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// Rendered corrected XML. Present only for corrected documents.
    #[serde(skip)]
    pub output: Option<String>,
    pub log: Vec<LogEntry>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub documents: Vec<ProcessedDocument>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn corrected(&self) -> impl Iterator<Item = &ProcessedDocument> {
        self.documents
            .iter()
            .filter(|d| d.state == DocumentState::Corrected)
    }

    /// Rebuilds the summary after document states changed downstream.
    pub fn recount(&mut self) {
        let mut summary = BatchSummary::default();
        for doc in &self.documents {
            summary.record(doc.state, &doc.log);
        }
        self.summary = summary;
    }
}

/// Drives documents through parse, locate, match and correct.
///
/// Each document ends in exactly one terminal state. A document that fails
/// early is reported and left as it was; the others are not affected.
pub struct BatchOrchestrator<'a> {
    registry: &'a OrderRegistry,
    rules: &'a RuleTable,
    locator: &'a OrderIdLocator,
    applicator: RuleApplicator,
    agency_filter: Option<String>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(
        registry: &'a OrderRegistry,
        rules: &'a RuleTable,
        locator: &'a OrderIdLocator,
        applicator: RuleApplicator,
    ) -> Self {
        Self {
            registry,
            rules,
            locator,
            applicator,
            agency_filter: None,
        }
    }

    /// Only correct documents whose order belongs to `agency`.
    pub fn with_agency_filter(mut self, agency: Option<String>) -> Self {
        self.agency_filter = agency
            .map(|a| a.trim().to_uppercase())
            .filter(|a| !a.is_empty());
        self
    }

    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn process(&self, documents: &[SourceDocument]) -> BatchReport {
        let mut report = BatchReport::default();

        for source in documents {
            let processed = self.process_one(source);
            report.summary.record(processed.state, &processed.log);
            report.documents.push(processed);
        }

        info!(summary = %report.summary, "Batch processed");
        report
    }

    pub fn process_one(&self, source: &SourceDocument) -> ProcessedDocument {
        let id = source.id.as_str();
        let terminal = |state, order_id, reason, detail: String| ProcessedDocument {
            id: id.to_string(),
            state,
            order_id,
            output_file: None,
            output: None,
            log: vec![LogEntry::for_document(id, reason, detail)],
        };

        // 1. Parse
        let mut document = match parse_document(id, &source.content) {
            Ok(document) => document,
            Err(e) => {
                warn!(document = id, error = %e, "Document is not well-formed, left untouched");
                return terminal(
                    DocumentState::ParseFailure,
                    None,
                    SkipReason::ParseFailure,
                    e.to_string(),
                );
            }
        };

        // 2. Locate
        let Some(order_id) = self.locator.extract_order_id(&document) else {
            warn!(document = id, "No order number found");
            return terminal(
                DocumentState::Unlocatable,
                None,
                SkipReason::UnlocatableOrderId,
                "no order number in document or file name".to_string(),
            );
        };

        // 3. Match
        let Some(record) = self.registry.lookup(&order_id) else {
            warn!(document = id, order_id = %order_id, "Order not in registry");
            return terminal(
                DocumentState::Unmatched,
                Some(order_id.clone()),
                SkipReason::UnmatchedOrder,
                format!("{} not found in registry", order_id),
            );
        };

        if let Some(agency) = &self.agency_filter {
            let record_agency = record.agency_code.as_deref().map(str::to_uppercase);
            if record_agency.as_deref() != Some(agency.as_str()) {
                debug!(document = id, order_id = %order_id, "Filtered out by agency");
                return terminal(
                    DocumentState::Filtered,
                    Some(order_id),
                    SkipReason::AgencyFiltered,
                    format!(
                        "agency {} does not match {}",
                        record.agency_code.as_deref().unwrap_or("<none>"),
                        agency
                    ),
                );
            }
        }

        // 4. Correct, rule by rule in table order
        let log: Vec<LogEntry> = self
            .rules
            .iter()
            .map(|rule| {
                let outcome = self.applicator.apply(&mut document, record, rule);
                LogEntry::for_rule(id, &rule.name, outcome)
            })
            .collect();

        match render_document(&document) {
            Ok(output) => ProcessedDocument {
                id: id.to_string(),
                state: DocumentState::Corrected,
                order_id: Some(order_id),
                output_file: None,
                output: Some(output),
                log,
            },
            Err(e) => {
                warn!(document = id, error = %e, "Corrected document could not be serialized");
                terminal(
                    DocumentState::ParseFailure,
                    Some(order_id),
                    SkipReason::ParseFailure,
                    e.to_string(),
                )
            }
        }
    }
}
