//! Aggregation of classification results.
//!
//! Container issues roll up into one `AuditFinding` per workload, findings
//! roll up into a `KindReport` per resource kind, and kind reports fold into
//! a single `AuditReport`. Every step is keyed and sorted, so the result does
//! not depend on fetch or processing order.

use super::classifier::classify;
use super::types::{
    AuditFinding, AuditSummary, ContainerProbes, KindFailure, KindSummary, UnscannableWorkload,
    WorkloadKind, WorkloadRef,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Outcome of scanning a single workload.
pub type WorkloadScan = Result<AuditFinding, UnscannableWorkload>;

/// Outcome of auditing one resource kind.
pub type KindOutcome = Result<KindReport, KindFailure>;

/// Every workload of one kind, sorted by namespace then name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindReport {
    pub kind: WorkloadKind,
    pub findings: Vec<AuditFinding>,
    pub unscannable: Vec<UnscannableWorkload>,
}

impl KindReport {
    pub fn empty(kind: WorkloadKind) -> Self {
        Self {
            kind,
            findings: Vec::new(),
            unscannable: Vec::new(),
        }
    }

    /// Counts derived from the findings themselves.
    pub fn summary(&self) -> KindSummary {
        KindSummary {
            scanned: self.findings.len(),
            with_issues: self.findings.iter().filter(|f| f.has_issues()).count(),
            issues: self.findings.iter().map(|f| f.issues.len()).sum(),
            unscannable: self.unscannable.len(),
        }
    }

    /// Findings with at least one issue.
    pub fn flagged(&self) -> impl Iterator<Item = &AuditFinding> {
        self.findings.iter().filter(|f| f.has_issues())
    }
}

/// Result of a whole run; the single model every emitter reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub summary: AuditSummary,
    pub kinds: BTreeMap<WorkloadKind, KindReport>,
}

impl AuditReport {
    /// Flagged findings across all kinds, in report order.
    pub fn flagged(&self) -> impl Iterator<Item = &AuditFinding> {
        self.kinds.values().flat_map(|k| k.flagged())
    }
}

/// Merge the issues of every container of one workload.
///
/// Issues keep container order, then slot order within a container.
pub fn build_finding(workload: WorkloadRef, containers: &[ContainerProbes]) -> AuditFinding {
    let issues = containers
        .iter()
        .flat_map(|container| classify(&workload, container))
        .collect();

    AuditFinding { workload, issues }
}

/// Collect the scans of one kind into a sorted `KindReport`.
///
/// A workload reported more than once counts once; the first scan wins.
pub fn collect_kind<I>(kind: WorkloadKind, scans: I) -> KindReport
where
    I: IntoIterator<Item = WorkloadScan>,
{
    let mut by_workload: BTreeMap<WorkloadRef, WorkloadScan> = BTreeMap::new();

    for scan in scans {
        let key = match &scan {
            Ok(finding) => finding.workload.clone(),
            Err(unscannable) => unscannable.workload.clone(),
        };
        match by_workload.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(scan);
            }
            Entry::Occupied(existing) => {
                log::debug!("Ignoring duplicate workload {}", existing.key());
            }
        }
    }

    let mut report = KindReport::empty(kind);
    for scan in by_workload.into_values() {
        match scan {
            Ok(finding) => report.findings.push(finding),
            Err(unscannable) => report.unscannable.push(unscannable),
        }
    }
    report
}

/// Fold every kind's outcome into the run report.
///
/// The result is the same for any ordering of `outcomes`. If a kind shows
/// up twice, its first outcome is kept.
pub fn aggregate<I>(
    outcomes: I,
    audit_date: DateTime<Utc>,
    namespace_filter: Option<String>,
) -> AuditReport
where
    I: IntoIterator<Item = KindOutcome>,
{
    let mut summary = AuditSummary::new(audit_date, namespace_filter);
    let mut kinds = BTreeMap::new();
    let mut failed = BTreeMap::new();

    for outcome in outcomes {
        let kind = match &outcome {
            Ok(report) => report.kind,
            Err(failure) => failure.kind,
        };
        if kinds.contains_key(&kind) || failed.contains_key(&kind) {
            log::warn!("Ignoring duplicate outcome for {}", kind.plural());
            continue;
        }
        match outcome {
            Ok(report) => {
                kinds.insert(kind, report);
            }
            Err(failure) => {
                failed.insert(kind, failure);
            }
        }
    }

    for (kind, report) in &kinds {
        summary.record_kind(*kind, report.summary());
    }
    for failure in failed.into_values() {
        summary.record_failure(failure);
    }

    AuditReport { summary, kinds }
}
