//! Exec probe timeout audit.
//!
//! Finds containers whose exec liveness, readiness or startup probes rely on
//! the implicit `timeoutSeconds` default, so operators can see their exposure
//! before the platform starts enforcing exec probe timeouts.
//!
//! The audit is read-only and point-in-time:
//!
//! ```text
//! WorkloadSource ─► extractor ─► classifier ─► aggregator ─► formatter
//!   (per kind)      (per workload, parallel)    (merge)      (narrative / JSON / console)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use exec_probe_audit::analyzer::probe_audit::{AuditPlan, ManifestSource, ProbeAuditor};
//!
//! let source = ManifestSource::new("cluster-dump.json");
//! let report = ProbeAuditor::new(AuditPlan::new()).run(&source).await;
//! println!("{} workloads need attention", report.summary.total_with_issues);
//! ```

pub mod aggregator;
pub mod auditor;
pub mod classifier;
pub mod extractor;
pub mod formatter;
pub mod source;
pub mod types;

pub use aggregator::{
    AuditReport, KindOutcome, KindReport, WorkloadScan, aggregate, build_finding, collect_kind,
};
pub use auditor::{AuditPlan, DEFAULT_FETCH_TIMEOUT, ProbeAuditor, scan_workloads};
pub use classifier::{REMEDIATION, classify, is_missing_timeout};
pub use extractor::{ExtractionError, extract};
pub use formatter::{
    KindBreakdown, NarrativeOptions, StructuredReport, format_console, render_narrative,
};
pub use source::{
    ClusterSource, ConnectError, FetchError, ManifestSource, RawWorkload, WorkloadSource,
};
pub use types::{
    AuditFinding, AuditSummary, ComplianceIssue, ContainerProbes, FetchErrorKind, IssueReason,
    KindFailure, KindSummary, ProbeMechanism, ProbeSpec, ProbeType, Severity,
    UnscannableWorkload, WorkloadKind, WorkloadRef,
};
