//! Audit orchestration.
//!
//! ```text
//!            ┌──────────── one pipeline per kind (concurrent) ────────────┐
//!  kinds ──► │ fetch (deadline) ─► extract + classify (rayon) ─► collect  │ ──► aggregate ──► AuditReport
//!            └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pipelines share nothing mutable; the only merge point is [`aggregate`].

use super::aggregator::{
    AuditReport, KindOutcome, KindReport, WorkloadScan, aggregate, build_finding, collect_kind,
};
use super::extractor::extract;
use super::source::{FetchError, RawWorkload, WorkloadSource};
use super::types::{UnscannableWorkload, WorkloadKind, WorkloadRef};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::time::Duration;

/// Default per-kind fetch deadline.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// What to audit.
#[derive(Debug, Clone)]
pub struct AuditPlan {
    /// Kinds to scan; duplicates are ignored
    pub kinds: Vec<WorkloadKind>,
    /// Target namespace (None = all namespaces)
    pub namespace: Option<String>,
    /// Deadline for each kind's fetch
    pub fetch_timeout: Duration,
}

impl Default for AuditPlan {
    fn default() -> Self {
        Self {
            kinds: WorkloadKind::ALL.to_vec(),
            namespace: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl AuditPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = WorkloadKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// Runs one audit pass against a workload source.
pub struct ProbeAuditor {
    plan: AuditPlan,
}

impl ProbeAuditor {
    pub fn new(plan: AuditPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &AuditPlan {
        &self.plan
    }

    /// Audit every planned kind, stamping the report with the current time.
    pub async fn run(&self, source: &dyn WorkloadSource) -> AuditReport {
        self.run_at(source, Utc::now()).await
    }

    /// Audit every planned kind, stamping the report with `audit_date`.
    pub async fn run_at(&self, source: &dyn WorkloadSource, audit_date: DateTime<Utc>) -> AuditReport {
        let kinds: BTreeSet<WorkloadKind> = self.plan.kinds.iter().copied().collect();
        log::info!(
            "Auditing {} kind(s) from {} in {}",
            kinds.len(),
            source.describe(),
            self.plan.namespace.as_deref().unwrap_or("all namespaces")
        );

        let pipelines = kinds.into_iter().map(|kind| self.audit_kind(source, kind));
        let outcomes = join_all(pipelines).await;

        aggregate(outcomes, audit_date, self.plan.namespace.clone())
    }

    async fn audit_kind(&self, source: &dyn WorkloadSource, kind: WorkloadKind) -> KindOutcome {
        let namespace = self.plan.namespace.as_deref();
        let fetched =
            match tokio::time::timeout(self.plan.fetch_timeout, source.fetch(kind, namespace)).await
            {
                Ok(result) => result,
                Err(_) => Err(FetchError::Unavailable(format!(
                    "deadline of {}s exceeded",
                    self.plan.fetch_timeout.as_secs_f64()
                ))),
            };

        match fetched {
            Ok(workloads) => {
                log::info!("Fetched {} {}", workloads.len(), kind.plural());
                Ok(scan_workloads(kind, workloads))
            }
            Err(e) => {
                log::warn!("Could not scan {}: {}", kind.plural(), e);
                Err(e.into_failure(kind))
            }
        }
    }
}

/// Extract and classify every workload of one kind in parallel.
pub fn scan_workloads(kind: WorkloadKind, workloads: Vec<RawWorkload>) -> KindReport {
    let scans: Vec<WorkloadScan> = workloads.par_iter().map(scan_workload).collect();
    collect_kind(kind, scans)
}

fn scan_workload(raw: &RawWorkload) -> WorkloadScan {
    let workload = WorkloadRef::new(raw.kind, &raw.namespace, &raw.name);
    match extract(raw) {
        Ok(containers) => {
            let finding = build_finding(workload, &containers);
            log::debug!("{}: {} issue(s)", finding.workload, finding.issues.len());
            Ok(finding)
        }
        Err(e) => {
            log::warn!("Skipping {}: {}", workload, e);
            Err(UnscannableWorkload {
                workload,
                reason: e.to_string(),
            })
        }
    }
}
