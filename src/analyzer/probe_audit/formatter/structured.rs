//! Machine-readable JSON summary.

use crate::analyzer::probe_audit::aggregator::AuditReport;
use crate::analyzer::probe_audit::types::{
    KindFailure, KindSummary, UnscannableWorkload, WorkloadKind, WorkloadRef,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured audit summary as written to `<prefix>-<timestamp>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
    pub audit_date: DateTime<Utc>,
    /// Workloads scanned across all reachable kinds
    pub total_resources: usize,
    /// Workloads with at least one issue, sorted by kind, namespace, name
    pub flagged: Vec<WorkloadRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_filter: Option<String>,
    #[serde(default)]
    pub total_with_issues: usize,
    #[serde(default)]
    pub total_issues: usize,
    #[serde(default)]
    pub by_kind: Vec<KindBreakdown>,
    #[serde(default)]
    pub failed_kinds: Vec<KindFailure>,
    #[serde(default)]
    pub unscannable: Vec<UnscannableWorkload>,
}

/// Counts for one scanned kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindBreakdown {
    pub kind: WorkloadKind,
    #[serde(flatten)]
    pub counts: KindSummary,
}

impl StructuredReport {
    /// Build from the aggregated report.
    pub fn from_report(report: &AuditReport) -> Self {
        let summary = &report.summary;
        Self {
            audit_date: summary.audit_date,
            total_resources: summary.total_scanned,
            flagged: report.flagged().map(|f| f.workload.clone()).collect(),
            namespace_filter: summary.namespace_filter.clone(),
            total_with_issues: summary.total_with_issues,
            total_issues: summary.total_issues,
            by_kind: summary
                .by_kind
                .iter()
                .map(|(kind, counts)| KindBreakdown {
                    kind: *kind,
                    counts: *counts,
                })
                .collect(),
            failed_kinds: summary.failed_kinds.clone(),
            unscannable: report
                .kinds
                .values()
                .flat_map(|k| k.unscannable.iter().cloned())
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::probe_audit::aggregator::{
        WorkloadScan, aggregate, build_finding, collect_kind,
    };
    use crate::analyzer::probe_audit::types::{
        ContainerProbes, FetchErrorKind, ProbeMechanism, ProbeSpec, ProbeType,
    };
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn scan(kind: WorkloadKind, ns: &str, name: &str, exec_without_timeout: bool) -> WorkloadScan {
        let mut c = ContainerProbes::new("app");
        let timeout = if exec_without_timeout { None } else { Some(2) };
        c.readiness = Some(ProbeSpec::new(ProbeType::Readiness, ProbeMechanism::Exec, timeout));
        Ok(build_finding(WorkloadRef::new(kind, ns, name), &[c]))
    }

    fn sample_report() -> AuditReport {
        let deployments = collect_kind(
            WorkloadKind::Deployment,
            vec![
                scan(WorkloadKind::Deployment, "payments", "api", true),
                scan(WorkloadKind::Deployment, "payments", "ledger", false),
            ],
        );
        let failure = KindFailure {
            kind: WorkloadKind::DaemonSet,
            error: FetchErrorKind::Unavailable,
            message: "deadline of 30s exceeded".to_string(),
        };
        aggregate(
            vec![Ok(deployments), Err(failure)],
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            Some("payments".to_string()),
        )
    }

    #[test]
    fn test_required_fields() {
        let report = StructuredReport::from_report(&sample_report());
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["auditDate"], "2026-10-18T09:30:00Z");
        assert_eq!(value["totalResources"], 2);
        assert_eq!(
            value["flagged"],
            serde_json::json!([{"kind": "Deployment", "namespace": "payments", "name": "api"}])
        );
        assert_eq!(value["namespaceFilter"], "payments");
        assert_eq!(value["failedKinds"][0]["error"], "unavailable");
        assert_eq!(value["byKind"][0]["withIssues"], 1);
    }

    #[test]
    fn test_round_trip() {
        let report = StructuredReport::from_report(&sample_report());
        let decoded = StructuredReport::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn test_decodes_minimal_document() {
        let json = r#"{
            "auditDate": "2026-10-18T09:30:00Z",
            "totalResources": 4,
            "flagged": [{"kind": "StatefulSet", "namespace": "data", "name": "db"}]
        }"#;
        let report = StructuredReport::from_json(json).unwrap();
        assert_eq!(report.total_resources, 4);
        assert_eq!(report.flagged[0].kind, WorkloadKind::StatefulSet);
        assert!(report.failed_kinds.is_empty());
    }

    fn arb_workload() -> impl Strategy<Value = WorkloadRef> {
        (
            prop::sample::select(WorkloadKind::ALL.to_vec()),
            "[a-z][a-z0-9-]{0,8}",
            "[a-z][a-z0-9-]{0,8}",
        )
            .prop_map(|(kind, ns, name)| WorkloadRef::new(kind, ns, name))
    }

    fn arb_report() -> impl Strategy<Value = StructuredReport> {
        let counts = (0usize..50, 0usize..50, 0usize..50, 0usize..5).prop_map(
            |(scanned, with_issues, issues, unscannable)| KindSummary {
                scanned,
                with_issues,
                issues,
                unscannable,
            },
        );
        (
            0i64..4_000_000_000,
            0u32..1_000_000_000,
            prop::collection::vec(arb_workload(), 0..6),
            prop::option::of("[a-z]{1,8}"),
            prop::collection::vec(
                (prop::sample::select(WorkloadKind::ALL.to_vec()), counts),
                0..3,
            ),
            prop::collection::vec((arb_workload(), ".{0,20}"), 0..3),
            0usize..500,
        )
            .prop_map(|(secs, nanos, flagged, ns, kinds, unscannable, total)| {
                StructuredReport {
                    audit_date: Utc.timestamp_opt(secs, nanos).unwrap(),
                    total_resources: total,
                    flagged,
                    namespace_filter: ns,
                    total_with_issues: kinds.iter().map(|(_, c)| c.with_issues).sum(),
                    total_issues: kinds.iter().map(|(_, c)| c.issues).sum(),
                    by_kind: kinds
                        .into_iter()
                        .map(|(kind, counts)| KindBreakdown { kind, counts })
                        .collect(),
                    failed_kinds: Vec::new(),
                    unscannable: unscannable
                        .into_iter()
                        .map(|(workload, reason)| UnscannableWorkload { workload, reason })
                        .collect(),
                }
            })
    }

    proptest! {
        #[test]
        fn prop_structured_round_trip(report in arb_report()) {
            let json = report.to_json().unwrap();
            let decoded = StructuredReport::from_json(&json).unwrap();
            prop_assert_eq!(decoded, report);
        }
    }
}
