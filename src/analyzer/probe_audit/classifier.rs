//! Compliance classification.
//!
//! One rule: an exec probe must carry an explicit `timeoutSeconds`. HTTP,
//! TCP and gRPC probes are never flagged. Any explicit value is accepted,
//! including the platform default of 1 and non-positive values.

use super::types::{
    ComplianceIssue, ContainerProbes, IssueReason, ProbeSpec, ProbeType, Severity, WorkloadRef,
};

/// Fixed remediation instruction attached to every issue.
pub const REMEDIATION: &str = "add explicit timeoutSeconds to exec probe";

/// Check if a probe breaks the rule.
pub fn is_missing_timeout(probe: &ProbeSpec) -> bool {
    probe.is_exec() && !probe.has_explicit_timeout()
}

/// Classify every probe slot of one container, in slot order.
pub fn classify(workload: &WorkloadRef, container: &ContainerProbes) -> Vec<ComplianceIssue> {
    container
        .probes()
        .filter(|probe| is_missing_timeout(probe))
        .map(|probe| missing_timeout_issue(workload, &container.name, probe.probe_type))
        .collect()
}

fn missing_timeout_issue(
    workload: &WorkloadRef,
    container: &str,
    probe_type: ProbeType,
) -> ComplianceIssue {
    ComplianceIssue {
        workload: workload.clone(),
        container: container.to_string(),
        probe_type,
        severity: Severity::NeedsAttention,
        reason: IssueReason::MissingTimeout,
        message: format!(
            "Container '{}' has an exec {} probe without an explicit timeoutSeconds",
            container, probe_type
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::probe_audit::types::{ProbeMechanism, WorkloadKind};

    fn workload() -> WorkloadRef {
        WorkloadRef::new(WorkloadKind::Deployment, "payments", "api")
    }

    fn probe(t: ProbeType, mechanism: ProbeMechanism, timeout: Option<i32>) -> Option<ProbeSpec> {
        Some(ProbeSpec::new(t, mechanism, timeout))
    }

    #[test]
    fn test_exec_without_timeout_is_flagged() {
        let mut c = ContainerProbes::new("app");
        c.liveness = probe(ProbeType::Liveness, ProbeMechanism::Exec, None);

        let issues = classify(&workload(), &c);
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.container, "app");
        assert_eq!(issue.probe_type, ProbeType::Liveness);
        assert_eq!(issue.severity, Severity::NeedsAttention);
        assert_eq!(issue.reason, IssueReason::MissingTimeout);
        assert_eq!(issue.workload, workload());
        assert!(issue.message.contains("exec liveness probe"));
    }

    #[test]
    fn test_explicit_default_is_compliant() {
        let mut c = ContainerProbes::new("app");
        c.liveness = probe(ProbeType::Liveness, ProbeMechanism::Exec, Some(1));
        assert!(classify(&workload(), &c).is_empty());
    }

    #[test]
    fn test_non_positive_explicit_value_is_compliant() {
        let mut c = ContainerProbes::new("app");
        c.readiness = probe(ProbeType::Readiness, ProbeMechanism::Exec, Some(0));
        c.startup = probe(ProbeType::Startup, ProbeMechanism::Exec, Some(-3));
        assert!(classify(&workload(), &c).is_empty());
    }

    #[test]
    fn test_non_exec_probes_never_flagged() {
        for mechanism in [
            ProbeMechanism::HttpGet,
            ProbeMechanism::TcpSocket,
            ProbeMechanism::Grpc,
            ProbeMechanism::Unspecified,
        ] {
            let mut c = ContainerProbes::new("app");
            c.liveness = probe(ProbeType::Liveness, mechanism, None);
            c.readiness = probe(ProbeType::Readiness, mechanism, Some(5));
            c.startup = probe(ProbeType::Startup, mechanism, None);
            assert!(classify(&workload(), &c).is_empty(), "{:?}", mechanism);
        }
    }

    #[test]
    fn test_one_issue_per_slot_in_slot_order() {
        let mut c = ContainerProbes::new("app");
        c.startup = probe(ProbeType::Startup, ProbeMechanism::Exec, None);
        c.readiness = probe(ProbeType::Readiness, ProbeMechanism::Exec, Some(5));
        c.liveness = probe(ProbeType::Liveness, ProbeMechanism::Exec, None);

        let types: Vec<ProbeType> = classify(&workload(), &c)
            .iter()
            .map(|i| i.probe_type)
            .collect();
        assert_eq!(types, vec![ProbeType::Liveness, ProbeType::Startup]);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let mut c = ContainerProbes::new("app");
        c.liveness = probe(ProbeType::Liveness, ProbeMechanism::Exec, None);
        c.startup = probe(ProbeType::Startup, ProbeMechanism::Exec, None);

        let first = classify(&workload(), &c);
        let second = classify(&workload(), &c);
        assert_eq!(first, second);
    }
}
