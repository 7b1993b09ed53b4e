//! Core types for the exec probe timeout audit.
//!
//! These types describe what was fetched, what was extracted from each pod
//! template, and what the audit concluded:
//! - `WorkloadKind` / `WorkloadRef` - Which workload a result belongs to
//! - `ProbeSpec` / `ContainerProbes` - Normalized probe configuration
//! - `ComplianceIssue` / `AuditFinding` - Classification results
//! - `KindSummary` / `AuditSummary` - Counts rolled up per kind and per run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

// ============================================================================
// Workload Kind
// ============================================================================

/// Workload resource kinds that carry a pod template.
///
/// The derived ordering is the order kinds appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl WorkloadKind {
    /// Every supported kind, in report order.
    pub const ALL: [WorkloadKind; 3] = [Self::Deployment, Self::StatefulSet, Self::DaemonSet];

    /// Parse a kind from a user-supplied name (case-insensitive, accepts
    /// plurals and kubectl short names).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "deployment" | "deployments" | "deploy" => Some(Self::Deployment),
            "statefulset" | "statefulsets" | "sts" => Some(Self::StatefulSet),
            "daemonset" | "daemonsets" | "ds" => Some(Self::DaemonSet),
            _ => None,
        }
    }

    /// The Kubernetes `kind` string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
        }
    }

    /// Plural form used for report section headings.
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployments",
            Self::StatefulSet => "StatefulSets",
            Self::DaemonSet => "DaemonSets",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "unknown resource kind '{}' (expected deployment, statefulset or daemonset)",
                s
            )
        })
    }
}

// ============================================================================
// Workload Reference
// ============================================================================

/// Identifies one workload. Ordering is kind, then namespace, then name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkloadRef {
    pub kind: WorkloadKind,
    pub namespace: String,
    pub name: String,
}

impl WorkloadRef {
    pub fn new(kind: WorkloadKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// `namespace/name`, as kubectl prints it.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

// ============================================================================
// Probe Specification
// ============================================================================

/// The three probe slots of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeType {
    Liveness,
    Readiness,
    Startup,
}

impl ProbeType {
    /// Slot order within a container.
    pub const ALL: [ProbeType; 3] = [Self::Liveness, Self::Readiness, Self::Startup];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liveness => "liveness",
            Self::Readiness => "readiness",
            Self::Startup => "startup",
        }
    }

    /// Field name of this slot in a container spec.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Liveness => "livenessProbe",
            Self::Readiness => "readinessProbe",
            Self::Startup => "startupProbe",
        }
    }
}

impl fmt::Display for ProbeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a probe checks the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeMechanism {
    /// Runs a command inside the container
    Exec,
    HttpGet,
    TcpSocket,
    Grpc,
    /// The probe names no handler at all
    Unspecified,
}

/// Normalized configuration of one probe slot on one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSpec {
    pub probe_type: ProbeType,
    pub mechanism: ProbeMechanism,
    /// `None` when the field was omitted. An explicit value, whatever it
    /// is, stays `Some`.
    pub timeout_seconds: Option<i32>,
}

impl ProbeSpec {
    pub fn new(probe_type: ProbeType, mechanism: ProbeMechanism, timeout_seconds: Option<i32>) -> Self {
        Self {
            probe_type,
            mechanism,
            timeout_seconds,
        }
    }

    /// Check if the probe runs a command.
    pub fn is_exec(&self) -> bool {
        self.mechanism == ProbeMechanism::Exec
    }

    /// Check if `timeoutSeconds` was written in the source object.
    pub fn has_explicit_timeout(&self) -> bool {
        self.timeout_seconds.is_some()
    }
}

/// Probe slots present on a single container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerProbes {
    pub name: String,
    pub liveness: Option<ProbeSpec>,
    pub readiness: Option<ProbeSpec>,
    pub startup: Option<ProbeSpec>,
}

impl ContainerProbes {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get the probe in a slot.
    pub fn slot(&self, probe_type: ProbeType) -> Option<&ProbeSpec> {
        match probe_type {
            ProbeType::Liveness => self.liveness.as_ref(),
            ProbeType::Readiness => self.readiness.as_ref(),
            ProbeType::Startup => self.startup.as_ref(),
        }
    }

    /// Present probes in slot order (liveness, readiness, startup).
    pub fn probes(&self) -> impl Iterator<Item = &ProbeSpec> {
        ProbeType::ALL.into_iter().filter_map(|t| self.slot(t))
    }

    pub fn has_exec_probe(&self) -> bool {
        self.probes().any(ProbeSpec::is_exec)
    }
}

// ============================================================================
// Compliance Issues
// ============================================================================

/// Severity of a compliance issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// The workload will behave differently once exec probe timeouts are enforced
    #[default]
    NeedsAttention,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedsAttention => "needs-attention",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why an issue was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueReason {
    /// Exec probe with no explicit `timeoutSeconds`
    MissingTimeout,
}

impl IssueReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTimeout => "missing-timeout",
        }
    }
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One finding for a (workload, container, probe slot) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    pub workload: WorkloadRef,
    pub container: String,
    pub probe_type: ProbeType,
    pub severity: Severity,
    pub reason: IssueReason,
    pub message: String,
}

/// Per-workload rollup of issues, in pod template order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub workload: WorkloadRef,
    pub issues: Vec<ComplianceIssue>,
}

impl AuditFinding {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// A workload whose pod template could not be read.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnscannableWorkload {
    #[serde(flatten)]
    pub workload: WorkloadRef,
    pub reason: String,
}

// ============================================================================
// Summaries
// ============================================================================

/// Counts for one resource kind. Summaries add up field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSummary {
    /// Workloads whose pod template was read and classified
    pub scanned: usize,
    pub with_issues: usize,
    pub issues: usize,
    pub unscannable: usize,
}

impl Add for KindSummary {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            scanned: self.scanned + rhs.scanned,
            with_issues: self.with_issues + rhs.with_issues,
            issues: self.issues + rhs.issues,
            unscannable: self.unscannable + rhs.unscannable,
        }
    }
}

impl AddAssign for KindSummary {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for KindSummary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Category of a per-kind fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchErrorKind {
    NotFound,
    PermissionDenied,
    Unavailable,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::PermissionDenied => "permission-denied",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resource kind that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindFailure {
    pub kind: WorkloadKind,
    pub error: FetchErrorKind,
    pub message: String,
}

/// Run-level rollup, built once from every kind's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSummary {
    pub audit_date: DateTime<Utc>,
    /// `None` means all namespaces
    pub namespace_filter: Option<String>,
    pub total_scanned: usize,
    pub total_with_issues: usize,
    pub total_issues: usize,
    pub total_unscannable: usize,
    pub by_kind: BTreeMap<WorkloadKind, KindSummary>,
    /// Sorted by kind
    pub failed_kinds: Vec<KindFailure>,
}

impl AuditSummary {
    pub fn new(audit_date: DateTime<Utc>, namespace_filter: Option<String>) -> Self {
        Self {
            audit_date,
            namespace_filter,
            total_scanned: 0,
            total_with_issues: 0,
            total_issues: 0,
            total_unscannable: 0,
            by_kind: BTreeMap::new(),
            failed_kinds: Vec::new(),
        }
    }

    /// Add one kind's counts to the totals.
    pub fn record_kind(&mut self, kind: WorkloadKind, summary: KindSummary) {
        *self.by_kind.entry(kind).or_default() += summary;
        self.total_scanned += summary.scanned;
        self.total_with_issues += summary.with_issues;
        self.total_issues += summary.issues;
        self.total_unscannable += summary.unscannable;
    }

    /// Record a kind that could not be fetched.
    pub fn record_failure(&mut self, failure: KindFailure) {
        let pos = self
            .failed_kinds
            .partition_point(|existing| existing.kind <= failure.kind);
        self.failed_kinds.insert(pos, failure);
    }

    /// Check if any kind was fetched at all.
    pub fn nothing_scanned(&self) -> bool {
        self.by_kind.is_empty()
    }

    pub fn has_issues(&self) -> bool {
        self.total_with_issues > 0
    }
}
