//! Human-readable Markdown report.

use crate::analyzer::probe_audit::aggregator::{AuditReport, KindReport};
use crate::analyzer::probe_audit::classifier::REMEDIATION;
use crate::analyzer::probe_audit::types::{AuditFinding, WorkloadKind};
use chrono::SecondsFormat;
use std::fmt::Write;

/// Report title.
pub const TITLE: &str = "Exec Probe Timeout Audit";

/// Rendering options for the narrative report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeOptions {
    /// Timeout suggested next to each flagged probe (advisory only)
    pub recommended_timeout_secs: u32,
}

impl Default for NarrativeOptions {
    fn default() -> Self {
        Self {
            recommended_timeout_secs: 5,
        }
    }
}

/// Render the narrative report.
pub fn render_narrative(report: &AuditReport, options: &NarrativeOptions) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    let _ = writeln!(out, "# {}\n", TITLE);
    let _ = writeln!(
        out,
        "Generated: {}",
        summary.audit_date.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = match &summary.namespace_filter {
        Some(ns) => writeln!(out, "Scope: namespace `{}`\n", ns),
        None => writeln!(out, "Scope: all namespaces\n"),
    };

    out.push_str("## Summary\n\n");
    out.push_str("| Metric | Count |\n");
    out.push_str("|---|---|\n");
    let _ = writeln!(out, "| Workloads scanned | {} |", summary.total_scanned);
    let _ = writeln!(out, "| Workloads with issues | {} |", summary.total_with_issues);
    let _ = writeln!(
        out,
        "| Exec probes without timeoutSeconds | {} |",
        summary.total_issues
    );
    if summary.total_unscannable > 0 {
        let _ = writeln!(out, "| Unscannable workloads | {} |", summary.total_unscannable);
    }
    out.push('\n');

    for kind in WorkloadKind::ALL {
        if let Some(kind_report) = report.kinds.get(&kind) {
            render_kind_section(&mut out, kind_report, options);
        }
    }

    if !summary.failed_kinds.is_empty() {
        out.push_str("## Not Scanned\n\n");
        let _ = writeln!(
            out,
            "{} resource kind(s) could not be scanned.\n",
            summary.failed_kinds.len()
        );
        for failure in &summary.failed_kinds {
            let _ = writeln!(
                out,
                "- {} could not be scanned ({}): {}",
                failure.kind.plural(),
                failure.error,
                failure.message
            );
        }
        out.push('\n');
    }

    let unscannable: Vec<_> = report
        .kinds
        .values()
        .flat_map(|k| k.unscannable.iter())
        .collect();
    if !unscannable.is_empty() {
        out.push_str("## Unscannable Workloads\n\n");
        for entry in unscannable {
            let _ = writeln!(
                out,
                "- {} `{}`: {}",
                entry.workload.kind,
                entry.workload.qualified_name(),
                entry.reason
            );
        }
        out.push('\n');
    }

    out
}

fn render_kind_section(out: &mut String, kind_report: &KindReport, options: &NarrativeOptions) {
    let counts = kind_report.summary();
    let _ = writeln!(out, "## {}\n", kind_report.kind.plural());
    let _ = writeln!(
        out,
        "Scanned {}, flagged {}.\n",
        counts.scanned, counts.with_issues
    );

    if counts.with_issues == 0 {
        out.push_str("No issues found.\n\n");
        return;
    }

    for finding in kind_report.flagged() {
        render_finding(out, finding, options);
    }
}

fn render_finding(out: &mut String, finding: &AuditFinding, options: &NarrativeOptions) {
    let _ = writeln!(out, "### {}\n", finding.workload.qualified_name());
    for issue in &finding.issues {
        let _ = writeln!(
            out,
            "- Container `{}`, {} probe: {} (suggested `timeoutSeconds: {}`)",
            issue.container, issue.probe_type, REMEDIATION, options.recommended_timeout_secs
        );
    }
    out.push('\n');
}
