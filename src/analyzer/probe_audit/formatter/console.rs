//! Colored terminal summary printed after an audit.

use crate::analyzer::probe_audit::aggregator::AuditReport;
use crate::analyzer::probe_audit::types::WorkloadKind;
use colored::Colorize;

const RULE: &str =
    "═══════════════════════════════════════════════════════════════════════════════";

/// Format the terminal summary.
pub fn format_console(report: &AuditReport, recommended_timeout_secs: u32) -> String {
    let mut output = String::new();
    let summary = &report.summary;

    output.push_str(&format!("\n{}\n", RULE.bright_blue()));
    output.push_str(&format!(
        "{}\n",
        "⏱  EXEC PROBE TIMEOUT AUDIT".bright_white().bold()
    ));
    output.push_str(&format!("{}\n\n", RULE.bright_blue()));

    output.push_str(&format!(
        "{} {}\n",
        "Scope:".dimmed(),
        summary
            .namespace_filter
            .as_deref()
            .unwrap_or("all namespaces")
            .cyan()
    ));
    output.push_str(&format!(
        "{} {:>6}     {} {:>6}     {} {:>6}\n",
        "Scanned:".dimmed(),
        summary.total_scanned.to_string().bright_white(),
        "Flagged:".dimmed(),
        if summary.total_with_issues > 0 {
            summary.total_with_issues.to_string().yellow()
        } else {
            summary.total_with_issues.to_string().green()
        },
        "Probes:".dimmed(),
        summary.total_issues.to_string().bright_white(),
    ));

    for kind in WorkloadKind::ALL {
        let Some(kind_report) = report.kinds.get(&kind) else {
            continue;
        };
        let counts = kind_report.summary();
        output.push_str(&format!(
            "\n{} {}\n",
            kind.plural().bright_cyan().bold(),
            format!("({} scanned, {} flagged)", counts.scanned, counts.with_issues).dimmed()
        ));

        if counts.with_issues == 0 {
            output.push_str(&format!("  {}\n", "✅ No issues found".green()));
            continue;
        }

        for finding in kind_report.flagged() {
            output.push_str(&format!(
                "  🟡 {}\n",
                finding.workload.qualified_name().bright_white()
            ));
            for issue in &finding.issues {
                output.push_str(&format!(
                    "     {} {} {}\n",
                    issue.container.yellow(),
                    format!("{} probe", issue.probe_type).dimmed(),
                    format!("→ timeoutSeconds: {}", recommended_timeout_secs).green()
                ));
            }
        }
    }

    if !summary.failed_kinds.is_empty() {
        output.push_str(&format!(
            "\n{}\n",
            format!(
                "⚠️  {} resource kind(s) could not be scanned",
                summary.failed_kinds.len()
            )
            .red()
        ));
        for failure in &summary.failed_kinds {
            output.push_str(&format!(
                "  {} {}: {}\n",
                failure.kind.plural().red(),
                format!("[{}]", failure.error).dimmed(),
                failure.message
            ));
        }
    }

    if summary.total_unscannable > 0 {
        output.push_str(&format!(
            "\n{}\n",
            format!(
                "⚠️  {} workload(s) could not be read",
                summary.total_unscannable
            )
            .yellow()
        ));
    }

    output.push_str(&format!("\n{}\n", RULE.bright_blue()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::probe_audit::aggregator::{aggregate, build_finding, collect_kind};
    use crate::analyzer::probe_audit::types::{
        ContainerProbes, FetchErrorKind, KindFailure, ProbeMechanism, ProbeSpec, ProbeType,
        WorkloadRef,
    };
    use chrono::Utc;

    #[test]
    fn test_console_lists_flagged_and_failures() {
        colored::control::set_override(false);

        let mut c = ContainerProbes::new("app");
        c.startup = Some(ProbeSpec::new(ProbeType::Startup, ProbeMechanism::Exec, None));
        let finding = build_finding(
            WorkloadRef::new(WorkloadKind::StatefulSet, "data", "db"),
            &[c],
        );
        let report = aggregate(
            vec![
                Ok(collect_kind(WorkloadKind::StatefulSet, vec![Ok(finding)])),
                Ok(collect_kind(WorkloadKind::Deployment, Vec::new())),
                Err(KindFailure {
                    kind: WorkloadKind::DaemonSet,
                    error: FetchErrorKind::NotFound,
                    message: "not served".to_string(),
                }),
            ],
            Utc::now(),
            None,
        );

        let text = format_console(&report, 5);
        assert!(text.contains("EXEC PROBE TIMEOUT AUDIT"));
        assert!(text.contains("data/db"));
        assert!(text.contains("startup probe"));
        assert!(text.contains("timeoutSeconds: 5"));
        assert!(text.contains("No issues found"));
        assert!(text.contains("1 resource kind(s) could not be scanned"));
        assert!(text.contains("[not-found]"));
    }
}
