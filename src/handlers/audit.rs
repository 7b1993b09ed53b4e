//! Handler for the `audit` command.
//!
//! Resolves options against the config file, runs the auditor against a live
//! cluster or a manifest dump, then prints the summary and writes the
//! narrative and structured reports.

use crate::analyzer::probe_audit::{
    AuditPlan, AuditReport, ClusterSource, ManifestSource, NarrativeOptions, ProbeAuditor,
    StructuredReport, WorkloadKind, format_console, render_narrative,
};
use crate::config::{resolve_kinds, types::Config};
use crate::error::{AuditError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options for the audit command. `None` falls back to the config file.
#[derive(Debug, Clone, Default)]
pub struct AuditCommandOptions {
    pub namespace: Option<String>,
    pub kinds: Option<Vec<WorkloadKind>>,
    pub context: Option<String>,
    pub from_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub recommended_timeout_secs: Option<u32>,
    pub json: bool,
    pub no_write: bool,
    pub quiet: bool,
}

/// Fully resolved audit settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAudit {
    pub kinds: Vec<WorkloadKind>,
    pub namespace: Option<String>,
    pub context: Option<String>,
    pub fetch_timeout: Duration,
    pub recommended_timeout_secs: u32,
    pub output_dir: PathBuf,
    pub prefix: String,
}

impl AuditCommandOptions {
    /// Merge with the config file; command-line values win.
    pub fn resolve(&self, config: &Config) -> Result<ResolvedAudit> {
        let kinds = match &self.kinds {
            Some(kinds) => kinds.clone(),
            None => resolve_kinds(&config.audit.kinds)?,
        };

        Ok(ResolvedAudit {
            kinds,
            namespace: self
                .namespace
                .clone()
                .or_else(|| config.audit.namespace.clone())
                .filter(|ns| !ns.is_empty()),
            context: self.context.clone().or_else(|| config.audit.context.clone()),
            fetch_timeout: Duration::from_secs(
                self.fetch_timeout_secs
                    .unwrap_or(config.audit.fetch_timeout_secs),
            ),
            recommended_timeout_secs: self
                .recommended_timeout_secs
                .unwrap_or(config.audit.recommended_timeout_secs),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.output.directory)),
            prefix: self
                .prefix
                .clone()
                .unwrap_or_else(|| config.output.prefix.clone()),
        })
    }
}

/// Handle the `audit` command.
pub async fn handle_audit(options: AuditCommandOptions, config: &Config) -> Result<()> {
    let resolved = options.resolve(config)?;

    let mut plan = AuditPlan::new()
        .with_kinds(resolved.kinds.iter().copied())
        .with_fetch_timeout(resolved.fetch_timeout);
    if let Some(ns) = &resolved.namespace {
        plan = plan.with_namespace(ns.clone());
    }
    let auditor = ProbeAuditor::new(plan);

    let report = match &options.from_file {
        Some(path) => {
            let source = ManifestSource::new(path.clone());
            auditor.run(&source).await
        }
        None => {
            let source = ClusterSource::connect(resolved.context.as_deref()).await?;
            auditor.run(&source).await
        }
    };

    complete_audit(&report, &resolved, &options)
}

/// Render, print and persist a finished audit.
pub fn complete_audit(
    report: &AuditReport,
    resolved: &ResolvedAudit,
    options: &AuditCommandOptions,
) -> Result<()> {
    if report.summary.nothing_scanned() {
        if !options.quiet && !options.json {
            print!("{}", format_console(report, resolved.recommended_timeout_secs));
        }
        return Err(AuditError::NothingScanned {
            failed: report.summary.failed_kinds.len(),
        });
    }

    let narrative = render_narrative(
        report,
        &NarrativeOptions {
            recommended_timeout_secs: resolved.recommended_timeout_secs,
        },
    );
    let json = StructuredReport::from_report(report).to_json()?;

    if options.json {
        println!("{}", json);
    } else if !options.quiet {
        print!("{}", format_console(report, resolved.recommended_timeout_secs));
    }

    if options.no_write {
        return Ok(());
    }

    let (md_path, json_path) = write_reports(
        &resolved.output_dir,
        &resolved.prefix,
        report.summary.audit_date,
        &narrative,
        &json,
    )?;
    if !options.quiet && !options.json {
        println!("Report written to: {}", md_path.display());
        println!("Summary written to: {}", json_path.display());
    }

    Ok(())
}

/// Report file stem, `<prefix>-YYYYmmdd-HHMMSS`.
pub fn report_stem(prefix: &str, audit_date: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, audit_date.format("%Y%m%d-%H%M%S"))
}

/// Write both rendered reports into `dir`, creating it when missing.
pub fn write_reports(
    dir: &Path,
    prefix: &str,
    audit_date: DateTime<Utc>,
    narrative: &str,
    json: &str,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).map_err(|source| AuditError::Output {
        path: dir.to_path_buf(),
        source,
    })?;

    let stem = report_stem(prefix, audit_date);
    let md_path = dir.join(format!("{}.md", stem));
    let json_path = dir.join(format!("{}.json", stem));

    for (path, content) in [(&md_path, narrative), (&json_path, json)] {
        fs::write(path, content).map_err(|source| AuditError::Output {
            path: path.clone(),
            source,
        })?;
        log::info!("Wrote {}", path.display());
    }

    Ok((md_path, json_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::probe_audit::{FetchErrorKind, KindFailure, aggregate};
    use chrono::TimeZone;

    #[test]
    fn test_cli_values_override_config() {
        let mut config = Config::default();
        config.audit.namespace = Some("from-config".to_string());
        config.audit.kinds = vec!["ds".to_string()];
        config.output.prefix = "cfg".to_string();

        let options = AuditCommandOptions {
            namespace: Some("payments".to_string()),
            fetch_timeout_secs: Some(3),
            ..Default::default()
        };
        let resolved = options.resolve(&config).unwrap();

        assert_eq!(resolved.namespace.as_deref(), Some("payments"));
        assert_eq!(resolved.kinds, vec![WorkloadKind::DaemonSet]);
        assert_eq!(resolved.fetch_timeout, Duration::from_secs(3));
        assert_eq!(resolved.recommended_timeout_secs, 5);
        assert_eq!(resolved.prefix, "cfg");
        assert_eq!(resolved.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_report_stem() {
        let date = Utc.with_ymd_and_hms(2026, 10, 18, 9, 5, 7).unwrap();
        assert_eq!(
            report_stem("exec-probe-audit", date),
            "exec-probe-audit-20261018-090507"
        );
    }

    #[test]
    fn test_nothing_scanned_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let failures = WorkloadKind::ALL.iter().map(|kind| {
            Err(KindFailure {
                kind: *kind,
                error: FetchErrorKind::PermissionDenied,
                message: "forbidden".to_string(),
            })
        });
        let report = aggregate(failures, Utc::now(), None);

        let options = AuditCommandOptions {
            output_dir: Some(dir.path().to_path_buf()),
            quiet: true,
            ..Default::default()
        };
        let resolved = options.resolve(&Config::default()).unwrap();
        let err = complete_audit(&report, &resolved, &options).unwrap_err();

        assert!(matches!(err, AuditError::NothingScanned { failed: 3 }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unwritable_directory_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = write_reports(&blocker.join("reports"), "p", Utc::now(), "md", "{}")
            .unwrap_err();
        assert!(matches!(err, AuditError::Output { .. }));
    }
}
