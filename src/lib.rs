//! # Exec Probe Audit
//!
//! Audits Kubernetes workloads for exec probes that rely on the implicit
//! `timeoutSeconds` default and reports which workloads need attention.
//!
//! ## Features
//!
//! - **Concurrent fetch**: Deployments, StatefulSets and DaemonSets are listed in parallel, each under its own deadline
//! - **Partial results**: A kind that cannot be listed is reported, not fatal
//! - **Two reports**: A Markdown narrative and a camelCase JSON summary
//! - **Offline mode**: Audit `kubectl get -o json` dumps or manifest directories
//!
//! ## Example
//!
//! ```rust,no_run
//! use exec_probe_audit::analyzer::probe_audit::{AuditPlan, ManifestSource, ProbeAuditor};
//!
//! # async fn demo() {
//! let source = ManifestSource::new("./cluster-dump.json");
//! let report = ProbeAuditor::new(AuditPlan::new()).run(&source).await;
//! for finding in report.flagged() {
//!     println!("{}", finding.workload);
//! }
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;

pub use error::{AuditError, Result};
pub use handlers::*;
use cli::Commands;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn run_command(command: Commands, config: &config::types::Config, quiet: bool) -> Result<()> {
    match command {
        Commands::Audit {
            namespace,
            kinds,
            context,
            from_file,
            output_dir,
            prefix,
            fetch_timeout,
            recommended_timeout,
            json,
            no_write,
        } => {
            let options = AuditCommandOptions {
                namespace,
                kinds,
                context,
                from_file,
                output_dir,
                prefix,
                fetch_timeout_secs: fetch_timeout,
                recommended_timeout_secs: recommended_timeout,
                json,
                no_write,
                quiet,
            };
            handlers::handle_audit(options, config).await
        }
    }
}
