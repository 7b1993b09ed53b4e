use crate::analyzer::probe_audit::WorkloadKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "probe-audit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find exec probes that rely on the implicit timeoutSeconds default")]
#[command(long_about = "Scans Deployments, StatefulSets and DaemonSets for exec liveness, readiness and startup probes without an explicit timeoutSeconds, and writes a Markdown narrative and a JSON summary of the workloads that need attention.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit workloads for exec probes without an explicit timeout
    Audit {
        /// Only audit this namespace (all namespaces when omitted)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Resource kinds to audit (deployments, statefulsets, daemonsets)
        #[arg(short, long, value_delimiter = ',', value_name = "KINDS")]
        kinds: Option<Vec<WorkloadKind>>,

        /// Kubeconfig context to use (current context when omitted)
        #[arg(long, value_name = "CONTEXT", conflicts_with = "from_file")]
        context: Option<String>,

        /// Audit a manifest file or directory instead of a live cluster
        #[arg(short = 'f', long, value_name = "PATH")]
        from_file: Option<PathBuf>,

        /// Directory for the report files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// File name prefix for the report files
        #[arg(long)]
        prefix: Option<String>,

        /// Per-kind fetch deadline in seconds
        #[arg(long, value_name = "SECONDS")]
        fetch_timeout: Option<u64>,

        /// timeoutSeconds value suggested next to flagged probes
        #[arg(long, value_name = "SECONDS")]
        recommended_timeout: Option<u32>,

        /// Print the structured report to stdout instead of the summary
        #[arg(long)]
        json: bool,

        /// Do not write report files
        #[arg(long)]
        no_write: bool,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
