// Handler modules
pub mod audit;

pub use audit::{
    AuditCommandOptions, ResolvedAudit, complete_audit, handle_audit, report_stem, write_reports,
};
