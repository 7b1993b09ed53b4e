//! Workload analyzers.

pub mod probe_audit;
