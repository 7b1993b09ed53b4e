//! Workload sources.
//!
//! A source answers one question: "give me every object of this kind,
//! optionally restricted to a namespace". Each call is atomic from the
//! caller's point of view, either the full list or a `FetchError`.
//!
//! - [`ClusterSource`] lists objects from a live API server (read-only).
//! - [`ManifestSource`] reads `kubectl get -o json|yaml` dumps from disk.

pub mod cluster;
pub mod manifest;

pub use cluster::{ClusterSource, ConnectError};
pub use manifest::ManifestSource;

use super::types::{FetchErrorKind, KindFailure, WorkloadKind};
use async_trait::async_trait;

/// Error fetching the objects of one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::NotFound(_) => FetchErrorKind::NotFound,
            Self::PermissionDenied(_) => FetchErrorKind::PermissionDenied,
            Self::Unavailable(_) => FetchErrorKind::Unavailable,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m) | Self::PermissionDenied(m) | Self::Unavailable(m) => m,
        }
    }

    /// Convert into the summary record for `kind`.
    pub fn into_failure(self, kind: WorkloadKind) -> KindFailure {
        KindFailure {
            kind,
            error: self.kind(),
            message: self.message().to_string(),
        }
    }
}

/// A workload object as fetched, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWorkload {
    pub kind: WorkloadKind,
    pub namespace: String,
    pub name: String,
    /// The object's `spec`, verbatim. `Null` when the object has none.
    pub spec: serde_json::Value,
}

impl RawWorkload {
    pub fn new(
        kind: WorkloadKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
        spec: serde_json::Value,
    ) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
            spec,
        }
    }

    /// Build from a full object (`apiVersion`, `kind`, `metadata`, `spec`).
    ///
    /// Objects without a namespace land in `default`, as kubectl would place them.
    pub fn from_object(kind: WorkloadKind, object: &serde_json::Value) -> Self {
        let metadata = object.get("metadata");
        let field = |key: &str| {
            metadata
                .and_then(|m| m.get(key))
                .and_then(|v| v.as_str())
                .map(String::from)
        };

        Self {
            kind,
            namespace: field("namespace").unwrap_or_else(|| "default".to_string()),
            name: field("name").unwrap_or_default(),
            spec: object.get("spec").cloned().unwrap_or(serde_json::Value::Null),
        }
    }
}

/// Somewhere workload objects can be listed from.
#[async_trait]
pub trait WorkloadSource: Send + Sync {
    /// List every object of `kind`, in `namespace` or in all namespaces.
    async fn fetch(
        &self,
        kind: WorkloadKind,
        namespace: Option<&str>,
    ) -> Result<Vec<RawWorkload>, FetchError>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}
