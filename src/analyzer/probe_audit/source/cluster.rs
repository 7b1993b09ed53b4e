//! Live cluster source backed by the Kubernetes API.
//!
//! Lists workload objects through the dynamic API so every kind shares one
//! code path and the object body reaches the extractor untouched.
//!
//! # Prerequisites
//!
//! - Valid kubeconfig (uses default context or specified context)
//! - RBAC permission to `list` deployments, statefulsets and daemonsets
//!
//! Only `list` requests are ever issued.

use super::{FetchError, RawWorkload, WorkloadSource};
use crate::analyzer::probe_audit::types::WorkloadKind;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use kube::{
    Client, Config,
    api::{Api, ApiResource, DynamicObject, ListParams},
};

/// Error type for establishing a cluster connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Failed to create Kubernetes client: {0}")]
    ClientCreation(#[from] kube::Error),

    #[error("Failed to infer Kubernetes config: {0}")]
    ConfigError(#[from] kube::config::InferConfigError),

    #[error("Failed to read kubeconfig: {0}")]
    KubeconfigError(#[from] kube::config::KubeconfigError),
}

/// Kubernetes API workload source.
pub struct ClusterSource {
    client: Client,
    context: Option<String>,
}

impl ClusterSource {
    /// Connect using the default kubeconfig (or in-cluster config).
    pub async fn new() -> Result<Self, ConnectError> {
        install_crypto_provider();
        let config = Config::infer().await?;
        let client = Client::try_from(config)?;
        Ok(Self {
            client,
            context: None,
        })
    }

    /// Connect with a specific kubeconfig context.
    pub async fn with_context(context: &str) -> Result<Self, ConnectError> {
        install_crypto_provider();
        let kubeconfig = kube::config::Kubeconfig::read()?;
        let config = Config::from_custom_kubeconfig(
            kubeconfig,
            &kube::config::KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            },
        )
        .await?;
        let client = Client::try_from(config)?;
        Ok(Self {
            client,
            context: Some(context.to_string()),
        })
    }

    /// Connect with `context` when given, otherwise the current context.
    pub async fn connect(context: Option<&str>) -> Result<Self, ConnectError> {
        match context {
            Some(ctx) if !ctx.is_empty() && ctx != "current" => Self::with_context(ctx).await,
            _ => Self::new().await,
        }
    }
}

#[async_trait]
impl WorkloadSource for ClusterSource {
    async fn fetch(
        &self,
        kind: WorkloadKind,
        namespace: Option<&str>,
    ) -> Result<Vec<RawWorkload>, FetchError> {
        let resource = api_resource(kind);
        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        };

        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| classify_api_error(kind, e))?;

        Ok(list
            .items
            .into_iter()
            .map(|obj| to_raw_workload(kind, obj))
            .collect())
    }

    fn describe(&self) -> String {
        match &self.context {
            Some(ctx) => format!("cluster (context '{}')", ctx),
            None => "cluster (current context)".to_string(),
        }
    }
}

/// Required for TLS connections to the API server.
fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

fn api_resource(kind: WorkloadKind) -> ApiResource {
    match kind {
        WorkloadKind::Deployment => ApiResource::erase::<Deployment>(&()),
        WorkloadKind::StatefulSet => ApiResource::erase::<StatefulSet>(&()),
        WorkloadKind::DaemonSet => ApiResource::erase::<DaemonSet>(&()),
    }
}

fn to_raw_workload(kind: WorkloadKind, obj: DynamicObject) -> RawWorkload {
    let spec = obj
        .data
        .get("spec")
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    RawWorkload {
        kind,
        namespace: obj.metadata.namespace.unwrap_or_default(),
        name: obj.metadata.name.unwrap_or_default(),
        spec,
    }
}

/// Map a kube error to the fetch error taxonomy.
fn classify_api_error(kind: WorkloadKind, err: kube::Error) -> FetchError {
    match err {
        kube::Error::Api(response) => {
            classify_status(kind, response.code, response.message.clone())
        }
        other => FetchError::Unavailable(other.to_string()),
    }
}

fn classify_status(kind: WorkloadKind, code: u16, message: String) -> FetchError {
    match code {
        404 => FetchError::NotFound(format!("{} API not served: {}", kind.plural(), message)),
        401 | 403 => FetchError::PermissionDenied(message),
        code => FetchError::Unavailable(format!("{} (HTTP {})", message, code)),
    }
}
