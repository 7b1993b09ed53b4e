//! Probe extraction from workload pod templates.
//!
//! The pod template is decoded with the `k8s-openapi` types, whose
//! `timeout_seconds: Option<i32>` keeps "field omitted" (`None`) apart from
//! "field set" (`Some(n)`, including `Some(1)` and `Some(0)`).

use super::source::RawWorkload;
use super::types::{ContainerProbes, ProbeMechanism, ProbeSpec, ProbeType};
use k8s_openapi::api::core::v1::{Container, PodTemplateSpec, Probe};
use serde::Deserialize;

/// Error reading a single workload's pod template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("malformed workload spec: {0}")]
    MalformedSpec(String),
}

/// Extract one `ContainerProbes` per regular container, in template order.
pub fn extract(workload: &RawWorkload) -> Result<Vec<ContainerProbes>, ExtractionError> {
    if workload.spec.is_null() {
        return Err(ExtractionError::MalformedSpec("missing spec".to_string()));
    }

    let template = workload
        .spec
        .get("template")
        .ok_or_else(|| ExtractionError::MalformedSpec("missing spec.template".to_string()))?;

    let template = PodTemplateSpec::deserialize(template).map_err(|e| {
        ExtractionError::MalformedSpec(format!("invalid spec.template: {}", e))
    })?;

    let pod_spec = template.spec.ok_or_else(|| {
        ExtractionError::MalformedSpec("missing spec.template.spec".to_string())
    })?;

    Ok(pod_spec.containers.iter().map(container_probes).collect())
}

fn container_probes(container: &Container) -> ContainerProbes {
    ContainerProbes {
        name: container.name.clone(),
        liveness: probe_spec(ProbeType::Liveness, container.liveness_probe.as_ref()),
        readiness: probe_spec(ProbeType::Readiness, container.readiness_probe.as_ref()),
        startup: probe_spec(ProbeType::Startup, container.startup_probe.as_ref()),
    }
}

fn probe_spec(probe_type: ProbeType, probe: Option<&Probe>) -> Option<ProbeSpec> {
    probe.map(|p| ProbeSpec::new(probe_type, mechanism(p), p.timeout_seconds))
}

fn mechanism(probe: &Probe) -> ProbeMechanism {
    if probe.exec.is_some() {
        ProbeMechanism::Exec
    } else if probe.http_get.is_some() {
        ProbeMechanism::HttpGet
    } else if probe.tcp_socket.is_some() {
        ProbeMechanism::TcpSocket
    } else if probe.grpc.is_some() {
        ProbeMechanism::Grpc
    } else {
        ProbeMechanism::Unspecified
    }
}
