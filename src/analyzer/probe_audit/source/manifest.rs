//! Offline source reading exported workload objects from disk.
//!
//! Accepts what `kubectl get deploy,sts,ds -A -o json` (or `-o yaml`)
//! produces: a `List` with `items`, a single object, or a multi-document
//! YAML stream. A directory path reads every `*.json`, `*.yaml` and `*.yml`
//! file below it in file name order.

use super::{FetchError, RawWorkload, WorkloadSource};
use crate::analyzer::probe_audit::types::WorkloadKind;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Workload source backed by exported manifests.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every top-level object, with `List` wrappers flattened.
    fn load_objects(&self) -> Result<Vec<serde_json::Value>, FetchError> {
        if !self.path.exists() {
            return Err(FetchError::NotFound(format!(
                "manifest path {} does not exist",
                self.path.display()
            )));
        }

        let files = if self.path.is_dir() {
            collect_manifest_files(&self.path)
        } else {
            vec![self.path.clone()]
        };

        let mut objects = Vec::new();
        for file in files {
            for document in parse_manifest_file(&file)? {
                flatten_into(document, &mut objects);
            }
        }
        Ok(objects)
    }
}

#[async_trait]
impl WorkloadSource for ManifestSource {
    async fn fetch(
        &self,
        kind: WorkloadKind,
        namespace: Option<&str>,
    ) -> Result<Vec<RawWorkload>, FetchError> {
        let objects = self.load_objects()?;

        Ok(objects
            .iter()
            .filter(|obj| obj.get("kind").and_then(|k| k.as_str()) == Some(kind.as_str()))
            .map(|obj| RawWorkload::from_object(kind, obj))
            .filter(|raw| namespace.is_none_or(|ns| raw.namespace == ns))
            .collect())
    }

    fn describe(&self) -> String {
        format!("manifests at {}", self.path.display())
    }
}

fn collect_manifest_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            matches!(
                e.path().extension().and_then(|ext| ext.to_str()),
                Some("json") | Some("yaml") | Some("yml")
            )
        })
        .map(|e| e.into_path())
        .collect()
}

/// Parse one file into its documents. JSON files hold a single document.
fn parse_manifest_file(path: &Path) -> Result<Vec<serde_json::Value>, FetchError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        FetchError::Unavailable(format!("failed to read {}: {}", path.display(), e))
    })?;

    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    if is_json {
        let value = serde_json::from_str(&content).map_err(|e| {
            FetchError::Unavailable(format!("failed to parse {}: {}", path.display(), e))
        })?;
        return Ok(vec![value]);
    }

    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&content) {
        let value = serde_json::Value::deserialize(document).map_err(|e| {
            FetchError::Unavailable(format!("failed to parse {}: {}", path.display(), e))
        })?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

fn flatten_into(document: serde_json::Value, out: &mut Vec<serde_json::Value>) {
    match document {
        serde_json::Value::Object(mut map) if map.get("items").is_some_and(|i| i.is_array()) => {
            if let Some(serde_json::Value::Array(items)) = map.remove("items") {
                for item in items {
                    flatten_into(item, out);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        other => out.push(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LIST_JSON: &str = r#"{
      "apiVersion": "v1",
      "kind": "List",
      "items": [
        {
          "apiVersion": "apps/v1",
          "kind": "Deployment",
          "metadata": {"name": "api", "namespace": "payments"},
          "spec": {"template": {"spec": {"containers": [{"name": "app"}]}}}
        },
        {
          "apiVersion": "apps/v1",
          "kind": "StatefulSet",
          "metadata": {"name": "db", "namespace": "payments"},
          "spec": {"template": {"spec": {"containers": [{"name": "postgres"}]}}}
        },
        {
          "apiVersion": "apps/v1",
          "kind": "Deployment",
          "metadata": {"name": "web", "namespace": "frontend"},
          "spec": {"template": {"spec": {"containers": [{"name": "nginx"}]}}}
        }
      ]
    }"#;

    const MULTI_DOC_YAML: &str = r#"
apiVersion: apps/v1
kind: DaemonSet
metadata:
  name: node-agent
  namespace: monitoring
spec:
  template:
    spec:
      containers:
        - name: agent
          livenessProbe:
            exec:
              command: ["/bin/check"]
---
# trailing comment document
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: worker
spec:
  template:
    spec:
      containers:
        - name: worker
"#;

    #[tokio::test]
    async fn test_list_json_filters_by_kind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all.json");
        fs::write(&path, LIST_JSON).unwrap();

        let source = ManifestSource::new(&path);
        let deployments = source.fetch(WorkloadKind::Deployment, None).await.unwrap();
        let names: Vec<&str> = deployments.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["api", "web"]);

        let statefulsets = source.fetch(WorkloadKind::StatefulSet, None).await.unwrap();
        assert_eq!(statefulsets.len(), 1);
        assert_eq!(statefulsets[0].kind, WorkloadKind::StatefulSet);

        let daemonsets = source.fetch(WorkloadKind::DaemonSet, None).await.unwrap();
        assert!(daemonsets.is_empty());
    }

    #[tokio::test]
    async fn test_namespace_filter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all.json");
        fs::write(&path, LIST_JSON).unwrap();

        let source = ManifestSource::new(&path);
        let deployments = source
            .fetch(WorkloadKind::Deployment, Some("frontend"))
            .await
            .unwrap();
        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].name, "web");
    }

    #[tokio::test]
    async fn test_multi_document_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("workloads.yaml");
        fs::write(&path, MULTI_DOC_YAML).unwrap();

        let source = ManifestSource::new(&path);
        let daemonsets = source.fetch(WorkloadKind::DaemonSet, None).await.unwrap();
        assert_eq!(daemonsets.len(), 1);
        assert_eq!(daemonsets[0].namespace, "monitoring");

        let deployments = source
            .fetch(WorkloadKind::Deployment, Some("default"))
            .await
            .unwrap();
        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].name, "worker");
    }

    #[tokio::test]
    async fn test_directory_reads_all_manifests() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), LIST_JSON).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.yml"), MULTI_DOC_YAML).unwrap();
        fs::write(dir.path().join("README.md"), "# not a manifest").unwrap();

        let source = ManifestSource::new(dir.path());
        let deployments = source.fetch(WorkloadKind::Deployment, None).await.unwrap();
        assert_eq!(deployments.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let source = ManifestSource::new("/nonexistent/cluster-dump.json");
        let err = source
            .fetch(WorkloadKind::Deployment, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unparseable_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let source = ManifestSource::new(&path);
        let err = source
            .fetch(WorkloadKind::Deployment, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Unavailable(_)));
    }
}
