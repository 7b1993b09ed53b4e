pub mod types;

use crate::analyzer::probe_audit::WorkloadKind;
use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".probe-audit.toml";

/// Get the global config file path (~/.probe-audit.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (./.probe-audit.toml)
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load configuration.
///
/// An explicit path must exist and parse. Otherwise the local config is
/// tried first, then the global one, then defaults; an implicit file that
/// fails to parse is skipped with a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<types::Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        return Ok(read_config(path)?);
    }

    let candidates = std::env::current_dir()
        .ok()
        .map(|cwd| local_config_path(&cwd))
        .into_iter()
        .chain(global_config_path());

    for candidate in candidates {
        if !candidate.exists() {
            continue;
        }
        match read_config(&candidate) {
            Ok(config) => {
                log::debug!("Loaded configuration from {}", candidate.display());
                return Ok(config);
            }
            Err(e) => log::warn!("Ignoring {}: {}", candidate.display(), e),
        }
    }

    Ok(types::Config::default())
}

/// Read and parse one config file.
pub fn read_config(path: &Path) -> std::result::Result<types::Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ParsingFailed(e.to_string()))
}

/// Resolve configured kind names.
pub fn resolve_kinds(names: &[String]) -> std::result::Result<Vec<WorkloadKind>, ConfigError> {
    names
        .iter()
        .map(|name| {
            WorkloadKind::parse(name)
                .ok_or_else(|| ConfigError::InvalidValue(format!("unknown resource kind '{}'", name)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = types::Config::default();
        assert_eq!(config.audit.fetch_timeout_secs, 30);
        assert_eq!(config.audit.recommended_timeout_secs, 5);
        assert_eq!(config.output.directory, ".");
        assert_eq!(config.output.prefix, "exec-probe-audit");
        assert_eq!(
            resolve_kinds(&config.audit.kinds).unwrap(),
            WorkloadKind::ALL.to_vec()
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[audit]\nnamespace = \"payments\"\nkinds = [\"sts\"]").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.audit.namespace.as_deref(), Some("payments"));
        assert_eq!(
            resolve_kinds(&config.audit.kinds).unwrap(),
            vec![WorkloadKind::StatefulSet]
        );
        assert_eq!(config.audit.fetch_timeout_secs, 30);
        assert_eq!(config.output, types::OutputConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_explicit_invalid_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[audit]\nfetch_timeout_secs = \"soon\"").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = resolve_kinds(&["cronjobs".to_string()]).unwrap_err();
        assert!(err.to_string().contains("cronjobs"));
    }
}
