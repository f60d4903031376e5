// config.rs — Daemon configuration: TOML file plus environment overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level daemon configuration, loaded from `opsd.toml`.
///
/// Every field has a workable default so a bare `ops-daemon` starts a
/// local instance; deployments override via the file or `OPSD_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Listen address, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
    /// Remote media storage; absent means uploads stay in-process
    /// (development only).
    pub media: Option<MediaConfig>,
    /// Push delivery credentials.
    pub push: PushConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("ops.db"),
            bind_addr: "127.0.0.1:8080".to_string(),
            media: None,
            push: PushConfig::default(),
        }
    }
}

/// Remote media storage provider.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    pub upload_url: String,
    pub api_key: String,
}

/// Push transport selection. The managed multicast sender wins when its
/// credential is present; otherwise the legacy HTTP-key gateway; otherwise
/// push is a logged no-op (in-app notifications still persist).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub fcm_credential: Option<String>,
    pub legacy_endpoint: Option<String>,
    pub legacy_api_key: Option<String>,
}

impl DaemonConfig {
    /// Load from `path` if it exists, else start from defaults; then apply
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(db_path) = std::env::var("OPSD_DB_PATH") {
            config.db_path = PathBuf::from(db_path);
        }
        if let Ok(bind_addr) = std::env::var("OPSD_BIND_ADDR") {
            config.bind_addr = bind_addr;
        }
        if let Ok(credential) = std::env::var("OPSD_FCM_CREDENTIAL") {
            config.push.fcm_credential = Some(credential);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = DaemonConfig::load(Path::new("/nonexistent/opsd.toml")).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert!(config.media.is_none());
        assert!(config.push.fcm_credential.is_none());
    }

    #[test]
    fn toml_file_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opsd.toml");
        std::fs::write(
            &path,
            r#"
db_path = "/var/lib/ops/ops.db"
bind_addr = "0.0.0.0:9090"

[media]
upload_url = "https://media.example/upload"
api_key = "k"

[push]
legacy_endpoint = "https://push.example/send"
legacy_api_key = "pk"
"#,
        )
        .unwrap();

        let config = DaemonConfig::load(&path).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9090");
        assert_eq!(
            config.media.as_ref().unwrap().upload_url,
            "https://media.example/upload"
        );
        assert_eq!(
            config.push.legacy_endpoint.as_deref(),
            Some("https://push.example/send")
        );
    }
}
