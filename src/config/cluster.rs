//! API server connection settings.
//!
//! Resolved either from `KUBESTORE_*` environment variables or, when running
//! inside a pod, from the mounted service account.

use std::path::{Path, PathBuf};

use crate::errors::{Result, StoreError};

/// Where a pod's service account credentials are mounted.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Connection settings for [`HttpResourceClient`](crate::kube::HttpResourceClient).
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Base URL of the API server (e.g. "https://10.96.0.1:443")
    pub api_url: String,

    /// Bearer token
    pub token: Option<String>,

    /// Namespace every store operates in
    pub namespace: String,

    /// PEM bundle used to verify the API server certificate
    pub ca_cert_path: Option<PathBuf>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            api_url: "https://kubernetes.default.svc".to_string(),
            token: None,
            namespace: "default".to_string(),
            ca_cert_path: None,
            timeout_seconds: 30,
        }
    }
}

impl ClusterConfig {
    /// Load explicit configuration from environment variables.
    ///
    /// Uses:
    /// - `KUBESTORE_API_URL` (required, otherwise `Ok(None)`)
    /// - `KUBESTORE_TOKEN` or `KUBESTORE_TOKEN_FILE`
    /// - `KUBESTORE_NAMESPACE` (default: service account namespace, then "default")
    /// - `KUBESTORE_CA_CERT`
    /// - `KUBESTORE_TIMEOUT_SECONDS` (default: 30)
    pub fn from_env() -> Result<Option<Self>> {
        let Some(api_url) = non_empty_env("KUBESTORE_API_URL") else {
            return Ok(None);
        };

        let token = match non_empty_env("KUBESTORE_TOKEN") {
            Some(token) => Some(token),
            None => match non_empty_env("KUBESTORE_TOKEN_FILE") {
                Some(path) => Some(read_trimmed(Path::new(&path))?),
                None => None,
            },
        };

        let namespace = non_empty_env("KUBESTORE_NAMESPACE")
            .or_else(|| read_trimmed(&Path::new(SERVICE_ACCOUNT_DIR).join("namespace")).ok())
            .unwrap_or_else(|| "default".to_string());

        let timeout_seconds = match non_empty_env("KUBESTORE_TIMEOUT_SECONDS") {
            Some(value) => value.parse().map_err(|e| {
                StoreError::config(format!("Invalid KUBESTORE_TIMEOUT_SECONDS: {}", e))
            })?,
            None => 30,
        };

        Ok(Some(Self {
            api_url,
            token,
            namespace,
            ca_cert_path: non_empty_env("KUBESTORE_CA_CERT").map(PathBuf::from),
            timeout_seconds,
        }))
    }

    /// Discover the API server and credentials of the current pod.
    pub fn in_cluster() -> Result<Self> {
        let host = non_empty_env("KUBERNETES_SERVICE_HOST").ok_or_else(|| {
            StoreError::config("KUBERNETES_SERVICE_HOST is not set; not running in a pod?")
        })?;
        let port = non_empty_env("KUBERNETES_SERVICE_PORT").unwrap_or_else(|| "443".to_string());

        Self::from_service_account(Path::new(SERVICE_ACCOUNT_DIR), &host, &port)
    }

    /// Explicit environment configuration if present, else in-cluster discovery.
    pub fn resolve() -> Result<Self> {
        match Self::from_env()? {
            Some(config) => Ok(config),
            None => Self::in_cluster(),
        }
    }

    /// Build a configuration from a mounted service account directory.
    pub fn from_service_account(dir: &Path, host: &str, port: &str) -> Result<Self> {
        let host = if host.contains(':') { format!("[{}]", host) } else { host.to_string() };

        let ca_path = dir.join("ca.crt");
        let ca_cert_path = ca_path.exists().then_some(ca_path);

        Ok(Self {
            api_url: format!("https://{}:{}", host, port),
            token: Some(read_trimmed(&dir.join("token"))?),
            namespace: read_trimmed(&dir.join("namespace"))?,
            ca_cert_path,
            ..Default::default()
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|value| value.trim().to_string()).filter(|v| !v.is_empty())
}

fn read_trimmed(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map(|contents| contents.trim().to_string())
        .map_err(|e| StoreError::config(format!("Failed to read {}: {}", path.display(), e)))
}
