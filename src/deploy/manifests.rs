//! Kubernetes manifest generation
//!
//! Renders a PersistentVolumeClaim, a Deployment and a Service for the file
//! manager. The Deployment mounts the claim at `/data` and points the server's
//! default root there.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::fmt::Write;

/// Mount point of the data volume inside the container
pub const DATA_MOUNT: &str = "/data";

/// Manifest parameters, read from plain environment variables
/// (`IMAGE`, `NAMESPACE`, `APP_NAME`, `STORAGE`, `STORAGE_CLASS`, `PORT`).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ManifestConfig {
    pub image: String,
    pub namespace: String,
    pub app_name: String,
    pub storage: String,
    #[serde(default)]
    pub storage_class: Option<String>,
    pub port: u16,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            image: "file-manager:latest".to_string(),
            namespace: "default".to_string(),
            app_name: "file-manager".to_string(),
            storage: "1Gi".to_string(),
            storage_class: None,
            port: 8000,
        }
    }
}

impl ManifestConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config: ManifestConfig = Config::builder()
            .set_default("image", defaults.image)?
            .set_default("namespace", defaults.namespace)?
            .set_default("app_name", defaults.app_name)?
            .set_default("storage", defaults.storage)?
            .set_default("port", defaults.port as i64)?
            .add_source(Environment::default())
            .build()?
            .try_deserialize()?;

        if config.port == 0 {
            return Err(ConfigError::Message("PORT cannot be 0".into()));
        }
        Ok(config)
    }

    fn storage_class(&self) -> Option<&str> {
        self.storage_class.as_deref().filter(|class| !class.is_empty())
    }

    /// All three manifests as one multi-document YAML stream.
    pub fn render(&self) -> String {
        [
            self.persistent_volume_claim(),
            self.deployment(),
            self.service(),
        ]
        .join("---\n")
    }

    pub fn persistent_volume_claim(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "apiVersion: v1\n\
             kind: PersistentVolumeClaim\n\
             metadata:\n  name: {name}-pvc\n  namespace: {namespace}\n\
             spec:\n  accessModes:\n    - ReadWriteOnce\n",
            name = self.app_name,
            namespace = self.namespace,
        );
        if let Some(class) = self.storage_class() {
            let _ = writeln!(out, "  storageClassName: {}", class);
        }
        let _ = write!(
            out,
            "  resources:\n    requests:\n      storage: {}\n",
            self.storage
        );
        out
    }

    pub fn deployment(&self) -> String {
        format!(
            "apiVersion: apps/v1\n\
             kind: Deployment\n\
             metadata:\n  name: {name}\n  namespace: {namespace}\n\
             spec:\n  replicas: 1\n  selector:\n    matchLabels:\n      app: {name}\n\
             \x20 template:\n    metadata:\n      labels:\n        app: {name}\n\
             \x20   spec:\n      containers:\n        - name: {name}\n\
             \x20         image: {image}\n          imagePullPolicy: IfNotPresent\n\
             \x20         env:\n            - name: FILE_MANAGER_DEFAULT_ROOT\n              value: {mount}\n\
             \x20           - name: PORT\n              value: \"{port}\"\n\
             \x20         ports:\n            - containerPort: {port}\n\
             \x20         volumeMounts:\n            - name: data\n              mountPath: {mount}\n\
             \x20     volumes:\n        - name: data\n          persistentVolumeClaim:\n            claimName: {name}-pvc\n",
            name = self.app_name,
            namespace = self.namespace,
            image = self.image,
            port = self.port,
            mount = DATA_MOUNT,
        )
    }

    pub fn service(&self) -> String {
        format!(
            "apiVersion: v1\n\
             kind: Service\n\
             metadata:\n  name: {name}\n  namespace: {namespace}\n\
             spec:\n  type: ClusterIP\n  selector:\n    app: {name}\n\
             \x20 ports:\n    - name: http\n      port: 80\n      targetPort: {port}\n",
            name = self.app_name,
            namespace = self.namespace,
            port = self.port,
        )
    }
}
