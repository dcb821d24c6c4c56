//! Process settings and kube client construction.

use std::path::{Path, PathBuf};

use kube_client::config::{KubeConfigOptions, Kubeconfig};
use kube_client::Client;

use crate::error::Result;

/// Namespace used for instances when `CRD_NAMESPACE` is unset.
pub const DEFAULT_CRD_NAMESPACE: &str = "crd";

/// Where to find the cluster and where instances live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Namespace in which CRD instances are created.
    pub crd_namespace: String,
    /// Path of the kubeconfig file.
    pub kubeconfig: PathBuf,
}

impl Settings {
    /// Reads `CRD_NAMESPACE` and `KUBECONFIG` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            crd_namespace: get("CRD_NAMESPACE")
                .unwrap_or_else(|| DEFAULT_CRD_NAMESPACE.to_owned()),
            kubeconfig: get("KUBECONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(default_kubeconfig_path),
        }
    }

    /// Connects to the cluster described by [`kubeconfig`](Self::kubeconfig).
    ///
    /// Falls back to in-cluster and other inferred configuration when the file is absent.
    pub async fn client(&self) -> Result<Client> {
        let config = if self.kubeconfig.exists() {
            log::debug!("loading kubeconfig from {}", self.kubeconfig.display());
            let kubeconfig = Kubeconfig::read_from(&self.kubeconfig)?;
            kube_client::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await?
        } else {
            log::info!(
                "kubeconfig {} not found, inferring cluster config",
                self.kubeconfig.display()
            );
            kube_client::Config::infer().await?
        };

        Ok(Client::try_from(config)?)
    }
}

fn default_kubeconfig_path() -> PathBuf {
    home::home_dir()
        .unwrap_or_else(|| Path::new("/").to_path_buf())
        .join(".kube")
        .join("config")
}
