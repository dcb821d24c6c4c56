use std::time::Duration;

use kube_client::config::{InferConfigError, KubeconfigError};
use thiserror::Error;

/// Errors returned by the CRD registration, client and controller layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the Kubernetes client
    #[error("Kube Error: {0}")]
    Kube(#[from] kube_client::Error),

    /// The kubeconfig file could not be read or resolved
    #[error("Kubeconfig Error: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    /// Neither a kubeconfig nor an in-cluster environment was usable
    #[error("Infer Config Error: {0}")]
    InferConfig(#[from] InferConfigError),

    /// Error during JSON serialization/deserialization
    #[error("SerializationError: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The CRD never reported `Established=True` within the wait window
    #[error("CRD {name} not established after {timeout:?}")]
    CrdNotEstablished { name: String, timeout: Duration },

    /// Waiting for the CRD failed, and so did deleting it afterwards
    #[error("CRD {name} failed ({cause}) and cleanup failed too: {cleanup}")]
    CrdCleanup {
        name: String,
        #[source]
        cause: Box<Error>,
        cleanup: kube_client::Error,
    },

    /// An instance never reached the `Processed` state
    #[error("instance {name} not processed after {timeout:?}")]
    WaitTimeout { name: String, timeout: Duration },

    /// The object has no `metadata.name`
    #[error("object has no name")]
    MissingName,
}

/// Result type for controller operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// The apiserver rejected a create because the object exists.
    pub fn is_already_exists(&self) -> bool {
        self.api_code() == Some(409)
    }

    /// The apiserver has no such object.
    pub fn is_not_found(&self) -> bool {
        self.api_code() == Some(404)
    }

    fn api_code(&self) -> Option<u16> {
        match self {
            Error::Kube(kube_client::Error::Api(response)) => Some(response.code),
            _ => None,
        }
    }
}
