//! Registering custom resource definitions with the apiserver.

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube_client::{
    api::{DeleteParams, PostParams},
    Api, Client,
};
use kube_core::ResourceExt;

use crate::{
    error::{Error, Result},
    poll::Poll,
};

/// How far a CRD is from being usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// `Established=True`: instances can be created.
    Established,
    /// `NamesAccepted=False`, with the reported reason.
    NamesConflict(String),
    /// Neither of the above yet.
    Pending,
}

/// Evaluates the status conditions of a CRD.
pub fn crd_readiness(crd: &CustomResourceDefinition) -> Readiness {
    let conditions = crd
        .status
        .as_ref()
        .and_then(|status| status.conditions.as_deref())
        .unwrap_or_default();

    let mut readiness = Readiness::Pending;
    for cond in conditions {
        match (cond.type_.as_str(), cond.status.as_str()) {
            ("Established", "True") => return Readiness::Established,
            ("NamesAccepted", "False") => {
                readiness = Readiness::NamesConflict(cond.reason.clone().unwrap_or_default());
            }
            _ => {}
        }
    }
    readiness
}

/// Creates `crd` and waits until it is established.
///
/// An existing CRD of the same name is accepted as is. If waiting fails or times out,
/// the CRD is deleted again before the error is returned.
pub async fn create_custom_resource_definition(
    client: Client,
    crd: CustomResourceDefinition,
    poll: Poll,
) -> Result<CustomResourceDefinition> {
    let api = Api::<CustomResourceDefinition>::all(client);
    let name = crd.name_any();

    match api.create(&PostParams::default(), &crd).await.map_err(Error::from) {
        Ok(_) => log::info!("CRD {name} is created"),
        Err(err) if err.is_already_exists() => log::info!("CRD {name} already exists"),
        Err(err) => {
            log::error!("failed to create CRD {name}: {err}");
            return Err(err);
        }
    }

    let waited = {
        let api = &api;
        let name = name.as_str();
        poll.until(|| async move {
            let current = api.get(name).await.map_err(|err| {
                log::error!("failed to wait for CRD {name}: {err}");
                Error::from(err)
            })?;
            match crd_readiness(&current) {
                Readiness::Established => Ok(Some(current)),
                Readiness::NamesConflict(reason) => {
                    log::warn!("name conflict while waiting for CRD {name}: {reason}");
                    Ok(None)
                }
                Readiness::Pending => Ok(None),
            }
        })
        .await
    };

    let cause = match waited {
        Ok(Some(established)) => return Ok(established),
        Ok(None) => Error::CrdNotEstablished {
            name: name.clone(),
            timeout: poll.timeout,
        },
        Err(err) => err,
    };

    log::info!("cleaning up CRD {name}");
    match delete(&api, &name).await {
        Ok(()) => Err(cause),
        Err(cleanup) => {
            log::error!("failed to delete CRD {name}: {cleanup}");
            Err(Error::CrdCleanup {
                name,
                cause: Box::new(cause),
                cleanup,
            })
        }
    }
}

/// Deletes the CRD called `name`. A missing CRD is not an error.
pub async fn delete_custom_resource_definition(client: Client, name: &str) -> Result<()> {
    let api = Api::<CustomResourceDefinition>::all(client);
    delete(&api, name).await?;
    log::info!("CRD {name} is deleted");
    Ok(())
}

async fn delete(api: &Api<CustomResourceDefinition>, name: &str) -> Result<(), kube_client::Error> {
    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => Ok(()),
        Err(kube_client::Error::Api(response)) if response.code == 404 => Ok(()),
        Err(err) => Err(err),
    }
}
