//! Typed, namespaced CRUD for instances of a custom resource.

use std::fmt::Debug;

use json_patch::{PatchOperation, ReplaceOperation};
use kube_client::{
    api::{DeleteParams, ListParams, ObjectList, Patch, PatchParams, PostParams},
    Api, Client,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    error::{Error, Result},
    poll::Poll,
    resource::{LifecycleResource, LifecycleStatus, State},
};

/// Client for the instances of `K` in one namespace.
#[derive(Clone)]
pub struct CrdClient<K> {
    api: Api<K>,
    namespace: String,
}

impl<K: LifecycleResource> CrdClient<K> {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            api: Api::namespaced(client, &namespace),
            namespace,
        }
    }

    /// The namespace this client talks to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The plural resource name this client manages.
    pub fn plural(&self) -> String {
        K::plural(&()).into_owned()
    }

    pub async fn create(&self, obj: &K) -> Result<K> {
        Ok(self.api.create(&PostParams::default(), obj).await?)
    }

    /// Replaces the stored object with `obj`.
    ///
    /// `obj` must carry the last observed resource version. The status
    /// subresource is not written by this call.
    pub async fn update(&self, obj: &K) -> Result<K> {
        let name = obj.meta().name.as_deref().ok_or(Error::MissingName)?;
        Ok(self.api.replace(name, &PostParams::default(), obj).await?)
    }

    /// Overwrites both spec and status of the named instance.
    ///
    /// Prefer the patch helpers when only one of them changes.
    pub async fn update_spec_and_status(
        &self,
        name: &str,
        spec: K::Spec,
        status: LifecycleStatus,
    ) -> Result<K> {
        let mut instance = self.get(name).await?;
        *instance.spec_mut() = spec;
        instance.set_lifecycle(status.clone());
        self.update(&instance).await?;
        self.patch_status(name, &status).await
    }

    /// Applies an arbitrary patch to the main resource.
    pub async fn patch<P: Serialize + Debug>(&self, name: &str, patch: &Patch<P>) -> Result<K> {
        Ok(self.api.patch(name, &PatchParams::default(), patch).await?)
    }

    /// Applies an RFC 6902 JSON patch to the main resource.
    pub async fn patch_json_type(&self, name: &str, ops: Vec<PatchOperation>) -> Result<K> {
        self.patch(name, &Patch::<()>::Json(json_patch::Patch(ops)))
            .await
    }

    /// Replaces `/spec` only.
    pub async fn patch_spec(&self, name: &str, spec: &K::Spec) -> Result<K> {
        let ops = vec![replace("/spec", serde_json::to_value(spec)?)];
        self.patch_json_type(name, ops).await
    }

    /// Replaces the status through the status subresource.
    pub async fn patch_status(&self, name: &str, status: &LifecycleStatus) -> Result<K> {
        let patch = Patch::Merge(status_patch(status));
        Ok(self
            .api
            .patch_status(name, &PatchParams::default(), &patch)
            .await?)
    }

    pub async fn patch_spec_and_status(
        &self,
        name: &str,
        spec: &K::Spec,
        status: &LifecycleStatus,
    ) -> Result<K> {
        self.patch_spec(name, spec).await?;
        self.patch_status(name, status).await
    }

    pub async fn delete(&self, name: &str, params: &DeleteParams) -> Result<()> {
        self.api.delete(name, params).await?;
        Ok(())
    }

    pub async fn get(&self, name: &str) -> Result<K> {
        Ok(self.api.get(name).await?)
    }

    pub async fn list(&self, params: &ListParams) -> Result<ObjectList<K>> {
        Ok(self.api.list(params).await?)
    }

    /// Polls the named instance until the controller marks it `Processed`.
    pub async fn wait_for_instance_processed(&self, name: &str, poll: Poll) -> Result<K> {
        log::info!("waiting for {} {name} to be processed", K::kind(&()));
        poll.until(|| async move {
            let instance = self.get(name).await?;
            Ok((instance.state() == Some(State::Processed)).then_some(instance))
        })
        .await?
        .ok_or_else(|| Error::WaitTimeout {
            name: name.to_owned(),
            timeout: poll.timeout,
        })
    }
}

/// A JSON patch `replace` operation.
pub fn replace(path: &str, value: Value) -> PatchOperation {
    PatchOperation::Replace(ReplaceOperation {
        path: path.to_owned(),
        value,
    })
}

/// The merge patch body writing `status`.
pub fn status_patch(status: &LifecycleStatus) -> Value {
    json!({ "status": status })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::{Method, StatusCode};

    use super::*;
    use crate::{
        crd::jinghzhu::{Jinghzhu, JinghzhuSpec},
        mock::{failure, respond, testcontext, timeout_after_1s},
    };

    const JH1: &str = "/apis/jinghzhu.io/v1/namespaces/crd/jinghzhus/jh1";
    const QUICK: Poll = Poll::new(Duration::from_millis(10), Duration::from_millis(35));

    fn jinghzhu(status: LifecycleStatus) -> Jinghzhu {
        let mut obj = Jinghzhu::new("jh1", JinghzhuSpec {
            desired: 1,
            ..Default::default()
        });
        obj.metadata.namespace = Some("crd".into());
        obj.status = Some(status);
        obj
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_once_processed() {
        let (client, mut apiserver) = testcontext();
        let server = tokio::spawn(async move {
            let (_, send) = apiserver.expect(Method::GET, JH1).await;
            respond(send, StatusCode::OK, &jinghzhu(LifecycleStatus::created()));
            let (_, send) = apiserver.expect(Method::GET, JH1).await;
            respond(send, StatusCode::OK, &jinghzhu(LifecycleStatus::processed()));
        });

        let processed = CrdClient::<Jinghzhu>::new(client, "crd")
            .wait_for_instance_processed("jh1", QUICK)
            .await
            .unwrap();
        assert_eq!(processed.state(), Some(State::Processed));
        timeout_after_1s(server).await;
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_while_unprocessed() {
        let (client, mut apiserver) = testcontext();
        tokio::spawn(async move {
            while let Some((request, send)) = apiserver.next().await {
                assert_eq!(request.uri().path(), JH1);
                respond(send, StatusCode::OK, &jinghzhu(LifecycleStatus::pending()));
            }
        });

        let err = CrdClient::<Jinghzhu>::new(client, "crd")
            .wait_for_instance_processed("jh1", QUICK)
            .await
            .unwrap_err();
        match err {
            Error::WaitTimeout { name, timeout } => {
                assert_eq!(name, "jh1");
                assert_eq!(timeout, QUICK.timeout);
            }
            other => panic!("expected a timeout, got {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_aborts_on_get_error() {
        let (client, mut apiserver) = testcontext();
        let server = tokio::spawn(async move {
            let (_, send) = apiserver.expect(Method::GET, JH1).await;
            respond(send, StatusCode::FORBIDDEN, &failure(403, "Forbidden"));
        });

        let err = CrdClient::<Jinghzhu>::new(client, "crd")
            .wait_for_instance_processed("jh1", QUICK)
            .await
            .unwrap_err();
        assert!(
            matches!(&err, Error::Kube(kube_client::Error::Api(response)) if response.code == 403),
            "unexpected error {err}"
        );
        timeout_after_1s(server).await;
    }

    #[tokio::test]
    async fn update_needs_a_name() {
        let (client, _apiserver) = testcontext();
        let mut obj = jinghzhu(LifecycleStatus::created());
        obj.metadata.name = None;
        let err = CrdClient::<Jinghzhu>::new(client, "crd")
            .update(&obj)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingName));
    }

    #[test]
    fn replace_serializes_as_rfc6902() {
        let spec = JinghzhuSpec {
            desired: 3,
            current: 1,
            pod_list: vec!["pod-a".into()],
        };
        let ops = json_patch::Patch(vec![replace("/spec", serde_json::to_value(&spec).unwrap())]);
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!([{
                "op": "replace",
                "path": "/spec",
                "value": { "desired": 3, "current": 1, "podList": ["pod-a"] }
            }])
        );
    }

    #[test]
    fn status_patch_wraps_status() {
        assert_eq!(
            status_patch(&LifecycleStatus::pending()),
            json!({ "status": { "state": "Pending", "message": "Pending to be processed" } })
        );
    }

    #[test]
    fn replace_applies_to_documents() {
        let mut doc = json!({ "spec": { "desired": 1 }, "status": { "state": "Created" } });
        let patch = json_patch::Patch(vec![replace("/status/state", json!("Processed"))]);
        json_patch::patch(&mut doc, &patch).unwrap();
        assert_eq!(doc["status"]["state"], "Processed");
        assert_eq!(doc["spec"]["desired"], 1);
    }
}
