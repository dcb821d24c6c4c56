use std::{future::Future, marker::PhantomData, sync::Arc};

use kube_client::Client;
use kube_core::ResourceExt;

use crate::{
    client::CrdClient,
    resource::{LifecycleResource, LifecycleStatus},
};

/// Callbacks for the notifications produced by the informer.
///
/// Handlers own their error reporting: nothing they do can stop the watch.
pub trait EventHandler<K>: Send + Sync {
    fn on_add(&self, obj: Arc<K>) -> impl Future<Output = ()> + Send;

    fn on_update(&self, old: Arc<K>, new: Arc<K>) -> impl Future<Output = ()> + Send;

    fn on_delete(&self, obj: Arc<K>) -> impl Future<Output = ()> + Send;
}

/// Moves every newly observed object to `Processed`.
pub struct StatusProcessor<K> {
    client: Client,
    _ph: PhantomData<fn(K)>,
}

impl<K> StatusProcessor<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _ph: PhantomData,
        }
    }
}

impl<K: LifecycleResource> EventHandler<K> for StatusProcessor<K> {
    async fn on_add(&self, obj: Arc<K>) {
        let key = object_key(&*obj);
        log::info!("on add {key}");

        if !obj.needs_processing() {
            log::debug!("{key} is already {}", obj.state().unwrap_or_default());
            return;
        }

        let namespace = obj.namespace().unwrap_or_default();
        let client = CrdClient::<K>::new(self.client.clone(), namespace);
        match client
            .patch_status(&obj.name_any(), &LifecycleStatus::processed())
            .await
        {
            Ok(_) => log::info!("updated status of {key}"),
            Err(err) => log::error!("error updating status of {key}: {err}"),
        }
    }

    async fn on_update(&self, old: Arc<K>, new: Arc<K>) {
        log::info!(
            "on update {} (resource version {} -> {})",
            object_key(&*new),
            old.resource_version().unwrap_or_default(),
            new.resource_version().unwrap_or_default()
        );
    }

    async fn on_delete(&self, obj: Arc<K>) {
        log::info!("on delete {}", object_key(&*obj));
    }
}

/// `namespace/name`, or just `name` for cluster-scoped objects.
pub fn object_key<K: ResourceExt>(obj: &K) -> String {
    match obj.namespace() {
        Some(namespace) => format!("{namespace}/{}", obj.name_any()),
        None => obj.name_any(),
    }
}
