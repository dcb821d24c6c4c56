//! Watches every instance of a kind and dispatches add/update/delete
//! notifications to an [`EventHandler`].

use futures::StreamExt;
use kube_client::{Api, Client};
use kube_runtime::{reflector::Store, watcher, WatchStreamExt};
use tokio_util::sync::CancellationToken;

use crate::resource::LifecycleResource;

pub mod handler;
pub use handler::{EventHandler, StatusProcessor};
pub mod informer;
pub use informer::{Informer, Notification};

/// A list-watch over all namespaces feeding an [`Informer`] and a handler.
pub struct Controller<K: LifecycleResource, H> {
    api: Api<K>,
    watcher_config: watcher::Config,
    informer: Informer<K>,
    handler: H,
}

impl<K, H> Controller<K, H>
where
    K: LifecycleResource,
    H: EventHandler<K>,
{
    pub fn new(client: Client, handler: H) -> Self {
        Self {
            api: Api::all(client),
            watcher_config: watcher::Config::default(),
            informer: Informer::new(),
            handler,
        }
    }

    /// Restricts the watch, e.g. by label selector.
    #[must_use]
    pub fn with_watcher_config(mut self, watcher_config: watcher::Config) -> Self {
        self.watcher_config = watcher_config;
        self
    }

    /// Read handle on the controller's cache, valid after [`run`](Self::run) starts.
    pub fn store(&self) -> Store<K> {
        self.informer.store()
    }

    /// Runs until `cancel` fires or the watch stream ends.
    ///
    /// Watch errors are logged; the watcher backs off and reconnects on its own.
    pub async fn run(mut self, cancel: CancellationToken) {
        log::info!("watching {} objects", K::kind(&()));

        let mut events = watcher(self.api, self.watcher_config)
            .default_backoff()
            .boxed();

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.next() => event,
            };
            match event {
                Some(Ok(event)) => {
                    for notification in self.informer.apply(event) {
                        dispatch(&self.handler, notification).await;
                    }
                }
                Some(Err(err)) => log::warn!("watch error: {err}"),
                None => break,
            }
        }

        log::info!("stopped watching {} objects", K::kind(&()));
    }
}

/// Hands one notification to the matching handler callback.
pub async fn dispatch<K, H: EventHandler<K>>(handler: &H, notification: Notification<K>) {
    match notification {
        Notification::Added(obj) => handler.on_add(obj).await,
        Notification::Updated { old, new } => handler.on_update(old, new).await,
        Notification::Deleted(obj) => handler.on_delete(obj).await,
    }
}
