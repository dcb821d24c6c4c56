use std::{collections::HashMap, sync::Arc};

use kube_core::{Resource, ResourceExt};
use kube_runtime::{
    reflector::{self, ObjectRef, Store},
    watcher,
};

/// A change observed by the [`Informer`].
#[derive(Debug)]
pub enum Notification<K> {
    Added(Arc<K>),
    Updated { old: Arc<K>, new: Arc<K> },
    Deleted(Arc<K>),
}

/// Turns raw watch events into add/update/delete notifications.
///
/// Relists are diffed against the store: new objects are added, objects whose
/// resource version moved are updated, and objects missing from the relist are
/// deleted. Unchanged objects produce nothing.
pub struct Informer<K: Resource<DynamicType = ()> + Clone + 'static> {
    writer: reflector::store::Writer<K>,
}

impl<K> Default for Informer<K>
where
    K: Resource<DynamicType = ()> + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Informer<K>
where
    K: Resource<DynamicType = ()> + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            writer: reflector::store::Writer::new(()),
        }
    }

    /// Read handle on the objects seen so far.
    pub fn store(&self) -> Store<K> {
        self.writer.as_reader()
    }

    pub fn apply(&mut self, event: watcher::Event<K>) -> Vec<Notification<K>> {
        let store = self.writer.as_reader();
        let notifications = match &event {
            watcher::Event::Applied(obj) => {
                let new = Arc::new(obj.clone());
                match store.get(&ObjectRef::from_obj(obj)) {
                    None => vec![Notification::Added(new)],
                    Some(old) => vec![Notification::Updated { old, new }],
                }
            }
            watcher::Event::Deleted(obj) => vec![Notification::Deleted(Arc::new(obj.clone()))],
            watcher::Event::Restarted(objs) => {
                let mut previous: HashMap<_, _> = store
                    .state()
                    .into_iter()
                    .map(|old| (ObjectRef::from_obj(&*old), old))
                    .collect();
                let mut notifications = Vec::new();
                for obj in objs {
                    match previous.remove(&ObjectRef::from_obj(obj)) {
                        None => notifications.push(Notification::Added(Arc::new(obj.clone()))),
                        Some(old) if old.resource_version() != obj.resource_version() => {
                            notifications.push(Notification::Updated {
                                old,
                                new: Arc::new(obj.clone()),
                            });
                        }
                        Some(_) => {}
                    }
                }
                notifications.extend(previous.into_values().map(Notification::Deleted));
                notifications
            }
        };
        self.writer.apply_watcher_event(&event);
        notifications
    }
}
