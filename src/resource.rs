//! Lifecycle status shared by every custom resource kind.

use std::fmt::{self, Debug};

use k8s_openapi::NamespaceResourceScope;
use kube_core::{CustomResourceExt, Resource, ResourceExt};
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Lifecycle state recorded in `status.state`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    /// Created but not yet seen by the controller.
    #[default]
    Created,
    /// Waiting for the controller.
    Pending,
    /// Handled by the controller.
    Processed,
    /// Any other value written by someone else.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Created => "Created",
            State::Pending => "Pending",
            State::Processed => "Processed",
            State::Unknown => "Unknown",
        })
    }
}

/// The `status` block of every kind.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LifecycleStatus {
    #[serde(default)]
    #[schemars(with = "String")]
    pub state: State,
    #[serde(default)]
    pub message: String,
}

impl LifecycleStatus {
    pub fn new(state: State, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }

    pub fn created() -> Self {
        Self::new(State::Created, "Created but not processed yet")
    }

    pub fn pending() -> Self {
        Self::new(State::Pending, "Pending to be processed")
    }

    pub fn processed() -> Self {
        Self::new(State::Processed, "Successfully processed by controller")
    }
}

/// A namespaced custom resource carrying a [`LifecycleStatus`].
///
/// The controller and client are generic over this trait, so adding a kind
/// only needs a derived type and this impl.
pub trait LifecycleResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + CustomResourceExt
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// The spec type, used by the spec patch helpers.
    type Spec: Clone + Debug + Serialize + Send + Sync;

    fn spec(&self) -> &Self::Spec;

    fn spec_mut(&mut self) -> &mut Self::Spec;

    fn lifecycle(&self) -> Option<&LifecycleStatus>;

    fn set_lifecycle(&mut self, status: LifecycleStatus);

    fn state(&self) -> Option<State> {
        self.lifecycle().map(|status| status.state)
    }

    /// Whether the controller should move this object to `Processed`.
    fn needs_processing(&self) -> bool {
        matches!(
            self.state(),
            None | Some(State::Created) | Some(State::Pending)
        )
    }

    /// Summary used when listing instances.
    fn describe(&self) -> String {
        format!("{} ({})", self.name_any(), self.state().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::crd::example::{Example, ExampleSpec};

    fn example(status: Option<LifecycleStatus>) -> Example {
        let mut obj = Example::new(
            "example1",
            ExampleSpec {
                foo: "hello".into(),
                bar: true,
            },
        );
        obj.status = status;
        obj
    }

    #[test]
    fn status_uses_plain_state_strings() {
        let value = serde_json::to_value(LifecycleStatus::processed()).unwrap();
        assert_eq!(
            value,
            json!({"state": "Processed", "message": "Successfully processed by controller"})
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let status: LifecycleStatus = serde_json::from_value(json!({})).unwrap();
        assert_eq!(status.state, State::Created);
        assert!(status.message.is_empty());
    }

    #[test]
    fn foreign_state_is_unknown() {
        let status: LifecycleStatus =
            serde_json::from_value(json!({"state": "Exploded", "message": "?"})).unwrap();
        assert_eq!(status.state, State::Unknown);
    }

    #[test]
    fn crd_schema_accepts_any_state_string() {
        let crd = serde_json::to_value(Example::crd()).unwrap();
        let state = &crd["spec"]["versions"][0]["schema"]["openAPIV3Schema"]["properties"]
            ["status"]["properties"]["state"];
        assert_eq!(state["type"], "string");
        assert!(state.get("enum").is_none(), "state schema is restricted: {state}");
    }

    #[test]
    fn processing_is_needed_until_processed() {
        assert!(example(None).needs_processing());
        assert!(example(Some(LifecycleStatus::created())).needs_processing());
        assert!(example(Some(LifecycleStatus::pending())).needs_processing());
        assert!(!example(Some(LifecycleStatus::processed())).needs_processing());
        assert!(!example(Some(LifecycleStatus::new(State::Unknown, ""))).needs_processing());
    }

    #[test]
    fn describe_shows_name_and_state() {
        assert_eq!(example(None).describe(), "example1 (Created)");
        assert_eq!(
            example(Some(LifecycleStatus::processed())).describe(),
            "example1 (Processed)"
        );
    }
}
