use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::resource::{LifecycleResource, LifecycleStatus};

pub const GROUP: &str = "jinghzhu.io";
pub const PLURAL: &str = "examples";
pub const CRD_NAME: &str = "examples.jinghzhu.io";

/// Desired state of an [`Example`].
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "jinghzhu.io",
    version = "v1",
    kind = "Example",
    plural = "examples",
    namespaced,
    status = "LifecycleStatus"
)]
pub struct ExampleSpec {
    pub foo: String,
    pub bar: bool,
}

impl LifecycleResource for Example {
    type Spec = ExampleSpec;

    fn spec(&self) -> &ExampleSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut ExampleSpec {
        &mut self.spec
    }

    fn lifecycle(&self) -> Option<&LifecycleStatus> {
        self.status.as_ref()
    }

    fn set_lifecycle(&mut self, status: LifecycleStatus) {
        self.status = Some(status);
    }
}
