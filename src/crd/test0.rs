use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::resource::{LifecycleResource, LifecycleStatus};

pub const GROUP: &str = "test0.io";
pub const PLURAL: &str = "tests";
pub const CRD_NAME: &str = "tests.test0.io";

/// Desired state of a [`Test`].
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "test0.io",
    version = "v1",
    kind = "Test",
    plural = "tests",
    namespaced,
    status = "LifecycleStatus"
)]
pub struct TestSpec {
    pub foo: String,
    pub bar: bool,
}

impl LifecycleResource for Test {
    type Spec = TestSpec;

    fn spec(&self) -> &TestSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut TestSpec {
        &mut self.spec
    }

    fn lifecycle(&self) -> Option<&LifecycleStatus> {
        self.status.as_ref()
    }

    fn set_lifecycle(&mut self, status: LifecycleStatus) {
        self.status = Some(status);
    }
}
