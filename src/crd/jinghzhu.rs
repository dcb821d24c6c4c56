use std::fmt;

use kube::CustomResource;
use kube_core::ResourceExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::resource::{LifecycleResource, LifecycleStatus};

pub const GROUP: &str = "jinghzhu.io";
pub const PLURAL: &str = "jinghzhus";
pub const SINGULAR: &str = "jinghzhu";
pub const SHORT_NAME: &str = "jh";
pub const CRD_NAME: &str = "jinghzhus.jinghzhu.io";

/// Desired state of a [`Jinghzhu`]: a tracked set of pods.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "jinghzhu.io",
    version = "v1",
    kind = "Jinghzhu",
    plural = "jinghzhus",
    singular = "jinghzhu",
    shortname = "jh",
    namespaced,
    status = "LifecycleStatus",
    printcolumn = r#"{"name":"Desired", "type":"integer", "jsonPath":".spec.desired"}"#,
    printcolumn = r#"{"name":"State", "type":"string", "jsonPath":".status.state"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct JinghzhuSpec {
    /// Desired pod count.
    pub desired: i32,
    /// Pods currently running.
    #[serde(default)]
    pub current: i32,
    /// Names of the current pods.
    #[serde(default)]
    pub pod_list: Vec<String>,
}

impl LifecycleResource for Jinghzhu {
    type Spec = JinghzhuSpec;

    fn spec(&self) -> &JinghzhuSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut JinghzhuSpec {
        &mut self.spec
    }

    fn lifecycle(&self) -> Option<&LifecycleStatus> {
        self.status.as_ref()
    }

    fn set_lifecycle(&mut self, status: LifecycleStatus) {
        self.status = Some(status);
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Jinghzhu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status.clone().unwrap_or_default();
        writeln!(f, "\tName = {}", self.name_any())?;
        writeln!(
            f,
            "\tResource Version = {}",
            self.resource_version().unwrap_or_default()
        )?;
        writeln!(f, "\tDesired = {}", self.spec.desired)?;
        writeln!(f, "\tCurrent = {}", self.spec.current)?;
        writeln!(f, "\tPodList = {}", self.spec.pod_list.join(", "))?;
        writeln!(f, "\tState = {}", status.state)?;
        write!(f, "\tMessage = {}", status.message)
    }
}
