//! The custom resource kinds this controller manages.
//!
//! All three kinds share [`LifecycleStatus`](crate::resource::LifecycleStatus)
//! and differ only in names and spec shape.

use std::{fmt, str::FromStr};

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube_core::CustomResourceExt;

pub mod example;
pub use example::Example;
pub mod jinghzhu;
pub use jinghzhu::Jinghzhu;
pub mod test0;
pub use test0::Test;

/// Selects one of the managed kinds at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Example,
    Test,
    Jinghzhu,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Example, Kind::Test, Kind::Jinghzhu];

    /// The CRD object name, `<plural>.<group>`.
    pub fn crd_name(self) -> &'static str {
        match self {
            Kind::Example => example::CRD_NAME,
            Kind::Test => test0::CRD_NAME,
            Kind::Jinghzhu => jinghzhu::CRD_NAME,
        }
    }

    pub fn crd(self) -> CustomResourceDefinition {
        match self {
            Kind::Example => Example::crd(),
            Kind::Test => Test::crd(),
            Kind::Jinghzhu => Jinghzhu::crd(),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Example => "Example",
            Kind::Test => "Test",
            Kind::Jinghzhu => "Jinghzhu",
        })
    }
}

/// Returned when a string names none of the managed kinds.
#[derive(Debug, thiserror::Error)]
#[error("unknown kind {0:?}, expected one of example, test, jinghzhu")]
pub struct UnknownKind(String);

impl FromStr for Kind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}
