//! kube-crd-controller registers a custom resource definition,
//! watches its instances across all namespaces,
//! and moves every newly observed instance from `Created`/`Pending` to `Processed`.
//!
//! Three kinds are provided ([`crd::Example`], [`crd::Test`], [`crd::Jinghzhu`]).
//! They share one [`resource::LifecycleStatus`] and are handled by the same generic
//! [`client::CrdClient`] and [`controller::Controller`].

pub mod client;
pub use client::CrdClient;
pub mod config;
pub use config::Settings;
pub mod controller;
pub use controller::Controller;
pub mod crd;
pub mod definition;
mod error;
pub use error::{Error, Result};
pub mod poll;
pub use poll::Poll;
pub mod resource;

#[cfg(test)]
mod mock;
