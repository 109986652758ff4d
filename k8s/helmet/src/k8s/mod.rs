/// Contains the Kubernetes API client wrapper.
pub mod client;

pub use client::{Kube, KubeBuilder};
