/// Module for the on-disk chart filesystem.
pub mod chartfs;
/// Module for the cluster-stored installer configuration.
pub mod config;
/// Module for installer constants.
pub mod constants;
/// Module for installer errors.
pub mod error;
/// Module for Kubernetes API clients.
pub mod k8s;
/// Runtime dependencies shared by command handlers.
pub mod runcontext;

pub use runcontext::RunContext;
