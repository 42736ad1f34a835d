//! Deployment support
//!
//! Generates the Kubernetes manifests that run the server with a persistent
//! volume as its sandbox root.

pub mod manifests;

pub use manifests::ManifestConfig;
