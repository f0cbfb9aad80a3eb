//! Droplift Core
//!
//! The lifecycle engine: `Lifecycle::up` restores a droplet from its snapshot
//! and publishes it under a host name, `Lifecycle::down` snapshots it,
//! destroys it and withdraws the host name. Both are written against
//! `droplift_cloud::CloudProvider` and report progress through a `Notifier`.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod notifier;
pub mod workflow;

pub use config::{DownConfig, UpConfig};
pub use error::{LifecycleError, ResourceKind, Result};
pub use lifecycle::{Lifecycle, RECORD_TTL};
pub use notifier::Notifier;
pub use workflow::{LifecycleRunner, Workflow, WorkflowRunner};
