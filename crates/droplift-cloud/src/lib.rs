//! Droplift Cloud
//!
//! Provider abstraction for Droplift: the `CloudProvider` trait the lifecycle
//! workflows are written against, the resource shapes it returns, and the two
//! building blocks every workflow step uses.
//!
//! - **Locator**: find a droplet, snapshot or project by exact name
//! - **Waiter**: poll an action or a droplet status until it settles
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              droplift (up / down / bot)          │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                droplift-core                     │
//! │            Lifecycle::up / ::down                │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               droplift-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait CloudProvider { ... }              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │   Locator    │  │    Waiter    │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!         ┌─────────▼─────────┐
//!         │   digitalocean    │
//!         │     provider      │
//!         └───────────────────┘
//! ```

pub mod error;
pub mod locator;
pub mod model;
pub mod provider;
pub mod waiter;

// Re-exports
pub use error::{CloudError, Result};
pub use locator::{find_by_name, find_droplet, find_project, find_snapshot};
pub use model::{
    Action, ActionStatus, CreateDropletRequest, DomainRecord, DomainRecordRequest, Droplet,
    DropletStatus, ListOptions, Named, NetworkV4, Networks, Project, Snapshot,
};
pub use provider::CloudProvider;
pub use waiter::{
    DEFAULT_POLL_INTERVAL, WaitConfig, WaitError, poll_until, wait_for_action,
    wait_for_droplet_status,
};
