//! Lifecycle error types

use droplift_cloud::{CloudError, WaitError};
use thiserror::Error;

/// Kind of resource a lookup was about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Droplet,
    Snapshot,
    Project,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Droplet => write!(f, "droplet"),
            ResourceKind::Snapshot => write!(f, "snapshot"),
            ResourceKind::Project => write!(f, "project"),
        }
    }
}

/// Failure of an up or down workflow
///
/// The first failing step aborts the workflow. Nothing is rolled back.
/// Variants that can happen both before and after the first change to the
/// account carry a `changed` flag recording which side of it they are on.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("failed to find {kind}: {name}")]
    NotFound { kind: ResourceKind, name: String },

    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: ResourceKind, name: String },

    #[error("failed to look up {kind} {name}: {source}")]
    Lookup {
        kind: ResourceKind,
        name: String,
        #[source]
        source: CloudError,
        changed: bool,
    },

    #[error("failed to convert snapshot ID: {0}")]
    InvalidSnapshotId(String),

    #[error("failed to create droplet {name}: {source}")]
    CreateFailed {
        name: String,
        #[source]
        source: CloudError,
    },

    #[error("droplet {droplet} was created, but did not become active: {source}")]
    ActivationFailed {
        droplet: String,
        #[source]
        source: WaitError,
    },

    #[error("{source}")]
    Wait {
        #[source]
        source: WaitError,
        changed: bool,
    },

    #[error("droplet {droplet} is running, but failed to assign it to project {project}: {source}")]
    AssignFailed {
        droplet: String,
        project: String,
        #[source]
        source: CloudError,
    },

    #[error("droplet {0} is running, but has no public IPv4 address")]
    NoPublicIp(String),

    #[error("droplet {droplet} is running, but failed to create 'A' record {host}: {source}")]
    DnsCreateFailed {
        droplet: String,
        host: String,
        #[source]
        source: CloudError,
    },

    #[error("droplet is running, but failed to delete snapshot {name}: {source}")]
    SnapshotCleanupFailed {
        name: String,
        #[source]
        source: CloudError,
    },

    #[error("failed to shutdown droplet {name}: {source}")]
    ShutdownFailed {
        name: String,
        #[source]
        source: CloudError,
    },

    #[error("failed to create snapshot {name}: {source}")]
    SnapshotFailed {
        name: String,
        #[source]
        source: CloudError,
        changed: bool,
    },

    #[error("unable to find snapshot after creating it: {0}")]
    SnapshotVerificationFailed(String),

    #[error("unable to exterminate droplet {name}: {source}")]
    DeleteFailed {
        name: String,
        #[source]
        source: CloudError,
    },

    #[error("droplet still exists: {0}")]
    ResourceStillExists(String),

    #[error("failed to get records of domain {domain}: {source}")]
    DnsLookupFailed {
        domain: String,
        #[source]
        source: CloudError,
    },

    #[error("droplet is gone, but failed to delete record {host}: {source}")]
    DnsDeleteFailed {
        host: String,
        #[source]
        source: CloudError,
    },

    #[error("{workflow} was cancelled")]
    Cancelled {
        workflow: &'static str,
        changed: bool,
    },
}

impl LifecycleError {
    /// Whether the workflow got far enough to leave resources half-changed
    pub fn is_partial(&self) -> bool {
        match self {
            LifecycleError::ActivationFailed { .. }
            | LifecycleError::AssignFailed { .. }
            | LifecycleError::NoPublicIp(_)
            | LifecycleError::DnsCreateFailed { .. }
            | LifecycleError::SnapshotCleanupFailed { .. }
            | LifecycleError::SnapshotVerificationFailed(_)
            | LifecycleError::DeleteFailed { .. }
            | LifecycleError::ResourceStillExists(_)
            | LifecycleError::DnsLookupFailed { .. }
            | LifecycleError::DnsDeleteFailed { .. } => true,
            LifecycleError::Lookup { changed, .. }
            | LifecycleError::Wait { changed, .. }
            | LifecycleError::SnapshotFailed { changed, .. }
            | LifecycleError::Cancelled { changed, .. } => *changed,
            LifecycleError::NotFound { .. }
            | LifecycleError::AlreadyExists { .. }
            | LifecycleError::InvalidSnapshotId(_)
            | LifecycleError::CreateFailed { .. }
            | LifecycleError::ShutdownFailed { .. } => false,
        }
    }

    /// Whether the workflow stopped because of a shutdown request
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            LifecycleError::Cancelled { .. }
                | LifecycleError::Wait {
                    source: WaitError::Cancelled { .. },
                    ..
                }
                | LifecycleError::ActivationFailed {
                    source: WaitError::Cancelled { .. },
                    ..
                }
        )
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
