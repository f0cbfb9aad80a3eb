//! Cloud provider trait definition

use crate::error::Result;
use crate::model::{
    Action, CreateDropletRequest, DomainRecord, DomainRecordRequest, Droplet, ListOptions,
    Project, Snapshot,
};
use async_trait::async_trait;

/// Cloud provider abstraction trait
///
/// The lifecycle workflows only ever talk to the provider through this trait,
/// so the HTTP client can be swapped for an in-memory fake in tests.
/// Implementations hold nothing but credentials and are shared read-only.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    async fn list_droplets(&self, opts: ListOptions) -> Result<Vec<Droplet>>;

    async fn get_droplet(&self, droplet_id: u64) -> Result<Droplet>;

    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet>;

    async fn delete_droplet(&self, droplet_id: u64) -> Result<()>;

    /// Request a graceful shutdown
    async fn shutdown_droplet(&self, droplet_id: u64) -> Result<Action>;

    /// Request a snapshot of the droplet's disk under `name`
    async fn snapshot_droplet(&self, droplet_id: u64, name: &str) -> Result<Action>;

    async fn get_action(&self, droplet_id: u64, action_id: u64) -> Result<Action>;

    async fn list_snapshots(&self, opts: ListOptions) -> Result<Vec<Snapshot>>;

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()>;

    async fn list_projects(&self, opts: ListOptions) -> Result<Vec<Project>>;

    /// Move a droplet into a project
    async fn assign_to_project(&self, project_id: &str, droplet: &Droplet) -> Result<()>;

    async fn list_domain_records(
        &self,
        domain: &str,
        opts: ListOptions,
    ) -> Result<Vec<DomainRecord>>;

    async fn create_domain_record(
        &self,
        domain: &str,
        request: &DomainRecordRequest,
    ) -> Result<DomainRecord>;

    async fn delete_domain_record(&self, domain: &str, record_id: u64) -> Result<()>;
}
