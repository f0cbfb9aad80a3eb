//! DigitalOcean provider implementation

use crate::client::DigitalOceanClient;
use async_trait::async_trait;
use droplift_cloud::{
    Action, CloudProvider, CreateDropletRequest, DomainRecord, DomainRecordRequest, Droplet,
    ListOptions, Project, Result, Snapshot,
};
use serde::{Deserialize, Serialize};

fn page_query(opts: ListOptions) -> [(&'static str, String); 2] {
    [
        ("page", opts.page.to_string()),
        ("per_page", opts.per_page.to_string()),
    ]
}

#[async_trait]
impl CloudProvider for DigitalOceanClient {
    async fn list_droplets(&self, opts: ListOptions) -> Result<Vec<Droplet>> {
        let body: DropletsBody = self.get("/droplets", &page_query(opts)).await?;
        Ok(body.droplets)
    }

    async fn get_droplet(&self, droplet_id: u64) -> Result<Droplet> {
        let body: DropletBody = self.get(&format!("/droplets/{}", droplet_id), &[]).await?;
        Ok(body.droplet)
    }

    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet> {
        tracing::info!(
            "Creating droplet {} from image {} ({}, {})",
            request.name,
            request.image,
            request.region,
            request.size
        );
        let body: DropletBody = self.post("/droplets", request).await?;
        Ok(body.droplet)
    }

    async fn delete_droplet(&self, droplet_id: u64) -> Result<()> {
        tracing::info!("Deleting droplet {}", droplet_id);
        self.delete(&format!("/droplets/{}", droplet_id)).await
    }

    async fn shutdown_droplet(&self, droplet_id: u64) -> Result<Action> {
        let request = DropletActionRequest {
            action_type: "shutdown",
            name: None,
        };
        let body: ActionBody = self
            .post(&format!("/droplets/{}/actions", droplet_id), &request)
            .await?;
        Ok(body.action)
    }

    async fn snapshot_droplet(&self, droplet_id: u64, name: &str) -> Result<Action> {
        let request = DropletActionRequest {
            action_type: "snapshot",
            name: Some(name),
        };
        let body: ActionBody = self
            .post(&format!("/droplets/{}/actions", droplet_id), &request)
            .await?;
        Ok(body.action)
    }

    async fn get_action(&self, droplet_id: u64, action_id: u64) -> Result<Action> {
        let body: ActionBody = self
            .get(
                &format!("/droplets/{}/actions/{}", droplet_id, action_id),
                &[],
            )
            .await?;
        Ok(body.action)
    }

    async fn list_snapshots(&self, opts: ListOptions) -> Result<Vec<Snapshot>> {
        let body: SnapshotsBody = self.get("/snapshots", &page_query(opts)).await?;
        Ok(body.snapshots)
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        tracing::info!("Deleting snapshot {}", snapshot_id);
        self.delete(&format!("/snapshots/{}", snapshot_id)).await
    }

    async fn list_projects(&self, opts: ListOptions) -> Result<Vec<Project>> {
        let body: ProjectsBody = self.get("/projects", &page_query(opts)).await?;
        Ok(body.projects)
    }

    async fn assign_to_project(&self, project_id: &str, droplet: &Droplet) -> Result<()> {
        let request = AssignResourcesRequest {
            resources: vec![droplet.urn()],
        };
        self.post_discard(&format!("/projects/{}/resources", project_id), &request)
            .await
    }

    async fn list_domain_records(
        &self,
        domain: &str,
        opts: ListOptions,
    ) -> Result<Vec<DomainRecord>> {
        let body: DomainRecordsBody = self
            .get(&format!("/domains/{}/records", domain), &page_query(opts))
            .await?;
        Ok(body.domain_records)
    }

    async fn create_domain_record(
        &self,
        domain: &str,
        request: &DomainRecordRequest,
    ) -> Result<DomainRecord> {
        tracing::info!(
            "Creating {} record {}.{} -> {}",
            request.record_type,
            request.name,
            domain,
            request.data
        );
        let body: DomainRecordBody = self
            .post(&format!("/domains/{}/records", domain), request)
            .await?;
        Ok(body.domain_record)
    }

    async fn delete_domain_record(&self, domain: &str, record_id: u64) -> Result<()> {
        tracing::info!("Deleting record {} from {}", record_id, domain);
        self.delete(&format!("/domains/{}/records/{}", domain, record_id))
            .await
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct DropletsBody {
    droplets: Vec<Droplet>,
}

#[derive(Debug, Deserialize)]
struct DropletBody {
    droplet: Droplet,
}

#[derive(Debug, Deserialize)]
struct ActionBody {
    action: Action,
}

#[derive(Debug, Deserialize)]
struct SnapshotsBody {
    snapshots: Vec<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct ProjectsBody {
    projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
struct DomainRecordsBody {
    domain_records: Vec<DomainRecord>,
}

#[derive(Debug, Deserialize)]
struct DomainRecordBody {
    domain_record: DomainRecord,
}

#[derive(Debug, Serialize)]
struct DropletActionRequest<'a> {
    #[serde(rename = "type")]
    action_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct AssignResourcesRequest {
    resources: Vec<String>,
}
