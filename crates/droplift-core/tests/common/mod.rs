#![allow(dead_code)]

use async_trait::async_trait;
use droplift_cloud::{
    Action, ActionStatus, CloudError, CloudProvider, CreateDropletRequest, DomainRecord,
    DomainRecordRequest, Droplet, DropletStatus, ListOptions, NetworkV4, Networks, Project,
    Result, Snapshot, WaitConfig,
};
use droplift_core::{DownConfig, Lifecycle, Notifier, UpConfig};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PUBLIC_IP: &str = "203.0.113.10";

/// In-memory provider that records every call it receives
#[derive(Default)]
pub struct FakeProvider {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    droplets: Vec<Droplet>,
    snapshots: Vec<Snapshot>,
    projects: Vec<Project>,
    records: Vec<DomainRecord>,
    assignments: Vec<(String, u64)>,
    calls: Vec<String>,
    next_id: u64,
    failing: HashSet<&'static str>,
    hanging: HashSet<&'static str>,
    boot_polls: u32,
    action_status: Option<ActionStatus>,
    no_public_ip: bool,
    snapshots_vanish: bool,
    deletes_are_ignored: bool,
}

impl FakeState {
    fn record(&mut self, call: &'static str) -> Result<()> {
        self.calls.push(call.to_string());
        if self.failing.contains(call) {
            return Err(CloudError::Api {
                status: 500,
                message: format!("{} failed", call),
            });
        }
        Ok(())
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        1000 + self.next_id
    }

    fn action(&mut self, action_type: &str) -> Action {
        Action {
            id: self.next_id(),
            status: ActionStatus::InProgress,
            action_type: action_type.to_string(),
        }
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_droplet(self, id: u64, name: &str, status: DropletStatus) -> Self {
        self.state.lock().unwrap().droplets.push(Droplet {
            id,
            name: name.to_string(),
            status,
            networks: public_network(),
        });
        self
    }

    pub fn with_snapshot(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().snapshots.push(Snapshot {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_project(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().projects.push(Project {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_record(self, id: u64, name: &str) -> Self {
        self.state.lock().unwrap().records.push(DomainRecord {
            id,
            record_type: "A".to_string(),
            name: name.to_string(),
            data: PUBLIC_IP.to_string(),
            ttl: Some(3600),
        });
        self
    }

    /// Make every call to `op` fail with a 500
    pub fn failing(self, op: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(op);
        self
    }

    /// Make every call to `op` hang forever
    pub fn hanging(self, op: &'static str) -> Self {
        self.state.lock().unwrap().hanging.insert(op);
        self
    }

    /// Created droplets report `new` until the `polls`-th status poll
    pub fn booting_for(self, polls: u32) -> Self {
        self.state.lock().unwrap().boot_polls = polls;
        self
    }

    pub fn with_action_status(self, status: ActionStatus) -> Self {
        self.state.lock().unwrap().action_status = Some(status);
        self
    }

    pub fn without_public_ip(self) -> Self {
        self.state.lock().unwrap().no_public_ip = true;
        self
    }

    /// Snapshot actions complete but never produce a snapshot
    pub fn losing_snapshots(self) -> Self {
        self.state.lock().unwrap().snapshots_vanish = true;
        self
    }

    /// Droplet deletion is accepted but the droplet stays listed
    pub fn ignoring_deletes(self) -> Self {
        self.state.lock().unwrap().deletes_are_ignored = true;
        self
    }

    async fn stall(&self, call: &'static str) {
        let hangs = {
            let mut state = self.state.lock().unwrap();
            let hangs = state.hanging.contains(call);
            if hangs {
                state.calls.push(call.to_string());
            }
            hangs
        };
        if hangs {
            std::future::pending::<()>().await;
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that change provider state
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list_") && !c.starts_with("get_"))
            .collect()
    }

    pub fn droplets(&self) -> Vec<Droplet> {
        self.state.lock().unwrap().droplets.clone()
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.state.lock().unwrap().snapshots.clone()
    }

    pub fn records(&self) -> Vec<DomainRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn assignments(&self) -> Vec<(String, u64)> {
        self.state.lock().unwrap().assignments.clone()
    }
}

#[async_trait]
impl CloudProvider for FakeProvider {
    async fn list_droplets(&self, _opts: ListOptions) -> Result<Vec<Droplet>> {
        self.stall("list_droplets").await;
        let mut state = self.state.lock().unwrap();
        state.record("list_droplets")?;
        Ok(state.droplets.clone())
    }

    async fn get_droplet(&self, droplet_id: u64) -> Result<Droplet> {
        let mut state = self.state.lock().unwrap();
        state.record("get_droplet")?;
        if state.boot_polls > 0 {
            state.boot_polls -= 1;
            if state.boot_polls == 0 {
                for droplet in state.droplets.iter_mut() {
                    if droplet.status == DropletStatus::New {
                        droplet.status = DropletStatus::Active;
                    }
                }
            }
        }
        state
            .droplets
            .iter()
            .find(|d| d.id == droplet_id)
            .cloned()
            .ok_or_else(|| CloudError::Api {
                status: 404,
                message: "not found".to_string(),
            })
    }

    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet> {
        self.stall("create_droplet").await;
        let mut state = self.state.lock().unwrap();
        state.record("create_droplet")?;
        state.calls.push(format!("image:{}", request.image));

        let id = state.next_id();
        let networks = if state.no_public_ip {
            Networks::default()
        } else {
            public_network()
        };
        // without a boot delay the first status poll sees it active
        let status = if state.boot_polls > 0 {
            DropletStatus::New
        } else {
            DropletStatus::Active
        };
        state.droplets.push(Droplet {
            id,
            name: request.name.clone(),
            status,
            networks,
        });

        Ok(Droplet {
            id,
            name: request.name.clone(),
            status: DropletStatus::New,
            networks: Networks::default(),
        })
    }

    async fn delete_droplet(&self, droplet_id: u64) -> Result<()> {
        self.stall("delete_droplet").await;
        let mut state = self.state.lock().unwrap();
        state.record("delete_droplet")?;
        if !state.deletes_are_ignored {
            state.droplets.retain(|d| d.id != droplet_id);
        }
        Ok(())
    }

    async fn shutdown_droplet(&self, droplet_id: u64) -> Result<Action> {
        let mut state = self.state.lock().unwrap();
        state.record("shutdown_droplet")?;
        if let Some(droplet) = state.droplets.iter_mut().find(|d| d.id == droplet_id) {
            droplet.status = DropletStatus::Off;
        }
        Ok(state.action("shutdown"))
    }

    async fn snapshot_droplet(&self, _droplet_id: u64, name: &str) -> Result<Action> {
        let mut state = self.state.lock().unwrap();
        state.record("snapshot_droplet")?;
        if !state.snapshots_vanish {
            let id = state.next_id().to_string();
            state.snapshots.push(Snapshot {
                id,
                name: name.to_string(),
            });
        }
        Ok(state.action("snapshot"))
    }

    async fn get_action(&self, _droplet_id: u64, action_id: u64) -> Result<Action> {
        let mut state = self.state.lock().unwrap();
        state.record("get_action")?;
        Ok(Action {
            id: action_id,
            status: state.action_status.unwrap_or(ActionStatus::Completed),
            action_type: String::new(),
        })
    }

    async fn list_snapshots(&self, _opts: ListOptions) -> Result<Vec<Snapshot>> {
        let mut state = self.state.lock().unwrap();
        state.record("list_snapshots")?;
        Ok(state.snapshots.clone())
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record("delete_snapshot")?;
        state.snapshots.retain(|s| s.id != snapshot_id);
        Ok(())
    }

    async fn list_projects(&self, _opts: ListOptions) -> Result<Vec<Project>> {
        let mut state = self.state.lock().unwrap();
        state.record("list_projects")?;
        Ok(state.projects.clone())
    }

    async fn assign_to_project(&self, project_id: &str, droplet: &Droplet) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record("assign_to_project")?;
        state.assignments.push((project_id.to_string(), droplet.id));
        Ok(())
    }

    async fn list_domain_records(
        &self,
        _domain: &str,
        _opts: ListOptions,
    ) -> Result<Vec<DomainRecord>> {
        let mut state = self.state.lock().unwrap();
        state.record("list_domain_records")?;
        Ok(state.records.clone())
    }

    async fn create_domain_record(
        &self,
        _domain: &str,
        request: &DomainRecordRequest,
    ) -> Result<DomainRecord> {
        let mut state = self.state.lock().unwrap();
        state.record("create_domain_record")?;
        let record = DomainRecord {
            id: state.next_id(),
            record_type: request.record_type.clone(),
            name: request.name.clone(),
            data: request.data.clone(),
            ttl: Some(request.ttl),
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn delete_domain_record(&self, _domain: &str, record_id: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record("delete_domain_record")?;
        state.records.retain(|r| r.id != record_id);
        Ok(())
    }
}

fn public_network() -> Networks {
    Networks {
        v4: vec![
            NetworkV4 {
                ip_address: "10.110.0.2".to_string(),
                network_type: "private".to_string(),
            },
            NetworkV4 {
                ip_address: PUBLIC_IP.to_string(),
                network_type: "public".to_string(),
            },
        ],
    }
}

/// Notifier that keeps every message
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: String) {
        self.messages.lock().unwrap().push(message);
    }
}

pub fn up_config() -> UpConfig {
    UpConfig {
        project_name: "proj".to_string(),
        droplet_name: "host-a".to_string(),
        domain_name: "example.com".to_string(),
        host_name: "host.example.com".to_string(),
        snapshot_name: "snap-1".to_string(),
        region: "fra1".to_string(),
        size: "s-1vcpu-1gb".to_string(),
    }
}

pub fn down_config() -> DownConfig {
    DownConfig {
        droplet_name: "host-a".to_string(),
        snapshot_name: "snap-1".to_string(),
        domain_name: "example.com".to_string(),
        host_name: "host.example.com".to_string(),
    }
}

/// Engine over `provider` that polls every millisecond
pub fn lifecycle(provider: &Arc<FakeProvider>) -> Lifecycle {
    Lifecycle::new(provider.clone())
        .with_wait_config(WaitConfig::default().with_interval(Duration::from_millis(1)))
}
