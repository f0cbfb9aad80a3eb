//! Provider-side resource types
//!
//! These mirror the shapes the provider API returns. Every lookup fetches them
//! fresh; nothing here is cached between calls.

use serde::{Deserialize, Serialize};

/// Entities that can be located by their user-facing name
pub trait Named {
    fn name(&self) -> &str;
}

/// Pagination for list calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page: u32,
    pub per_page: u32,
}

impl ListOptions {
    /// Largest page the provider serves; enough for a single-account setup
    pub const MAX_PER_PAGE: u32 = 200;

    pub fn first_page() -> Self {
        Self {
            page: 1,
            per_page: Self::MAX_PER_PAGE,
        }
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::first_page()
    }
}

/// A virtual machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Droplet {
    pub id: u64,

    pub name: String,

    pub status: DropletStatus,

    #[serde(default)]
    pub networks: Networks,
}

impl Droplet {
    /// First public IPv4 address, if the droplet has one yet
    pub fn public_ipv4(&self) -> Option<&str> {
        self.networks
            .v4
            .iter()
            .find(|n| n.network_type == "public")
            .map(|n| n.ip_address.as_str())
    }

    /// Uniform resource name used for project assignment
    pub fn urn(&self) -> String {
        format!("do:droplet:{}", self.id)
    }
}

impl Named for Droplet {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Status of a droplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropletStatus {
    New,
    Active,
    Off,
    Archive,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for DropletStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropletStatus::New => write!(f, "new"),
            DropletStatus::Active => write!(f, "active"),
            DropletStatus::Off => write!(f, "off"),
            DropletStatus::Archive => write!(f, "archive"),
            DropletStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Networks {
    #[serde(default)]
    pub v4: Vec<NetworkV4>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkV4 {
    pub ip_address: String,

    #[serde(rename = "type")]
    pub network_type: String,
}

/// A disk image taken from a droplet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The provider returns snapshot IDs as strings
    pub id: String,

    pub name: String,
}

impl Snapshot {
    /// Image ID to create a droplet from, if the ID is numeric
    pub fn image_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }
}

impl Named for Snapshot {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,

    pub name: String,
}

impl Named for Project {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A long-running provider operation on a droplet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: u64,

    pub status: ActionStatus,

    #[serde(rename = "type", default)]
    pub action_type: String,
}

/// Status of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionStatus {
    InProgress,
    Completed,
    Errored,
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStatus::InProgress => write!(f, "in-progress"),
            ActionStatus::Completed => write!(f, "completed"),
            ActionStatus::Errored => write!(f, "errored"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub id: u64,

    #[serde(rename = "type")]
    pub record_type: String,

    pub name: String,

    #[serde(default)]
    pub data: String,

    #[serde(default)]
    pub ttl: Option<u32>,
}

impl DomainRecord {
    /// Fully-qualified name of the record within `domain`
    pub fn fqdn(&self, domain: &str) -> String {
        format!("{}.{}", self.name, domain)
    }
}

/// Request to create a droplet from an existing image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDropletRequest {
    pub name: String,
    pub region: String,
    pub size: String,
    pub image: u64,
}

/// Request to create a DNS record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainRecordRequest {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub data: String,
    pub ttl: u32,
}

impl DomainRecordRequest {
    pub fn a_record(name: impl Into<String>, ip: impl Into<String>, ttl: u32) -> Self {
        Self {
            record_type: "A".to_string(),
            name: name.into(),
            data: ip.into(),
            ttl,
        }
    }
}
