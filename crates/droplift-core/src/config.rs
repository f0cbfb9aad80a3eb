//! Workflow inputs

/// Everything `Lifecycle::up` needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpConfig {
    pub project_name: String,
    pub droplet_name: String,
    pub domain_name: String,
    /// Fully-qualified host name, e.g. `host.example.com`
    pub host_name: String,
    /// Snapshot to create the droplet from; deleted once the droplet is up
    pub snapshot_name: String,
    pub region: String,
    pub size: String,
}

impl UpConfig {
    /// Record name relative to the domain (`host` for `host.example.com`)
    pub fn record_name(&self) -> &str {
        relative_name(&self.host_name, &self.domain_name)
    }
}

/// Everything `Lifecycle::down` needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownConfig {
    pub droplet_name: String,
    /// Snapshot to create; must not exist yet
    pub snapshot_name: String,
    pub domain_name: String,
    pub host_name: String,
}

fn relative_name<'a>(host: &'a str, domain: &str) -> &'a str {
    host.strip_suffix(domain)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(host)
}
