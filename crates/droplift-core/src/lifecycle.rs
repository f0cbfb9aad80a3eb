//! Up and down workflows
//!
//! Each workflow is a fixed sequence of provider calls. The first failing step
//! aborts the workflow and is returned as a `LifecycleError`; nothing that was
//! already done is rolled back. Progress lines go to the `Notifier`.
//!
//! Every provider call races the cancellation token, so a hung request never
//! keeps a cancelled workflow alive.

use crate::config::{DownConfig, UpConfig};
use crate::error::{LifecycleError, ResourceKind, Result};
use crate::notifier::Notifier;
use droplift_cloud::{
    CloudError, CloudProvider, CreateDropletRequest, DomainRecordRequest, DropletStatus,
    ListOptions, WaitConfig, WaitError, find_droplet, find_project, find_snapshot,
    wait_for_action, wait_for_droplet_status,
};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// TTL of the host's `A` record, in seconds
pub const RECORD_TTL: u32 = 3600;

/// Lifecycle engine bound to one provider account
pub struct Lifecycle {
    provider: Arc<dyn CloudProvider>,
    wait: WaitConfig,
    cancel: CancellationToken,
}

impl Lifecycle {
    pub fn new(provider: Arc<dyn CloudProvider>) -> Self {
        Self {
            provider,
            wait: WaitConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Stop workflows once `cancel` fires, interrupting any provider call in flight
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn checkpoint(&self, progress: &Progress) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(progress.cancelled());
        }
        Ok(())
    }

    /// Run a read-only provider call unless cancellation wins the race
    async fn guard<T>(
        &self,
        progress: &Progress,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(progress.cancelled()),
            result = call => result,
        }
    }

    /// Run a mutating provider call unless cancellation wins the race
    ///
    /// A call interrupted in flight may still have been applied, so both a
    /// success and an interruption mark the workflow as having changed the
    /// account.
    async fn guard_change<T>(
        &self,
        progress: &mut Progress,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        self.checkpoint(progress)?;
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                progress.changed = true;
                return Err(progress.cancelled());
            }
            result = call => result,
        };
        if result.is_ok() {
            progress.changed = true;
        }
        result
    }

    /// Restore the droplet from its snapshot and publish it under the host name
    #[instrument(skip_all, fields(droplet = %config.droplet_name))]
    pub async fn up(&self, config: &UpConfig, notifier: &dyn Notifier) -> Result<()> {
        let provider = self.provider.as_ref();
        let mut progress = Progress::new("up");
        self.checkpoint(&progress)?;

        let snapshot = self
            .guard(&progress, async {
                progress.lookup(
                    find_snapshot(provider, &config.snapshot_name).await,
                    ResourceKind::Snapshot,
                    &config.snapshot_name,
                )
            })
            .await?
            .ok_or_else(|| not_found(ResourceKind::Snapshot, &config.snapshot_name))?;

        let project = self
            .guard(&progress, async {
                progress.lookup(
                    find_project(provider, &config.project_name).await,
                    ResourceKind::Project,
                    &config.project_name,
                )
            })
            .await?
            .ok_or_else(|| not_found(ResourceKind::Project, &config.project_name))?;

        let existing = self
            .guard(&progress, async {
                progress.lookup(
                    find_droplet(provider, &config.droplet_name).await,
                    ResourceKind::Droplet,
                    &config.droplet_name,
                )
            })
            .await?;
        if existing.is_some() {
            return Err(LifecycleError::AlreadyExists {
                kind: ResourceKind::Droplet,
                name: config.droplet_name.clone(),
            });
        }

        let image = snapshot
            .image_id()
            .ok_or_else(|| LifecycleError::InvalidSnapshotId(snapshot.id.clone()))?;

        self.checkpoint(&progress)?;
        notifier
            .notify(format!("Creating droplet from snapshot: {}", snapshot.name))
            .await;

        let request = CreateDropletRequest {
            name: config.droplet_name.clone(),
            region: config.region.clone(),
            size: config.size.clone(),
            image,
        };
        let created = self
            .guard_change(&mut progress, async {
                provider
                    .create_droplet(&request)
                    .await
                    .map_err(|source| LifecycleError::CreateFailed {
                        name: config.droplet_name.clone(),
                        source,
                    })
            })
            .await?;

        let droplet = wait_for_droplet_status(
            provider,
            created.id,
            DropletStatus::Active,
            &self.wait,
            &self.cancel,
        )
        .await
        .map_err(|source| match source {
            WaitError::Cancelled { .. } => progress.cancelled(),
            source => LifecycleError::ActivationFailed {
                droplet: created.name.clone(),
                source,
            },
        })?;
        notifier
            .notify(format!("Droplet has been created: {}", droplet.name))
            .await;

        self.guard_change(&mut progress, async {
            provider
                .assign_to_project(&project.id, &droplet)
                .await
                .map_err(|source| LifecycleError::AssignFailed {
                    droplet: droplet.name.clone(),
                    project: project.name.clone(),
                    source,
                })
        })
        .await?;
        notifier
            .notify(format!(
                "Droplet became a part of project: {}",
                config.project_name
            ))
            .await;

        let ip = droplet
            .public_ipv4()
            .ok_or_else(|| LifecycleError::NoPublicIp(droplet.name.clone()))?;

        let record = DomainRecordRequest::a_record(config.record_name(), ip, RECORD_TTL);
        self.guard_change(&mut progress, async {
            provider
                .create_domain_record(&config.domain_name, &record)
                .await
                .map_err(|source| LifecycleError::DnsCreateFailed {
                    droplet: droplet.name.clone(),
                    host: config.host_name.clone(),
                    source,
                })
        })
        .await?;
        notifier
            .notify(format!(
                "'A' record has been created: {} -> {}",
                config.host_name, ip
            ))
            .await;

        self.guard_change(&mut progress, async {
            provider
                .delete_snapshot(&snapshot.id)
                .await
                .map_err(|source| LifecycleError::SnapshotCleanupFailed {
                    name: snapshot.name.clone(),
                    source,
                })
        })
        .await?;
        notifier
            .notify(format!("Snapshot has been deleted: {}", snapshot.name))
            .await;

        Ok(())
    }

    /// Snapshot the droplet, destroy it and withdraw its host name
    ///
    /// The snapshot is verified to exist before the droplet is destroyed.
    #[instrument(skip_all, fields(droplet = %config.droplet_name))]
    pub async fn down(&self, config: &DownConfig, notifier: &dyn Notifier) -> Result<()> {
        let provider = self.provider.as_ref();
        let mut progress = Progress::new("down");
        self.checkpoint(&progress)?;

        let droplet = self
            .guard(&progress, async {
                progress.lookup(
                    find_droplet(provider, &config.droplet_name).await,
                    ResourceKind::Droplet,
                    &config.droplet_name,
                )
            })
            .await?
            .ok_or_else(|| not_found(ResourceKind::Droplet, &config.droplet_name))?;

        let existing = self
            .guard(&progress, async {
                progress.lookup(
                    find_snapshot(provider, &config.snapshot_name).await,
                    ResourceKind::Snapshot,
                    &config.snapshot_name,
                )
            })
            .await?;
        if existing.is_some() {
            return Err(LifecycleError::AlreadyExists {
                kind: ResourceKind::Snapshot,
                name: config.snapshot_name.clone(),
            });
        }

        notifier
            .notify(format!("Found droplet: {}", droplet.name))
            .await;

        if droplet.status != DropletStatus::Off {
            self.checkpoint(&progress)?;
            notifier.notify("Shutting down droplet".to_string()).await;

            let action = self
                .guard_change(&mut progress, async {
                    provider.shutdown_droplet(droplet.id).await.map_err(|source| {
                        LifecycleError::ShutdownFailed {
                            name: droplet.name.clone(),
                            source,
                        }
                    })
                })
                .await?;
            wait_for_action(provider, droplet.id, action.id, &self.wait, &self.cancel)
                .await
                .map_err(|source| progress.wait_failed(source))?;
        }
        notifier.notify("Droplet is down".to_string()).await;

        self.checkpoint(&progress)?;
        notifier
            .notify(format!("Creating snapshot: {}", config.snapshot_name))
            .await;

        let powered_off = progress.changed;
        let action = self
            .guard_change(&mut progress, async {
                provider
                    .snapshot_droplet(droplet.id, &config.snapshot_name)
                    .await
                    .map_err(|source| LifecycleError::SnapshotFailed {
                        name: config.snapshot_name.clone(),
                        source,
                        changed: powered_off,
                    })
            })
            .await?;
        wait_for_action(provider, droplet.id, action.id, &self.wait, &self.cancel)
            .await
            .map_err(|source| progress.wait_failed(source))?;

        let verified = self
            .guard(&progress, async {
                progress.lookup(
                    find_snapshot(provider, &config.snapshot_name).await,
                    ResourceKind::Snapshot,
                    &config.snapshot_name,
                )
            })
            .await?;
        if verified.is_none() {
            return Err(LifecycleError::SnapshotVerificationFailed(
                config.snapshot_name.clone(),
            ));
        }
        notifier.notify("Snapshot has been created".to_string()).await;

        self.checkpoint(&progress)?;
        notifier.notify("Exterminating droplet".to_string()).await;
        notifier.notify("E X T E R M I N A T E !".to_string()).await;

        self.guard_change(&mut progress, async {
            provider
                .delete_droplet(droplet.id)
                .await
                .map_err(|source| LifecycleError::DeleteFailed {
                    name: droplet.name.clone(),
                    source,
                })
        })
        .await?;

        let remaining = self
            .guard(&progress, async {
                progress.lookup(
                    find_droplet(provider, &config.droplet_name).await,
                    ResourceKind::Droplet,
                    &config.droplet_name,
                )
            })
            .await?;
        if remaining.is_some() {
            return Err(LifecycleError::ResourceStillExists(
                config.droplet_name.clone(),
            ));
        }
        notifier
            .notify("Droplet has been exterminated".to_string())
            .await;

        self.remove_record(
            &mut progress,
            &config.domain_name,
            &config.host_name,
            notifier,
        )
        .await?;

        Ok(())
    }

    /// Delete the record of `domain` whose full name is `host`
    ///
    /// Returns whether a record was found and removed. A missing record is
    /// not an error.
    pub async fn remove_host_record(
        &self,
        domain: &str,
        host: &str,
        notifier: &dyn Notifier,
    ) -> Result<bool> {
        let mut progress = Progress::new("record removal");
        self.remove_record(&mut progress, domain, host, notifier).await
    }

    async fn remove_record(
        &self,
        progress: &mut Progress,
        domain: &str,
        host: &str,
        notifier: &dyn Notifier,
    ) -> Result<bool> {
        let provider = self.provider.as_ref();

        let records = self
            .guard(progress, async {
                provider
                    .list_domain_records(domain, ListOptions::first_page())
                    .await
                    .map_err(|source| LifecycleError::DnsLookupFailed {
                        domain: domain.to_string(),
                        source,
                    })
            })
            .await?;

        let Some(record) = records.into_iter().find(|r| r.fqdn(domain) == host) else {
            debug!("No record for {} in {}", host, domain);
            return Ok(false);
        };

        self.guard_change(progress, async {
            provider
                .delete_domain_record(domain, record.id)
                .await
                .map_err(|source| LifecycleError::DnsDeleteFailed {
                    host: host.to_string(),
                    source,
                })
        })
        .await?;
        notifier
            .notify(format!("Record has been removed: {}", host))
            .await;

        Ok(true)
    }
}

/// Where a running workflow stands
struct Progress {
    workflow: &'static str,
    /// Set once the first change has been made to the account
    changed: bool,
}

impl Progress {
    fn new(workflow: &'static str) -> Self {
        Self {
            workflow,
            changed: false,
        }
    }

    fn cancelled(&self) -> LifecycleError {
        LifecycleError::Cancelled {
            workflow: self.workflow,
            changed: self.changed,
        }
    }

    fn wait_failed(&self, source: WaitError) -> LifecycleError {
        match source {
            WaitError::Cancelled { .. } => self.cancelled(),
            source => LifecycleError::Wait {
                source,
                changed: self.changed,
            },
        }
    }

    fn lookup<T>(
        &self,
        found: std::result::Result<Option<T>, CloudError>,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<T>> {
        found.map_err(|source| LifecycleError::Lookup {
            kind,
            name: name.to_string(),
            source,
            changed: self.changed,
        })
    }
}

fn not_found(kind: ResourceKind, name: &str) -> LifecycleError {
    LifecycleError::NotFound {
        kind,
        name: name.to_string(),
    }
}
