//! Name-based resource lookup
//!
//! Resources are fetched fresh on every call and scanned for an exact name
//! match. Only the first page is read, which covers a single-account setup.

use crate::error::Result;
use crate::model::{Droplet, ListOptions, Named, Project, Snapshot};
use crate::provider::CloudProvider;
use std::future::Future;

/// Fetch one page through `fetch` and return the first item named `name`
pub async fn find_by_name<T, F, Fut>(fetch: F, name: &str) -> Result<Option<T>>
where
    T: Named,
    F: FnOnce(ListOptions) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let items = fetch(ListOptions::first_page()).await?;
    Ok(items.into_iter().find(|item| item.name() == name))
}

pub async fn find_droplet(provider: &dyn CloudProvider, name: &str) -> Result<Option<Droplet>> {
    tracing::debug!("Looking up droplet: {}", name);
    find_by_name(move |opts| provider.list_droplets(opts), name).await
}

pub async fn find_snapshot(provider: &dyn CloudProvider, name: &str) -> Result<Option<Snapshot>> {
    tracing::debug!("Looking up snapshot: {}", name);
    find_by_name(move |opts| provider.list_snapshots(opts), name).await
}

pub async fn find_project(provider: &dyn CloudProvider, name: &str) -> Result<Option<Project>> {
    tracing::debug!("Looking up project: {}", name);
    find_by_name(move |opts| provider.list_projects(opts), name).await
}
