//! DigitalOcean provider for Droplift
//!
//! This crate implements the `CloudProvider` trait over the DigitalOcean v2
//! REST API.
//!
//! # Features
//!
//! - Droplet management (list, create, delete, shutdown, snapshot)
//! - Action polling
//! - Snapshot and project lookup, project assignment
//! - DNS record management for a domain hosted on DigitalOcean
//!
//! # Requirements
//!
//! - A personal access token with read/write scope (`DIGITALOCEAN_TOKEN`)
//!
//! # Example
//!
//! ```ignore
//! use droplift_cloud::{CloudProvider, find_droplet};
//! use droplift_cloud_digitalocean::DigitalOceanClient;
//!
//! let provider = DigitalOceanClient::new(token)?;
//! let droplet = find_droplet(&provider, "host-a").await?;
//! ```

pub mod client;
mod provider;

pub use client::DigitalOceanClient;
