//! Named workflows and the runner the chat dispatcher drives

use crate::config::{DownConfig, UpConfig};
use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::notifier::Notifier;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Up,
    Down,
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Workflow::Up => write!(f, "up"),
            Workflow::Down => write!(f, "down"),
        }
    }
}

/// Runs a workflow to completion, reporting progress to `notifier`
#[async_trait]
pub trait WorkflowRunner: Send + Sync {
    async fn run(&self, workflow: Workflow, notifier: Arc<dyn Notifier>) -> Result<()>;
}

/// Runner backed by the lifecycle engine and fixed workflow inputs
pub struct LifecycleRunner {
    lifecycle: Lifecycle,
    up: UpConfig,
    down: DownConfig,
}

impl LifecycleRunner {
    pub fn new(lifecycle: Lifecycle, up: UpConfig, down: DownConfig) -> Self {
        Self {
            lifecycle,
            up,
            down,
        }
    }
}

#[async_trait]
impl WorkflowRunner for LifecycleRunner {
    async fn run(&self, workflow: Workflow, notifier: Arc<dyn Notifier>) -> Result<()> {
        tracing::info!("Starting {} workflow", workflow);
        match workflow {
            Workflow::Up => self.lifecycle.up(&self.up, notifier.as_ref()).await,
            Workflow::Down => self.lifecycle.down(&self.down, notifier.as_ref()).await,
        }
    }
}
