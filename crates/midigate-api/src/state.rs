//! Application state.

use std::sync::Arc;

use midigate_backend::BackendClient;
use midigate_queue::{JobOrchestrator, QueueClient};
use midigate_storage::StagingClient;

use crate::config::{ApiConfig, DeploymentMode};

/// The remote compute path requests are served through.
#[derive(Clone)]
pub enum Gateway {
    /// Synchronous relay to a directly addressable backend
    Direct(Arc<BackendClient>),
    /// Stage the upload, then run it through the job queue
    Queue {
        storage: Arc<StagingClient>,
        orchestrator: Arc<JobOrchestrator>,
    },
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub gateway: Gateway,
}

impl AppState {
    /// Build the clients the configured mode needs from the environment.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let gateway = match config.mode {
            DeploymentMode::Direct => Gateway::Direct(Arc::new(BackendClient::from_env()?)),
            DeploymentMode::Queue => {
                let storage = StagingClient::from_env()?;
                let orchestrator = JobOrchestrator::new(QueueClient::from_env()?)?;
                Gateway::Queue {
                    storage: Arc::new(storage),
                    orchestrator: Arc::new(orchestrator),
                }
            }
        };

        Ok(Self { config, gateway })
    }

    /// State for direct mode with an already built backend client.
    pub fn direct(mut config: ApiConfig, backend: BackendClient) -> Self {
        config.mode = DeploymentMode::Direct;
        Self {
            config,
            gateway: Gateway::Direct(Arc::new(backend)),
        }
    }

    /// State for queue mode with already built clients.
    pub fn queue(mut config: ApiConfig, storage: StagingClient, orchestrator: JobOrchestrator) -> Self {
        config.mode = DeploymentMode::Queue;
        Self {
            config,
            gateway: Gateway::Queue {
                storage: Arc::new(storage),
                orchestrator: Arc::new(orchestrator),
            },
        }
    }

    pub fn mode(&self) -> DeploymentMode {
        self.config.mode
    }
}
