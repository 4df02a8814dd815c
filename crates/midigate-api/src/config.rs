//! API configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which remote compute backend the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Forward uploads synchronously to a directly addressable backend
    Direct,
    /// Stage uploads, submit a queue job and poll for the result
    Queue,
}

impl DeploymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentMode::Direct => "direct",
            DeploymentMode::Queue => "queue",
        }
    }
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(DeploymentMode::Direct),
            "queue" | "runpod" => Ok(DeploymentMode::Queue),
            other => Err(format!("unknown deployment mode: {}", other)),
        }
    }
}

/// One relayed endpoint. Endpoints differ only in these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    /// Inbound route, e.g. `/transcribe`
    pub route: String,
    /// Backend path the upload is forwarded to
    pub backend_path: String,
    /// Multipart field holding the file
    pub file_field: String,
    /// Optional extra string field: name and default value
    pub extra_field: Option<(String, String)>,
    /// Content type of successful responses
    pub content_type: String,
    /// Ceiling for the backend exchange
    pub timeout: Duration,
}

impl RelayEndpoint {
    pub fn new(route: &str, content_type: &str, timeout: Duration) -> Self {
        Self {
            route: route.to_string(),
            backend_path: route.to_string(),
            file_field: "file".to_string(),
            extra_field: None,
            content_type: content_type.to_string(),
            timeout,
        }
    }

    pub fn with_extra_field(mut self, name: &str, default: &str) -> Self {
        self.extra_field = Some((name.to_string(), default.to_string()));
        self
    }

    /// Label used in logs and metrics.
    pub fn name(&self) -> &str {
        self.route.trim_start_matches('/')
    }
}

/// Default endpoint table.
pub fn default_endpoints() -> Vec<RelayEndpoint> {
    vec![
        RelayEndpoint::new("/transcribe", "audio/midi", Duration::from_secs(300))
            .with_extra_field("separate_stems", "false"),
        // Stem separation is the heaviest workload.
        RelayEndpoint::new("/separate", "application/zip", Duration::from_secs(900)),
        RelayEndpoint::new("/analyze", "application/json", Duration::from_secs(60)),
    ]
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Directory for temporary uploads
    pub upload_dir: PathBuf,
    /// Backend variant
    pub mode: DeploymentMode,
    /// Relayed endpoints (direct mode)
    pub endpoints: Vec<RelayEndpoint>,
    /// Route served by the job-queue pipeline (queue mode)
    pub queue_route: String,
    /// Content type of the job-queue pipeline's responses
    pub queue_content_type: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 100 * 1024 * 1024, // 100MB
            upload_dir: std::env::temp_dir(),
            mode: DeploymentMode::Direct,
            endpoints: default_endpoints(),
            queue_route: "/transcribe".to_string(),
            queue_content_type: "audio/midi".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            mode: match std::env::var("DEPLOYMENT_MODE") {
                Ok(raw) => raw.parse()?,
                Err(_) => defaults.mode,
            },
            endpoints: defaults.endpoints,
            queue_route: std::env::var("QUEUE_ROUTE").unwrap_or(defaults.queue_route),
            queue_content_type: std::env::var("QUEUE_CONTENT_TYPE")
                .unwrap_or(defaults.queue_content_type),
        })
    }
}
