//! Panoptes monitoring sidecar
//!
//! Snakemake reports job status to a `--wms-monitor` endpoint. The wrapper
//! reuses a Panoptes server that is already up, or starts one for the duration
//! of a run and stops it afterwards.

use crate::config::MonitorConfig;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Invalid monitor address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ServiceInfo {
    status: String,
}

/// Answer to one `GET /api/service-info` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Running,
    /// Something answered but did not report `running`
    NotRunning(String),
    Unreachable,
}

pub struct PanoptesMonitor {
    address: String,
    port: u16,
    program: String,
    http: reqwest::Client,
    connect_attempts: u32,
    retry_interval: Duration,
}

impl PanoptesMonitor {
    pub fn new(address: &str, program: &str, settings: &MonitorConfig) -> Result<Self, MonitorError> {
        let address = address.trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&address).map_err(|e| MonitorError::InvalidAddress {
            address: address.clone(),
            reason: e.to_string(),
        })?;
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| MonitorError::InvalidAddress {
                address: address.clone(),
                reason: "no port".to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            address,
            port,
            program: program.to_string(),
            http,
            connect_attempts: settings.connect_attempts,
            retry_interval: settings.retry_interval(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn service_state(&self) -> ServiceState {
        let url = format!("{}/api/service-info", self.address);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Monitor status request failed: {}", e);
                return ServiceState::Unreachable;
            }
        };
        match response.json::<ServiceInfo>().await {
            Ok(info) if info.status == "running" => ServiceState::Running,
            Ok(info) => ServiceState::NotRunning(info.status),
            Err(e) => ServiceState::NotRunning(format!("unreadable service info: {e}")),
        }
    }

    /// Reuse a running Panoptes, or start one and wait for it to come up.
    pub async fn ensure_running(&self) -> Result<MonitorHandle, MonitorError> {
        println!("Monitoring BGCFlow jobs with Panoptes...");
        let handle = match self.service_state().await {
            ServiceState::Running => {
                info!("Panoptes already running on {}", self.address);
                MonitorHandle { child: None }
            }
            ServiceState::NotRunning(status) => {
                warn!("Monitor at {} reports status '{}'", self.address, status);
                MonitorHandle { child: None }
            }
            ServiceState::Unreachable => {
                info!("Running Panoptes to monitor BGCFlow jobs at {}", self.address);
                let child = self.spawn()?;
                if let Some(pid) = child.id() {
                    info!("Panoptes job id: {}", pid);
                }
                MonitorHandle { child: Some(child) }
            }
        };

        info!("Connecting to Panoptes...");
        if !self.wait_until_ready().await {
            warn!(
                "Panoptes did not report running after {} attempts, continuing without confirmation",
                self.connect_attempts
            );
        }
        Ok(handle)
    }

    fn spawn(&self) -> Result<Child, MonitorError> {
        Command::new(&self.program)
            .arg("--port")
            .arg(self.port.to_string())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| MonitorError::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    /// Poll until the monitor reports running. Returns false when attempts run out.
    pub async fn wait_until_ready(&self) -> bool {
        for attempt in 1..=self.connect_attempts {
            match self.service_state().await {
                ServiceState::Running => {
                    info!("Panoptes status: running");
                    return true;
                }
                ServiceState::Unreachable => info!("Retrying to connect: {}x", attempt),
                ServiceState::NotRunning(status) => debug!("Panoptes status: {}", status),
            }
            tokio::time::sleep(self.retry_interval).await;
        }
        false
    }
}

/// A monitor this process may own.
#[derive(Debug)]
pub struct MonitorHandle {
    child: Option<Child>,
}

impl MonitorHandle {
    pub fn started_here(&self) -> bool {
        self.child.is_some()
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Kill the sidecar if this process started it.
    pub async fn stop(self) {
        let Some(mut child) = self.child else {
            return;
        };
        match child.id() {
            Some(pid) => info!("Stopping panoptes server: PID {}", pid),
            None => debug!("Panoptes already exited"),
        }
        if let Err(e) = child.kill().await {
            warn!("Failed to stop panoptes: {}", e);
        }
    }
}
