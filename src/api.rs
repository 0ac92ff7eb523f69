//! Read-only client for the DevStack REST API.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::config::ServerConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Docker,
    Vm,
    Mock,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceKind::Docker => "docker",
            ServiceKind::Vm => "vm",
            ServiceKind::Mock => "mock",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ServiceSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Set by the backend when a whole category is unavailable.
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ServiceCatalog {
    #[serde(default)]
    pub docker: Vec<ServiceSummary>,
    #[serde(default)]
    pub vms: Vec<ServiceSummary>,
    #[serde(default)]
    pub mocks: Vec<ServiceSummary>,
}

impl ServiceCatalog {
    /// Every named service in picker order: containers, VMs, then mocks.
    pub fn all(&self) -> Vec<(ServiceKind, &ServiceSummary)> {
        let docker = self.docker.iter().map(|s| (ServiceKind::Docker, s));
        let vms = self.vms.iter().map(|s| (ServiceKind::Vm, s));
        let mocks = self.mocks.iter().map(|s| (ServiceKind::Mock, s));
        docker
            .chain(vms)
            .chain(mocks)
            .filter(|(_, service)| !service.name.trim().is_empty())
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .map(|(_, service)| service.name.clone())
            .collect()
    }

    /// Backend-reported category errors, e.g. Docker being unreachable.
    pub fn errors(&self) -> Vec<String> {
        self.docker
            .iter()
            .chain(&self.vms)
            .chain(&self.mocks)
            .filter_map(|service| service.error.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileSummary {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub services_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ProfilesResponse {
    #[serde(default)]
    profiles: Vec<ProfileSummary>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not reach {url}: {reason}")]
    Transport { url: String, reason: String },
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn fetch_services(server: &ServerConfig) -> Result<ServiceCatalog, ApiError> {
    get_json(&server.api_url("/api/services"))
}

pub fn fetch_profiles(server: &ServerConfig) -> Result<Vec<ProfileSummary>, ApiError> {
    let response: ProfilesResponse = get_json(&server.api_url("/api/profiles"))?;
    Ok(response.profiles)
}

fn get_json<T>(url: &str) -> Result<T, ApiError>
where
    T: serde::de::DeserializeOwned,
{
    debug!(%url, "GET");
    let response = ureq::get(url)
        .timeout(REQUEST_TIMEOUT)
        .call()
        .map_err(|error| match error {
            ureq::Error::Status(status, _) => ApiError::Status {
                url: url.to_owned(),
                status,
            },
            ureq::Error::Transport(transport) => ApiError::Transport {
                url: url.to_owned(),
                reason: transport.to_string(),
            },
        })?;
    response.into_json::<T>().map_err(|source| ApiError::Decode {
        url: url.to_owned(),
        source,
    })
}
