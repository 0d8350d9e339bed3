//! Swarm service handles. Only meaningful against a daemon participating
//! in a swarm; elsewhere every call surfaces the daemon's 503 answer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::container::LogStream;
use crate::error::Error;
use crate::transport::{tables, Call, Remote};

/// Collection-level service operations.
#[derive(Debug, Clone)]
pub struct Services {
    remote: Remote,
}

impl Services {
    pub(crate) fn new(remote: Remote) -> Self {
        Self { remote }
    }

    /// List services, one handle per entry, in the daemon's order.
    pub async fn list(&self, opts: &ServiceListOptions) -> Result<Vec<Service>, Error> {
        let call = Call::get("/services", tables::service_list()).filters(&opts.filters)?;
        let entries: Vec<Value> = self.remote.value(call).await?;

        entries
            .into_iter()
            .map(|entry| {
                let id = entry
                    .get("ID")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .ok_or_else(|| Error::transport("service list entry without an ID"))?;
                Ok(Service {
                    remote: self.remote.clone(),
                    id,
                    snapshot: Some(entry),
                })
            })
            .collect()
    }

    /// Create a service from the given spec.
    pub async fn create(&self, spec: &ServiceSpec) -> Result<Service, Error> {
        let call = Call::post("/services/create", tables::service_create()).json(spec)?;
        let body = self.remote.raw(call).await?;
        let created: ServiceCreateResponse = serde_json::from_value(body.clone())?;
        for warning in created.warnings.iter().flatten() {
            tracing::warn!("creating service {}: {}", created.id, warning);
        }
        tracing::trace!("Created service {}", created.id);

        Ok(Service {
            remote: self.remote.clone(),
            id: created.id,
            snapshot: Some(body),
        })
    }

    /// Wrap a known service identifier without touching the daemon.
    pub fn get(&self, id: impl Into<String>) -> Service {
        Service {
            remote: self.remote.clone(),
            id: id.into(),
            snapshot: None,
        }
    }
}

/// Handle to one swarm service.
#[derive(Debug, Clone)]
pub struct Service {
    remote: Remote,
    id: String,
    snapshot: Option<Value>,
}

impl Service {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> Option<&Value> {
        self.snapshot.as_ref()
    }

    /// Fetch the service's representation, replacing the snapshot.
    pub async fn inspect(&mut self) -> Result<ServiceDetails, Error> {
        let call = Call::get(format!("/services/{}", self.id), tables::service_inspect());
        let body = self.remote.raw(call).await?;
        let details = serde_json::from_value(body.clone())?;
        self.snapshot = Some(body);
        Ok(details)
    }

    /// Update the service spec. `version` must be the current spec version
    /// index reported by inspect; the daemon rejects stale versions.
    pub async fn update(&self, version: u64, spec: &ServiceSpec) -> Result<UpdateWarnings, Error> {
        let call = Call::post(format!("/services/{}/update", self.id), tables::service_update())
            .query("version", version)
            .json(spec)?;
        let report: UpdateWarnings = self.remote.value(call).await?;
        for warning in report.warnings.iter().flatten() {
            tracing::warn!("updating service {}: {}", self.id, warning);
        }
        Ok(report)
    }

    /// Remove the service from the swarm.
    pub async fn remove(&self) -> Result<(), Error> {
        tracing::trace!("Removing service {}", self.id);
        let call = Call::delete(format!("/services/{}", self.id), tables::service_remove());
        self.remote.unit(call).await
    }

    /// Follow aggregated task output for this service.
    pub async fn logs(&self, opts: &ServiceLogsOptions) -> Result<LogStream, Error> {
        let call = Call::get(format!("/services/{}/logs", self.id), tables::service_logs())
            .queries(opts.to_query());
        Ok(LogStream::new(self.remote.stream(call).await?))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceListOptions {
    pub filters: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceLogsOptions {
    pub follow: bool,
    pub stdout: bool,
    pub stderr: bool,
    pub timestamps: bool,
    pub since: Option<i64>,
    pub tail: Option<String>,
}

impl ServiceLogsOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if self.follow {
            query.push(("follow", "true".to_string()));
        }
        if self.stdout {
            query.push(("stdout", "true".to_string()));
        }
        if self.stderr {
            query.push(("stderr", "true".to_string()));
        }
        if self.timestamps {
            query.push(("timestamps", "true".to_string()));
        }
        if let Some(since) = self.since {
            query.push(("since", since.to_string()));
        }
        if let Some(tail) = &self.tail {
            query.push(("tail", tail.clone()));
        }
        query
    }
}

/// Declarative description of a service. Deeply nested engine structures
/// (task template, endpoint spec) stay untyped; the daemon validates them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_template: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_spec: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceCreateResponse {
    #[serde(rename = "ID")]
    pub id: String,
    pub warnings: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateWarnings {
    pub warnings: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceDetails {
    #[serde(rename = "ID")]
    pub id: String,
    pub version: ServiceVersion,
    pub spec: ServiceSpec,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Monotonic spec version; updates must quote the current index.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceVersion {
    pub index: u64,
}
