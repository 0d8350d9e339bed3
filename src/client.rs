//! Top-level client handle.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::container::Containers;
use crate::error::Error;
use crate::exec::Execs;
use crate::image::Images;
use crate::service::Services;
use crate::transport::{tables, Call, JsonLines, Remote, Transport};

/// Entry point: owns the transport and hands out resource managers.
///
/// Cloning is cheap; clones share the underlying transport connection.
#[derive(Debug, Clone)]
pub struct Client {
    remote: Remote,
}

impl Client {
    /// Build a client over an already-shared transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            remote: Remote::new(transport),
        }
    }

    /// Build a client owning its transport.
    pub fn from_transport<T: Transport>(transport: T) -> Self {
        Self::new(Arc::new(transport))
    }

    pub fn containers(&self) -> Containers {
        Containers::new(self.remote.clone())
    }

    pub fn images(&self) -> Images {
        Images::new(self.remote.clone())
    }

    pub fn services(&self) -> Services {
        Services::new(self.remote.clone())
    }

    pub fn execs(&self) -> Execs {
        Execs::new(self.remote.clone())
    }

    /// Daemon and API version information.
    pub async fn version(&self) -> Result<VersionInfo, Error> {
        self.remote
            .value(Call::get("/version", tables::version()))
            .await
    }

    /// Liveness probe; resolves with the daemon's answer text.
    pub async fn ping(&self) -> Result<String, Error> {
        self.remote.text(Call::get("/_ping", tables::ping())).await
    }

    /// System-wide daemon information.
    pub async fn info(&self) -> Result<SystemInfo, Error> {
        self.remote.value(Call::get("/info", tables::info())).await
    }

    /// Subscribe to daemon events, one JSON document per line. The stream
    /// stays open until dropped or ended by the daemon.
    pub async fn events(&self, opts: &EventsOptions) -> Result<JsonLines<EventMessage>, Error> {
        let call = Call::get("/events", tables::events())
            .queries(opts.to_query())
            .filters(&opts.filters)?;
        Ok(JsonLines::new(self.remote.stream(call).await?))
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventsOptions {
    /// Only events after this UNIX timestamp.
    pub since: Option<i64>,
    pub until: Option<i64>,
    /// Daemon-side filters, e.g. `type` or `container`.
    pub filters: HashMap<String, Vec<String>>,
}

impl EventsOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(since) = self.since {
            query.push(("since", since.to_string()));
        }
        if let Some(until) = self.until {
            query.push(("until", until.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VersionInfo {
    pub version: String,
    pub api_version: String,
    pub os: String,
    pub arch: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SystemInfo {
    #[serde(rename = "ID")]
    pub id: String,
    pub containers: i64,
    pub containers_running: i64,
    pub images: i64,
    pub name: String,
    pub server_version: String,
    pub operating_system: String,
}

/// One daemon event. The engine mixes casings here: entity fields are
/// PascalCase, `time` and `scope` are lowercase.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EventMessage {
    #[serde(rename = "Type")]
    pub typ: String,
    pub action: String,
    pub actor: EventActor,
    #[serde(rename = "scope")]
    pub scope: String,
    #[serde(rename = "time")]
    pub time: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EventActor {
    #[serde(rename = "ID")]
    pub id: String,
    pub attributes: HashMap<String, String>,
}
