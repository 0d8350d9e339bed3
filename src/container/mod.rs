//! Container handles and their collection.

use serde_json::Value;

use crate::error::Error;
use crate::exec::{Exec, ExecCreateOptions, Execs};
use crate::image::Image;
use crate::transport::{tables, Call, Remote};

pub mod fs;
mod lifecycle;
pub mod model;
pub mod options;
mod stream;

pub use fs::ContainerFs;
pub use model::{
    ContainerDetails, ContainerState, ContainerSummary, CreateResponse, FsChange, MemoryStats,
    PruneReport, StatsSample, Top, UpdateReport, WaitStatus,
};
pub use options::{
    AttachOptions, CommitOptions, CreateContainerOptions, HostConfig, KillOptions,
    ListContainersOptions, LogsOptions, PruneOptions, PutArchiveOptions, RemoveContainerOptions,
    RestartPolicy, StatsOptions, StopOptions, TopOptions, UpdateOptions, WaitOptions,
};
pub use stream::LogStream;

/// Collection-level container operations.
#[derive(Debug, Clone)]
pub struct Containers {
    remote: Remote,
}

impl Containers {
    pub(crate) fn new(remote: Remote) -> Self {
        Self { remote }
    }

    /// List containers, one handle per entry, in the daemon's order. Each
    /// handle carries its list entry as the initial snapshot.
    pub async fn list(&self, opts: &ListContainersOptions) -> Result<Vec<Container>, Error> {
        let call = Call::get("/containers/json", tables::container_list())
            .queries(opts.to_query())
            .filters(&opts.filters)?;
        let entries: Vec<Value> = self.remote.value(call).await?;

        entries
            .into_iter()
            .map(|entry| {
                let id = entry
                    .get("Id")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .ok_or_else(|| Error::transport("container list entry without an Id"))?;
                Ok(Container {
                    remote: self.remote.clone(),
                    id,
                    snapshot: Some(entry),
                })
            })
            .collect()
    }

    /// Create a container and return its handle with the create response
    /// attached as the snapshot.
    pub async fn create(&self, opts: &CreateContainerOptions) -> Result<Container, Error> {
        let mut call = Call::post("/containers/create", tables::container_create()).json(opts)?;
        if let Some(name) = &opts.name {
            call = call.query("name", name);
        }

        let body = self.remote.raw(call).await?;
        let created: CreateResponse = serde_json::from_value(body.clone())?;
        for warning in &created.warnings {
            tracing::warn!("creating container {}: {}", created.id, warning);
        }
        tracing::trace!("Created container {}", created.id);

        Ok(Container {
            remote: self.remote.clone(),
            id: created.id,
            snapshot: Some(body),
        })
    }

    /// Wrap a known identifier without touching the daemon.
    pub fn get(&self, id: impl Into<String>) -> Container {
        Container {
            remote: self.remote.clone(),
            id: id.into(),
            snapshot: None,
        }
    }

    /// Delete stopped containers; resolves with the ids removed.
    pub async fn prune(&self, opts: &PruneOptions) -> Result<PruneReport, Error> {
        let call =
            Call::post("/containers/prune", tables::container_prune()).filters(&opts.filters)?;
        self.remote.value(call).await
    }
}

/// Handle to one container.
///
/// The identifier is fixed at construction. Deleting the remote container
/// does not invalidate the handle; subsequent calls surface the daemon's
/// "no such container" answer.
#[derive(Debug, Clone)]
pub struct Container {
    pub(crate) remote: Remote,
    pub(crate) id: String,
    pub(crate) snapshot: Option<Value>,
}

impl Container {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last decoded representation of this container, replaced wholesale by
    /// every call that returns one. The shape depends on the originating
    /// call (list entry, inspect body, create response).
    pub fn snapshot(&self) -> Option<&Value> {
        self.snapshot.as_ref()
    }

    /// Fetch the current state, replacing the snapshot.
    pub async fn inspect(&mut self) -> Result<ContainerDetails, Error> {
        let call = Call::get(
            format!("/containers/{}/json", self.id),
            tables::container_inspect(),
        );
        let body = self.remote.raw(call).await?;
        let details = serde_json::from_value(body.clone())?;
        self.snapshot = Some(body);
        Ok(details)
    }

    /// Process table of the running container.
    pub async fn top(&self, opts: &TopOptions) -> Result<Top, Error> {
        let call = Call::get(format!("/containers/{}/top", self.id), tables::container_top())
            .queries(opts.to_query());
        self.remote.value(call).await
    }

    /// Filesystem changes relative to the image.
    pub async fn changes(&self) -> Result<Vec<FsChange>, Error> {
        let call = Call::get(
            format!("/containers/{}/changes", self.id),
            tables::container_changes(),
        );
        self.remote.value(call).await
    }

    /// Remove the container from the daemon.
    pub async fn remove(&self, opts: &RemoveContainerOptions) -> Result<(), Error> {
        tracing::trace!("Removing container {}", self.id);
        let call = Call::delete(format!("/containers/{}", self.id), tables::container_remove())
            .queries(opts.to_query());
        self.remote.unit(call).await
    }

    /// Create an image from this container's current filesystem.
    pub async fn commit(&self, opts: &CommitOptions) -> Result<Image, Error> {
        let call = Call::post("/commit", tables::commit())
            .query("container", &self.id)
            .queries(opts.to_query());
        let body = self.remote.raw(call).await?;
        let id = body
            .get("Id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::transport("commit response without an Id"))?;
        tracing::trace!("Committed container {} as image {}", self.id, id);
        Ok(Image::from_parts(self.remote.clone(), id, Some(body)))
    }

    /// Allocate an exec instance scoped to this container.
    pub async fn exec(&self, opts: &ExecCreateOptions) -> Result<Exec, Error> {
        Execs::new(self.remote.clone()).create(&self.id, opts).await
    }

    /// Filesystem archive access for this container.
    pub fn fs(&self) -> ContainerFs {
        ContainerFs::new(self.remote.clone(), self.id.clone())
    }
}
